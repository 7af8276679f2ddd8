//! The closed set of effects and their registry.
//!
//! [`Pedal`] wraps every effect in one enum so an
//! [`EffectChain<Pedal>`](stompbox_core::EffectChain) holds a heterogeneous
//! pedalboard in a fixed array with no boxing. [`EffectKind`] names each
//! variant with a stable string id used by presets and the command line.

use core::fmt;

use stompbox_core::{Effect, ErrorCode, ParamDescriptor, ParameterInfo};

use crate::{Cabinet, Compressor, Echo, Equalizer, Overdrive, Reverb, Tremolo};

/// Broad grouping used when listing effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    /// Level-dependent gain.
    Dynamics,
    /// Saturation and clipping.
    Distortion,
    /// Time-varying gain or pitch.
    Modulation,
    /// Delays and reverbs.
    TimeBased,
    /// Static tone shaping.
    Filter,
}

impl EffectCategory {
    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            EffectCategory::Dynamics => "Dynamics",
            EffectCategory::Distortion => "Distortion",
            EffectCategory::Modulation => "Modulation",
            EffectCategory::TimeBased => "Time-Based",
            EffectCategory::Filter => "Filter",
        }
    }
}

/// Identity of each effect type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Three-band equalizer.
    Equalizer,
    /// Compressor.
    Compressor,
    /// Reverb.
    Reverb,
    /// Tremolo.
    Tremolo,
    /// Echo.
    Echo,
    /// Overdrive.
    Overdrive,
    /// Cabinet simulator.
    Cabinet,
}

impl EffectKind {
    /// Every kind, in listing order.
    pub const ALL: [EffectKind; 7] = [
        EffectKind::Equalizer,
        EffectKind::Compressor,
        EffectKind::Overdrive,
        EffectKind::Cabinet,
        EffectKind::Tremolo,
        EffectKind::Echo,
        EffectKind::Reverb,
    ];

    /// Stable id used in presets.
    pub const fn id(self) -> &'static str {
        match self {
            EffectKind::Equalizer => "eq",
            EffectKind::Compressor => "compressor",
            EffectKind::Reverb => "reverb",
            EffectKind::Tremolo => "tremolo",
            EffectKind::Echo => "echo",
            EffectKind::Overdrive => "overdrive",
            EffectKind::Cabinet => "cabinet",
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            EffectKind::Equalizer => "Equalizer",
            EffectKind::Compressor => "Compressor",
            EffectKind::Reverb => "Reverb",
            EffectKind::Tremolo => "Tremolo",
            EffectKind::Echo => "Echo",
            EffectKind::Overdrive => "Overdrive",
            EffectKind::Cabinet => "Cabinet",
        }
    }

    /// One-line description.
    pub const fn description(self) -> &'static str {
        match self {
            EffectKind::Equalizer => "Low shelf, sweepable mid and high shelf",
            EffectKind::Compressor => "Feed-forward compressor with soft knee",
            EffectKind::Reverb => "Freeverb-style room with pre-delay",
            EffectKind::Tremolo => "LFO amplitude modulation",
            EffectKind::Echo => "Feedback delay with darkening repeats",
            EffectKind::Overdrive => "Asymmetric soft-clipping drive with tone control",
            EffectKind::Cabinet => "Speaker cabinet voicing filters",
        }
    }

    /// Category for listings.
    pub const fn category(self) -> EffectCategory {
        match self {
            EffectKind::Equalizer | EffectKind::Cabinet => EffectCategory::Filter,
            EffectKind::Compressor => EffectCategory::Dynamics,
            EffectKind::Reverb | EffectKind::Echo => EffectCategory::TimeBased,
            EffectKind::Tremolo => EffectCategory::Modulation,
            EffectKind::Overdrive => EffectCategory::Distortion,
        }
    }

    /// Looks up a kind by id, display name, or common alias (ASCII
    /// case-insensitive).
    ///
    /// ```rust
    /// use stompbox_effects::EffectKind;
    ///
    /// assert_eq!(EffectKind::from_id("eq"), Some(EffectKind::Equalizer));
    /// assert_eq!(EffectKind::from_id("Delay"), Some(EffectKind::Echo));
    /// assert_eq!(EffectKind::from_id("flanger"), None);
    /// ```
    pub fn from_id(id: &str) -> Option<Self> {
        const ALIASES: [(&str, EffectKind); 9] = [
            ("equalizer", EffectKind::Equalizer),
            ("eq3", EffectKind::Equalizer),
            ("comp", EffectKind::Compressor),
            ("verb", EffectKind::Reverb),
            ("trem", EffectKind::Tremolo),
            ("delay", EffectKind::Echo),
            ("drive", EffectKind::Overdrive),
            ("od", EffectKind::Overdrive),
            ("cab", EffectKind::Cabinet),
        ];
        Self::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(id) || kind.name().eq_ignore_ascii_case(id))
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(id))
                    .map(|&(_, kind)| kind)
            })
    }

    /// Parameter descriptors of this kind, in index order.
    pub fn params(self) -> &'static [ParamDescriptor] {
        match self {
            Self::Equalizer => &crate::eq::PARAMS,
            Self::Compressor => &crate::compressor::PARAMS,
            Self::Reverb => &crate::reverb::PARAMS,
            Self::Tremolo => &crate::tremolo::PARAMS,
            Self::Echo => &crate::echo::PARAMS,
            Self::Overdrive => &crate::overdrive::PARAMS,
            Self::Cabinet => &crate::cabinet::PARAMS,
        }
    }

    /// Index and descriptor of the parameter called `name` (string id,
    /// name or short name, ASCII case-insensitive).
    ///
    /// ```rust
    /// use stompbox_effects::EffectKind;
    ///
    /// let (index, desc) = EffectKind::Echo.find_param("Time").unwrap();
    /// assert_eq!((index, desc.string_id), (0, "time"));
    /// ```
    pub fn find_param(self, name: &str) -> Option<(usize, ParamDescriptor)> {
        self.params().iter().copied().enumerate().find(|(_, desc)| {
            desc.string_id.eq_ignore_ascii_case(name)
                || desc.name.eq_ignore_ascii_case(name)
                || desc.short_name.eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Any effect of the pedalboard.
#[derive(Debug, Clone)]
pub enum Pedal {
    /// See [`Equalizer`].
    Equalizer(Equalizer),
    /// See [`Compressor`].
    Compressor(Compressor),
    /// See [`Reverb`].
    Reverb(Reverb),
    /// See [`Tremolo`].
    Tremolo(Tremolo),
    /// See [`Echo`].
    Echo(Echo),
    /// See [`Overdrive`].
    Overdrive(Overdrive),
    /// See [`Cabinet`].
    Cabinet(Cabinet),
}

/// Forwards to the wrapped effect.
macro_rules! dispatch {
    ($self:expr, $fx:ident => $body:expr) => {
        match $self {
            Pedal::Equalizer($fx) => $body,
            Pedal::Compressor($fx) => $body,
            Pedal::Reverb($fx) => $body,
            Pedal::Tremolo($fx) => $body,
            Pedal::Echo($fx) => $body,
            Pedal::Overdrive($fx) => $body,
            Pedal::Cabinet($fx) => $body,
        }
    };
}

impl Pedal {
    /// Builds a `kind` effect with default controls.
    pub fn new(kind: EffectKind, sample_rate: f32) -> Self {
        match kind {
            EffectKind::Equalizer => Pedal::Equalizer(Equalizer::new(sample_rate)),
            EffectKind::Compressor => Pedal::Compressor(Compressor::new(sample_rate)),
            EffectKind::Reverb => Pedal::Reverb(Reverb::new(sample_rate)),
            EffectKind::Tremolo => Pedal::Tremolo(Tremolo::new(sample_rate)),
            EffectKind::Echo => Pedal::Echo(Echo::new(sample_rate)),
            EffectKind::Overdrive => Pedal::Overdrive(Overdrive::new(sample_rate)),
            EffectKind::Cabinet => Pedal::Cabinet(Cabinet::new(sample_rate)),
        }
    }

    /// Builds an effect from its id or alias.
    pub fn from_id(id: &str, sample_rate: f32) -> Option<Self> {
        EffectKind::from_id(id).map(|kind| Self::new(kind, sample_rate))
    }

    /// Kind of the wrapped effect.
    pub fn kind(&self) -> EffectKind {
        match self {
            Pedal::Equalizer(_) => EffectKind::Equalizer,
            Pedal::Compressor(_) => EffectKind::Compressor,
            Pedal::Reverb(_) => EffectKind::Reverb,
            Pedal::Tremolo(_) => EffectKind::Tremolo,
            Pedal::Echo(_) => EffectKind::Echo,
            Pedal::Overdrive(_) => EffectKind::Overdrive,
            Pedal::Cabinet(_) => EffectKind::Cabinet,
        }
    }
}

impl Effect for Pedal {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        dispatch!(self, fx => fx.process(input))
    }

    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        dispatch!(self, fx => fx.process_block(input, output))
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        dispatch!(self, fx => fx.process_block_inplace(buffer))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        dispatch!(self, fx => fx.set_sample_rate(sample_rate))
    }

    fn reset(&mut self) {
        dispatch!(self, fx => fx.reset())
    }

    fn latency_samples(&self) -> usize {
        dispatch!(self, fx => fx.latency_samples())
    }

    fn fault(&self) -> Option<ErrorCode> {
        dispatch!(self, fx => fx.fault())
    }
}

impl ParameterInfo for Pedal {
    fn param_count(&self) -> usize {
        dispatch!(self, fx => fx.param_count())
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        dispatch!(self, fx => fx.param_info(index))
    }

    fn get_param(&self, index: usize) -> f32 {
        dispatch!(self, fx => fx.get_param(index))
    }

    fn set_param(&mut self, index: usize, value: f32) {
        dispatch!(self, fx => fx.set_param(index, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stompbox_core::{MAX_PARAMS, ParamFlags};

    #[test]
    fn every_kind_round_trips_through_its_id() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::from_id(kind.id()), Some(kind));
            assert_eq!(EffectKind::from_id(kind.name()), Some(kind));
            assert_eq!(Pedal::new(kind, 48000.0).kind(), kind);
        }
        assert_eq!(EffectKind::from_id("CAB"), Some(EffectKind::Cabinet));
        assert!(Pedal::from_id("wah", 48000.0).is_none());
    }

    #[test]
    fn descriptors_are_consistent() {
        for kind in EffectKind::ALL {
            let pedal = Pedal::new(kind, 48000.0);
            assert!(pedal.param_count() <= MAX_PARAMS);
            let mut ids = Vec::new();
            for (i, desc) in kind.params().iter().enumerate() {
                assert!(desc.min < desc.max, "{kind}.{}", desc.string_id);
                assert!(desc.contains(desc.default), "{kind}.{}", desc.string_id);
                assert_eq!(pedal.get_param(i), desc.default, "{kind}.{}", desc.string_id);
                assert_eq!(pedal.find_param_by_name(desc.string_id), Some(i));
                assert_eq!(kind.find_param(desc.string_id), Some((i, *desc)));
                assert_eq!(pedal.param_info(i).as_ref(), Some(desc));
                assert!(desc.flags.contains(ParamFlags::AUTOMATABLE));
                assert!(!ids.contains(&desc.string_id));
                ids.push(desc.string_id);
            }
            assert_eq!(ids.len(), pedal.param_count());
        }
    }

    #[test]
    fn set_param_clamps_for_every_kind() {
        for kind in EffectKind::ALL {
            let mut pedal = Pedal::new(kind, 48000.0);
            for (i, desc) in kind.params().iter().enumerate() {
                pedal.set_param(i, desc.max + 1000.0);
                assert_eq!(pedal.get_param(i), desc.max, "{kind}.{}", desc.string_id);
                pedal.set_param(i, desc.min - 1000.0);
                assert_eq!(pedal.get_param(i), desc.min, "{kind}.{}", desc.string_id);
            }
        }
    }
}
