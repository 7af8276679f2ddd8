//! Tremolo: amplitude modulation by a low-frequency oscillator.

use stompbox_core::{
    Effect, Lfo, LfoWaveform, ParamDescriptor, ParameterInfo, SmoothedParam,
};

pub(crate) const PARAMS: [ParamDescriptor; 3] = [
    ParamDescriptor::rate_hz(0.5, 20.0, 5.0).with_id("rate"),
    ParamDescriptor::percent("Depth", "Depth", 50.0).with_id("depth"),
    ParamDescriptor::choice("Shape", "Shape", 3, 0).with_id("shape"),
];

/// Control record of the [`Tremolo`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TremoloControls {
    /// LFO rate in Hz.
    pub rate_hz: f32,
    /// Modulation depth, percent.
    pub depth_pct: f32,
    /// LFO shape.
    pub shape: LfoWaveform,
}

impl Default for TremoloControls {
    fn default() -> Self {
        Self {
            rate_hz: 5.0,
            depth_pct: 50.0,
            shape: LfoWaveform::Sine,
        }
    }
}

/// LFO tremolo.
///
/// Gain swings between `1 - depth` and 1, so depth 0 leaves the signal
/// untouched.
///
/// ```rust
/// use stompbox_core::{Effect, LfoWaveform};
/// use stompbox_effects::{Tremolo, TremoloControls};
///
/// let mut trem = Tremolo::new(48000.0);
/// trem.set_controls(TremoloControls {
///     rate_hz: 6.0,
///     depth_pct: 80.0,
///     shape: LfoWaveform::Triangle,
/// });
/// assert!(trem.process(0.5).abs() <= 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Tremolo {
    controls: TremoloControls,
    lfo: Lfo,
    depth: SmoothedParam,
}

impl Tremolo {
    /// Tremolo with default controls.
    pub fn new(sample_rate: f32) -> Self {
        let controls = TremoloControls::default();
        Self {
            controls,
            lfo: Lfo::new(sample_rate, controls.rate_hz),
            depth: SmoothedParam::standard(controls.depth_pct / 100.0, sample_rate),
        }
    }

    /// Current controls.
    pub fn controls(&self) -> TremoloControls {
        self.controls
    }

    /// Replaces every control, clamping each to its range.
    pub fn set_controls(&mut self, controls: TremoloControls) {
        let c = TremoloControls {
            rate_hz: PARAMS[0].clamp(controls.rate_hz),
            depth_pct: PARAMS[1].clamp(controls.depth_pct),
            shape: controls.shape,
        };
        self.lfo.set_frequency(c.rate_hz);
        self.lfo.set_waveform(c.shape);
        self.depth.set_target(c.depth_pct / 100.0);
        self.controls = c;
    }
}

impl Effect for Tremolo {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let depth = self.depth.advance();
        let lfo = self.lfo.next_unipolar();
        input * (1.0 - depth * (1.0 - lfo))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.lfo.set_sample_rate(sample_rate);
        self.depth.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.lfo.reset();
        self.depth.snap_to_target();
    }
}

impl ParameterInfo for Tremolo {
    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.controls.rate_hz,
            1 => self.controls.depth_pct,
            2 => self.controls.shape.index(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let mut c = self.controls;
        match index {
            0 => c.rate_hz = value,
            1 => c.depth_pct = value,
            2 => c.shape = LfoWaveform::from_index(PARAMS[2].sanitize(value)),
            _ => return,
        }
        self.set_controls(c);
    }
}
