//! Speaker cabinet voicing.
//!
//! A closed-back 4x12 is approximated by a low cut, a resonant bump near
//! the speaker's resonance, a presence peak, and a steep high cut from two
//! cascaded 2-pole low-passes (4th-order Butterworth).

use stompbox_core::{
    Biquad, Effect, ParamDescriptor, ParameterInfo, SmoothedParam, highpass_coefficients,
    lowpass_coefficients, peaking_eq_coefficients, wet_dry_mix,
};

const RESONANCE_HZ: f32 = 110.0;
const RESONANCE_Q: f32 = 1.4;
const PRESENCE_HZ: f32 = 2500.0;
const PRESENCE_Q: f32 = 0.8;
/// Stage Qs of a 4th-order Butterworth.
const HIGH_CUT_Q: [f32; 2] = [0.541, 1.307];

pub(crate) const PARAMS: [ParamDescriptor; 5] = [
    ParamDescriptor::frequency_hz("Low Cut", "LoCut", 40.0, 200.0, 80.0)
        .with_id("low_cut"),
    ParamDescriptor::gain_db("Resonance", "Reso", 0.0, 9.0, 3.0).with_id("resonance"),
    ParamDescriptor::gain_db("Presence", "Pres", -9.0, 9.0, 0.0).with_id("presence"),
    ParamDescriptor::frequency_hz("High Cut", "HiCut", 2000.0, 10000.0, 5000.0)
        .with_id("high_cut"),
    ParamDescriptor::percent("Mix", "Mix", 100.0).with_id("mix"),
];

/// Control record of the [`Cabinet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CabinetControls {
    /// High-pass cutoff, Hz.
    pub low_cut_hz: f32,
    /// Low resonance boost, dB.
    pub resonance_db: f32,
    /// Upper-mid presence, dB.
    pub presence_db: f32,
    /// Low-pass cutoff, Hz.
    pub high_cut_hz: f32,
    /// Wet level, percent.
    pub mix_pct: f32,
}

impl Default for CabinetControls {
    fn default() -> Self {
        Self {
            low_cut_hz: 80.0,
            resonance_db: 3.0,
            presence_db: 0.0,
            high_cut_hz: 5000.0,
            mix_pct: 100.0,
        }
    }
}

/// Cabinet simulator.
#[derive(Debug, Clone)]
pub struct Cabinet {
    controls: CabinetControls,
    low_cut: Biquad,
    resonance: Biquad,
    presence: Biquad,
    high_cut: [Biquad; 2],
    mix: SmoothedParam,
    sample_rate: f32,
}

impl Cabinet {
    /// Cabinet with default controls.
    pub fn new(sample_rate: f32) -> Self {
        let controls = CabinetControls::default();
        let mut cab = Self {
            controls,
            low_cut: Biquad::new(),
            resonance: Biquad::new(),
            presence: Biquad::new(),
            high_cut: [Biquad::new(), Biquad::new()],
            mix: SmoothedParam::standard(controls.mix_pct / 100.0, sample_rate),
            sample_rate,
        };
        cab.update_filters();
        cab
    }

    /// Current controls.
    pub fn controls(&self) -> CabinetControls {
        self.controls
    }

    /// Replaces every control, clamping each to its range.
    pub fn set_controls(&mut self, controls: CabinetControls) {
        self.controls = CabinetControls {
            low_cut_hz: PARAMS[0].clamp(controls.low_cut_hz),
            resonance_db: PARAMS[1].clamp(controls.resonance_db),
            presence_db: PARAMS[2].clamp(controls.presence_db),
            high_cut_hz: PARAMS[3].clamp(controls.high_cut_hz),
            mix_pct: PARAMS[4].clamp(controls.mix_pct),
        };
        self.mix.set_target(self.controls.mix_pct / 100.0);
        self.update_filters();
    }

    fn update_filters(&mut self) {
        let sr = self.sample_rate;
        let c = self.controls;
        self.low_cut
            .set(highpass_coefficients(c.low_cut_hz, 0.707, sr));
        self.resonance.set(peaking_eq_coefficients(
            RESONANCE_HZ,
            RESONANCE_Q,
            c.resonance_db,
            sr,
        ));
        self.presence.set(peaking_eq_coefficients(
            PRESENCE_HZ,
            PRESENCE_Q,
            c.presence_db,
            sr,
        ));
        for (stage, q) in self.high_cut.iter_mut().zip(HIGH_CUT_Q) {
            stage.set(lowpass_coefficients(c.high_cut_hz, q, sr));
        }
    }
}

impl Effect for Cabinet {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let mut wet = self.low_cut.process(input);
        wet = self.resonance.process(wet);
        wet = self.presence.process(wet);
        for stage in &mut self.high_cut {
            wet = stage.process(wet);
        }
        wet_dry_mix(input, wet, self.mix.advance())
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.mix.set_sample_rate(sample_rate);
        self.update_filters();
    }

    fn reset(&mut self) {
        self.low_cut.clear();
        self.resonance.clear();
        self.presence.clear();
        for stage in &mut self.high_cut {
            stage.clear();
        }
        self.mix.snap_to_target();
    }
}

impl ParameterInfo for Cabinet {
    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        let c = &self.controls;
        match index {
            0 => c.low_cut_hz,
            1 => c.resonance_db,
            2 => c.presence_db,
            3 => c.high_cut_hz,
            4 => c.mix_pct,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let mut c = self.controls;
        match index {
            0 => c.low_cut_hz = value,
            1 => c.resonance_db = value,
            2 => c.presence_db = value,
            3 => c.high_cut_hz = value,
            4 => c.mix_pct = value,
            _ => return,
        }
        self.set_controls(c);
    }
}
