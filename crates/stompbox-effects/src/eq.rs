//! Three-band guitar equalizer.
//!
//! Low shelf at 120 Hz, a sweepable peaking mid band and a high shelf at
//! 3.2 kHz, all RBJ biquads. Coefficients are recomputed when a control
//! changes, which happens at block boundaries only.

use stompbox_core::{
    Biquad, Effect, ParamDescriptor, ParameterInfo, high_shelf_coefficients,
    low_shelf_coefficients, peaking_eq_coefficients,
};

const LOW_SHELF_HZ: f32 = 120.0;
const HIGH_SHELF_HZ: f32 = 3200.0;
const SHELF_Q: f32 = 0.707;
const MID_Q: f32 = 0.9;

pub(crate) const PARAMS: [ParamDescriptor; 4] = [
    ParamDescriptor::gain_db("Low", "Low", -12.0, 12.0, 0.0).with_id("low"),
    ParamDescriptor::gain_db("Mid", "Mid", -12.0, 12.0, 0.0).with_id("mid"),
    ParamDescriptor::gain_db("High", "High", -12.0, 12.0, 0.0).with_id("high"),
    ParamDescriptor::frequency_hz("Mid Frequency", "MidFreq", 200.0, 5000.0, 800.0)
        .with_id("mid_freq"),
];

/// Control record of the [`Equalizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqControls {
    /// Low shelf gain in dB.
    pub low_db: f32,
    /// Mid band gain in dB.
    pub mid_db: f32,
    /// High shelf gain in dB.
    pub high_db: f32,
    /// Mid band center in Hz.
    pub mid_freq_hz: f32,
}

impl Default for EqControls {
    fn default() -> Self {
        Self {
            low_db: 0.0,
            mid_db: 0.0,
            high_db: 0.0,
            mid_freq_hz: 800.0,
        }
    }
}

/// Three-band equalizer.
///
/// ## Parameter Indices (`ParameterInfo`)
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | Low | -12.0–12.0 dB | 0.0 |
/// | 1 | Mid | -12.0–12.0 dB | 0.0 |
/// | 2 | High | -12.0–12.0 dB | 0.0 |
/// | 3 | Mid Frequency | 200–5000 Hz | 800 |
///
/// # Example
///
/// ```rust
/// use stompbox_core::Effect;
/// use stompbox_effects::{EqControls, Equalizer};
///
/// let mut eq = Equalizer::new(48000.0);
/// eq.set_controls(EqControls { high_db: -4.0, ..EqControls::default() });
/// let _ = eq.process(0.2);
/// ```
#[derive(Debug, Clone)]
pub struct Equalizer {
    controls: EqControls,
    low: Biquad,
    mid: Biquad,
    high: Biquad,
    sample_rate: f32,
}

impl Equalizer {
    /// Flat equalizer.
    pub fn new(sample_rate: f32) -> Self {
        let mut eq = Self {
            controls: EqControls::default(),
            low: Biquad::new(),
            mid: Biquad::new(),
            high: Biquad::new(),
            sample_rate,
        };
        eq.update_coefficients();
        eq
    }

    /// Current controls.
    pub fn controls(&self) -> EqControls {
        self.controls
    }

    /// Replaces every control, clamping each to its range.
    pub fn set_controls(&mut self, controls: EqControls) {
        self.controls = EqControls {
            low_db: PARAMS[0].clamp(controls.low_db),
            mid_db: PARAMS[1].clamp(controls.mid_db),
            high_db: PARAMS[2].clamp(controls.high_db),
            mid_freq_hz: PARAMS[3].clamp(controls.mid_freq_hz),
        };
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        let sr = self.sample_rate;
        let c = self.controls;
        self.low
            .set(low_shelf_coefficients(LOW_SHELF_HZ, SHELF_Q, c.low_db, sr));
        self.mid
            .set(peaking_eq_coefficients(c.mid_freq_hz, MID_Q, c.mid_db, sr));
        self.high
            .set(high_shelf_coefficients(HIGH_SHELF_HZ, SHELF_Q, c.high_db, sr));
    }
}

impl Effect for Equalizer {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let low = self.low.process(input);
        let mid = self.mid.process(low);
        self.high.process(mid)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    fn reset(&mut self) {
        self.low.clear();
        self.mid.clear();
        self.high.clear();
    }
}

impl ParameterInfo for Equalizer {
    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.controls.low_db,
            1 => self.controls.mid_db,
            2 => self.controls.high_db,
            3 => self.controls.mid_freq_hz,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let mut c = self.controls;
        match index {
            0 => c.low_db = value,
            1 => c.mid_db = value,
            2 => c.high_db = value,
            3 => c.mid_freq_hz = value,
            _ => return,
        }
        self.set_controls(c);
    }
}
