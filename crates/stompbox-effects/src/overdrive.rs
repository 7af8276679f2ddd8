//! Asymmetric soft-clipping overdrive.
//!
//! ```text
//! input -> drive gain -> asymmetric clip -> DC block -> tone low-pass -> level
//! ```

use stompbox_core::{
    Biquad, Effect, OnePole, ParamDescriptor, ParameterInfo, SmoothedParam,
    asymmetric_clip, db_to_linear, highpass_coefficients,
};

/// The clipper is asymmetric, so its output carries DC.
const DC_BLOCK_HZ: f32 = 25.0;

pub(crate) const PARAMS: [ParamDescriptor; 3] = [
    ParamDescriptor::gain_db("Drive", "Drive", 0.0, 40.0, 12.0).with_id("drive"),
    ParamDescriptor::frequency_hz("Tone", "Tone", 500.0, 8000.0, 3000.0)
        .with_id("tone"),
    ParamDescriptor::gain_db("Level", "Level", -20.0, 6.0, -6.0).with_id("level"),
];

/// Control record of the [`Overdrive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverdriveControls {
    /// Gain into the clipper, dB.
    pub drive_db: f32,
    /// Tone low-pass cutoff, Hz.
    pub tone_hz: f32,
    /// Output level, dB.
    pub level_db: f32,
}

impl Default for OverdriveControls {
    fn default() -> Self {
        Self {
            drive_db: 12.0,
            tone_hz: 3000.0,
            level_db: -6.0,
        }
    }
}

/// Overdrive pedal.
#[derive(Debug, Clone)]
pub struct Overdrive {
    controls: OverdriveControls,
    drive: SmoothedParam,
    level: SmoothedParam,
    dc_block: Biquad,
    tone: OnePole,
    sample_rate: f32,
}

impl Overdrive {
    /// Overdrive with default controls.
    pub fn new(sample_rate: f32) -> Self {
        let controls = OverdriveControls::default();
        Self {
            controls,
            drive: SmoothedParam::with_config(db_to_linear(controls.drive_db), sample_rate, 5.0),
            level: SmoothedParam::with_config(db_to_linear(controls.level_db), sample_rate, 5.0),
            dc_block: Biquad::with_coefficients(highpass_coefficients(
                DC_BLOCK_HZ,
                0.707,
                sample_rate,
            )),
            tone: OnePole::new(sample_rate, controls.tone_hz),
            sample_rate,
        }
    }

    /// Current controls.
    pub fn controls(&self) -> OverdriveControls {
        self.controls
    }

    /// Replaces every control, clamping each to its range.
    pub fn set_controls(&mut self, controls: OverdriveControls) {
        let c = OverdriveControls {
            drive_db: PARAMS[0].clamp(controls.drive_db),
            tone_hz: PARAMS[1].clamp(controls.tone_hz),
            level_db: PARAMS[2].clamp(controls.level_db),
        };
        self.drive.set_target(db_to_linear(c.drive_db));
        self.level.set_target(db_to_linear(c.level_db));
        self.tone.set_frequency(c.tone_hz);
        self.controls = c;
    }
}

impl Effect for Overdrive {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let driven = asymmetric_clip(input * self.drive.advance());
        let centered = self.dc_block.process(driven);
        self.tone.process(centered) * self.level.advance()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.drive.set_sample_rate(sample_rate);
        self.level.set_sample_rate(sample_rate);
        self.dc_block
            .set(highpass_coefficients(DC_BLOCK_HZ, 0.707, sample_rate));
        self.tone.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.drive.snap_to_target();
        self.level.snap_to_target();
        self.dc_block.clear();
        self.tone.reset();
    }
}

impl ParameterInfo for Overdrive {
    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.controls.drive_db,
            1 => self.controls.tone_hz,
            2 => self.controls.level_db,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let mut c = self.controls;
        match index {
            0 => c.drive_db = value,
            1 => c.tone_hz = value,
            2 => c.level_db = value,
            _ => return,
        }
        self.set_controls(c);
    }
}
