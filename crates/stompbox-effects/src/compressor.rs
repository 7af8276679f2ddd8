//! Feed-forward compressor with an optional soft knee.
//!
//! ```text
//! input -> envelope follower -> gain computer -> gain * makeup -> output
//! ```
//!
//! With ratio 1:1 the gain computer returns exactly 0 dB, and with 0 dB of
//! makeup the compressor passes its input through unchanged.

use stompbox_core::{
    Effect, EnvelopeFollower, ParamDescriptor, ParamUnit, ParameterInfo, SmoothedParam,
    db_to_linear, linear_to_db,
};

pub(crate) const PARAMS: [ParamDescriptor; 6] = [
    ParamDescriptor::gain_db("Threshold", "Thresh", -60.0, 0.0, -18.0)
        .with_id("threshold"),
    ParamDescriptor::custom("Ratio", "Ratio", ParamUnit::Ratio, 1.0, 20.0, 4.0)
        .with_id("ratio"),
    ParamDescriptor::custom("Attack", "Attack", ParamUnit::Milliseconds, 0.1, 100.0, 10.0)
        .with_id("attack"),
    ParamDescriptor::time_ms("Release", "Release", 10.0, 1000.0, 100.0)
        .with_id("release"),
    ParamDescriptor::gain_db("Makeup", "Makeup", 0.0, 24.0, 0.0).with_id("makeup"),
    ParamDescriptor::gain_db("Knee", "Knee", 0.0, 12.0, 0.0).with_id("knee"),
];

/// Control record of the [`Compressor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorControls {
    /// Level where gain reduction starts, dB.
    pub threshold_db: f32,
    /// Input dB above threshold per output dB.
    pub ratio: f32,
    /// Envelope attack, ms.
    pub attack_ms: f32,
    /// Envelope release, ms.
    pub release_ms: f32,
    /// Output gain, dB.
    pub makeup_db: f32,
    /// Knee width, dB. Zero is a hard knee.
    pub knee_db: f32,
}

impl Default for CompressorControls {
    fn default() -> Self {
        Self {
            threshold_db: -18.0,
            ratio: 4.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            makeup_db: 0.0,
            knee_db: 0.0,
        }
    }
}

impl CompressorControls {
    /// Gain change in dB for an envelope level in dB. Never positive.
    #[inline]
    pub fn gain_db(&self, level_db: f32) -> f32 {
        let overshoot = level_db - self.threshold_db;
        let slope = 1.0 - 1.0 / self.ratio;
        let half_knee = self.knee_db / 2.0;

        if overshoot <= -half_knee {
            0.0
        } else if overshoot >= half_knee {
            -(overshoot * slope)
        } else {
            let x = overshoot + half_knee;
            -(slope * x * x / (2.0 * self.knee_db))
        }
    }
}

/// Dynamics compressor.
///
/// ## Parameter Indices (`ParameterInfo`)
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | Threshold | -60.0–0.0 dB | -18.0 |
/// | 1 | Ratio | 1.0–20.0 | 4.0 |
/// | 2 | Attack | 0.1–100.0 ms | 10.0 |
/// | 3 | Release | 10.0–1000.0 ms | 100.0 |
/// | 4 | Makeup | 0.0–24.0 dB | 0.0 |
/// | 5 | Knee | 0.0–12.0 dB | 0.0 |
#[derive(Debug, Clone)]
pub struct Compressor {
    controls: CompressorControls,
    envelope: EnvelopeFollower,
    makeup: SmoothedParam,
    gain_reduction_db: f32,
}

impl Compressor {
    /// Compressor with default controls.
    pub fn new(sample_rate: f32) -> Self {
        let controls = CompressorControls::default();
        Self {
            controls,
            envelope: EnvelopeFollower::with_times(
                sample_rate,
                controls.attack_ms,
                controls.release_ms,
            ),
            makeup: SmoothedParam::standard(db_to_linear(controls.makeup_db), sample_rate),
            gain_reduction_db: 0.0,
        }
    }

    /// Current controls.
    pub fn controls(&self) -> CompressorControls {
        self.controls
    }

    /// Replaces every control, clamping each to its range.
    pub fn set_controls(&mut self, controls: CompressorControls) {
        let c = CompressorControls {
            threshold_db: PARAMS[0].clamp(controls.threshold_db),
            ratio: PARAMS[1].clamp(controls.ratio),
            attack_ms: PARAMS[2].clamp(controls.attack_ms),
            release_ms: PARAMS[3].clamp(controls.release_ms),
            makeup_db: PARAMS[4].clamp(controls.makeup_db),
            knee_db: PARAMS[5].clamp(controls.knee_db),
        };
        self.envelope.set_attack_ms(c.attack_ms);
        self.envelope.set_release_ms(c.release_ms);
        if c.makeup_db != self.controls.makeup_db {
            self.makeup.set_target(db_to_linear(c.makeup_db));
        }
        self.controls = c;
    }

    /// Gain reduction applied to the last sample, dB (0 or negative).
    pub fn gain_reduction_db(&self) -> f32 {
        self.gain_reduction_db
    }
}

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let level = self.envelope.process(input);
        let reduction_db = self.controls.gain_db(linear_to_db(level));
        self.gain_reduction_db = reduction_db;

        let gain = if reduction_db == 0.0 {
            1.0
        } else {
            db_to_linear(reduction_db)
        };
        input * gain * self.makeup.advance()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope.set_sample_rate(sample_rate);
        self.makeup.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.envelope.reset();
        self.makeup.snap_to_target();
        self.gain_reduction_db = 0.0;
    }
}

impl ParameterInfo for Compressor {
    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        let c = &self.controls;
        match index {
            0 => c.threshold_db,
            1 => c.ratio,
            2 => c.attack_ms,
            3 => c.release_ms,
            4 => c.makeup_db,
            5 => c.knee_db,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let mut c = self.controls;
        match index {
            0 => c.threshold_db = value,
            1 => c.ratio = value,
            2 => c.attack_ms = value,
            3 => c.release_ms = value,
            4 => c.makeup_db = value,
            5 => c.knee_db = value,
            _ => return,
        }
        self.set_controls(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_ratio_is_transparent() {
        let mut comp = Compressor::new(48000.0);
        comp.set_controls(CompressorControls {
            threshold_db: 0.0,
            ratio: 1.0,
            ..CompressorControls::default()
        });
        for i in 0..4096 {
            let x = libm::sinf(i as f32 * 0.03) * 1.5;
            assert_eq!(comp.process(x).to_bits(), x.to_bits());
        }
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn reduces_loud_signals() {
        let mut comp = Compressor::new(48000.0);
        comp.set_param(0, -20.0);
        comp.set_param(1, 4.0);
        comp.set_param(2, 1.0);

        let mut out = 0.0;
        for _ in 0..4800 {
            out = comp.process(0.5);
        }
        // 0.5 is about -6 dB: 14 dB over, 10.5 dB of reduction
        assert!(out < 0.2, "got {out}");
        assert!((comp.gain_reduction_db() + 10.5).abs() < 0.5);
    }

    #[test]
    fn quiet_signals_pass() {
        let mut comp = Compressor::new(48000.0);
        for _ in 0..4800 {
            assert_eq!(comp.process(0.01), 0.01);
        }
    }

    #[test]
    fn soft_knee_is_continuous() {
        let c = CompressorControls {
            threshold_db: -20.0,
            ratio: 4.0,
            knee_db: 6.0,
            ..CompressorControls::default()
        };
        assert_eq!(c.gain_db(-23.0), 0.0);
        assert!((c.gain_db(-17.0) - -(3.0 * 0.75)).abs() < 1e-5);
        assert!(c.gain_db(-20.0) < 0.0);
        assert!(c.gain_db(-20.0) > c.gain_db(-18.0));
    }

    #[test]
    fn makeup_applies_after_smoothing() {
        let mut comp = Compressor::new(48000.0);
        comp.set_param(1, 1.0);
        comp.set_param(4, 6.0);
        let mut out = 0.0;
        for _ in 0..4800 {
            out = comp.process(0.1);
        }
        assert!((out - 0.1995).abs() < 1e-3, "got {out}");
        assert_eq!(comp.get_param(4), 6.0);
    }
}
