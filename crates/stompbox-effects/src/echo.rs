//! Feedback echo with a darkening repeat path.

use stompbox_core::{
    Effect, InterpolatedDelay, OnePole, ParamDescriptor, ParameterInfo, SmoothedParam,
    flush_denormal, ms_to_samples, wet_dry_mix,
};

/// Longest selectable echo time.
pub const MAX_ECHO_MS: f32 = 1000.0;

/// Cutoff of the low-pass inside the feedback loop.
const REPEAT_TONE_HZ: f32 = 4500.0;

pub(crate) const PARAMS: [ParamDescriptor; 3] = [
    ParamDescriptor::time_ms("Time", "Time", 1.0, MAX_ECHO_MS, 350.0).with_id("time"),
    ParamDescriptor {
        default: 40.0,
        ..ParamDescriptor::feedback()
    }
    .with_id("feedback"),
    ParamDescriptor::percent("Mix", "Mix", 35.0).with_id("mix"),
];

/// Control record of the [`Echo`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoControls {
    /// Delay between repeats, ms.
    pub time_ms: f32,
    /// Repeat level, percent.
    pub feedback_pct: f32,
    /// Wet level, percent.
    pub mix_pct: f32,
}

impl Default for EchoControls {
    fn default() -> Self {
        Self {
            time_ms: 350.0,
            feedback_pct: 40.0,
            mix_pct: 35.0,
        }
    }
}

/// Mono echo.
///
/// ## Parameter Indices (`ParameterInfo`)
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | Time | 1–1000 ms | 350 |
/// | 1 | Feedback | 0–95 % | 40 |
/// | 2 | Mix | 0–100 % | 35 |
///
/// The delay line is sized for [`MAX_ECHO_MS`] when the effect is built or
/// its sample rate changes; processing never allocates.
#[derive(Debug, Clone)]
pub struct Echo {
    controls: EchoControls,
    line: InterpolatedDelay,
    tone: OnePole,
    time_samples: SmoothedParam,
    feedback: SmoothedParam,
    mix: SmoothedParam,
    sample_rate: f32,
}

impl Echo {
    /// Echo with default controls.
    pub fn new(sample_rate: f32) -> Self {
        let controls = EchoControls::default();
        Self {
            controls,
            line: InterpolatedDelay::from_time(sample_rate, MAX_ECHO_MS / 1000.0),
            tone: OnePole::new(sample_rate, REPEAT_TONE_HZ),
            time_samples: SmoothedParam::with_config(
                ms_to_samples(controls.time_ms, sample_rate),
                sample_rate,
                80.0,
            ),
            feedback: SmoothedParam::standard(controls.feedback_pct / 100.0, sample_rate),
            mix: SmoothedParam::standard(controls.mix_pct / 100.0, sample_rate),
            sample_rate,
        }
    }

    /// Current controls.
    pub fn controls(&self) -> EchoControls {
        self.controls
    }

    /// Replaces every control, clamping each to its range.
    pub fn set_controls(&mut self, controls: EchoControls) {
        let c = EchoControls {
            time_ms: PARAMS[0].clamp(controls.time_ms),
            feedback_pct: PARAMS[1].clamp(controls.feedback_pct),
            mix_pct: PARAMS[2].clamp(controls.mix_pct),
        };
        self.time_samples
            .set_target(ms_to_samples(c.time_ms, self.sample_rate));
        self.feedback.set_target(c.feedback_pct / 100.0);
        self.mix.set_target(c.mix_pct / 100.0);
        self.controls = c;
    }
}

impl Effect for Echo {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let time = self.time_samples.advance();
        let feedback = self.feedback.advance();
        let mix = self.mix.advance();

        // read before write: offset by one so `time` samples separate repeats
        let delayed = self.line.read(time - 1.0);
        let repeat = self.tone.process(delayed);
        self.line.write(flush_denormal(input + repeat * feedback));

        wet_dry_mix(input, delayed, mix)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.line = InterpolatedDelay::from_time(sample_rate, MAX_ECHO_MS / 1000.0);
        self.tone.set_sample_rate(sample_rate);
        self.time_samples.set_sample_rate(sample_rate);
        self.time_samples
            .set_immediate(ms_to_samples(self.controls.time_ms, sample_rate));
        self.feedback.set_sample_rate(sample_rate);
        self.mix.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.line.clear();
        self.tone.reset();
        self.time_samples.snap_to_target();
        self.feedback.snap_to_target();
        self.mix.snap_to_target();
    }
}

impl ParameterInfo for Echo {
    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.controls.time_ms,
            1 => self.controls.feedback_pct,
            2 => self.controls.mix_pct,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let mut c = self.controls;
        match index {
            0 => c.time_ms = value,
            1 => c.feedback_pct = value,
            2 => c.mix_pct = value,
            _ => return,
        }
        self.set_controls(c);
    }
}
