//! Freeverb-style reverb: eight damped combs in parallel feeding four
//! all-pass diffusers in series, behind a pre-delay.

use stompbox_core::{
    AllpassFilter, CombFilter, Effect, InterpolatedDelay, ParamDescriptor, ParameterInfo,
    SmoothedParam, ms_to_samples, wet_dry_mix,
};

/// Comb lengths at 44.1 kHz, mutually prime.
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
/// All-pass lengths at 44.1 kHz.
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];
const REFERENCE_RATE: f32 = 44100.0;
/// Longest pre-delay in milliseconds.
pub const MAX_PREDELAY_MS: f32 = 100.0;

pub(crate) const PARAMS: [ParamDescriptor; 5] = [
    ParamDescriptor::percent("Decay", "Decay", 50.0).with_id("decay"),
    ParamDescriptor::time_ms("Pre-Delay", "PreDly", 0.0, MAX_PREDELAY_MS, 10.0)
        .with_id("predelay"),
    ParamDescriptor::percent("Size", "Size", 50.0).with_id("size"),
    ParamDescriptor::percent("Damping", "Damp", 50.0).with_id("damping"),
    ParamDescriptor::percent("Mix", "Mix", 30.0).with_id("mix"),
];

fn scale_to_rate(samples: usize, sample_rate: f32) -> usize {
    (libm::roundf(samples as f32 * sample_rate / REFERENCE_RATE) as usize).max(1)
}

/// Control record of the [`Reverb`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbControls {
    /// Tail length, percent.
    pub decay_pct: f32,
    /// Gap before the tail, ms.
    pub predelay_ms: f32,
    /// Room size, percent.
    pub size_pct: f32,
    /// High-frequency absorption, percent.
    pub damping_pct: f32,
    /// Wet level, percent.
    pub mix_pct: f32,
}

impl Default for ReverbControls {
    fn default() -> Self {
        Self {
            decay_pct: 50.0,
            predelay_ms: 10.0,
            size_pct: 50.0,
            damping_pct: 50.0,
            mix_pct: 30.0,
        }
    }
}

/// Algorithmic reverb.
///
/// ## Parameter Indices (`ParameterInfo`)
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | Decay | 0–100 % | 50 |
/// | 1 | Pre-Delay | 0–100 ms | 10 |
/// | 2 | Size | 0–100 % | 50 |
/// | 3 | Damping | 0–100 % | 50 |
/// | 4 | Mix | 0–100 % | 30 |
///
/// Comb and all-pass lines are allocated in `new` and `set_sample_rate`.
#[derive(Debug, Clone)]
pub struct Reverb {
    controls: ReverbControls,
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
    predelay: InterpolatedDelay,
    predelay_samples: SmoothedParam,
    mix: SmoothedParam,
    sample_rate: f32,
}

impl Reverb {
    /// Reverb with default controls.
    pub fn new(sample_rate: f32) -> Self {
        let controls = ReverbControls::default();
        let mut reverb = Self {
            controls,
            combs: Self::build_combs(sample_rate),
            allpasses: Self::build_allpasses(sample_rate),
            predelay: InterpolatedDelay::from_time(sample_rate, MAX_PREDELAY_MS / 1000.0),
            predelay_samples: SmoothedParam::with_config(
                ms_to_samples(controls.predelay_ms, sample_rate),
                sample_rate,
                50.0,
            ),
            mix: SmoothedParam::standard(controls.mix_pct / 100.0, sample_rate),
            sample_rate,
        };
        reverb.update_tank();
        reverb
    }

    fn build_combs(sample_rate: f32) -> [CombFilter; 8] {
        core::array::from_fn(|i| CombFilter::new(scale_to_rate(COMB_TUNINGS_44K[i], sample_rate)))
    }

    fn build_allpasses(sample_rate: f32) -> [AllpassFilter; 4] {
        core::array::from_fn(|i| {
            let mut ap = AllpassFilter::new(scale_to_rate(ALLPASS_TUNINGS_44K[i], sample_rate));
            ap.set_feedback(0.5);
            ap
        })
    }

    /// Current controls.
    pub fn controls(&self) -> ReverbControls {
        self.controls
    }

    /// Replaces every control, clamping each to its range.
    pub fn set_controls(&mut self, controls: ReverbControls) {
        self.controls = ReverbControls {
            decay_pct: PARAMS[0].clamp(controls.decay_pct),
            predelay_ms: PARAMS[1].clamp(controls.predelay_ms),
            size_pct: PARAMS[2].clamp(controls.size_pct),
            damping_pct: PARAMS[3].clamp(controls.damping_pct),
            mix_pct: PARAMS[4].clamp(controls.mix_pct),
        };
        self.predelay_samples
            .set_target(ms_to_samples(self.controls.predelay_ms, self.sample_rate));
        self.mix.set_target(self.controls.mix_pct / 100.0);
        self.update_tank();
    }

    /// Comb feedback for the current size and decay, in `0.28..=0.98`.
    pub fn feedback(&self) -> f32 {
        let size = self.controls.size_pct / 100.0;
        let decay = self.controls.decay_pct / 100.0;
        let scaled_room = 0.28 + size * 0.7;
        scaled_room + decay * (0.98 - scaled_room)
    }

    fn update_tank(&mut self) {
        let feedback = self.feedback();
        let damp = self.controls.damping_pct / 100.0;
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
            comb.set_damp(damp);
        }
    }
}

impl Effect for Reverb {
    fn process(&mut self, input: f32) -> f32 {
        let predelay = self.predelay_samples.advance();
        let mix = self.mix.advance();

        self.predelay.write(input);
        let predelayed = self.predelay.read(predelay);

        let mut tank = 0.0f32;
        for comb in &mut self.combs {
            tank += comb.process(predelayed);
        }
        tank *= 0.125;

        for allpass in &mut self.allpasses {
            tank = allpass.process(tank);
        }

        wet_dry_mix(input, tank, mix)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.combs = Self::build_combs(sample_rate);
        self.allpasses = Self::build_allpasses(sample_rate);
        self.predelay = InterpolatedDelay::from_time(sample_rate, MAX_PREDELAY_MS / 1000.0);
        self.predelay_samples.set_sample_rate(sample_rate);
        self.predelay_samples
            .set_immediate(ms_to_samples(self.controls.predelay_ms, sample_rate));
        self.mix.set_sample_rate(sample_rate);
        self.update_tank();
    }

    fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.clear();
        }
        for allpass in &mut self.allpasses {
            allpass.clear();
        }
        self.predelay.clear();
        self.predelay_samples.snap_to_target();
        self.mix.snap_to_target();
    }

    fn latency_samples(&self) -> usize {
        self.predelay_samples.get() as usize
    }
}

impl ParameterInfo for Reverb {
    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        let c = &self.controls;
        match index {
            0 => c.decay_pct,
            1 => c.predelay_ms,
            2 => c.size_pct,
            3 => c.damping_pct,
            4 => c.mix_pct,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let mut c = self.controls;
        match index {
            0 => c.decay_pct = value,
            1 => c.predelay_ms = value,
            2 => c.size_pct = value,
            3 => c.damping_pct = value,
            4 => c.mix_pct = value,
            _ => return,
        }
        self.set_controls(c);
    }
}
