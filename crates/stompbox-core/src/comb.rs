//! Feedback comb filter with damping in the loop, the core of the reverb's
//! tank.

use crate::delay::InterpolatedDelay;
use crate::math::flush_denormal;

/// Comb filter whose feedback passes through a one-pole low-pass.
#[derive(Debug, Clone)]
pub struct CombFilter {
    delay: InterpolatedDelay,
    feedback: f32,
    damp1: f32,
    damp2: f32,
    filterstore: f32,
}

impl CombFilter {
    /// Comb with a loop of `delay_samples`.
    pub fn new(delay_samples: usize) -> Self {
        Self {
            delay: InterpolatedDelay::new(delay_samples),
            feedback: 0.5,
            damp1: 0.5,
            damp2: 0.5,
            filterstore: 0.0,
        }
    }

    /// Loop gain, clamped to `0.0..=0.99`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    /// Current loop gain.
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// High-frequency damping, 0 bright to 1 dark.
    pub fn set_damp(&mut self, damp: f32) {
        self.damp1 = damp.clamp(0.0, 1.0);
        self.damp2 = 1.0 - self.damp1;
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.delay.read((self.delay.capacity() - 1) as f32);
        self.filterstore = flush_denormal(output * self.damp2 + self.filterstore * self.damp1);
        self.delay.write(input + self.filterstore * self.feedback);
        output
    }

    /// Clears the loop.
    pub fn clear(&mut self) {
        self.delay.clear();
        self.filterstore = 0.0;
    }

    /// Loop length in samples.
    pub fn capacity(&self) -> usize {
        self.delay.capacity()
    }
}
