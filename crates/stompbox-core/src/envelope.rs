//! Peak envelope follower with separate attack and release times.
//!
//! Drives the compressor's gain computer. The follower rectifies its input
//! and smooths it with a one-pole filter whose coefficient switches between
//! attack (rising) and release (falling).

use libm::expf;

/// Attack/release envelope follower.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Follower with 10 ms attack and 100 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, 10.0, 100.0)
    }

    /// Follower with explicit times.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms: attack_ms.max(0.1),
            release_ms: release_ms.max(1.0),
        };
        follower.recalculate();
        follower
    }

    /// Attack time, floored at 0.1 ms.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.1);
        self.recalculate();
    }

    /// Release time, floored at 1 ms.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(1.0);
        self.recalculate();
    }

    /// Attack time in ms.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Release time in ms.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Recomputes coefficients for a new sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Tracks one sample and returns the current envelope.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let coeff = if rectified > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * rectified;
        self.envelope
    }

    /// Current envelope without advancing.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Drops the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate(&mut self) {
        self.attack_coeff = expf(-1.0 / (self.attack_ms * self.sample_rate / 1000.0));
        self.release_coeff = expf(-1.0 / (self.release_ms * self.sample_rate / 1000.0));
    }
}
