//! One-pole (6 dB/oct) low-pass used for tone controls.
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n]),  coeff = exp(-2π f / fs)
//! ```

use core::f32::consts::PI;
use libm::expf;

use crate::math::flush_denormal;

/// One-pole low-pass filter.
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePole {
    /// Low-pass with cutoff `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 0.0,
            sample_rate,
            freq: freq_hz,
        };
        filter.recalculate();
        filter
    }

    /// Sets the cutoff.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz;
        self.recalculate();
    }

    /// Current cutoff.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Keeps the cutoff across a sample-rate change.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Clears the filter state.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    fn recalculate(&mut self) {
        let freq = self.freq.clamp(1.0, self.sample_rate * 0.49);
        self.coeff = expf(-2.0 * PI * freq / self.sample_rate);
    }
}
