//! Schroeder all-pass diffuser.

use crate::delay::InterpolatedDelay;

/// All-pass filter: flat magnitude, smeared phase.
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    delay: InterpolatedDelay,
    feedback: f32,
}

impl AllpassFilter {
    /// All-pass with a loop of `delay_samples` and feedback 0.5.
    pub fn new(delay_samples: usize) -> Self {
        Self {
            delay: InterpolatedDelay::new(delay_samples),
            feedback: 0.5,
        }
    }

    /// Feedback, clamped to `-0.99..=0.99`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.99, 0.99);
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay.read((self.delay.capacity() - 1) as f32);
        let w = input + delayed * self.feedback;
        self.delay.write(w);
        delayed - w * self.feedback
    }

    /// Clears the loop.
    pub fn clear(&mut self) {
        self.delay.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_energy_is_preserved() {
        let mut ap = AllpassFilter::new(7);
        let mut energy = 0.0f32;
        for i in 0..2000 {
            let y = ap.process(if i == 0 { 1.0 } else { 0.0 });
            energy += y * y;
        }
        assert!((energy - 1.0).abs() < 1e-3, "energy {energy}");
    }

    #[test]
    fn clear_silences() {
        let mut ap = AllpassFilter::new(5);
        ap.process(1.0);
        ap.clear();
        for _ in 0..10 {
            assert_eq!(ap.process(0.0), 0.0);
        }
    }
}
