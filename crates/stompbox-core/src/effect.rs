//! The processing contract every effect honors.
//!
//! An [`Effect`] turns one mono input sample into one output sample while
//! advancing its internal state. The chain drives effects a whole block at
//! a time through [`Effect::process_block`], which must write exactly as many
//! samples as it reads and must not allocate.
//!
//! Control data lives alongside the trait in
//! [`ParameterInfo`](crate::ParameterInfo); status is tracked per slot by
//! [`EffectSlot`](crate::EffectSlot), so an effect never needs to know
//! whether it is bypassed or faulted.

use crate::slot::ErrorCode;

/// Core trait for all audio effects.
///
/// # Example
///
/// ```rust
/// use stompbox_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait Effect {
    /// Process a single sample, advancing internal state by one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// The default calls [`process`](Self::process) per sample. `input` and
    /// `output` must have the same length.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Recalculate sample-rate dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear delay lines, filter history and envelopes without touching
    /// parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Most effects have none.
    fn latency_samples(&self) -> usize {
        0
    }

    /// Internal fault detected by the effect itself during the last block.
    ///
    /// Checked by the owning slot after every block. Non-finite output is
    /// detected by the slot regardless of what this returns.
    fn fault(&self) -> Option<ErrorCode> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl Effect for Doubler {
        fn process(&mut self, input: f32) -> f32 {
            input * 2.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn default_block_matches_per_sample() {
        let mut fx = Doubler;
        let input = [0.1, -0.2, 0.3, 0.0];
        let mut output = [0.0; 4];
        fx.process_block(&input, &mut output);
        assert_eq!(output, [0.2, -0.4, 0.6, 0.0]);

        let mut inplace = input;
        fx.process_block_inplace(&mut inplace);
        assert_eq!(inplace, output);
    }

    #[test]
    fn defaults_report_no_latency_or_fault() {
        let fx = Doubler;
        assert_eq!(fx.latency_samples(), 0);
        assert_eq!(fx.fault(), None);
    }
}
