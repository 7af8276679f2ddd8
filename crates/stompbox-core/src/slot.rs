//! Per-effect state record and bypass handling.
//!
//! An [`EffectSlot`] is one position in an [`EffectChain`](crate::EffectChain).
//! It owns the effect, its bypass flag and its [`EffectState`], and runs the
//! per-effect state machine:
//!
//! ```text
//! Uninitialized ──prepare──► Ready ──process──► Processing ──► Ready
//!                              ▲                     │
//!                              │                     ▼ non-finite output
//!                              └────reset_fault──── Faulted
//! ```
//!
//! Bypassed, uninitialized and faulted slots all copy input to output. Active
//! slots write the effect's output; if that output is unusable the slot
//! faults and substitutes the input for that block, so a bad block never
//! reaches the next effect.

use crate::buffer::Block;
use crate::effect::Effect;

/// Position of a slot in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Lifecycle {
    /// Constructed but not yet prepared for a sample rate.
    #[default]
    Uninitialized = 0,
    /// Prepared and idle between blocks.
    Ready = 1,
    /// Inside `process`.
    Processing = 2,
    /// Disabled after an internal error; behaves as bypassed.
    Faulted = 3,
}

impl Lifecycle {
    /// Decodes the `repr(u8)` value; unknown values map to `Faulted`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Ready,
            2 => Self::Processing,
            _ => Self::Faulted,
        }
    }

    /// Lower-case label for status displays.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Processing => "processing",
            Self::Faulted => "faulted",
        }
    }
}

/// Error code carried in an effect's state record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ErrorCode {
    /// No error.
    #[default]
    None = 0,
    /// Output contained NaN or infinity.
    NonFinite = 1,
    /// The effect reported an internal invariant violation.
    Internal = 2,
}

impl ErrorCode {
    /// Decodes the `repr(u8)` value; unknown values map to `Internal`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::NonFinite,
            _ => Self::Internal,
        }
    }

    /// Lower-case label for status displays.
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "ok",
            Self::NonFinite => "non-finite output",
            Self::Internal => "internal error",
        }
    }
}

/// Status of one effect as seen by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectState {
    /// State-machine position.
    pub lifecycle: Lifecycle,
    /// Last fault, or `ErrorCode::None`.
    pub error: ErrorCode,
    /// Last processed block exceeded full scale.
    pub clipped: bool,
    /// Blocks actively processed since construction (wrapping).
    pub blocks: u32,
}

/// Result of running one block through a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The effect processed the block.
    Processed,
    /// The slot copied input to output.
    PassedThrough,
    /// The effect faulted on this block; output is the input.
    Faulted(ErrorCode),
}

/// One effect plus its bypass flag and state record.
#[derive(Debug, Clone)]
pub struct EffectSlot<E> {
    effect: E,
    state: EffectState,
    bypassed: bool,
}

impl<E: Effect> EffectSlot<E> {
    /// Wraps an effect in the `Uninitialized` state.
    pub fn new(effect: E) -> Self {
        Self {
            effect,
            state: EffectState::default(),
            bypassed: false,
        }
    }

    /// Configures the effect for `sample_rate`, clears its state, and moves
    /// the slot to `Ready`. Clears any fault.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.effect.set_sample_rate(sample_rate);
        self.effect.reset();
        self.state.error = ErrorCode::None;
        self.state.lifecycle = Lifecycle::Ready;
    }

    /// The wrapped effect.
    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// Mutable access for control-plane updates.
    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// Current state record.
    pub fn state(&self) -> EffectState {
        self.state
    }

    /// Bypass flag as set by the control plane.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Engages or releases bypass.
    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    /// True if the next block will run through the effect.
    pub fn is_active(&self) -> bool {
        !self.bypassed && self.state.lifecycle == Lifecycle::Ready
    }

    /// Clears DSP state and any fault, returning a faulted slot to `Ready`.
    ///
    /// Has no lifecycle effect on an uninitialized slot.
    pub fn reset(&mut self) {
        self.effect.reset();
        self.state.error = ErrorCode::None;
        self.state.clipped = false;
        if self.state.lifecycle == Lifecycle::Faulted {
            self.state.lifecycle = Lifecycle::Ready;
        }
    }

    /// Runs one block.
    ///
    /// Writes exactly one block to `output` on every path.
    pub fn process(&mut self, input: &Block, output: &mut Block) -> SlotOutcome {
        if !self.is_active() {
            output.copy_from_slice(input);
            return SlotOutcome::PassedThrough;
        }

        self.state.lifecycle = Lifecycle::Processing;
        self.effect.process_block(input, output);

        let mut peak = 0.0f32;
        let mut finite = true;
        for &sample in output.iter() {
            finite &= sample.is_finite();
            peak = peak.max(sample.abs());
        }

        let fault = if finite {
            self.effect.fault()
        } else {
            Some(ErrorCode::NonFinite)
        };
        self.state.blocks = self.state.blocks.wrapping_add(1);

        match fault {
            Some(code) => {
                output.copy_from_slice(input);
                self.state.error = code;
                self.state.clipped = false;
                self.state.lifecycle = Lifecycle::Faulted;
                SlotOutcome::Faulted(code)
            }
            None => {
                self.state.clipped = peak > 1.0;
                self.state.lifecycle = Lifecycle::Ready;
                SlotOutcome::Processed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BLOCK_SIZE;

    struct Gain(f32);

    impl Effect for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    fn ramp() -> Block {
        core::array::from_fn(|i| i as f32 / BLOCK_SIZE as f32 - 0.5)
    }

    #[test]
    fn new_slot_is_uninitialized_and_passes_through() {
        let mut slot = EffectSlot::new(Gain(2.0));
        assert_eq!(slot.state().lifecycle, Lifecycle::Uninitialized);

        let input = ramp();
        let mut output = [0.0; BLOCK_SIZE];
        assert_eq!(slot.process(&input, &mut output), SlotOutcome::PassedThrough);
        assert_eq!(output, input);
    }

    #[test]
    fn prepared_slot_processes_and_returns_to_ready() {
        let mut slot = EffectSlot::new(Gain(2.0));
        slot.prepare(48000.0);

        let input = ramp();
        let mut output = [0.0; BLOCK_SIZE];
        assert_eq!(slot.process(&input, &mut output), SlotOutcome::Processed);
        assert_eq!(output[0], input[0] * 2.0);
        assert_eq!(slot.state().lifecycle, Lifecycle::Ready);
        assert_eq!(slot.state().blocks, 1);
    }

    #[test]
    fn bypass_is_bit_identical() {
        let mut slot = EffectSlot::new(Gain(0.3));
        slot.prepare(48000.0);
        slot.set_bypassed(true);

        let input: Block = core::array::from_fn(|i| f32::from_bits(0x3f00_0000 + i as u32));
        let mut output = [1.0; BLOCK_SIZE];
        slot.process(&input, &mut output);
        assert!(input.iter().zip(&output).all(|(a, b)| a.to_bits() == b.to_bits()));
    }

    #[test]
    fn clip_flag_tracks_peak() {
        let mut slot = EffectSlot::new(Gain(4.0));
        slot.prepare(48000.0);
        let input = ramp();
        let mut output = [0.0; BLOCK_SIZE];
        slot.process(&input, &mut output);
        assert!(slot.state().clipped);

        slot.effect_mut().0 = 1.0;
        slot.process(&input, &mut output);
        assert!(!slot.state().clipped);
    }

    #[test]
    fn non_finite_output_faults_and_substitutes_input() {
        let mut slot = EffectSlot::new(Gain(f32::INFINITY));
        slot.prepare(48000.0);

        let input = ramp();
        let mut output = [0.0; BLOCK_SIZE];
        assert_eq!(
            slot.process(&input, &mut output),
            SlotOutcome::Faulted(ErrorCode::NonFinite)
        );
        assert_eq!(output, input);
        assert_eq!(slot.state().lifecycle, Lifecycle::Faulted);
        assert_eq!(slot.state().error, ErrorCode::NonFinite);

        // behaves as bypassed until reset
        slot.effect_mut().0 = 2.0;
        assert_eq!(slot.process(&input, &mut output), SlotOutcome::PassedThrough);
        assert_eq!(output, input);

        slot.reset();
        assert_eq!(slot.state().lifecycle, Lifecycle::Ready);
        assert_eq!(slot.state().error, ErrorCode::None);
        assert_eq!(slot.process(&input, &mut output), SlotOutcome::Processed);
    }

    #[test]
    fn reported_fault_is_surfaced() {
        struct Broken;
        impl Effect for Broken {
            fn process(&mut self, input: f32) -> f32 {
                input
            }
            fn set_sample_rate(&mut self, _: f32) {}
            fn reset(&mut self) {}
            fn fault(&self) -> Option<ErrorCode> {
                Some(ErrorCode::Internal)
            }
        }

        let mut slot = EffectSlot::new(Broken);
        slot.prepare(44100.0);
        let input = ramp();
        let mut output = [0.0; BLOCK_SIZE];
        assert_eq!(
            slot.process(&input, &mut output),
            SlotOutcome::Faulted(ErrorCode::Internal)
        );
    }

    #[test]
    fn codes_round_trip_through_u8() {
        for l in [
            Lifecycle::Uninitialized,
            Lifecycle::Ready,
            Lifecycle::Processing,
            Lifecycle::Faulted,
        ] {
            assert_eq!(Lifecycle::from_u8(l as u8), l);
        }
        for e in [ErrorCode::None, ErrorCode::NonFinite, ErrorCode::Internal] {
            assert_eq!(ErrorCode::from_u8(e as u8), e);
        }
    }
}
