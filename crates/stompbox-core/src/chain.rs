//! Ordered, fixed-capacity effect chain.
//!
//! [`EffectChain`] drives one block through every slot in registration
//! order: the engine's capture block feeds the first slot, each slot's output
//! feeds the next, and the last output lands in the engine's playback block.
//! Slots live in a fixed array, so nothing on the processing path allocates.
//!
//! Adding effects ([`EffectChain::push`]) is a control-plane operation done
//! before audio starts. At run time the chain only changes through the
//! [`ParameterBus`]: values, bypass and reset requests are applied to each
//! slot at the entry of its own `process` call.

use core::fmt;

use crate::buffer::{BLOCK_SIZE, Block};
use crate::effect::Effect;
use crate::param_bus::ParameterBus;
use crate::param_info::ParameterInfo;
use crate::slot::{EffectSlot, ErrorCode, SlotOutcome};

/// Default chain capacity, also the number of effects the bus can address.
pub const MAX_EFFECTS: usize = 8;

/// Position of an effect in its chain. Stable for the chain's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub usize);

/// Control-plane errors from chain edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// The chain already holds `capacity` effects.
    Full {
        /// Fixed capacity.
        capacity: usize,
    },
    /// No effect at this position.
    NoSuchEffect(EffectId),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "effect chain is full ({capacity} slots)"),
            Self::NoSuchEffect(id) => write!(f, "no effect at position {}", id.0),
        }
    }
}

impl core::error::Error for ChainError {}

/// Summary of one block through the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainReport {
    /// Slots that ran their effect.
    pub processed: usize,
    /// Slots that faulted during this block.
    pub faults: usize,
    /// First slot that faulted, with its code.
    pub first_fault: Option<(EffectId, ErrorCode)>,
}

/// Ordered sequence of up to `MAX` effects with chain-level bypass.
pub struct EffectChain<E, const MAX: usize = MAX_EFFECTS> {
    slots: [Option<EffectSlot<E>>; MAX],
    len: usize,
    bypassed: bool,
    sample_rate: f32,
    scratch: Block,
}

impl<E: Effect, const MAX: usize> EffectChain<E, MAX> {
    /// Empty chain running at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            slots: [const { None }; MAX],
            len: 0,
            bypassed: false,
            sample_rate,
            scratch: [0.0; BLOCK_SIZE],
        }
    }

    /// Appends an effect in the `Uninitialized` state.
    pub fn push(&mut self, effect: E) -> Result<EffectId, ChainError> {
        if self.len == MAX {
            return Err(ChainError::Full { capacity: MAX });
        }
        let id = EffectId(self.len);
        self.slots[self.len] = Some(EffectSlot::new(effect));
        self.len += 1;
        Ok(id)
    }

    /// Prepares every slot for the chain's sample rate (`-> Ready`).
    pub fn prepare(&mut self) {
        let sample_rate = self.sample_rate;
        for slot in self.slots_mut() {
            slot.prepare(sample_rate);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(effects = self.len, sample_rate, "effect chain prepared");
    }

    /// Changes the sample rate and re-prepares every slot.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.prepare();
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of effects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the chain has no effects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fixed capacity.
    pub const fn capacity(&self) -> usize {
        MAX
    }

    /// Chain-level bypass flag.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Engages or releases chain-level bypass.
    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    /// Slot at `id`.
    pub fn slot(&self, id: EffectId) -> Option<&EffectSlot<E>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable slot at `id`.
    pub fn slot_mut(&mut self, id: EffectId) -> Option<&mut EffectSlot<E>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Engages or releases bypass on one effect.
    pub fn set_effect_bypassed(&mut self, id: EffectId, bypassed: bool) -> Result<(), ChainError> {
        let slot = self.slot_mut(id).ok_or(ChainError::NoSuchEffect(id))?;
        slot.set_bypassed(bypassed);
        Ok(())
    }

    /// Clears one effect's DSP state and any fault.
    pub fn reset_effect(&mut self, id: EffectId) -> Result<(), ChainError> {
        let slot = self.slot_mut(id).ok_or(ChainError::NoSuchEffect(id))?;
        slot.reset();
        Ok(())
    }

    /// Clears DSP state and faults of every effect.
    pub fn reset(&mut self) {
        for slot in self.slots_mut() {
            slot.reset();
        }
    }

    /// Sum of the latencies of all active effects.
    pub fn latency_samples(&self) -> usize {
        self.iter()
            .filter(|(_, slot)| slot.is_active())
            .map(|(_, slot)| slot.effect().latency_samples())
            .sum()
    }

    /// Slots in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (EffectId, &EffectSlot<E>)> + '_ {
        self.slots[..self.len]
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (EffectId(i), s)))
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut EffectSlot<E>> + '_ {
        self.slots[..self.len].iter_mut().flatten()
    }

    /// Runs one block through the chain with no pending updates.
    pub fn process(&mut self, input: &Block, output: &mut Block) -> ChainReport {
        self.run(input, output, |_, _| {})
    }

    fn run(
        &mut self,
        input: &Block,
        output: &mut Block,
        mut at_entry: impl FnMut(EffectId, &mut EffectSlot<E>),
    ) -> ChainReport {
        let mut report = ChainReport::default();
        let Self {
            slots,
            len,
            bypassed,
            scratch,
            ..
        } = self;

        output.copy_from_slice(input);

        if *bypassed {
            // Updates still land so the chain is current when bypass releases.
            for (i, slot) in slots[..*len].iter_mut().enumerate() {
                if let Some(slot) = slot {
                    at_entry(EffectId(i), slot);
                }
            }
            return report;
        }

        // Ping-pong between the output block and scratch so every slot reads
        // the previous slot's output and writes a whole block.
        let mut src: &mut Block = output;
        let mut dst: &mut Block = scratch;
        let mut swapped = false;

        for (i, slot) in slots[..*len].iter_mut().enumerate() {
            let Some(slot) = slot else { continue };
            let id = EffectId(i);
            at_entry(id, slot);

            match slot.process(src, dst) {
                SlotOutcome::Processed => report.processed += 1,
                SlotOutcome::PassedThrough => {}
                SlotOutcome::Faulted(code) => {
                    report.faults += 1;
                    report.first_fault.get_or_insert((id, code));
                }
            }
            core::mem::swap(&mut src, &mut dst);
            swapped = !swapped;
        }

        if swapped {
            // result is in scratch (`src`); `dst` is the caller's output
            dst.copy_from_slice(src);
        }
        report
    }
}

impl<E: Effect + ParameterInfo, const MAX: usize> EffectChain<E, MAX> {
    /// Runs one block, applying pending bus requests to each slot at the
    /// entry of its `process` call.
    ///
    /// Chain bypass requests apply before the block; per-effect bypass,
    /// reset and parameter values apply just before that effect runs.
    pub fn process_with(
        &mut self,
        bus: &ParameterBus,
        input: &Block,
        output: &mut Block,
    ) -> ChainReport {
        if let Some(bypassed) = bus.take_chain_bypass_request() {
            self.bypassed = bypassed;
        }
        self.run(input, output, |id, slot| {
            if let Some(bypassed) = bus.take_bypass_request(id) {
                slot.set_bypassed(bypassed);
            }
            if bus.take_reset_request(id) {
                slot.reset();
            }
            let effect = slot.effect_mut();
            bus.drain(id, |param, value| effect.set_param(param, value));
        })
    }

    /// Value of a parameter of one effect.
    pub fn param(&self, id: EffectId, param: usize) -> Option<f32> {
        let effect = self.slot(id)?.effect();
        (param < effect.param_count()).then(|| effect.get_param(param))
    }

    /// Sets a parameter directly (control plane, before audio starts).
    pub fn set_param(&mut self, id: EffectId, param: usize, value: f32) -> Result<(), ChainError> {
        let slot = self.slot_mut(id).ok_or(ChainError::NoSuchEffect(id))?;
        slot.effect_mut().set_param(param, value);
        Ok(())
    }
}

impl<E: fmt::Debug, const MAX: usize> fmt::Debug for EffectChain<E, MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectChain")
            .field("slots", &&self.slots[..self.len])
            .field("bypassed", &self.bypassed)
            .field("sample_rate", &self.sample_rate)
            .finish_non_exhaustive()
    }
}
