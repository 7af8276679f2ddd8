//! Read-only status mirror for displays and telemetry.
//!
//! The engine copies every slot's state record into a [`StatusBoard`] after
//! each block. Each slot is packed into a single `AtomicU32`, so a reader on
//! any thread sees a consistent record for each effect without ever touching
//! the chain itself.
//!
//! ```text
//! bits  0..8   lifecycle
//! bits  8..16  error code
//! bit   16     bypassed
//! bit   17     clipped
//! bit   31     slot present
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::chain::{EffectChain, EffectId, MAX_EFFECTS};
use crate::effect::Effect;
use crate::slot::{ErrorCode, Lifecycle};

const BYPASSED: u32 = 1 << 16;
const CLIPPED: u32 = 1 << 17;
const PRESENT: u32 = 1 << 31;

/// Snapshot of one effect's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectStatus {
    /// Position in the chain.
    pub id: EffectId,
    /// State-machine position.
    pub lifecycle: Lifecycle,
    /// Last fault.
    pub error: ErrorCode,
    /// Bypass flag.
    pub bypassed: bool,
    /// Last block exceeded full scale.
    pub clipped: bool,
}

impl EffectStatus {
    fn pack(&self) -> u32 {
        let mut word = PRESENT | self.lifecycle as u32 | ((self.error as u32) << 8);
        if self.bypassed {
            word |= BYPASSED;
        }
        if self.clipped {
            word |= CLIPPED;
        }
        word
    }

    fn unpack(id: EffectId, word: u32) -> Option<Self> {
        if word & PRESENT == 0 {
            return None;
        }
        Some(Self {
            id,
            lifecycle: Lifecycle::from_u8((word & 0xff) as u8),
            error: ErrorCode::from_u8(((word >> 8) & 0xff) as u8),
            bypassed: word & BYPASSED != 0,
            clipped: word & CLIPPED != 0,
        })
    }

    /// True if the effect is currently not processing audio.
    pub fn is_silent(&self) -> bool {
        self.bypassed || self.lifecycle != Lifecycle::Ready
    }
}

/// Point-in-time copy of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Chain-level bypass.
    pub chain_bypassed: bool,
    effects: [Option<EffectStatus>; MAX_EFFECTS],
}

impl StatusSnapshot {
    /// Status of each effect in chain order.
    pub fn effects(&self) -> impl Iterator<Item = &EffectStatus> {
        self.effects.iter().flatten()
    }

    /// Status of one effect.
    pub fn effect(&self, id: EffectId) -> Option<&EffectStatus> {
        self.effects.get(id.0).and_then(Option::as_ref)
    }

    /// Number of effects in the `Faulted` state.
    pub fn faulted(&self) -> usize {
        self.effects()
            .filter(|s| s.lifecycle == Lifecycle::Faulted)
            .count()
    }
}

/// Lock-free mirror of the chain's state records.
#[derive(Debug)]
pub struct StatusBoard {
    slots: [AtomicU32; MAX_EFFECTS],
    chain_bypassed: AtomicBool,
}

impl StatusBoard {
    /// Empty board. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicU32::new(0) }; MAX_EFFECTS],
            chain_bypassed: AtomicBool::new(false),
        }
    }

    /// Copies the state of every slot of `chain` (processing context).
    ///
    /// Slots beyond the board's capacity are not mirrored.
    pub fn update<E: Effect, const M: usize>(&self, chain: &EffectChain<E, M>) {
        let mut present = 0;
        for (id, slot) in chain.iter().take(MAX_EFFECTS) {
            let state = slot.state();
            let status = EffectStatus {
                id,
                lifecycle: state.lifecycle,
                error: state.error,
                bypassed: slot.is_bypassed(),
                clipped: state.clipped,
            };
            self.slots[id.0].store(status.pack(), Ordering::Release);
            present = id.0 + 1;
        }
        for slot in &self.slots[present..] {
            slot.store(0, Ordering::Release);
        }
        self.chain_bypassed
            .store(chain.is_bypassed(), Ordering::Release);
    }

    /// Consistent per-effect copy of the board (any context, any rate).
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            chain_bypassed: self.chain_bypassed.load(Ordering::Acquire),
            effects: core::array::from_fn(|i| {
                EffectStatus::unpack(EffectId(i), self.slots[i].load(Ordering::Acquire))
            }),
        }
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}
