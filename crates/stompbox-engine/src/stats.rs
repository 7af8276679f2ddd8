//! Engine counters shared between the interrupt and processing contexts.
//!
//! Every counter is an `AtomicU32` so the same struct works on 32-bit
//! microcontrollers without 64-bit atomics. Counters wrap.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// Live counters. Written with `Relaxed` increments from either context;
/// readers take a [`StatsSnapshot`].
#[derive(Debug, Default)]
pub struct EngineStats {
    blocks: AtomicU32,
    overruns: AtomicU32,
    underruns: AtomicU32,
    deadline_misses: AtomicU32,
    effect_faults: AtomicU32,
    last_block_ticks: AtomicU32,
    worst_block_ticks: AtomicU32,
}

impl EngineStats {
    /// Zeroed counters. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            blocks: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            underruns: AtomicU32::new(0),
            deadline_misses: AtomicU32::new(0),
            effect_faults: AtomicU32::new(0),
            last_block_ticks: AtomicU32::new(0),
            worst_block_ticks: AtomicU32::new(0),
        }
    }

    /// Counts a processed block and its duration; returns the block count.
    pub fn record_block(&self, ticks: u64) -> u32 {
        let ticks = u32::try_from(ticks).unwrap_or(u32::MAX);
        self.last_block_ticks.store(ticks, Ordering::Relaxed);
        self.worst_block_ticks.fetch_max(ticks, Ordering::Relaxed);
        bump(&self.blocks)
    }

    /// Counts a dropped capture block; returns the new count.
    pub fn record_overrun(&self) -> u32 {
        bump(&self.overruns)
    }

    /// Counts a silent playback block; returns the new count.
    pub fn record_underrun(&self) -> u32 {
        bump(&self.underruns)
    }

    /// Counts a block that exceeded its budget; returns the new count.
    pub fn record_deadline_miss(&self) -> u32 {
        bump(&self.deadline_misses)
    }

    /// Adds newly faulted effects; returns the new total.
    pub fn record_faults(&self, faults: u32) -> u32 {
        self.effect_faults
            .fetch_add(faults, Ordering::Relaxed)
            .wrapping_add(faults)
    }

    /// Copies every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            blocks: self.blocks.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
            deadline_misses: self.deadline_misses.load(Ordering::Relaxed),
            effect_faults: self.effect_faults.load(Ordering::Relaxed),
            last_block_ticks: self.last_block_ticks.load(Ordering::Relaxed),
            worst_block_ticks: self.worst_block_ticks.load(Ordering::Relaxed),
        }
    }
}

fn bump(counter: &AtomicU32) -> u32 {
    counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}

/// True for counts worth a log line: 1, 2, 4, 8, ...
///
/// Keeps a persistent fault from flooding the log while still showing that
/// it continues.
#[inline]
pub fn should_report(count: u32) -> bool {
    count.is_power_of_two()
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Blocks run through the chain.
    pub blocks: u32,
    /// Capture blocks dropped because the engine fell behind.
    pub overruns: u32,
    /// Playback blocks replaced by silence.
    pub underruns: u32,
    /// Blocks that took longer than the budget.
    pub deadline_misses: u32,
    /// Effects that faulted.
    pub effect_faults: u32,
    /// Duration of the last block in clock ticks.
    pub last_block_ticks: u32,
    /// Longest block in clock ticks.
    pub worst_block_ticks: u32,
}

impl StatsSnapshot {
    /// True if nothing went wrong.
    pub fn is_clean(&self) -> bool {
        self.overruns == 0
            && self.underruns == 0
            && self.deadline_misses == 0
            && self.effect_faults == 0
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "blocks processed:  {}", self.blocks)?;
        writeln!(f, "overruns:          {}", self.overruns)?;
        writeln!(f, "underruns:         {}", self.underruns)?;
        writeln!(f, "deadline misses:   {}", self.deadline_misses)?;
        writeln!(f, "effect faults:     {}", self.effect_faults)?;
        write!(
            f,
            "block time (ticks): last {}, worst {}",
            self.last_block_ticks, self.worst_block_ticks
        )
    }
}
