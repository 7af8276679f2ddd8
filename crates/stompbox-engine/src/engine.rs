//! The processing loop.
//!
//! [`AudioEngine`] pops captured blocks, runs them through the effect chain
//! with pending bus updates applied at the block boundary, and queues the
//! result for playback. It measures every block against the deadline
//! budget and mirrors slot state into an optional [`StatusBoard`].

use core::sync::atomic::{AtomicBool, Ordering};

use stompbox_core::{Effect, EffectChain, MAX_EFFECTS, ParameterBus, ParameterInfo, StatusBoard};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::notify::Notify;
use crate::pipeline::ProcessingPort;
use crate::stats::EngineStats;
#[cfg(feature = "tracing")]
use crate::stats::should_report;

/// What [`AudioEngine::process_one`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// No captured block was waiting.
    Idle,
    /// One block went through the chain and was queued for playback.
    Processed,
    /// No playback buffer was free; the captured block was dropped and
    /// counted as an overrun.
    Dropped,
}

/// Runs the effect chain in the processing context.
pub struct AudioEngine<'e, E, C, const MAX: usize = MAX_EFFECTS> {
    chain: EffectChain<E, MAX>,
    bus: &'e ParameterBus,
    clock: C,
    stats: &'e EngineStats,
    status: Option<&'e StatusBoard>,
    config: EngineConfig,
    budget_ticks: u64,
}

impl<'e, E, C, const MAX: usize> AudioEngine<'e, E, C, MAX>
where
    E: Effect + ParameterInfo,
    C: Clock,
{
    /// Validates `config` and prepares `chain` at its sample rate.
    pub fn new(
        mut chain: EffectChain<E, MAX>,
        bus: &'e ParameterBus,
        clock: C,
        stats: &'e EngineStats,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        chain.set_sample_rate(config.sample_rate);
        let budget_ticks = config.budget_ticks(clock.ticks_per_second());

        #[cfg(feature = "tracing")]
        tracing::info!(
            sample_rate = config.sample_rate,
            block_size = stompbox_core::BLOCK_SIZE,
            effects = chain.len(),
            budget_ticks,
            "engine configured"
        );

        Ok(Self {
            chain,
            bus,
            clock,
            stats,
            status: None,
            config,
            budget_ticks,
        })
    }

    /// Mirrors slot state into `board` after every block.
    pub fn with_status_board(mut self, board: &'e StatusBoard) -> Self {
        board.update(&self.chain);
        self.status = Some(board);
        self
    }

    /// The chain (read-only while running).
    pub fn chain(&self) -> &EffectChain<E, MAX> {
        &self.chain
    }

    /// Mutable chain for control-plane edits between runs.
    pub fn chain_mut(&mut self) -> &mut EffectChain<E, MAX> {
        &mut self.chain
    }

    /// Gives the chain back.
    pub fn into_chain(self) -> EffectChain<E, MAX> {
        self.chain
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ticks one block may take.
    pub fn budget_ticks(&self) -> u64 {
        self.budget_ticks
    }

    /// The counters this engine reports into.
    pub fn stats(&self) -> &'e EngineStats {
        self.stats
    }

    /// Processes at most one captured block. Never blocks.
    pub fn process_one<const DEPTH: usize>(
        &mut self,
        port: &mut ProcessingPort<'_, '_, DEPTH>,
    ) -> BlockOutcome {
        let Some(input) = port.take_capture() else {
            return BlockOutcome::Idle;
        };
        let Some(output) = port.take_playback() else {
            port.release_capture(input);
            let _count = self.stats.record_overrun();
            #[cfg(feature = "tracing")]
            if should_report(_count) {
                tracing::warn!(overruns = _count, "no free playback buffer, block dropped");
            }
            return BlockOutcome::Dropped;
        };

        let start = self.clock.now();
        let mut report = None;
        if let Ok(block) = input.as_block() {
            let chain = &mut self.chain;
            let bus = self.bus;
            let _ = output.fill(|out| report = Some(chain.process_with(bus, block, out)));
        }
        output.mark_full();
        let elapsed = self.clock.now().wrapping_sub(start);

        port.release_capture(input);
        port.submit_playback(output);

        self.stats.record_block(elapsed);
        if elapsed > self.budget_ticks {
            let _count = self.stats.record_deadline_miss();
            #[cfg(feature = "tracing")]
            if should_report(_count) {
                tracing::warn!(
                    deadline_misses = _count,
                    elapsed,
                    budget = self.budget_ticks,
                    "block missed its deadline"
                );
            }
        }

        if let Some(report) = report {
            if report.faults > 0 {
                self.stats.record_faults(report.faults as u32);
                #[cfg(feature = "tracing")]
                if let Some((id, code)) = report.first_fault {
                    tracing::warn!(
                        effect = id.0,
                        error = code.label(),
                        "effect faulted, now bypassed"
                    );
                }
            }
        }

        if let Some(board) = self.status {
            board.update(&self.chain);
        }
        BlockOutcome::Processed
    }

    /// Processes captured blocks until none is waiting; returns how many
    /// went through the chain.
    pub fn process_pending<const DEPTH: usize>(
        &mut self,
        port: &mut ProcessingPort<'_, '_, DEPTH>,
    ) -> usize {
        let mut processed = 0;
        loop {
            match self.process_one(port) {
                BlockOutcome::Idle => return processed,
                BlockOutcome::Processed => processed += 1,
                BlockOutcome::Dropped => {}
            }
        }
    }

    /// Steady-state loop: drain, then wait on `notify`, until `stop` is set.
    ///
    /// Blocks queued when `stop` is observed are still processed.
    pub fn run<const DEPTH: usize>(
        &mut self,
        port: &mut ProcessingPort<'_, '_, DEPTH>,
        notify: &impl Notify,
        stop: &AtomicBool,
    ) {
        #[cfg(feature = "tracing")]
        tracing::debug!("engine loop started");
        loop {
            self.process_pending(port);
            if stop.load(Ordering::Acquire) {
                self.process_pending(port);
                break;
            }
            notify.wait();
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(blocks = self.stats.snapshot().blocks, "engine loop stopped");
    }
}

impl<E: Effect, C, const MAX: usize> core::fmt::Debug for AudioEngine<'_, E, C, MAX> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioEngine")
            .field("effects", &self.chain.len())
            .field("config", &self.config)
            .field("budget_ticks", &self.budget_ticks)
            .finish_non_exhaustive()
    }
}
