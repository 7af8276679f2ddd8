//! Deadline, underrun and overrun accounting through the full pipeline.
//!
//! The interrupt and the engine are stepped by hand so every interleaving is
//! deterministic; a manual clock lets an effect "take" as long as the test
//! wants.

use std::sync::atomic::{AtomicU64, Ordering};

use stompbox_core::{Effect, EffectChain, ParamDescriptor, ParameterBus, ParameterInfo};
use stompbox_engine::{
    AudioEngine, AudioInterface, AudioPipeline, BlockOutcome, BufferPool, Clock, EngineConfig,
    EngineStats,
};

/// Clock that only moves when told to, at 1 MHz.
#[derive(Default)]
struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    fn advance(&self, ticks: u64) {
        self.now.fetch_add(ticks, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }

    fn ticks_per_second(&self) -> u64 {
        1_000_000
    }
}

/// Halves its input. Consumes a pending stall from `stall` on each block.
struct SlowHalf<'c> {
    clock: &'c ManualClock,
    stall: &'c AtomicU64,
}

impl Effect for SlowHalf<'_> {
    fn process(&mut self, input: f32) -> f32 {
        input * 0.5
    }

    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        self.clock.advance(self.stall.swap(0, Ordering::Relaxed));
        for (o, &i) in output.iter_mut().zip(input) {
            *o = self.process(i);
        }
    }

    fn set_sample_rate(&mut self, _: f32) {}
    fn reset(&mut self) {}
}

impl ParameterInfo for SlowHalf<'_> {
    fn param_count(&self) -> usize {
        0
    }
    fn param_info(&self, _: usize) -> Option<ParamDescriptor> {
        None
    }
    fn get_param(&self, _: usize) -> f32 {
        0.0
    }
    fn set_param(&mut self, _: usize, _: f32) {}
}

/// Captures block `k` as a block full of `k`; records the first sample of
/// every played block.
struct Counter {
    next: f32,
    played: Vec<f32>,
}

impl Counter {
    fn new() -> Self {
        Self {
            next: 1.0,
            played: Vec::new(),
        }
    }
}

impl AudioInterface for Counter {
    fn read_input(&mut self, block: &mut [f32]) {
        block.fill(self.next);
        self.next += 1.0;
    }

    fn write_output(&mut self, block: &[f32]) {
        assert!(block.iter().all(|&s| s == block[0]), "torn block");
        self.played.push(block[0]);
    }
}

#[test]
fn one_missed_deadline_costs_exactly_one_underrun() {
    let clock = ManualClock::default();
    let stall = AtomicU64::new(0);
    let stats = EngineStats::new();
    let bus = ParameterBus::new();

    let mut chain: EffectChain<SlowHalf<'_>> = EffectChain::new(48000.0);
    chain
        .push(SlowHalf {
            clock: &clock,
            stall: &stall,
        })
        .unwrap();
    let mut engine =
        AudioEngine::new(chain, &bus, &clock, &stats, EngineConfig::default()).unwrap();
    let budget = engine.budget_ticks();

    let mut pool = BufferPool::<4>::new();
    let mut pipeline = AudioPipeline::new(&mut pool);
    let (mut isr, mut port) = pipeline.split(&stats);
    let mut codec = Counter::new();

    // steady state: one block of latency
    isr.on_transfer_complete(&mut codec);
    assert_eq!(engine.process_pending(&mut port), 1);
    isr.on_transfer_complete(&mut codec);

    // block 2 takes two block periods; the next interrupt arrives before
    // the engine has finished it
    stall.store(budget * 2, Ordering::Relaxed);
    let late = isr.on_transfer_complete(&mut codec);
    assert!(late.underrun);
    assert!(late.captured);
    assert_eq!(engine.process_one(&mut port), BlockOutcome::Processed);
    assert_eq!(stats.snapshot().deadline_misses, 1);

    // block 3 was captured fresh during the stall and processes normally
    assert_eq!(engine.process_one(&mut port), BlockOutcome::Processed);
    assert_eq!(engine.process_one(&mut port), BlockOutcome::Idle);

    for _ in 0..6 {
        let report = isr.on_transfer_complete(&mut codec);
        assert!(report.played);
        engine.process_pending(&mut port);
    }

    assert_eq!(codec.played, [0.0, 0.5, 0.0, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
    let snap = stats.snapshot();
    assert_eq!(snap.underruns, 1);
    assert_eq!(snap.deadline_misses, 1);
    assert_eq!(snap.overruns, 0);
    assert_eq!(snap.worst_block_ticks as u64, budget * 2);
}

#[test]
fn stalled_engine_drops_newest_blocks_then_recovers() {
    let clock = ManualClock::default();
    let stall = AtomicU64::new(0);
    let stats = EngineStats::new();
    let bus = ParameterBus::new();

    let mut chain: EffectChain<SlowHalf<'_>> = EffectChain::new(48000.0);
    chain
        .push(SlowHalf {
            clock: &clock,
            stall: &stall,
        })
        .unwrap();
    let mut engine =
        AudioEngine::new(chain, &bus, &clock, &stats, EngineConfig::default()).unwrap();

    let mut pool = BufferPool::<2>::new();
    let mut pipeline = AudioPipeline::new(&mut pool);
    let (mut isr, mut port) = pipeline.split(&stats);
    let mut codec = Counter::new();

    // the engine does not run for four periods: blocks 3 and 4 are dropped
    for _ in 0..4 {
        isr.on_transfer_complete(&mut codec);
    }
    assert_eq!(stats.snapshot().overruns, 2);

    assert_eq!(engine.process_pending(&mut port), 2);
    for _ in 0..3 {
        isr.on_transfer_complete(&mut codec);
        engine.process_pending(&mut port);
    }

    // blocks 1 and 2 play in order, then capture resumes at block 5
    assert_eq!(codec.played, [0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 2.5]);
    assert_eq!(stats.snapshot().underruns, 0);
}

#[test]
fn margin_shrinks_the_budget() {
    let clock = ManualClock::default();
    let stall = AtomicU64::new(0);
    let stats = EngineStats::new();
    let bus = ParameterBus::new();

    let mut chain: EffectChain<SlowHalf<'_>> = EffectChain::new(48000.0);
    chain
        .push(SlowHalf {
            clock: &clock,
            stall: &stall,
        })
        .unwrap();
    let config = EngineConfig {
        sample_rate: 48000.0,
        deadline_margin_pct: 50.0,
    };
    let mut engine = AudioEngine::new(chain, &bus, &clock, &stats, config).unwrap();
    let full = EngineConfig::new(48000.0).budget_ticks(1_000_000);
    assert_eq!(engine.budget_ticks(), full / 2);

    let mut pool = BufferPool::<2>::new();
    let mut pipeline = AudioPipeline::new(&mut pool);
    let (mut isr, mut port) = pipeline.split(&stats);
    let mut codec = Counter::new();

    stall.store(full * 3 / 4, Ordering::Relaxed);
    isr.on_transfer_complete(&mut codec);
    engine.process_pending(&mut port);
    assert_eq!(stats.snapshot().deadline_misses, 1);
}
