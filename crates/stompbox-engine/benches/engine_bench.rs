//! Criterion benchmarks for one interrupt plus one engine pass
//!
//! Run with: cargo bench -p stompbox-engine
#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use stompbox_core::{EffectChain, ParameterBus};
use stompbox_effects::{EffectKind, Pedal};
use stompbox_engine::{
    AudioEngine, AudioInterface, AudioPipeline, BufferPool, EngineConfig, EngineStats, StdClock,
};

struct Sine {
    phase: f32,
}

impl AudioInterface for Sine {
    fn read_input(&mut self, block: &mut [f32]) {
        for s in block {
            *s = (self.phase * std::f32::consts::TAU).sin() * 0.5;
            self.phase = (self.phase + 110.0 / 48000.0).fract();
        }
    }

    fn write_output(&mut self, block: &[f32]) {
        black_box(block[0]);
    }
}

fn bench_round_trip(c: &mut Criterion) {
    let mut chain: EffectChain<Pedal> = EffectChain::new(48000.0);
    for kind in EffectKind::ALL {
        let _ = chain.push(Pedal::new(kind, 48000.0));
    }
    let bus = ParameterBus::for_chain(&chain).unwrap();
    let stats = EngineStats::new();
    let mut engine =
        AudioEngine::new(chain, &bus, StdClock::new(), &stats, EngineConfig::default()).unwrap();

    let mut pool = BufferPool::<4>::new();
    let mut pipeline = AudioPipeline::new(&mut pool);
    let (mut isr, mut port) = pipeline.split(&stats);
    let mut codec = Sine { phase: 0.0 };

    c.bench_function("transfer_and_process_full_board", |b| {
        b.iter(|| {
            isr.on_transfer_complete(&mut codec);
            black_box(engine.process_one(&mut port))
        })
    });
}

criterion_group!(benches, bench_round_trip);
criterion_main!(benches);
