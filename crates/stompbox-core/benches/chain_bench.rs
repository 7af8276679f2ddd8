//! Criterion benchmarks for the block path: queue hand-off, chain dispatch
//! and bus draining.
//!
//! Run with: cargo bench -p stompbox-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stompbox_core::{
    BLOCK_SIZE, Biquad, Block, Effect, EffectChain, EffectId, HandoffQueue, ParamDescriptor,
    ParameterBus, ParameterInfo, SampleBuffer, lowpass_coefficients,
};

const SAMPLE_RATE: f32 = 48000.0;

struct Tone {
    filter: Biquad,
    cutoff: f32,
}

impl Tone {
    fn new() -> Self {
        Self {
            filter: Biquad::with_coefficients(lowpass_coefficients(3000.0, 0.707, SAMPLE_RATE)),
            cutoff: 3000.0,
        }
    }
}

impl Effect for Tone {
    fn process(&mut self, input: f32) -> f32 {
        self.filter.process(input)
    }
    fn set_sample_rate(&mut self, _: f32) {}
    fn reset(&mut self) {
        self.filter.clear();
    }
}

impl ParameterInfo for Tone {
    fn param_count(&self) -> usize {
        1
    }
    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        (index == 0).then(|| ParamDescriptor::frequency_hz("Cutoff", "Cut", 200.0, 8000.0, 3000.0))
    }
    fn get_param(&self, _: usize) -> f32 {
        self.cutoff
    }
    fn set_param(&mut self, _: usize, value: f32) {
        self.cutoff = value;
        self.filter
            .set(lowpass_coefficients(value, 0.707, SAMPLE_RATE));
    }
}

fn signal() -> Block {
    core::array::from_fn(|i| {
        let t = i as f32 / SAMPLE_RATE;
        (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
    })
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("EffectChain");
    let input = signal();

    for count in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("process", count), &count, |b, &count| {
            let mut chain: EffectChain<Tone> = EffectChain::new(SAMPLE_RATE);
            for _ in 0..count {
                let _ = chain.push(Tone::new());
            }
            chain.prepare();
            let mut output = [0.0; BLOCK_SIZE];
            b.iter(|| black_box(chain.process(black_box(&input), &mut output)));
        });
    }

    group.bench_function("bypassed", |b| {
        let mut chain: EffectChain<Tone> = EffectChain::new(SAMPLE_RATE);
        for _ in 0..8 {
            let _ = chain.push(Tone::new());
        }
        chain.prepare();
        chain.set_bypassed(true);
        let mut output = [0.0; BLOCK_SIZE];
        b.iter(|| black_box(chain.process(black_box(&input), &mut output)));
    });

    group.bench_function("process_with_updates", |b| {
        let mut chain: EffectChain<Tone> = EffectChain::new(SAMPLE_RATE);
        for _ in 0..4 {
            let _ = chain.push(Tone::new());
        }
        chain.prepare();
        let bus = ParameterBus::for_chain(&chain).unwrap_or_default();
        let mut output = [0.0; BLOCK_SIZE];
        let mut cutoff = 200.0;
        b.iter(|| {
            cutoff = if cutoff > 7000.0 { 200.0 } else { cutoff * 1.1 };
            let _ = bus.publish(EffectId(2), 0, cutoff);
            black_box(chain.process_with(&bus, black_box(&input), &mut output))
        });
    });

    group.finish();
}

fn bench_handoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("HandoffQueue");

    group.bench_function("push_pop_u32", |b| {
        let mut queue: HandoffQueue<u32, 8> = HandoffQueue::new();
        b.iter(|| {
            let _ = queue.push(black_box(7));
            black_box(queue.pop())
        });
    });

    group.bench_function("buffer_round_trip", |b| {
        let mut buffer: SampleBuffer = SampleBuffer::zeroed();
        let mut queue: HandoffQueue<&mut SampleBuffer, 4> = HandoffQueue::new();
        let (mut tx, mut rx) = queue.split();
        let mut held = Some(&mut buffer);
        b.iter(|| {
            if let Some(buf) = held.take() {
                buf.recycle();
                buf.mark_full();
                let _ = tx.push(buf);
            }
            held = rx.pop();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_chain, bench_handoff);
criterion_main!(benches);
