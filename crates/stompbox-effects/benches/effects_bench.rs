//! Criterion benchmarks for the stompbox pedals
//!
//! Run with: cargo bench -p stompbox-effects
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stompbox_core::{BLOCK_SIZE, Effect, EffectChain};
use stompbox_effects::{EffectKind, Pedal};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[32, 64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 110.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_pedals(c: &mut Criterion) {
    for kind in EffectKind::ALL {
        let mut group = c.benchmark_group(kind.name());
        let mut pedal = Pedal::new(kind, SAMPLE_RATE);
        for &block_size in BLOCK_SIZES {
            let input = generate_test_signal(block_size);
            let mut output = vec![0.0; block_size];
            group.bench_with_input(BenchmarkId::from_parameter(block_size), &block_size, |b, _| {
                b.iter(|| {
                    pedal.process_block(black_box(&input), &mut output);
                    black_box(output[0])
                })
            });
        }
        group.finish();
    }
}

fn bench_full_board(c: &mut Criterion) {
    let mut chain: EffectChain<Pedal> = EffectChain::new(SAMPLE_RATE);
    for kind in EffectKind::ALL {
        let _ = chain.push(Pedal::new(kind, SAMPLE_RATE));
    }
    chain.prepare();

    let signal = generate_test_signal(BLOCK_SIZE);
    let mut input = [0.0; BLOCK_SIZE];
    input.copy_from_slice(&signal);
    let mut output = [0.0; BLOCK_SIZE];

    c.bench_function("full_board_block", |b| {
        b.iter(|| {
            chain.process(black_box(&input), &mut output);
            black_box(output[0])
        })
    });
}

criterion_group!(benches, bench_pedals, bench_full_board);
criterion_main!(benches);
