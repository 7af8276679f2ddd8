//! Property-based tests over every pedal kind.
//!
//! Any parameter setting inside the declared ranges must give finite,
//! bounded output for bounded input, and a reset must leave the effect
//! silent.

use proptest::prelude::*;
use stompbox_core::{Effect, ParameterInfo};
use stompbox_effects::{EffectKind, Pedal};

/// Places every parameter at `t` of the way through its range.
fn set_random_params(pedal: &mut Pedal, values: &[f32; 16]) {
    for i in 0..pedal.param_count() {
        if let Some(desc) = pedal.param_info(i) {
            let t = values[i % 16];
            pedal.set_param(i, desc.min + t * (desc.max - desc.min));
        }
    }
}

fn pedal_at(index: usize) -> Pedal {
    let kind = EffectKind::ALL[index % EffectKind::ALL.len()];
    Pedal::new(kind, 48000.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn every_pedal_produces_finite_output(
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        params in prop::array::uniform16(0.0f32..=1.0f32),
        kind in 0usize..7,
    ) {
        let mut pedal = pedal_at(kind);
        set_random_params(&mut pedal, &params);
        for _ in 0..64 {
            pedal.process(0.0);
        }
        for &x in &input {
            let y = pedal.process(x);
            prop_assert!(y.is_finite(), "{} gave {} for {}", pedal.kind(), y, x);
        }
    }

    /// Gain stages may exceed unity but never run away.
    #[test]
    fn every_pedal_output_is_bounded(
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        params in prop::array::uniform16(0.0f32..=1.0f32),
        kind in 0usize..7,
    ) {
        let mut pedal = pedal_at(kind);
        set_random_params(&mut pedal, &params);
        pedal.reset();
        for &x in &input {
            let y = pedal.process(x);
            prop_assert!(y.abs() <= 32.0, "{} gave {} for {}", pedal.kind(), y, x);
        }
    }

    #[test]
    fn reset_leaves_pedal_silent(
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        params in prop::array::uniform16(0.0f32..=1.0f32),
        kind in 0usize..7,
    ) {
        let mut pedal = pedal_at(kind);
        set_random_params(&mut pedal, &params);
        for &x in &input {
            pedal.process(x);
        }
        pedal.reset();
        for _ in 0..256 {
            let y = pedal.process(0.0);
            prop_assert_eq!(y, 0.0, "{} rang after reset", pedal.kind());
        }
    }
}
