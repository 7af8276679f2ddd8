//! Every pedal at its parameter extremes and at unusual sample rates.

use stompbox_core::{Effect, ParameterInfo};
use stompbox_effects::{EffectKind, Pedal};

const RATES: [f32; 4] = [8000.0, 44100.0, 48000.0, 192000.0];
const NUM_SAMPLES: usize = 2000;

fn assert_finite_output(pedal: &mut Pedal, label: &str) {
    for i in 0..NUM_SAMPLES {
        let input = match i % 3 {
            0 => 0.9,
            1 => -0.9,
            _ => 0.0,
        };
        let output = pedal.process(input);
        assert!(output.is_finite(), "{label}: non-finite output at sample {i}: {output}");
    }
}

fn set_all(pedal: &mut Pedal, pick: impl Fn(f32, f32) -> f32) {
    for i in 0..pedal.param_count() {
        if let Some(desc) = pedal.param_info(i) {
            pedal.set_param(i, pick(desc.min, desc.max));
        }
    }
}

#[test]
fn all_params_at_minimum() {
    for kind in EffectKind::ALL {
        for rate in RATES {
            let mut pedal = Pedal::new(kind, rate);
            set_all(&mut pedal, |min, _| min);
            assert_finite_output(&mut pedal, &format!("{kind} min @ {rate}"));
        }
    }
}

#[test]
fn all_params_at_maximum() {
    for kind in EffectKind::ALL {
        for rate in RATES {
            let mut pedal = Pedal::new(kind, rate);
            set_all(&mut pedal, |_, max| max);
            assert_finite_output(&mut pedal, &format!("{kind} max @ {rate}"));
        }
    }
}

#[test]
fn sample_rate_change_keeps_controls() {
    for kind in EffectKind::ALL {
        let mut pedal = Pedal::new(kind, 48000.0);
        set_all(&mut pedal, |min, max| min + (max - min) * 0.25);
        let before: Vec<f32> = (0..pedal.param_count()).map(|i| pedal.get_param(i)).collect();

        pedal.set_sample_rate(96000.0);
        let after: Vec<f32> = (0..pedal.param_count()).map(|i| pedal.get_param(i)).collect();
        assert_eq!(before, after, "{kind}");
        assert_finite_output(&mut pedal, &format!("{kind} after rate change"));
    }
}

#[test]
fn out_of_range_and_non_finite_values_are_contained() {
    for kind in EffectKind::ALL {
        let mut pedal = Pedal::new(kind, 48000.0);
        for i in 0..pedal.param_count() {
            pedal.set_param(i, 1.0e9);
            pedal.set_param(i, -1.0e9);
        }
        assert_finite_output(&mut pedal, &format!("{kind} after extreme values"));
    }
}
