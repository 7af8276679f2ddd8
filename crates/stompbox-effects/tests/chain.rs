//! Pedals running inside an `EffectChain<Pedal>`.

use stompbox_core::{
    BLOCK_SIZE, Block, EffectChain, EffectId, Lifecycle, ParameterBus, ParameterInfo,
};
use stompbox_effects::{CompressorControls, EffectKind, Pedal};

fn guitar_block(offset: usize) -> Block {
    core::array::from_fn(|i| {
        let t = (offset + i) as f32 / 48000.0;
        0.6 * (2.0 * core::f32::consts::PI * 196.0 * t).sin()
    })
}

#[test]
fn bypassed_eq_and_transparent_compressor_pass_input_unchanged() {
    let mut chain: EffectChain<Pedal> = EffectChain::new(48000.0);
    let eq = chain.push(Pedal::new(EffectKind::Equalizer, 48000.0)).unwrap();
    let comp = chain.push(Pedal::new(EffectKind::Compressor, 48000.0)).unwrap();
    chain.prepare();

    chain.set_effect_bypassed(eq, true).unwrap();
    if let Some(slot) = chain.slot_mut(comp) {
        if let Pedal::Compressor(c) = slot.effect_mut() {
            c.set_controls(CompressorControls {
                threshold_db: 0.0,
                ratio: 1.0,
                ..CompressorControls::default()
            });
        }
    }

    let mut output = [0.0; BLOCK_SIZE];
    for n in 0..256 / BLOCK_SIZE {
        let input = guitar_block(n * BLOCK_SIZE);
        let report = chain.process(&input, &mut output);
        assert_eq!(report.processed, 1);
        assert_eq!(output, input);
    }
}

#[test]
fn full_board_runs_without_faults() {
    let mut chain: EffectChain<Pedal> = EffectChain::new(48000.0);
    for kind in EffectKind::ALL {
        chain.push(Pedal::new(kind, 48000.0)).unwrap();
    }
    chain.prepare();

    let mut output = [0.0; BLOCK_SIZE];
    for n in 0..200 {
        let report = chain.process(&guitar_block(n * BLOCK_SIZE), &mut output);
        assert_eq!(report.faults, 0);
        assert_eq!(report.processed, EffectKind::ALL.len());
        assert!(output.iter().all(|s| s.is_finite()));
    }
    for (_, slot) in chain.iter() {
        assert_eq!(slot.state().lifecycle, Lifecycle::Ready);
    }
}

#[test]
fn bus_reaches_pedal_parameters_by_name() {
    let mut chain: EffectChain<Pedal> = EffectChain::new(48000.0);
    chain.push(Pedal::new(EffectKind::Overdrive, 48000.0)).unwrap();
    let echo = chain.push(Pedal::new(EffectKind::Echo, 48000.0)).unwrap();
    chain.prepare();
    let bus = ParameterBus::for_chain(&chain).unwrap();

    let time = chain
        .slot(echo)
        .and_then(|slot| slot.effect().find_param_by_name("time"))
        .unwrap();
    assert_eq!(bus.publish(echo, time, 5000.0), Ok(1000.0));

    let input = guitar_block(0);
    let mut output = [0.0; BLOCK_SIZE];
    chain.process_with(&bus, &input, &mut output);
    assert_eq!(chain.param(echo, time), Some(1000.0));
    assert_eq!(chain.param(EffectId(0), 0), Some(12.0));
}

#[test]
fn reported_latency_is_the_reverb_predelay() {
    let mut chain: EffectChain<Pedal> = EffectChain::new(48000.0);
    chain.push(Pedal::new(EffectKind::Compressor, 48000.0)).unwrap();
    chain.push(Pedal::new(EffectKind::Reverb, 48000.0)).unwrap();
    chain.prepare();
    assert_eq!(chain.latency_samples(), 480);
}
