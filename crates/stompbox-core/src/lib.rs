//! Stompbox Core - real-time plumbing for a guitar multi-effects engine
//!
//! Everything the audio path touches lives here and is allocation-free once
//! constructed. The crate is `no_std` compatible; the observer registry and
//! delay lines need `alloc`.
//!
//! # Block hand-off
//!
//! - [`SampleBuffer`] - fixed-capacity block with a Filling/Full state
//! - [`HandoffQueue`] - bounded wait-free single-producer/single-consumer
//!   queue; [`HandoffQueue::split`] yields a [`Producer`] and a [`Consumer`]
//!   that may live on different threads or in an interrupt handler
//!
//! # Effect chain
//!
//! - [`Effect`] - per-sample processor with block defaults
//! - [`EffectSlot`] - one effect plus its lifecycle record and bypass flag
//! - [`EffectChain`] - ordered slots with per-effect and chain bypass and
//!   fault isolation
//! - [`StatusBoard`] - lock-free mirror of the slot records for displays
//!
//! # Control plane
//!
//! - [`ParameterInfo`] / [`ParamDescriptor`] - parameter introspection
//! - [`ParameterBus`] - lock-free control to audio parameter path with
//!   block-boundary application and atomic groups
//! - [`ControlSurface`] / [`ParamSubject`] - publish then notify observers
//! - [`SmoothedParam`] - zipper-free parameter ramps inside effects
//!
//! # DSP building blocks
//!
//! [`Biquad`], [`OnePole`], [`InterpolatedDelay`], [`CombFilter`],
//! [`AllpassFilter`], [`Lfo`], [`EnvelopeFollower`] and the helpers in
//! [`math`].
//!
//! # no_std
//!
//! ```toml
//! [dependencies]
//! stompbox-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use stompbox_core::{BLOCK_SIZE, Effect, EffectChain, ParameterBus, EffectId};
//! # use stompbox_core::{ParameterInfo, ParamDescriptor};
//! # struct Volume(f32);
//! # impl Effect for Volume {
//! #     fn process(&mut self, x: f32) -> f32 { x * self.0 / 100.0 }
//! #     fn set_sample_rate(&mut self, _: f32) {}
//! #     fn reset(&mut self) {}
//! # }
//! # impl ParameterInfo for Volume {
//! #     fn param_count(&self) -> usize { 1 }
//! #     fn param_info(&self, i: usize) -> Option<ParamDescriptor> {
//! #         (i == 0).then(|| ParamDescriptor::percent("Volume", "Vol", 100.0))
//! #     }
//! #     fn get_param(&self, _: usize) -> f32 { self.0 }
//! #     fn set_param(&mut self, _: usize, v: f32) { self.0 = v; }
//! # }
//!
//! let mut chain: EffectChain<Volume> = EffectChain::new(48000.0);
//! let volume = chain.push(Volume(100.0)).unwrap();
//! chain.prepare();
//!
//! let bus = ParameterBus::for_chain(&chain).unwrap();
//! bus.publish(volume, 0, 50.0).unwrap();
//!
//! let input = [1.0; BLOCK_SIZE];
//! let mut output = [0.0; BLOCK_SIZE];
//! chain.process_with(&bus, &input, &mut output);
//! assert_eq!(output[0], 0.5);
//! # let _ = EffectId(0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod allpass;
pub mod biquad;
pub mod buffer;
pub mod chain;
pub mod comb;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod handoff;
pub mod lfo;
pub mod math;
pub mod observer;
pub mod one_pole;
pub mod param;
pub mod param_bus;
pub mod param_info;
pub mod slot;
pub mod status;

pub use allpass::AllpassFilter;
pub use biquad::{
    Biquad, Coefficients, high_shelf_coefficients, highpass_coefficients, low_shelf_coefficients,
    lowpass_coefficients, peaking_eq_coefficients,
};
pub use buffer::{BLOCK_SIZE, Block, BufferError, BufferState, SampleBuffer};
pub use chain::{ChainError, ChainReport, EffectChain, EffectId, MAX_EFFECTS};
pub use comb::CombFilter;
pub use delay::InterpolatedDelay;
pub use effect::Effect;
pub use envelope::EnvelopeFollower;
pub use handoff::{Consumer, HandoffQueue, Producer};
pub use lfo::{Lfo, LfoWaveform};
pub use math::{
    asymmetric_clip, db_to_linear, flush_denormal, linear_to_db, ms_to_samples, soft_clip,
    wet_dry_mix,
};
pub use observer::{ControlSurface, ParamChange, ParamObserver, ParamSubject, SubscriptionId};
pub use one_pole::OnePole;
pub use param::SmoothedParam;
pub use param_bus::{BusError, DrainOutcome, MAX_PARAMS, ParameterBus};
pub use param_info::{ParamDescriptor, ParamFlags, ParamUnit, ParameterInfo};
pub use slot::{EffectSlot, EffectState, ErrorCode, Lifecycle, SlotOutcome};
pub use status::{EffectStatus, StatusBoard, StatusSnapshot};
