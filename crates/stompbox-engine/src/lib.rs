//! Stompbox Engine - the real-time signal path
//!
//! Ties stompbox-core's hand-off queues and effect chain into the two
//! execution contexts of the pedal:
//!
//! - **Interrupt context**: [`InterruptPort::on_transfer_complete`] plays one
//!   processed block, captures one block and queues it. It only moves
//!   buffer handles and never runs DSP.
//! - **Processing context**: [`AudioEngine`] pops captured blocks, applies
//!   pending [`ParameterBus`](stompbox_core::ParameterBus) updates at the
//!   block boundary, runs the chain and queues the result for playback.
//!
//! Buffers live in a [`BufferPool`] that [`AudioPipeline`] circulates as
//! `&mut SampleBuffer` handles, so no block is copied between contexts and
//! none is ever aliased. Overruns, underruns, deadline misses and effect
//! faults are counted in [`EngineStats`] and never stop the audio.
//!
//! # Example
//!
//! ```rust
//! use stompbox_core::{EffectChain, ParameterBus};
//! use stompbox_effects::{EffectKind, Pedal};
//! use stompbox_engine::{
//!     AudioEngine, AudioInterface, AudioPipeline, BufferPool, EngineConfig, EngineStats, StdClock,
//! };
//!
//! struct Loopback;
//! impl AudioInterface for Loopback {
//!     fn read_input(&mut self, block: &mut [f32]) { block.fill(0.1); }
//!     fn write_output(&mut self, _block: &[f32]) {}
//! }
//!
//! let mut chain: EffectChain<Pedal> = EffectChain::new(48000.0);
//! chain.push(Pedal::new(EffectKind::Overdrive, 48000.0)).unwrap();
//! let bus = ParameterBus::for_chain(&chain).unwrap();
//! let stats = EngineStats::new();
//!
//! let mut pool = BufferPool::<4>::new();
//! let mut pipeline = AudioPipeline::new(&mut pool);
//! let (mut isr, mut port) = pipeline.split(&stats);
//! let mut engine =
//!     AudioEngine::new(chain, &bus, StdClock::new(), &stats, EngineConfig::default()).unwrap();
//!
//! isr.on_transfer_complete(&mut Loopback);
//! assert_eq!(engine.process_pending(&mut port), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
#[cfg(feature = "tracing")]
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod stats;

#[cfg(feature = "std")]
pub use clock::StdClock;
pub use clock::Clock;
pub use config::{EngineConfig, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
pub use engine::{AudioEngine, BlockOutcome};
pub use error::EngineError;
#[cfg(feature = "tracing")]
pub use logging::LoggingObserver;
#[cfg(feature = "std")]
pub use notify::Signal;
pub use notify::{Notify, SpinWait};
pub use pipeline::{
    AudioInterface, AudioPipeline, BufferPool, Handle, InterruptPort, ProcessingPort,
    TransferReport,
};
pub use stats::{EngineStats, StatsSnapshot, should_report};
