//! Stompbox Effects - the pedalboard
//!
//! Seven guitar effects built on stompbox-core, each exposing its
//! parameters through [`ParameterInfo`](stompbox_core::ParameterInfo) and a
//! plain `Copy` control record:
//!
//! - [`Equalizer`] - three-band EQ with a sweepable mid
//! - [`Compressor`] - soft-knee feed-forward compressor
//! - [`Overdrive`] - asymmetric soft clipper with tone and level
//! - [`Cabinet`] - speaker cabinet voicing
//! - [`Tremolo`] - LFO amplitude modulation
//! - [`Echo`] - feedback delay with darkening repeats
//! - [`Reverb`] - Freeverb-style room with pre-delay
//!
//! [`Pedal`] wraps them in one enum so a single
//! [`EffectChain<Pedal>`](stompbox_core::EffectChain) holds any
//! combination, and [`EffectKind`] maps string ids to constructors.
//!
//! ## Example
//!
//! ```rust
//! use stompbox_core::{BLOCK_SIZE, EffectChain};
//! use stompbox_effects::{EffectKind, Pedal};
//!
//! let mut chain: EffectChain<Pedal> = EffectChain::new(48000.0);
//! for id in ["compressor", "od", "cab"] {
//!     let kind = EffectKind::from_id(id).unwrap();
//!     chain.push(Pedal::new(kind, 48000.0)).unwrap();
//! }
//! chain.prepare();
//!
//! let input = [0.1; BLOCK_SIZE];
//! let mut output = [0.0; BLOCK_SIZE];
//! let report = chain.process(&input, &mut output);
//! assert_eq!(report.faults, 0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod cabinet;
pub mod compressor;
pub mod echo;
pub mod eq;
pub mod overdrive;
pub mod pedal;
pub mod reverb;
pub mod tremolo;

pub use cabinet::{Cabinet, CabinetControls};
pub use compressor::{Compressor, CompressorControls};
pub use echo::{Echo, EchoControls, MAX_ECHO_MS};
pub use eq::{EqControls, Equalizer};
pub use overdrive::{Overdrive, OverdriveControls};
pub use pedal::{EffectCategory, EffectKind, Pedal};
pub use reverb::{MAX_PREDELAY_MS, Reverb, ReverbControls};
pub use tremolo::{Tremolo, TremoloControls};
