//! Presets and engine settings for stompbox.
//!
//! Presets are TOML files naming effects in processing order with their
//! parameter values. Values carry unit suffixes (`"18dB"`, `"2.8kHz"`,
//! `"350ms"`, `"40%"`) matched against each parameter's unit; a value that
//! is out of range or in the wrong unit is an error, never silently clamped.
//!
//! # Example
//!
//! ```rust
//! use stompbox_config::{EffectConfig, Preset};
//! use stompbox_core::EffectChain;
//! use stompbox_effects::Pedal;
//!
//! let preset = Preset::new("Slapback")
//!     .with_effect(EffectConfig::new("overdrive").with_param("drive", "10dB"))
//!     .with_effect(
//!         EffectConfig::new("echo")
//!             .with_param("time", "110ms")
//!             .with_param("feedback", "5%"),
//!     );
//!
//! let chain: EffectChain<Pedal> = preset.build_chain(48000.0).unwrap();
//! assert_eq!(chain.len(), 2);
//!
//! let saved = Preset::capture("Slapback", &chain);
//! assert_eq!(saved.effects[1].get_param("time"), Some("110ms"));
//! ```

mod effect_config;
mod error;
mod overrides;
mod preset;
mod settings;

/// Factory presets bundled with the library.
pub mod factory_presets;

/// Preset lookup on disk.
pub mod paths;

pub use effect_config::{EffectConfig, format_param_value, parse_param_value};
pub use error::{ConfigError, Result};
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_presets, get_factory_preset, is_factory_preset,
};
pub use overrides::ParamOverride;
pub use paths::{find_preset, find_preset_in, list_presets_in, user_presets_dir};
pub use preset::Preset;
pub use settings::EngineSettings;
