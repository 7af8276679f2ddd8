//! Preset file format and operations.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stompbox_core::{Effect, EffectChain, MAX_EFFECTS, ParameterInfo};
use stompbox_effects::Pedal;
use stompbox_engine::EngineConfig;

use crate::effect_config::{EffectConfig, format_param_value};
use crate::error::{ConfigError, Result};

/// A named effect chain.
///
/// # TOML Format
///
/// ```toml
/// name = "Crunch"
/// description = "Rhythm crunch"
/// sample_rate = 48000
///
/// [[effects]]
/// type = "overdrive"
/// [effects.params]
/// drive = "18dB"
/// tone = "2.8kHz"
///
/// [[effects]]
/// type = "!echo"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate the chain is built for (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Chain-level bypass.
    #[serde(default)]
    pub bypassed: bool,

    /// Effects in processing order.
    #[serde(default)]
    pub effects: Vec<EffectConfig>,
}

fn default_sample_rate() -> u32 {
    48000
}

impl Preset {
    /// Create a new empty preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            bypassed: false,
            effects: Vec::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Add an effect to the preset.
    pub fn with_effect(mut self, effect: EffectConfig) -> Self {
        self.effects.push(effect);
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset = Self::from_toml(&content)?;
        #[cfg(feature = "tracing")]
        tracing::info!(
            path = %path.display(),
            name = %preset.name,
            effects = preset.len(),
            "preset loaded"
        );
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut preset: Preset = toml::from_str(toml_str)?;
        for effect in &mut preset.effects {
            effect.normalize();
        }
        Ok(preset)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the number of effects in the preset.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the preset is empty.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Iterate over effects.
    pub fn iter(&self) -> impl Iterator<Item = &EffectConfig> {
        self.effects.iter()
    }

    /// Effect types with `!` on bypassed ones.
    pub fn effect_types(&self) -> Vec<String> {
        self.effects.iter().map(EffectConfig::display_type).collect()
    }

    /// Checks everything [`build_chain`](Self::build_chain) would: sample
    /// rate, chain length, effect types, parameter names, units and ranges.
    pub fn validate(&self) -> Result<()> {
        self.build_chain::<MAX_EFFECTS>(self.sample_rate as f32).map(|_| ())
    }

    /// Builds a prepared chain at `sample_rate`.
    ///
    /// The chain type fixes the capacity:
    ///
    /// ```rust
    /// use stompbox_config::get_factory_preset;
    /// use stompbox_core::EffectChain;
    /// use stompbox_effects::Pedal;
    ///
    /// let preset = get_factory_preset("crunch").unwrap();
    /// let chain: EffectChain<Pedal> = preset.build_chain(48000.0).unwrap();
    /// assert_eq!(chain.len(), preset.len());
    /// ```
    pub fn build_chain<const MAX: usize>(
        &self,
        sample_rate: f32,
    ) -> Result<EffectChain<Pedal, MAX>> {
        self.build_chain_with(sample_rate, |pedal| pedal)
    }

    /// [`build_chain`](Self::build_chain), passing each pedal through
    /// `wrap` before it enters the chain.
    pub fn build_chain_with<E: Effect, const MAX: usize>(
        &self,
        sample_rate: f32,
        mut wrap: impl FnMut(Pedal) -> E,
    ) -> Result<EffectChain<E, MAX>> {
        EngineConfig::new(sample_rate).validate()?;
        if self.effects.len() > MAX {
            return Err(ConfigError::ChainFull {
                count: self.effects.len(),
                capacity: MAX,
            });
        }

        let mut chain = EffectChain::new(sample_rate);
        for config in &self.effects {
            let pedal = config.build(sample_rate)?;
            let id = chain.push(wrap(pedal)).map_err(|_| ConfigError::ChainFull {
                count: self.effects.len(),
                capacity: MAX,
            })?;
            if let Some(slot) = chain.slot_mut(id) {
                slot.set_bypassed(config.bypassed);
            }
        }
        chain.set_bypassed(self.bypassed);
        chain.prepare();
        Ok(chain)
    }

    /// Records the current state of `chain` as a preset.
    pub fn capture<const MAX: usize>(
        name: impl Into<String>,
        chain: &EffectChain<Pedal, MAX>,
    ) -> Self {
        let effects = chain
            .iter()
            .map(|(_, slot)| {
                let pedal = slot.effect();
                let mut config =
                    EffectConfig::new(pedal.kind().id()).with_bypass(slot.is_bypassed());
                for index in 0..pedal.param_count() {
                    if let Some(desc) = pedal.param_info(index) {
                        let value = format_param_value(&desc, pedal.get_param(index));
                        config.set_param(desc.string_id, value);
                    }
                }
                config
            })
            .collect();

        Self {
            name: name.into(),
            description: None,
            sample_rate: chain.sample_rate() as u32,
            bypassed: chain.is_bypassed(),
            effects,
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stompbox_core::EffectId;
    use stompbox_effects::EffectKind;

    #[test]
    fn test_preset_new() {
        let preset = Preset::new("Test Preset");
        assert_eq!(preset.name, "Test Preset");
        assert!(preset.description.is_none());
        assert_eq!(preset.sample_rate, 48000);
        assert!(!preset.bypassed);
        assert!(preset.is_empty());
    }

    #[test]
    fn test_from_toml_defaults_and_bang_prefix() {
        let preset = Preset::from_toml(
            r#"
            name = "Minimal"

            [[effects]]
            type = "compressor"

            [[effects]]
            type = "!echo"
            [effects.params]
            time = "0.25s"
            "#,
        )
        .unwrap();

        assert_eq!(preset.sample_rate, 48000);
        assert_eq!(preset.effect_types(), ["compressor", "!echo"]);
        assert_eq!(preset.effects[1].effect_type, "echo");
        assert!(preset.effects[1].bypassed);
    }

    #[test]
    fn test_build_chain_applies_bypass_and_params() {
        let preset = Preset::new("Board")
            .with_effect(EffectConfig::new("od").with_param("drive", "30dB"))
            .with_effect(EffectConfig::new("!echo").with_param("time", "120ms"));
        let chain: EffectChain<Pedal, 4> = preset.build_chain(44100.0).unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.sample_rate(), 44100.0);
        let drive = chain.slot(EffectId(0)).unwrap();
        assert_eq!(drive.effect().kind(), EffectKind::Overdrive);
        assert_eq!(drive.effect().get_param(0), 30.0);
        assert!(!drive.is_bypassed());
        let echo = chain.slot(EffectId(1)).unwrap();
        assert!(echo.is_bypassed());
        assert_eq!(chain.param(EffectId(1), 0), Some(120.0));
    }

    #[test]
    fn test_build_chain_rejects_too_many_effects() {
        let mut preset = Preset::new("Long");
        for _ in 0..3 {
            preset = preset.with_effect(EffectConfig::new("eq"));
        }
        let err = preset.build_chain::<2>(48000.0).unwrap_err();
        assert!(matches!(err, ConfigError::ChainFull { count: 3, capacity: 2 }));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let preset = Preset::new("Hot")
            .with_effect(EffectConfig::new("overdrive").with_param("drive", "60dB"));
        let err = preset.validate().unwrap_err();
        let ConfigError::InvalidParameter { effect, param, .. } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!((effect.as_str(), param.as_str()), ("overdrive", "drive"));
    }

    #[test]
    fn test_validate_rejects_bad_sample_rate() {
        let preset = Preset::new("Slow").with_sample_rate(1000);
        assert!(matches!(preset.validate(), Err(ConfigError::Engine(_))));
    }

    #[test]
    fn test_capture_reproduces_chain() {
        let preset = Preset::new("Source")
            .with_effect(EffectConfig::new("compressor").with_param("ratio", "8"))
            .with_effect(EffectConfig::new("!reverb").with_param("mix", "45%"));
        let mut chain: EffectChain<Pedal> = preset.build_chain(48000.0).unwrap();
        chain.set_bypassed(true);

        let captured = Preset::capture("Captured", &chain);
        assert_eq!(captured.name, "Captured");
        assert!(captured.bypassed);
        assert_eq!(captured.effect_types(), ["compressor", "!reverb"]);
        assert_eq!(captured.effects[0].get_param("ratio"), Some("8"));
        assert_eq!(captured.effects[1].get_param("mix"), Some("45%"));

        let rebuilt: EffectChain<Pedal> = captured.build_chain(48000.0).unwrap();
        for ((_, a), (_, b)) in chain.iter().zip(rebuilt.iter()) {
            assert_eq!(a.is_bypassed(), b.is_bypassed());
            for i in 0..a.effect().param_count() {
                assert_eq!(a.effect().get_param(i), b.effect().get_param(i));
            }
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let preset = Preset::new("Round")
            .with_description("trip")
            .with_effect(EffectConfig::new("tremolo").with_param("rate", "6Hz"));
        let parsed = Preset::from_toml(&preset.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, preset);
    }
}
