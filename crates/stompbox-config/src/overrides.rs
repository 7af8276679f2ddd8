//! `effect.param=value` assignments from the command line.

use std::str::FromStr;

use stompbox_core::EffectId;
use stompbox_effects::EffectKind;

use crate::effect_config::resolve_param;
use crate::error::{ConfigError, Result};
use crate::preset::Preset;

/// One parsed assignment. `effect` is a chain position or an effect id;
/// an id addresses the first matching effect in the preset.
///
/// ```rust
/// use stompbox_config::ParamOverride;
///
/// let o: ParamOverride = "echo.time=0.5s".parse().unwrap();
/// assert_eq!((o.effect.as_str(), o.param.as_str(), o.value.as_str()), ("echo", "time", "0.5s"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamOverride {
    /// Effect position or id.
    pub effect: String,
    /// Parameter key.
    pub param: String,
    /// Value text, unit suffix allowed.
    pub value: String,
}

impl FromStr for ParamOverride {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected effect.param=value, got '{s}'"))?;
        let (effect, param) = target
            .split_once('.')
            .ok_or_else(|| format!("expected effect.param before '=', got '{target}'"))?;
        let (effect, param, value) = (effect.trim(), param.trim(), value.trim());
        if effect.is_empty() || param.is_empty() || value.is_empty() {
            return Err(format!("incomplete assignment '{s}'"));
        }
        Ok(Self {
            effect: effect.to_string(),
            param: param.to_string(),
            value: value.to_string(),
        })
    }
}

impl ParamOverride {
    /// Finds the target effect in `preset` and parses the value for it.
    /// Returns the chain position, parameter index and value.
    pub fn resolve(&self, preset: &Preset) -> Result<(EffectId, usize, f32)> {
        let position = match self.effect.parse::<usize>() {
            Ok(index) => (index < preset.len()).then_some(index),
            Err(_) => {
                let kind = EffectKind::from_id(&self.effect)
                    .ok_or_else(|| ConfigError::UnknownEffect(self.effect.clone()))?;
                preset.iter().position(|config| config.kind().ok() == Some(kind))
            }
        }
        .ok_or_else(|| ConfigError::UnknownEffect(format!("{} (not in chain)", self.effect)))?;

        let kind = preset.effects[position].kind()?;
        let (param, value) = resolve_param(kind, &self.effect, &self.param, &self.value)?;
        Ok((EffectId(position), param, value))
    }
}
