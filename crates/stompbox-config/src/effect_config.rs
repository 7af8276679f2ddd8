//! Effect configuration types and unit-aware parameter values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stompbox_core::{ParamDescriptor, ParamUnit, ParameterInfo};
use stompbox_effects::{EffectKind, Pedal};

use crate::error::{ConfigError, Result};

/// Configuration for a single effect in a preset.
///
/// A leading `!` on the type marks the effect bypassed (`"!echo"`).
/// Parameter values are strings so they can carry a unit suffix.
///
/// # Example
///
/// ```rust
/// use stompbox_config::EffectConfig;
///
/// let config = EffectConfig::new("!echo").with_param("time", "500ms");
///
/// assert_eq!(config.effect_type, "echo");
/// assert!(config.bypassed);
/// assert_eq!(config.get_param("time"), Some("500ms"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectConfig {
    /// Effect id or alias (e.g. "overdrive", "verb").
    #[serde(rename = "type")]
    pub effect_type: String,

    /// Whether the effect is bypassed.
    #[serde(default)]
    pub bypassed: bool,

    /// Parameter values keyed by parameter id.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl EffectConfig {
    /// Create a new effect configuration.
    ///
    /// If the type starts with `!`, the effect will be marked as bypassed.
    pub fn new(effect_type: impl Into<String>) -> Self {
        let mut config = Self {
            effect_type: effect_type.into(),
            bypassed: false,
            params: BTreeMap::new(),
        };
        config.normalize();
        config
    }

    /// Add a parameter to the configuration.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set whether the effect is bypassed.
    pub fn with_bypass(mut self, bypassed: bool) -> Self {
        self.bypassed = bypassed;
        self
    }

    /// Get a parameter value.
    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Set a parameter value.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Effect type for display (with `!` prefix if bypassed).
    pub fn display_type(&self) -> String {
        if self.bypassed {
            format!("!{}", self.effect_type)
        } else {
            self.effect_type.clone()
        }
    }

    /// Moves a `!` prefix on the type into [`bypassed`](Self::bypassed).
    pub(crate) fn normalize(&mut self) {
        if let Some(stripped) = self.effect_type.strip_prefix('!') {
            self.effect_type = stripped.trim().to_string();
            self.bypassed = true;
        }
    }

    /// Resolves the effect type against the registry.
    pub fn kind(&self) -> Result<EffectKind> {
        EffectKind::from_id(&self.effect_type)
            .ok_or_else(|| ConfigError::UnknownEffect(self.effect_type.clone()))
    }

    /// Builds the configured effect at `sample_rate`.
    ///
    /// Every parameter must name a real parameter and parse within its
    /// range; nothing is clamped.
    pub fn build(&self, sample_rate: f32) -> Result<Pedal> {
        let kind = self.kind()?;
        let mut pedal = Pedal::new(kind, sample_rate);
        for (key, text) in &self.params {
            let (index, value) = resolve_param(kind, &self.effect_type, key, text)?;
            pedal.set_param(index, value);
        }
        Ok(pedal)
    }
}

/// Finds parameter `key` of `kind` and parses `text` for it.
pub(crate) fn resolve_param(
    kind: EffectKind,
    effect: &str,
    key: &str,
    text: &str,
) -> Result<(usize, f32)> {
    let (index, desc) = kind.find_param(key).ok_or_else(|| ConfigError::UnknownParameter {
        effect: effect.to_string(),
        param: key.to_string(),
    })?;
    let value = parse_param_value(&desc, text)
        .map_err(|reason| ConfigError::invalid_param(effect, key, reason))?;
    Ok((index, value))
}

const SUFFIXES: &[(&str, ParamUnit, f32)] = &[
    ("kHz", ParamUnit::Hertz, 1000.0),
    ("khz", ParamUnit::Hertz, 1000.0),
    ("Hz", ParamUnit::Hertz, 1.0),
    ("hz", ParamUnit::Hertz, 1.0),
    ("dB", ParamUnit::Decibels, 1.0),
    ("db", ParamUnit::Decibels, 1.0),
    ("ms", ParamUnit::Milliseconds, 1.0),
    ("s", ParamUnit::Milliseconds, 1000.0),
    ("%", ParamUnit::Percent, 1.0),
    (":1", ParamUnit::Ratio, 1.0),
];

fn unit_name(unit: ParamUnit) -> &'static str {
    match unit {
        ParamUnit::Decibels => "decibel",
        ParamUnit::Hertz => "frequency",
        ParamUnit::Milliseconds => "time",
        ParamUnit::Percent => "percent",
        ParamUnit::Ratio => "ratio",
        ParamUnit::None => "unitless",
    }
}

/// Parses a parameter value string into the descriptor's native unit.
///
/// Accepted suffixes: `dB`, `Hz`, `kHz`, `ms`, `s`, `%` and `:1`. A bare
/// number is taken in the native unit. A suffix for a different unit, a
/// non-finite number or a value outside the descriptor's range is an error.
///
/// ```rust
/// use stompbox_config::parse_param_value;
/// use stompbox_core::ParamDescriptor;
///
/// let time = ParamDescriptor::time_ms("Time", "Time", 1.0, 1000.0, 350.0);
/// assert_eq!(parse_param_value(&time, "0.5s"), Ok(500.0));
/// assert_eq!(parse_param_value(&time, "120"), Ok(120.0));
/// assert!(parse_param_value(&time, "3dB").is_err());
/// assert!(parse_param_value(&time, "2s").is_err());
/// ```
pub fn parse_param_value(desc: &ParamDescriptor, text: &str) -> std::result::Result<f32, String> {
    let text = text.trim();
    let (number, scale) = match SUFFIXES.iter().find(|(suffix, _, _)| text.ends_with(suffix)) {
        Some(&(suffix, unit, scale)) => {
            if unit != desc.unit {
                return Err(format!(
                    "'{text}' is a {} value but '{}' takes {} values",
                    unit_name(unit),
                    desc.name,
                    unit_name(desc.unit)
                ));
            }
            (&text[..text.len() - suffix.len()], scale)
        }
        None => (text, 1.0),
    };

    let value = number
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("'{text}' is not a number"))?
        * scale;
    if !value.is_finite() {
        return Err(format!("'{text}' is not finite"));
    }
    if !desc.contains(value) {
        return Err(format!("{value} is outside {}..={}", desc.min, desc.max));
    }
    Ok(value)
}

/// Formats a value with the suffix [`parse_param_value`] reads back.
///
/// ```rust
/// use stompbox_config::format_param_value;
/// use stompbox_core::ParamDescriptor;
///
/// let level = ParamDescriptor::gain_db("Level", "Level", -20.0, 6.0, -6.0);
/// assert_eq!(format_param_value(&level, -6.0), "-6dB");
/// ```
pub fn format_param_value(desc: &ParamDescriptor, value: f32) -> String {
    match desc.unit {
        ParamUnit::Decibels => format!("{value}dB"),
        ParamUnit::Hertz => format!("{value}Hz"),
        ParamUnit::Milliseconds => format!("{value}ms"),
        ParamUnit::Percent => format!("{value}%"),
        ParamUnit::Ratio | ParamUnit::None => format!("{value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive() -> ParamDescriptor {
        ParamDescriptor::gain_db("Drive", "Drive", 0.0, 40.0, 12.0)
    }

    fn tone() -> ParamDescriptor {
        ParamDescriptor::frequency_hz("Tone", "Tone", 500.0, 8000.0, 3000.0)
    }

    #[test]
    fn bang_prefix_means_bypassed() {
        let config = EffectConfig::new("!reverb");
        assert_eq!(config.effect_type, "reverb");
        assert!(config.bypassed);
        assert_eq!(config.display_type(), "!reverb");

        let config = EffectConfig::new("reverb");
        assert!(!config.bypassed);
        assert_eq!(config.display_type(), "reverb");
    }

    #[test]
    fn suffixes_convert_to_native_units() {
        assert_eq!(parse_param_value(&tone(), "1.5kHz"), Ok(1500.0));
        assert_eq!(parse_param_value(&tone(), "900 Hz"), Ok(900.0));
        assert_eq!(parse_param_value(&drive(), "18dB"), Ok(18.0));
        assert_eq!(parse_param_value(&ParamDescriptor::mix(), "25%"), Ok(25.0));
    }

    #[test]
    fn mismatched_suffix_is_rejected() {
        let err = parse_param_value(&drive(), "20ms").unwrap_err();
        assert!(err.contains("time"), "got: {err}");
        assert!(parse_param_value(&tone(), "50%").is_err());
    }

    #[test]
    fn out_of_range_is_rejected_not_clamped() {
        let err = parse_param_value(&drive(), "41dB").unwrap_err();
        assert!(err.contains("outside"), "got: {err}");
        assert!(parse_param_value(&tone(), "10kHz").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_param_value(&drive(), "loud").is_err());
        assert!(parse_param_value(&drive(), "NaN").is_err());
        assert!(parse_param_value(&drive(), "").is_err());
    }

    #[test]
    fn formatted_values_parse_back() {
        for (desc, value) in [(drive(), 12.5), (tone(), 3000.0), (ParamDescriptor::mix(), 35.0)] {
            let text = format_param_value(&desc, value);
            assert_eq!(parse_param_value(&desc, &text), Ok(value), "{text}");
        }
    }

    #[test]
    fn build_applies_params() {
        let pedal = EffectConfig::new("overdrive")
            .with_param("drive", "20dB")
            .with_param("tone", "2kHz")
            .build(48000.0)
            .unwrap();
        assert_eq!(pedal.kind(), EffectKind::Overdrive);
        assert_eq!(pedal.get_param(0), 20.0);
        assert_eq!(pedal.get_param(1), 2000.0);
    }

    #[test]
    fn build_reports_unknown_names() {
        let err = EffectConfig::new("wah").build(48000.0).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEffect(ref e) if e == "wah"));

        let err = EffectConfig::new("echo").with_param("wobble", "1").build(48000.0).unwrap_err();
        assert!(
            matches!(err, ConfigError::UnknownParameter { ref param, .. } if param == "wobble")
        );
    }
}
