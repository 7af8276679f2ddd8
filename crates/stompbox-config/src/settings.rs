//! Engine settings file.
//!
//! ```toml
//! [engine]
//! sample_rate = 48000
//! queue_depth = 4
//! deadline_margin = 80
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use stompbox_engine::EngineConfig;

use crate::error::{ConfigError, Result};

/// The `[engine]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Blocks in flight per direction. Informational: the pipeline depth is
    /// fixed when the binary is built.
    pub queue_depth: usize,
    /// Percent of the block period processing may use before a deadline
    /// miss is counted.
    pub deadline_margin: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            queue_depth: 4,
            deadline_margin: 100.0,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    engine: EngineSettings,
}

impl EngineSettings {
    /// Parses a settings document. A missing `[engine]` table or missing
    /// keys fall back to defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let file: SettingsFile = toml::from_str(toml_str)?;
        Ok(file.engine)
    }

    /// Loads settings from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Serializes as a document with an `[engine]` table.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&SettingsFile { engine: *self })?)
    }

    /// Validated engine configuration.
    pub fn to_engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig {
            sample_rate: self.sample_rate as f32,
            deadline_margin_pct: self.deadline_margin,
        };
        config.validate()?;
        Ok(config)
    }
}
