//! Errors raised while reading, checking or writing presets and settings.

use std::io;
use std::path::PathBuf;

use stompbox_engine::EngineError;
use thiserror::Error;

/// Everything that can go wrong between a TOML file and a running chain.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A preset or settings file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    ReadFile {
        /// File that was being read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: io::Error,
    },

    /// A preset could not be written.
    #[error("cannot write {}: {source}", path.display())]
    WriteFile {
        /// File that was being written.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: io::Error,
    },

    /// The directory for a preset could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: io::Error,
    },

    /// Malformed TOML or a document that does not match the preset layout.
    #[error("bad TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A preset could not be encoded.
    #[error("cannot encode TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No file, user preset or factory preset by that name.
    #[error("no preset named '{0}'")]
    PresetNotFound(String),

    /// The effect type is not one of the registered pedals.
    #[error("'{0}' is not a known effect")]
    UnknownEffect(String),

    /// The effect has no parameter with this key.
    #[error("effect '{effect}' has no parameter '{param}'")]
    UnknownParameter {
        /// Effect type as written.
        effect: String,
        /// Parameter key as written.
        param: String,
    },

    /// The value does not parse, has the wrong unit or is out of range.
    #[error("{effect}.{param}: {reason}")]
    InvalidParameter {
        /// Effect type as written.
        effect: String,
        /// Parameter key as written.
        param: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// More effects than the chain can hold.
    #[error("preset has {count} effects but the chain holds at most {capacity}")]
    ChainFull {
        /// Effects in the preset.
        count: usize,
        /// Chain capacity.
        capacity: usize,
    },

    /// Engine settings rejected.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ConfigError {
    pub(crate) fn read_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadFile { path: path.into(), source }
    }

    pub(crate) fn write_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteFile { path: path.into(), source }
    }

    pub(crate) fn create_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CreateDir { path: path.into(), source }
    }

    pub(crate) fn invalid_param(
        effect: impl Into<String>,
        param: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            effect: effect.into(),
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ConfigError>;
