//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid fast-path policy value.
    #[error("Invalid fast-path policy '{value}': expected ipv4, all, or off")]
    InvalidFastPath {
        /// The invalid value provided
        value: String,
    },

    /// Invalid output format value.
    #[error("Invalid output format '{value}': expected text or json")]
    InvalidFormat {
        /// The invalid value provided
        value: String,
    },
}

/// Well-known field names, as written in the config file.
pub mod field {
    /// The `resolver.fast_path` field.
    pub const FAST_PATH: &str = "resolver.fast_path";
    /// The `output.format` field.
    pub const FORMAT: &str = "output.format";
}

impl ConfigError {
    /// Returns the config file field an invalid value came from, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidFastPath { .. } => Some(field::FAST_PATH),
            Self::InvalidFormat { .. } => Some(field::FORMAT),
            _ => None,
        }
    }
}
