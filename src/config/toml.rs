//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Resolver configuration section
    #[serde(default)]
    pub resolver: ResolverSection,

    /// Output configuration section
    #[serde(default)]
    pub output: OutputSection,
}

/// Resolver configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverSection {
    /// Fast-path policy: "ipv4", "all", or "off"
    pub fast_path: Option<String>,
}

/// Output configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Output format: "text" or "json"
    pub format: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# route-source configuration file

[resolver]
# Which destinations may be answered from local interface addresses
# without asking the kernel (default: "ipv4").
# Accepted values: "ipv4"/"v4"/"4", "all"/"both"/"any", "off"/"none"/"disabled"
# With "all", a scoped IPv6 destination (fe80::1%5) only matches an address
# on the same scope; an unscoped one matches any scope.
fast_path = "ipv4"

[output]
# Output format (default: "text", can be overridden by --format)
# Accepted values: "text", "json"
# format = "text"
"#
    .to_string()
}
