//! Tests for validated configuration.

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{OutputFormat, ValidatedConfig};
use crate::route::FastPathPolicy;

/// Helper to create CLI args for a `resolve` invocation plus extra flags
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["route-source", "resolve", "1.1.1.1"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}
