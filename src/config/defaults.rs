//! Default values for configuration options.
//!
//! Centralized constants to avoid magic values scattered across the codebase.

use crate::route::FastPathPolicy;

use super::validated::OutputFormat;

/// Default file name written by `init`.
pub const CONFIG_FILE: &str = "route-source.toml";

/// Default fast-path policy: IPv6 destinations always go to the kernel.
pub const FAST_PATH: FastPathPolicy = FastPathPolicy::Ipv4Only;

/// Default output format.
pub const FORMAT: OutputFormat = OutputFormat::Text;
