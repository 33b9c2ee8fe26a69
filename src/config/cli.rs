//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::route::FastPathPolicy;

use super::validated::OutputFormat;

/// route-source: find the local source address and interface for a destination
///
/// Answers from local interface addresses when the destination is one of
/// them, otherwise asks the kernel routing table.
#[derive(Debug, Parser)]
#[command(name = "route-source")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<FormatArg>,

    /// Which destination families may be answered from local interfaces
    #[arg(long = "fast-path", value_enum, global = true)]
    pub fast_path: Option<FastPathArg>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for route-source
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the source address and interface for a destination
    Resolve {
        /// Destination address (IPv6 may carry a numeric scope: fe80::1%4)
        destination: String,
    },

    /// Ask the kernel routing table directly, skipping the local fast path
    Query {
        /// Destination address (IPv6 may carry a numeric scope: fe80::1%4)
        destination: String,

        /// Restrict the lookup to this interface's routing scope
        #[arg(long, value_name = "IFNAME")]
        scope: Option<String>,

        /// Do not require the kernel to name the egress interface
        #[arg(long = "no-interface-name")]
        no_interface_name: bool,
    },

    /// Check whether an address is assigned to a local interface
    Owns {
        /// Address to look for
        address: String,

        /// Only consider this interface
        #[arg(long, short, value_name = "IFNAME")]
        interface: Option<String>,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

/// Output format argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// One line per result
    #[value(name = "text")]
    Text,
    /// JSON object per result
    #[value(name = "json")]
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Fast-path policy argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FastPathArg {
    /// IPv4 destinations only
    #[value(name = "ipv4")]
    Ipv4,
    /// IPv4 and IPv6 destinations
    #[value(name = "all")]
    All,
    /// Always query the kernel
    #[value(name = "off")]
    Off,
}

impl From<FastPathArg> for FastPathPolicy {
    fn from(arg: FastPathArg) -> Self {
        match arg {
            FastPathArg::Ipv4 => Self::Ipv4Only,
            FastPathArg::All => Self::AllFamilies,
            FastPathArg::Off => Self::Disabled,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
