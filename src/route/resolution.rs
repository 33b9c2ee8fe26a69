//! Resolution results.

use std::fmt;

use serde::Serialize;

use crate::network::{AddressRecord, InterfaceName};

/// Which strategy produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPath {
    /// The destination is held by a local interface.
    FastPath,
    /// The kernel routing table was queried.
    Kernel,
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastPath => write!(f, "fast-path"),
            Self::Kernel => write!(f, "kernel"),
        }
    }
}

/// The local address and interface that would carry traffic to a destination.
///
/// Either fully produced by one strategy or not produced at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Source address the kernel would use.
    pub source_address: AddressRecord,
    /// Egress interface, when it was asked for.
    pub interface_name: Option<InterfaceName>,
    /// Strategy that produced this result.
    pub path: ResolutionPath,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source_address)?;
        if let Some(name) = &self.interface_name {
            write!(f, " dev {name}")?;
        }
        write!(f, " via {}", self.path)
    }
}
