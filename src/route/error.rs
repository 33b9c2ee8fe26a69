//! Error types for route resolution.

use std::io;

use thiserror::Error;

use crate::network::{AddressRecord, AddressRole, InterfaceName};

/// Structural problems found while decoding a routing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ends before a structure it declares.
    #[error("Message truncated: needed {needed} bytes, got {available}")]
    Truncated {
        /// Bytes required to continue decoding
        needed: usize,
        /// Bytes actually available
        available: usize,
    },

    /// The message uses a routing protocol version this decoder does not know.
    #[error("Unsupported routing message version {0}")]
    UnsupportedVersion(u8),

    /// The declared message length cannot even hold the header.
    #[error("Declared message length {declared} is shorter than the header")]
    LengthMismatch {
        /// Length found in the header
        declared: usize,
    },
}

/// Error type for route resolution.
///
/// Interrupted system calls never appear here; they are retried.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The routing channel could not be opened (privileges, descriptor limits,
    /// or no routing socket on this platform).
    #[error("Routing channel unavailable: {0}")]
    ChannelUnavailable(#[source] io::Error),

    /// Writing the request to the routing channel failed.
    #[error("Failed to send route request: {0}")]
    RequestFailed(#[source] io::Error),

    /// Reading the reply from the routing channel failed.
    #[error("Failed to read route reply: {0}")]
    ReplyFailed(#[source] io::Error),

    /// The kernel reply lacks an address the caller requires.
    #[error("Kernel reply has no {missing} slot")]
    IncompleteReply {
        /// The missing slot
        missing: AddressRole,
    },

    /// The kernel reply could not be decoded.
    #[error("Malformed kernel reply: {0}")]
    Malformed(#[from] DecodeError),

    /// The kernel answered the request with an error code.
    #[error("Kernel rejected route request: {0}")]
    Kernel(#[source] io::Error),

    /// The scope interface does not exist.
    #[error("Unknown interface '{name}'")]
    UnknownInterface {
        /// The name that could not be resolved to an index
        name: InterfaceName,
    },

    /// Neither the local interfaces nor the kernel produced an answer.
    #[error("Cannot resolve a route to {destination}: {source}")]
    Unresolvable {
        /// The destination being resolved
        destination: AddressRecord,
        /// Why the kernel query failed
        #[source]
        source: Box<Self>,
    },
}

impl RouteError {
    /// Returns true if the error means the routing channel is not usable at all.
    #[must_use]
    pub fn is_channel_unavailable(&self) -> bool {
        match self {
            Self::ChannelUnavailable(_) => true,
            Self::Unresolvable { source, .. } => source.is_channel_unavailable(),
            _ => false,
        }
    }
}
