//! Route resolution: which local address and interface reach a destination.
//!
//! This module provides:
//! - The routing message codec ([`RouteQuery`], [`RouteReply`])
//! - The routing channel seam ([`RouteBackend`], [`RouteChannel`])
//! - The kernel query strategy ([`KernelRouteClient`], [`KernelRouteQuery`])
//! - The two-strategy facade ([`RouteResolver`])
//! - Platform-specific routing channels ([`platform`])

mod channel;
mod client;
mod error;
pub mod message;
pub mod platform;
mod resolution;
mod resolver;

#[cfg(test)]
mod test_fixtures;

pub use channel::{RouteBackend, RouteChannel};
pub use client::{KernelRouteClient, KernelRouteQuery, extract_resolution};
pub use error::{DecodeError, RouteError};
pub use message::{RouteHeader, RouteQuery, RouteReply};
pub use resolution::{Resolution, ResolutionPath};
pub use resolver::{FastPathPolicy, RouteResolver};

use crate::network::platform::PlatformEnumerator;

/// Resolver wired to the running system.
pub type PlatformResolver =
    RouteResolver<PlatformEnumerator, KernelRouteClient<platform::PlatformBackend>>;

impl PlatformResolver {
    /// Creates a resolver using the system interface list and routing socket.
    #[must_use]
    pub fn platform() -> Self {
        Self::new(
            PlatformEnumerator::default(),
            KernelRouteClient::new(platform::PlatformBackend::default()),
        )
    }
}
