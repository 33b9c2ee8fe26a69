//! Routing channel abstraction.

use std::io;

use crate::network::InterfaceName;

/// An open routing-communication channel.
///
/// Implementations release the underlying OS resource when dropped.
pub trait RouteChannel {
    /// Writes one complete routing message.
    ///
    /// # Errors
    ///
    /// Returns the OS error; [`io::ErrorKind::Interrupted`] is retried by the caller.
    fn send(&mut self, message: &[u8]) -> io::Result<usize>;

    /// Reads one routing message into `buffer`, returning its length.
    ///
    /// # Errors
    ///
    /// Returns the OS error; [`io::ErrorKind::Interrupted`] is retried by the caller.
    fn recv(&mut self, buffer: &mut [u8]) -> io::Result<usize>;
}

/// Source of routing channels and interface indexes.
///
/// # Design
///
/// - Enables dependency injection for testing with scripted channels
/// - Platform-specific implementations provided in [`super::platform`]
pub trait RouteBackend: Send + Sync {
    /// Channel type produced by [`RouteBackend::open`].
    type Channel: RouteChannel;

    /// Opens a fresh channel for a single request/reply exchange.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the channel is denied.
    fn open(&self) -> io::Result<Self::Channel>;

    /// Resolves an interface name to its kernel index.
    fn interface_index(&self, name: &InterfaceName) -> Option<u32>;

    /// Process id stamped into requests.
    fn process_id(&self) -> i32 {
        i32::try_from(std::process::id()).unwrap_or(i32::MAX)
    }
}
