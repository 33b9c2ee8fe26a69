//! Platform-specific routing channels.
//!
//! # Platform Support
//!
//! - **macOS / iOS**: `PF_ROUTE` raw socket ([`RoutingSocket`]).
//! - **Other**: every open fails with [`std::io::ErrorKind::Unsupported`],
//!   which surfaces as [`RouteError::ChannelUnavailable`](super::RouteError::ChannelUnavailable).

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod routing_socket;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use routing_socket::{RoutingSocket, RoutingSocketChannel};

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use routing_socket::RoutingSocket as PlatformBackend;

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
pub use unsupported::UnsupportedRouting;

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
pub use unsupported::UnsupportedRouting as PlatformBackend;

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
mod unsupported {
    use std::io;

    use crate::network::InterfaceName;
    use crate::route::{RouteBackend, RouteChannel};

    /// Routing backend for platforms without a Darwin routing socket.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UnsupportedRouting;

    /// Channel type that can never be constructed.
    #[derive(Debug)]
    pub enum NoChannel {}

    impl RouteChannel for NoChannel {
        fn send(&mut self, _message: &[u8]) -> io::Result<usize> {
            match *self {}
        }

        fn recv(&mut self, _buffer: &mut [u8]) -> io::Result<usize> {
            match *self {}
        }
    }

    impl RouteBackend for UnsupportedRouting {
        type Channel = NoChannel;

        fn open(&self) -> io::Result<NoChannel> {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "routing sockets are not available on this platform",
            ))
        }

        fn interface_index(&self, _name: &InterfaceName) -> Option<u32> {
            None
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::route::{KernelRouteClient, KernelRouteQuery, RouteError, RouteQuery};

        #[test]
        fn open_reports_unsupported() {
            let err = UnsupportedRouting.open().unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        }

        #[test]
        fn query_fails_with_channel_unavailable() {
            let client = KernelRouteClient::new(UnsupportedRouting);
            let destination = crate::network::AddressRecord::from_ip(
                "93.184.216.34".parse().unwrap(),
                crate::network::AddressRole::Destination,
            );

            let err = client
                .query_route(RouteQuery::new(&destination))
                .unwrap_err();

            assert!(matches!(err, RouteError::ChannelUnavailable(_)));
        }
    }
}
