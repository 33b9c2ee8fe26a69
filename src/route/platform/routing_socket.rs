//! Darwin routing socket (`PF_ROUTE`).

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{FromRawFd, OwnedFd};

use nix::net::if_::if_nametoindex;

use crate::network::InterfaceName;
use crate::route::{RouteBackend, RouteChannel};

/// Routing backend opening a fresh `PF_ROUTE` socket per query.
///
/// # Example
///
/// ```no_run
/// use route_source::network::{AddressRecord, AddressRole};
/// use route_source::route::{KernelRouteClient, KernelRouteQuery, RouteQuery, platform::RoutingSocket};
///
/// let client = KernelRouteClient::new(RoutingSocket::new());
/// let destination = AddressRecord::from_ip("1.1.1.1".parse().unwrap(), AddressRole::Destination);
/// let resolution = client.query_route(RouteQuery::new(&destination)).expect("route lookup failed");
/// println!("{resolution}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoutingSocket {
    _private: (),
}

impl RoutingSocket {
    /// Creates a new routing socket backend.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

/// An open routing socket; closed when dropped.
#[derive(Debug)]
pub struct RoutingSocketChannel {
    socket: File,
}

impl RouteBackend for RoutingSocket {
    type Channel = RoutingSocketChannel;

    fn open(&self) -> io::Result<RoutingSocketChannel> {
        // Protocol AF_UNSPEC: receive replies for every address family.
        // SAFETY: plain socket(2) call with constant arguments.
        let fd = unsafe { libc::socket(libc::PF_ROUTE, libc::SOCK_RAW, libc::AF_UNSPEC) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `fd` was just returned by socket(2) and is owned by nothing else.
        let owned = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(RoutingSocketChannel {
            socket: File::from(owned),
        })
    }

    fn interface_index(&self, name: &InterfaceName) -> Option<u32> {
        if_nametoindex(name.as_str()).ok()
    }
}

impl RouteChannel for RoutingSocketChannel {
    fn send(&mut self, message: &[u8]) -> io::Result<usize> {
        self.socket.write(message)
    }

    fn recv(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.socket.read(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{AF_INET6, AF_LINK, AddressRole, SOCKADDR_DL_LEN};
    use crate::route::message::{HEADER_LEN, RTF_IFSCOPE, RTM_GET, RTM_VERSION};

    #[test]
    fn wire_constants_match_system_headers() {
        assert_eq!(std::mem::size_of::<libc::rt_msghdr>(), HEADER_LEN);
        assert_eq!(std::mem::size_of::<libc::sockaddr_dl>(), SOCKADDR_DL_LEN);
        assert_eq!(i32::from(RTM_VERSION), libc::RTM_VERSION);
        assert_eq!(i32::from(RTM_GET), libc::RTM_GET);
        assert_eq!(RTF_IFSCOPE, libc::RTF_IFSCOPE);
        assert_eq!(i32::from(AF_INET6), libc::AF_INET6);
        assert_eq!(i32::from(AF_LINK), libc::AF_LINK);
        assert_eq!(AddressRole::COUNT, libc::RTAX_MAX as usize);
    }

    #[test]
    fn open_and_drop_socket() {
        let channel = RoutingSocket::new()
            .open()
            .expect("socket(PF_ROUTE) failed");
        drop(channel);
    }

    #[test]
    fn loopback_has_an_index() {
        let index = RoutingSocket::new().interface_index(&InterfaceName::new("lo0"));
        assert!(index.is_some_and(|i| i > 0));
    }

    #[test]
    fn unknown_interface_has_no_index() {
        let index = RoutingSocket::new().interface_index(&InterfaceName::new("nosuch9"));
        assert_eq!(index, None);
    }
}
