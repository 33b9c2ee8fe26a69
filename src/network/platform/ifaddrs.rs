//! Unix interface enumeration using `getifaddrs`.

use std::net::{SocketAddrV4, SocketAddrV6};

use nix::ifaddrs::getifaddrs;
use nix::sys::socket::SockaddrStorage;

use crate::network::{
    AddressRecord, AddressRole, EnumerateError, InterfaceAddress, InterfaceEnumerator,
};

/// Unix implementation of [`InterfaceEnumerator`] using `getifaddrs`.
///
/// Only internet addresses are reported; link-layer and other entries are
/// kept with `address: None` so interface order is preserved.
///
/// # Example
///
/// ```no_run
/// use route_source::network::{InterfaceEnumerator, platform::SystemInterfaces};
///
/// let interfaces = SystemInterfaces::new();
/// for entry in interfaces.enumerate().expect("getifaddrs failed") {
///     println!("{}: {:?}", entry.name, entry.address.map(|a| a.to_string()));
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemInterfaces {
    _private: (),
}

impl SystemInterfaces {
    /// Creates a new system interface enumerator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl InterfaceEnumerator for SystemInterfaces {
    fn enumerate(&self) -> Result<Vec<InterfaceAddress>, EnumerateError> {
        // The iterator owns the ifaddrs list and frees it when dropped.
        let entries = getifaddrs()?
            .map(|ifa| {
                let address = ifa.address.as_ref().and_then(convert_address);
                InterfaceAddress::new(ifa.interface_name.as_str(), address)
            })
            .collect();
        Ok(entries)
    }
}

/// Converts an `ifaddrs` socket address into a record.
///
/// IPv6 link-local addresses come back from some kernels with the scope
/// embedded in the address bytes; those are normalized so they compare
/// equal to the form callers write.
fn convert_address(storage: &SockaddrStorage) -> Option<AddressRecord> {
    if let Some(sin) = storage.as_sockaddr_in() {
        let addr = SocketAddrV4::from(*sin);
        return Some(AddressRecord::from_ip(
            (*addr.ip()).into(),
            AddressRole::InterfaceAddress,
        ));
    }
    if let Some(sin6) = storage.as_sockaddr_in6() {
        let addr = SocketAddrV6::from(*sin6);
        let record = AddressRecord::from_socket_v6(addr, AddressRole::InterfaceAddress);
        return Some(record.normalize_embedded_scope());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn system_interfaces_new_creates_instance() {
        let _interfaces = SystemInterfaces::new();
    }

    // Integration test: enumerates the real system interfaces
    #[test]
    fn enumerate_reports_loopback() {
        let entries = SystemInterfaces::new()
            .enumerate()
            .expect("getifaddrs failed");

        let has_loopback = entries.iter().any(|entry| {
            entry.address.as_ref().and_then(AddressRecord::ip)
                == Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        });

        assert!(
            has_loopback,
            "Expected 127.0.0.1 on some interface, got: {entries:?}"
        );
    }

    #[test]
    fn enumerate_names_are_not_empty() {
        let entries = SystemInterfaces::new()
            .enumerate()
            .expect("getifaddrs failed");

        for entry in &entries {
            assert!(!entry.name.is_empty(), "Empty interface name: {entry:?}");
        }
    }
}
