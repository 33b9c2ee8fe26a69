//! Typed socket-address records as carried by routing messages.
//!
//! Addresses are kept in their native BSD socket-address encoding
//! (`sa_len`-prefixed), so a record copied out of a kernel reply can be
//! handed back to the kernel byte-for-byte.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddrV6};

use serde::{Serialize, Serializer};

/// `AF_INET` as encoded in `sa_family`.
pub const AF_INET: u8 = 2;
/// `AF_INET6` as encoded in `sa_family` (Darwin value).
pub const AF_INET6: u8 = 30;
/// `AF_LINK` as encoded in `sa_family` (Darwin value).
pub const AF_LINK: u8 = 18;

/// `sizeof(struct sockaddr_in)`.
pub const SOCKADDR_IN_LEN: usize = 16;
/// `sizeof(struct sockaddr_in6)`.
pub const SOCKADDR_IN6_LEN: usize = 28;
/// `sizeof(struct sockaddr_dl)`.
pub const SOCKADDR_DL_LEN: usize = 20;

/// Kernel interface-name buffer size, including the terminating NUL.
pub const IF_NAMESIZE: usize = 16;

const IN_ADDR_OFFSET: usize = 4;
const IN6_ADDR_OFFSET: usize = 8;
const IN6_SCOPE_OFFSET: usize = 24;
const DL_INDEX_OFFSET: usize = 2;
const DL_NLEN_OFFSET: usize = 5;
const DL_DATA_OFFSET: usize = 8;

/// Address family of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// `sockaddr_in`.
    Ipv4,
    /// `sockaddr_in6`.
    Ipv6,
    /// `sockaddr_dl`, identifies an interface.
    Link,
    /// Any other family, or a known family whose encoding is too short to
    /// carry the address (kernel-form netmasks are the usual case).
    Other(u8),
}

impl AddressFamily {
    /// Classifies a slot from its `sa_family` byte and declared length.
    #[must_use]
    pub const fn classify(code: u8, len: usize) -> Self {
        match code {
            AF_INET if len >= IN_ADDR_OFFSET + 4 => Self::Ipv4,
            AF_INET6 if len >= SOCKADDR_IN6_LEN => Self::Ipv6,
            AF_LINK if len >= DL_DATA_OFFSET => Self::Link,
            other => Self::Other(other),
        }
    }

    /// Returns true for the two internet families.
    #[must_use]
    pub const fn is_inet(self) -> bool {
        matches!(self, Self::Ipv4 | Self::Ipv6)
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4 => write!(f, "IPv4"),
            Self::Ipv6 => write!(f, "IPv6"),
            Self::Link => write!(f, "link"),
            Self::Other(code) => write!(f, "family {code}"),
        }
    }
}

/// Slot a record occupies in a routing message, in kernel order.
///
/// The discriminant is the slot index (`RTAX_*`); the presence bit is
/// `1 << index` (`RTA_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressRole {
    /// `RTAX_DST`
    Destination = 0,
    /// `RTAX_GATEWAY`
    Gateway = 1,
    /// `RTAX_NETMASK`
    Netmask = 2,
    /// `RTAX_GENMASK`
    Genmask = 3,
    /// `RTAX_IFP`: link-layer identity of the egress interface.
    InterfacePresence = 4,
    /// `RTAX_IFA`: address of the egress interface.
    InterfaceAddress = 5,
    /// `RTAX_AUTHOR`
    Author = 6,
    /// `RTAX_BRD`
    Broadcast = 7,
}

impl AddressRole {
    /// Number of address slots (`RTAX_MAX`).
    pub const COUNT: usize = 8;

    /// All roles in slot order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Destination,
        Self::Gateway,
        Self::Netmask,
        Self::Genmask,
        Self::InterfacePresence,
        Self::InterfaceAddress,
        Self::Author,
        Self::Broadcast,
    ];

    /// Slot index.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Presence bit in the address bitmask.
    #[must_use]
    pub const fn bit(self) -> i32 {
        1 << (self as i32)
    }

    /// Returns the role for a slot index.
    #[must_use]
    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Destination => "destination",
            Self::Gateway => "gateway",
            Self::Netmask => "netmask",
            Self::Genmask => "genmask",
            Self::InterfacePresence => "interface identity",
            Self::InterfaceAddress => "interface address",
            Self::Author => "author",
            Self::Broadcast => "broadcast",
        };
        f.write_str(name)
    }
}

/// An interface name bounded to what the kernel accepts.
///
/// Longer input is truncated to `IF_NAMESIZE - 1` bytes on a character
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceName(String);

impl InterfaceName {
    /// Maximum name length in bytes.
    pub const MAX_LEN: usize = IF_NAMESIZE - 1;

    /// Creates a bounded interface name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut end = name.len().min(Self::MAX_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        Self(name[..end].to_string())
    }

    /// Creates a name from a C-style buffer, stopping at the first NUL.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Self::new(&String::from_utf8_lossy(&bytes[..end]))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the name is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for InterfaceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for InterfaceName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// An immutable socket address tagged with the slot it occupies.
///
/// # Invariant
///
/// `raw` is a complete socket-address encoding whose first byte is its
/// length and second byte its family; for [`AddressFamily::Ipv4`],
/// [`AddressFamily::Ipv6`] and [`AddressFamily::Link`] the encoding is
/// long enough to hold every field the accessors read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressRecord {
    family: AddressFamily,
    role: AddressRole,
    raw: Box<[u8]>,
}

impl AddressRecord {
    /// Encodes an IP address as a `sockaddr_in` / `sockaddr_in6` with port 0.
    #[must_use]
    pub fn from_ip(ip: IpAddr, role: AddressRole) -> Self {
        match ip {
            IpAddr::V4(v4) => Self::from_ipv4(v4, role),
            IpAddr::V6(v6) => Self::from_socket_v6(SocketAddrV6::new(v6, 0, 0, 0), role),
        }
    }

    fn from_ipv4(ip: Ipv4Addr, role: AddressRole) -> Self {
        let mut raw = vec![0u8; SOCKADDR_IN_LEN];
        raw[0] = SOCKADDR_IN_LEN as u8;
        raw[1] = AF_INET;
        raw[IN_ADDR_OFFSET..IN_ADDR_OFFSET + 4].copy_from_slice(&ip.octets());
        Self {
            family: AddressFamily::Ipv4,
            role,
            raw: raw.into_boxed_slice(),
        }
    }

    /// Encodes an IPv6 socket address, keeping its scope id.
    #[must_use]
    pub fn from_socket_v6(addr: SocketAddrV6, role: AddressRole) -> Self {
        let mut raw = vec![0u8; SOCKADDR_IN6_LEN];
        raw[0] = SOCKADDR_IN6_LEN as u8;
        raw[1] = AF_INET6;
        raw[2..4].copy_from_slice(&addr.port().to_be_bytes());
        raw[4..8].copy_from_slice(&addr.flowinfo().to_be_bytes());
        raw[IN6_ADDR_OFFSET..IN6_ADDR_OFFSET + 16].copy_from_slice(&addr.ip().octets());
        raw[IN6_SCOPE_OFFSET..IN6_SCOPE_OFFSET + 4].copy_from_slice(&addr.scope_id().to_ne_bytes());
        Self {
            family: AddressFamily::Ipv6,
            role,
            raw: raw.into_boxed_slice(),
        }
    }

    /// An empty `sockaddr_dl`, used in requests to ask for the interface identity.
    #[must_use]
    pub fn link_placeholder(role: AddressRole) -> Self {
        let mut raw = vec![0u8; SOCKADDR_DL_LEN];
        raw[0] = SOCKADDR_DL_LEN as u8;
        raw[1] = AF_LINK;
        Self {
            family: AddressFamily::Link,
            role,
            raw: raw.into_boxed_slice(),
        }
    }

    /// Copies a socket address out of a buffer.
    ///
    /// `bytes` must hold exactly the declared length of the structure; an
    /// empty slice yields an [`AddressFamily::Other`] record.
    #[must_use]
    pub fn from_sockaddr_bytes(bytes: &[u8], role: AddressRole) -> Self {
        let code = bytes.get(1).copied().unwrap_or(0);
        Self {
            family: AddressFamily::classify(code, bytes.len()),
            role,
            raw: bytes.into(),
        }
    }

    /// Returns a copy of this record occupying a different slot.
    #[must_use]
    pub fn with_role(&self, role: AddressRole) -> Self {
        Self {
            family: self.family,
            role,
            raw: self.raw.clone(),
        }
    }

    /// Family of the encoded address.
    #[must_use]
    pub const fn family(&self) -> AddressFamily {
        self.family
    }

    /// Slot this record occupies.
    #[must_use]
    pub const fn role(&self) -> AddressRole {
        self.role
    }

    /// Native socket-address encoding.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Bytes of the network address itself (`sin_addr` / `sin6_addr`).
    #[must_use]
    pub fn address_bytes(&self) -> Option<&[u8]> {
        match self.family {
            AddressFamily::Ipv4 => Some(&self.raw[IN_ADDR_OFFSET..IN_ADDR_OFFSET + 4]),
            AddressFamily::Ipv6 => Some(&self.raw[IN6_ADDR_OFFSET..IN6_ADDR_OFFSET + 16]),
            AddressFamily::Link | AddressFamily::Other(_) => None,
        }
    }

    /// The IP address, for internet families.
    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        let bytes = self.address_bytes()?;
        match self.family {
            AddressFamily::Ipv4 => <[u8; 4]>::try_from(bytes).ok().map(IpAddr::from),
            AddressFamily::Ipv6 => <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from),
            AddressFamily::Link | AddressFamily::Other(_) => None,
        }
    }

    /// `sin6_scope_id`, for IPv6 records.
    #[must_use]
    pub fn scope_id(&self) -> Option<u32> {
        if self.family != AddressFamily::Ipv6 {
            return None;
        }
        let bytes = self.raw.get(IN6_SCOPE_OFFSET..IN6_SCOPE_OFFSET + 4)?;
        bytes.try_into().ok().map(u32::from_ne_bytes)
    }

    /// `sdl_index`, for link-layer records.
    #[must_use]
    pub fn link_index(&self) -> Option<u16> {
        if self.family != AddressFamily::Link {
            return None;
        }
        let bytes = self.raw.get(DL_INDEX_OFFSET..DL_INDEX_OFFSET + 2)?;
        bytes.try_into().ok().map(u16::from_ne_bytes)
    }

    /// Interface name carried in `sdl_data`, for link-layer records.
    ///
    /// Returns `None` when the record names no interface.
    #[must_use]
    pub fn link_name(&self) -> Option<InterfaceName> {
        if self.family != AddressFamily::Link {
            return None;
        }
        let nlen = usize::from(self.raw[DL_NLEN_OFFSET]);
        let end = (DL_DATA_OFFSET + nlen).min(self.raw.len());
        let name = InterfaceName::from_bytes(&self.raw[DL_DATA_OFFSET..end]);
        (!name.is_empty()).then_some(name)
    }

    /// Interface index the kernel embedded in a link-local IPv6 address.
    ///
    /// KAME-derived stacks store the scope of `fe80::/10` addresses in the
    /// second 16-bit group of the address (network byte order). Returns
    /// `None` for other records and when no index is embedded.
    #[must_use]
    pub fn embedded_scope(&self) -> Option<u16> {
        if self.family != AddressFamily::Ipv6 {
            return None;
        }
        let addr = &self.raw[IN6_ADDR_OFFSET..IN6_ADDR_OFFSET + 16];
        let link_local = addr[0] == 0xfe && addr[1] & 0xc0 == 0x80;
        let index = u16::from_be_bytes([addr[2], addr[3]]);
        (link_local && index != 0).then_some(index)
    }

    /// Returns a copy with any embedded link-local scope moved into `sin6_scope_id`.
    ///
    /// The embedded index is always cleared from the address bytes; the
    /// explicit scope id is only filled in when it was zero.
    #[must_use]
    pub fn normalize_embedded_scope(&self) -> Self {
        let Some(index) = self.embedded_scope() else {
            return self.clone();
        };

        let mut raw = self.raw.clone();
        raw[IN6_ADDR_OFFSET + 2] = 0;
        raw[IN6_ADDR_OFFSET + 3] = 0;
        if self.scope_id() == Some(0) {
            raw[IN6_SCOPE_OFFSET..IN6_SCOPE_OFFSET + 4]
                .copy_from_slice(&u32::from(index).to_ne_bytes());
        }

        Self {
            family: self.family,
            role: self.role,
            raw,
        }
    }

    /// Returns true if both records carry the same family and network address.
    ///
    /// Ports, flow labels and scope ids are ignored.
    #[must_use]
    pub fn same_address(&self, other: &Self) -> bool {
        self.family == other.family
            && self.address_bytes().is_some()
            && self.address_bytes() == other.address_bytes()
    }

    /// Like [`same_address`](Self::same_address), but two non-zero scope ids
    /// must also agree.
    ///
    /// A zero scope id on either side matches any scope.
    #[must_use]
    pub fn same_scoped_address(&self, other: &Self) -> bool {
        let scopes_agree = match (self.scope_id(), other.scope_id()) {
            (Some(ours), Some(theirs)) if ours != 0 && theirs != 0 => ours == theirs,
            _ => true,
        };
        scopes_agree && self.same_address(other)
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.family, self.ip()) {
            (AddressFamily::Ipv6, Some(ip)) => match self.scope_id() {
                Some(scope) if scope != 0 => write!(f, "{ip}%{scope}"),
                _ => write!(f, "{ip}"),
            },
            (_, Some(ip)) => write!(f, "{ip}"),
            (AddressFamily::Link, None) => {
                write!(f, "link#{}", self.link_index().unwrap_or(0))?;
                if let Some(name) = self.link_name() {
                    write!(f, " ({name})")?;
                }
                Ok(())
            }
            (family, None) => write!(f, "<{family}, {} bytes>", self.raw.len()),
        }
    }
}

/// Convenience for building a link-local IPv6 record from its parts.
#[must_use]
pub fn ipv6_record(ip: Ipv6Addr, scope_id: u32, role: AddressRole) -> AddressRecord {
    AddressRecord::from_socket_v6(SocketAddrV6::new(ip, 0, 0, scope_id), role)
}
