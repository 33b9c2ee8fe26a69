//! Routing message codec (Darwin `rt_msghdr` layout).
//!
//! A routing message is a fixed header followed by the socket addresses
//! whose bits are set in `rtm_addrs`, in slot order. Each address starts
//! with its own length byte and is padded to [`ALIGN`]; a zero length still
//! occupies one alignment unit.
//!
//! ```text
//!  0      2   3   4      6      8        12       16     20     24       28
//! +------+---+---+------+------+--------+--------+------+------+--------+----
//! |msglen|ver|typ|index | pad  | flags  | addrs  | pid  | seq  | errno  | use, inits, metrics ...
//! +------+---+---+------+------+--------+--------+------+------+--------+----
//! ```
//!
//! All header fields are in host byte order.

use std::sync::atomic::{AtomicI32, Ordering};

use crate::network::{AddressRecord, AddressRole, InterfaceName};

use super::DecodeError;

/// `sizeof(struct rt_msghdr)`.
pub const HEADER_LEN: usize = 92;

/// Length, version and type: the prefix every routing message starts with.
pub const PREFIX_LEN: usize = 4;

/// Socket addresses are padded to a multiple of `sizeof(u_int32_t)`.
pub const ALIGN: usize = 4;

/// Reply buffer size: the header plus room for every slot at `sockaddr_in6` size and more.
pub const REPLY_CAPACITY: usize = HEADER_LEN + 512;

/// `RTM_VERSION`
pub const RTM_VERSION: u8 = 5;
/// `RTM_GET`
pub const RTM_GET: u8 = 4;

/// `RTF_UP`
pub const RTF_UP: i32 = 0x1;
/// `RTF_GATEWAY`
pub const RTF_GATEWAY: i32 = 0x2;
/// `RTF_HOST`
pub const RTF_HOST: i32 = 0x4;
/// `RTF_STATIC`
pub const RTF_STATIC: i32 = 0x800;
/// `RTF_IFSCOPE`
pub const RTF_IFSCOPE: i32 = 0x0100_0000;

const OFF_MSGLEN: usize = 0;
const OFF_VERSION: usize = 2;
const OFF_TYPE: usize = 3;
const OFF_INDEX: usize = 4;
const OFF_FLAGS: usize = 8;
const OFF_ADDRS: usize = 12;
const OFF_PID: usize = 16;
const OFF_SEQ: usize = 20;
const OFF_ERRNO: usize = 24;

static NEXT_SEQUENCE: AtomicI32 = AtomicI32::new(1);

/// Returns the next request sequence number for this process.
pub fn next_sequence() -> i32 {
    NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Reads the message type from the common prefix.
///
/// Works for every routing message, including the interface and address
/// notifications whose headers are shorter than [`HEADER_LEN`].
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if fewer than [`PREFIX_LEN`] bytes are given.
pub fn message_kind(bytes: &[u8]) -> Result<u8, DecodeError> {
    if bytes.len() < PREFIX_LEN {
        return Err(DecodeError::Truncated {
            needed: PREFIX_LEN,
            available: bytes.len(),
        });
    }
    Ok(bytes[OFF_TYPE])
}

/// Rounds a socket-address length up to the alignment unit.
///
/// A zero length advances by one full unit so decoding always makes progress.
#[must_use]
pub const fn roundup(len: usize) -> usize {
    if len == 0 {
        ALIGN
    } else {
        (len + ALIGN - 1) & !(ALIGN - 1)
    }
}

/// The fixed part of a routing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteHeader {
    /// Total message length, header included.
    pub msglen: u16,
    /// Protocol version.
    pub version: u8,
    /// Message type.
    pub kind: u8,
    /// Interface index (scope for requests, egress for replies).
    pub index: u16,
    /// `RTF_*` flags.
    pub flags: i32,
    /// Address presence bitmask.
    pub addrs: i32,
    /// Sender process id.
    pub pid: i32,
    /// Sequence number chosen by the sender.
    pub seq: i32,
    /// Kernel error code, zero on success.
    pub errno: i32,
}

impl RouteHeader {
    /// Reads a header from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if fewer than [`HEADER_LEN`] bytes are given.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_LEN {
            return Err(DecodeError::Truncated {
                needed: HEADER_LEN,
                available: bytes.len(),
            });
        }

        Ok(Self {
            msglen: u16::from_ne_bytes([bytes[OFF_MSGLEN], bytes[OFF_MSGLEN + 1]]),
            version: bytes[OFF_VERSION],
            kind: bytes[OFF_TYPE],
            index: u16::from_ne_bytes([bytes[OFF_INDEX], bytes[OFF_INDEX + 1]]),
            flags: read_i32(bytes, OFF_FLAGS),
            addrs: read_i32(bytes, OFF_ADDRS),
            pid: read_i32(bytes, OFF_PID),
            seq: read_i32(bytes, OFF_SEQ),
            errno: read_i32(bytes, OFF_ERRNO),
        })
    }

    /// Writes the header into the first [`HEADER_LEN`] bytes of `buf`.
    ///
    /// Fields not modelled here (use count, metrics) are left untouched.
    pub(crate) fn encode_into(&self, buf: &mut [u8]) {
        buf[OFF_MSGLEN..OFF_MSGLEN + 2].copy_from_slice(&self.msglen.to_ne_bytes());
        buf[OFF_VERSION] = self.version;
        buf[OFF_TYPE] = self.kind;
        buf[OFF_INDEX..OFF_INDEX + 2].copy_from_slice(&self.index.to_ne_bytes());
        buf[OFF_FLAGS..OFF_FLAGS + 4].copy_from_slice(&self.flags.to_ne_bytes());
        buf[OFF_ADDRS..OFF_ADDRS + 4].copy_from_slice(&self.addrs.to_ne_bytes());
        buf[OFF_PID..OFF_PID + 4].copy_from_slice(&self.pid.to_ne_bytes());
        buf[OFF_SEQ..OFF_SEQ + 4].copy_from_slice(&self.seq.to_ne_bytes());
        buf[OFF_ERRNO..OFF_ERRNO + 4].copy_from_slice(&self.errno.to_ne_bytes());
    }

    /// Returns true if the role's presence bit is set.
    #[must_use]
    pub const fn has(&self, role: AddressRole) -> bool {
        self.addrs & role.bit() != 0
    }
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_ne_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// A "get route" request for one destination.
///
/// Built per call and consumed when sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteQuery {
    /// Destination to look up.
    pub destination: AddressRecord,
    /// Restrict the lookup to this interface's routing scope.
    pub scope_interface: Option<InterfaceName>,
    /// Require the reply to name the egress interface.
    pub want_interface_name: bool,
    /// Correlates the reply with this request.
    pub sequence: i32,
}

impl RouteQuery {
    /// Creates a query with a fresh sequence number, asking for the interface name.
    #[must_use]
    pub fn new(destination: &AddressRecord) -> Self {
        Self {
            destination: destination.with_role(AddressRole::Destination),
            scope_interface: None,
            want_interface_name: true,
            sequence: next_sequence(),
        }
    }

    /// Restricts the lookup to one interface.
    #[must_use]
    pub fn with_scope(mut self, interface: Option<InterfaceName>) -> Self {
        self.scope_interface = interface;
        self
    }

    /// Sets whether the reply must identify the egress interface.
    #[must_use]
    pub const fn with_interface_name(mut self, wanted: bool) -> Self {
        self.want_interface_name = wanted;
        self
    }

    /// Encodes the request.
    ///
    /// The message carries the destination followed by an empty link-layer
    /// address asking the kernel for the egress interface identity. When
    /// `scope_index` is given, `RTF_IFSCOPE` is set and the index placed in
    /// the header.
    #[must_use]
    pub fn encode(&self, pid: i32, scope_index: Option<u16>) -> Vec<u8> {
        let destination = self.destination.raw();
        let link = AddressRecord::link_placeholder(AddressRole::InterfacePresence);
        let link_offset = HEADER_LEN + roundup(destination.len());

        let mut buf = vec![0u8; link_offset + link.raw().len()];
        buf[HEADER_LEN..HEADER_LEN + destination.len()].copy_from_slice(destination);
        buf[link_offset..].copy_from_slice(link.raw());

        let mut flags = RTF_STATIC | RTF_UP | RTF_HOST | RTF_GATEWAY;
        if scope_index.is_some() {
            flags |= RTF_IFSCOPE;
        }

        let header = RouteHeader {
            msglen: u16::try_from(buf.len()).unwrap_or(u16::MAX),
            version: RTM_VERSION,
            kind: RTM_GET,
            index: scope_index.unwrap_or(0),
            flags,
            addrs: AddressRole::Destination.bit() | AddressRole::InterfacePresence.bit(),
            pid,
            seq: self.sequence,
            errno: 0,
        };
        header.encode_into(&mut buf);
        buf
    }
}

/// A decoded routing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteReply {
    header: RouteHeader,
    slots: [Option<AddressRecord>; AddressRole::COUNT],
}

impl RouteReply {
    /// Decodes a complete routing message.
    ///
    /// Bytes beyond the declared message length are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the header is short, the version unknown,
    /// or an address runs past the end of the message.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let header = RouteHeader::decode(bytes)?;
        if header.version != RTM_VERSION {
            return Err(DecodeError::UnsupportedVersion(header.version));
        }

        let declared = usize::from(header.msglen);
        if declared < HEADER_LEN {
            return Err(DecodeError::LengthMismatch { declared });
        }
        if declared > bytes.len() {
            return Err(DecodeError::Truncated {
                needed: declared,
                available: bytes.len(),
            });
        }

        let slots = decode_addresses(header.addrs, &bytes[HEADER_LEN..declared])?;
        Ok(Self { header, slots })
    }

    /// The message header.
    #[must_use]
    pub const fn header(&self) -> &RouteHeader {
        &self.header
    }

    /// The address in the given slot, if present.
    #[must_use]
    pub fn address(&self, role: AddressRole) -> Option<&AddressRecord> {
        self.slots[role.slot()].as_ref()
    }

    /// All present addresses in slot order.
    pub fn addresses(&self) -> impl Iterator<Item = &AddressRecord> {
        self.slots.iter().flatten()
    }
}

/// Decodes the socket addresses following a header.
///
/// Walks the slots in increasing order; each slot whose bit is set in
/// `bitmask` consumes the next address at the cursor. Bits beyond the last
/// slot are ignored.
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if a present slot starts at or runs
/// past the end of `body`.
pub fn decode_addresses(
    bitmask: i32,
    body: &[u8],
) -> Result<[Option<AddressRecord>; AddressRole::COUNT], DecodeError> {
    let mut slots: [Option<AddressRecord>; AddressRole::COUNT] = Default::default();
    let mut cursor = 0;

    for role in AddressRole::ALL {
        if bitmask & role.bit() == 0 {
            continue;
        }

        let remaining = &body[cursor..];
        let Some(&declared) = remaining.first() else {
            return Err(DecodeError::Truncated {
                needed: cursor + 1,
                available: body.len(),
            });
        };

        let len = usize::from(declared);
        if len > remaining.len() {
            return Err(DecodeError::Truncated {
                needed: cursor + len,
                available: body.len(),
            });
        }

        slots[role.slot()] = Some(AddressRecord::from_sockaddr_bytes(&remaining[..len], role));
        // The final address may omit its trailing padding.
        cursor += roundup(len).min(remaining.len());
    }

    Ok(slots)
}
