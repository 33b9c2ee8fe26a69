//! Shared test fixtures for route tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::network::{
    AF_LINK, AddressRecord, AddressRole, EnumerateError, InterfaceAddress, InterfaceEnumerator,
    InterfaceName, SOCKADDR_DL_LEN, ipv6_record,
};

use super::message::{HEADER_LEN, RTM_GET, RTM_VERSION, RouteHeader, roundup};
use super::{KernelRouteQuery, Resolution, RouteBackend, RouteChannel, RouteError, RouteQuery};

// ============================================================================
// Address builders
// ============================================================================

pub fn v4(addr: &str, role: AddressRole) -> AddressRecord {
    AddressRecord::from_ip(addr.parse().unwrap(), role)
}

pub fn v6(addr: &str, scope: u32, role: AddressRole) -> AddressRecord {
    ipv6_record(addr.parse().unwrap(), scope, role)
}

/// A `sockaddr_dl` naming an interface, as found in the `RTAX_IFP` slot.
pub fn link(index: u16, name: &str) -> AddressRecord {
    let mut raw = vec![0u8; SOCKADDR_DL_LEN.max(8 + name.len())];
    raw[0] = u8::try_from(raw.len()).unwrap();
    raw[1] = AF_LINK;
    raw[2..4].copy_from_slice(&index.to_ne_bytes());
    raw[5] = u8::try_from(name.len()).unwrap();
    raw[8..8 + name.len()].copy_from_slice(name.as_bytes());
    AddressRecord::from_sockaddr_bytes(&raw, AddressRole::InterfacePresence)
}

// ============================================================================
// Message builders
// ============================================================================

/// Builds a kernel reply carrying the given raw socket addresses in slot order.
pub fn reply_bytes(header: RouteHeader, slots: &[(AddressRole, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    let mut addrs = 0;
    for (role, raw) in slots {
        addrs |= role.bit();
        body.extend_from_slice(raw);
        body.resize(body.len() + roundup(raw.len()) - raw.len(), 0);
    }

    let mut buf = vec![0u8; HEADER_LEN];
    buf.extend_from_slice(&body);
    let header = RouteHeader {
        msglen: u16::try_from(buf.len()).unwrap(),
        addrs,
        ..header
    };
    header.encode_into(&mut buf);
    buf
}

/// Builds a successful `RTM_GET` reply carrying the given records.
pub fn reply(pid: i32, seq: i32, records: &[AddressRecord]) -> Vec<u8> {
    let slots: Vec<(AddressRole, &[u8])> = records.iter().map(|r| (r.role(), r.raw())).collect();
    reply_bytes(reply_header(pid, seq), &slots)
}

pub fn reply_header(pid: i32, seq: i32) -> RouteHeader {
    RouteHeader {
        version: RTM_VERSION,
        kind: RTM_GET,
        pid,
        seq,
        ..RouteHeader::default()
    }
}

/// Typical reply for an off-link IPv4 destination leaving through en0.
pub fn egress_reply_records() -> Vec<AddressRecord> {
    vec![
        v4("93.184.216.34", AddressRole::Destination),
        v4("192.168.1.1", AddressRole::Gateway),
        link(4, "en0"),
        v4("192.168.1.20", AddressRole::InterfaceAddress),
    ]
}

// ============================================================================
// Mock routing backend
// ============================================================================

/// One scripted outcome of a channel read.
pub enum RecvStep {
    /// Reply whose pid and sequence are rewritten to match the last request.
    Answer(Vec<u8>),
    /// Bytes delivered verbatim.
    Raw(Vec<u8>),
    /// A read error of the given kind.
    Fail(io::ErrorKind),
}

/// Shared observation points of a [`MockBackend`].
#[derive(Default)]
pub struct Observations {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub sent: Mutex<Vec<Vec<u8>>>,
}

/// Routing backend replaying a script.
pub struct MockBackend {
    open_error: Option<io::ErrorKind>,
    sends: Mutex<VecDeque<Option<io::ErrorKind>>>,
    recvs: Mutex<VecDeque<RecvStep>>,
    indexes: HashMap<String, u32>,
    pub observed: Arc<Observations>,
}

impl MockBackend {
    pub fn new(recvs: Vec<RecvStep>) -> Self {
        Self {
            open_error: None,
            sends: Mutex::new(VecDeque::new()),
            recvs: Mutex::new(recvs.into()),
            indexes: HashMap::from([("en0".to_string(), 4), ("utun3".to_string(), 12)]),
            observed: Arc::new(Observations::default()),
        }
    }

    /// Backend answering a single query with the given records.
    pub fn answering(records: &[AddressRecord]) -> Self {
        Self::new(vec![RecvStep::Answer(reply(0, 0, records))])
    }

    pub fn failing_open(kind: io::ErrorKind) -> Self {
        Self {
            open_error: Some(kind),
            ..Self::new(vec![])
        }
    }

    /// Scripts the outcomes of successive writes; unscripted writes succeed.
    pub fn with_send_errors(self, errors: Vec<io::ErrorKind>) -> Self {
        *self.sends.lock().unwrap() = errors.into_iter().map(Some).collect();
        self
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.observed.sent.lock().unwrap().clone()
    }
}

impl RouteBackend for MockBackend {
    type Channel = MockChannel;

    fn open(&self) -> io::Result<MockChannel> {
        if let Some(kind) = self.open_error {
            return Err(io::Error::from(kind));
        }
        self.observed.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockChannel {
            sends: std::mem::take(&mut *self.sends.lock().unwrap()),
            recvs: std::mem::take(&mut *self.recvs.lock().unwrap()),
            last_request: None,
            observed: Arc::clone(&self.observed),
        })
    }

    fn interface_index(&self, name: &InterfaceName) -> Option<u32> {
        self.indexes.get(name.as_str()).copied()
    }

    fn process_id(&self) -> i32 {
        4242
    }
}

pub struct MockChannel {
    sends: VecDeque<Option<io::ErrorKind>>,
    recvs: VecDeque<RecvStep>,
    last_request: Option<RouteHeader>,
    observed: Arc<Observations>,
}

impl RouteChannel for MockChannel {
    fn send(&mut self, message: &[u8]) -> io::Result<usize> {
        if let Some(Some(kind)) = self.sends.pop_front() {
            return Err(io::Error::from(kind));
        }
        self.last_request = Some(RouteHeader::decode(message).unwrap());
        self.observed.sent.lock().unwrap().push(message.to_vec());
        Ok(message.len())
    }

    fn recv(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let bytes = match self.recvs.pop_front() {
            None => return Ok(0),
            Some(RecvStep::Fail(kind)) => return Err(io::Error::from(kind)),
            Some(RecvStep::Raw(bytes)) => bytes,
            Some(RecvStep::Answer(bytes)) => {
                let request = self.last_request.unwrap_or_default();
                let mut header = RouteHeader::decode(&bytes).unwrap();
                header.pid = request.pid;
                header.seq = request.seq;
                let mut bytes = bytes;
                header.encode_into(&mut bytes);
                bytes
            }
        };
        let n = bytes.len().min(buffer.len());
        buffer[..n].copy_from_slice(&bytes[..n]);
        Ok(n)
    }
}

impl Drop for MockChannel {
    fn drop(&mut self) {
        self.observed.closed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock strategies for the resolver
// ============================================================================

/// Enumerator returning a fixed snapshot.
pub struct StaticInterfaces {
    entries: Option<Vec<InterfaceAddress>>,
    pub calls: AtomicUsize,
}

impl StaticInterfaces {
    pub fn new(entries: Vec<(&str, AddressRecord)>) -> Self {
        Self {
            entries: Some(
                entries
                    .into_iter()
                    .map(|(name, address)| InterfaceAddress::new(name, Some(address)))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            entries: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl InterfaceEnumerator for StaticInterfaces {
    fn enumerate(&self) -> Result<Vec<InterfaceAddress>, EnumerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entries.clone().ok_or_else(|| EnumerateError::Platform {
            message: "enumeration failed".to_string(),
        })
    }
}

/// Kernel query stand-in recording the queries it receives.
pub struct ScriptedKernel {
    answer: Option<Resolution>,
    pub queries: Mutex<Vec<RouteQuery>>,
}

impl ScriptedKernel {
    pub fn answering(answer: Resolution) -> Self {
        Self {
            answer: Some(answer),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl KernelRouteQuery for ScriptedKernel {
    fn query_route(&self, query: RouteQuery) -> Result<Resolution, RouteError> {
        self.queries.lock().unwrap().push(query);
        self.answer.clone().ok_or(RouteError::IncompleteReply {
            missing: AddressRole::InterfaceAddress,
        })
    }
}

/// Kernel query that fails the test when invoked.
pub struct UnreachableKernel;

impl KernelRouteQuery for UnreachableKernel {
    fn query_route(&self, query: RouteQuery) -> Result<Resolution, RouteError> {
        panic!("kernel query invoked for {}", query.destination);
    }
}
