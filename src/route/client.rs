//! Kernel route query client.
//!
//! One query is one channel: open, send the request, read until the reply
//! carrying our pid and sequence arrives, decode, close.

use std::io;

use crate::network::{AddressRole, InterfaceName};

use super::message::{REPLY_CAPACITY, RTM_GET, RouteHeader, RouteQuery, RouteReply, message_kind};
use super::{Resolution, ResolutionPath, RouteBackend, RouteChannel, RouteError};

/// Trait for the kernel-query resolution strategy.
///
/// Implemented by [`KernelRouteClient`]; the resolver depends only on this
/// trait so the strategy can be replaced in tests.
pub trait KernelRouteQuery: Send + Sync {
    /// Asks the kernel which source address and interface reach `query.destination`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the channel fails or the reply is unusable.
    fn query_route(&self, query: RouteQuery) -> Result<Resolution, RouteError>;
}

/// Routing-socket client for "get route" requests.
#[derive(Debug, Clone, Default)]
pub struct KernelRouteClient<B> {
    backend: B,
}

impl<B: RouteBackend> KernelRouteClient<B> {
    /// Creates a client over the given backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the wrapped backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn scope_index(&self, name: &InterfaceName) -> Result<u16, RouteError> {
        self.backend
            .interface_index(name)
            .filter(|&index| index != 0)
            .and_then(|index| u16::try_from(index).ok())
            .ok_or_else(|| RouteError::UnknownInterface { name: name.clone() })
    }

    /// Sends the query and returns the matching decoded reply.
    ///
    /// The channel is dropped, and thereby closed, on every return path.
    fn exchange(&self, query: &RouteQuery) -> Result<RouteReply, RouteError> {
        let scope_index = query
            .scope_interface
            .as_ref()
            .map(|name| self.scope_index(name))
            .transpose()?;

        let pid = self.backend.process_id();
        let request = query.encode(pid, scope_index);

        let mut channel = self
            .backend
            .open()
            .map_err(RouteError::ChannelUnavailable)?;
        send_request(&mut channel, &request)?;
        receive_reply(&mut channel, pid, query.sequence)
    }
}

impl<B: RouteBackend> KernelRouteQuery for KernelRouteClient<B> {
    fn query_route(&self, query: RouteQuery) -> Result<Resolution, RouteError> {
        tracing::debug!(
            "Querying kernel route to {} (seq {})",
            query.destination,
            query.sequence
        );
        let reply = self.exchange(&query)?;
        extract_resolution(&reply, query.want_interface_name)
    }
}

/// Writes the whole request, retrying interrupted writes.
fn send_request<C: RouteChannel>(channel: &mut C, request: &[u8]) -> Result<(), RouteError> {
    loop {
        match channel.send(request) {
            Ok(written) if written == request.len() => return Ok(()),
            Ok(_) => {
                return Err(RouteError::RequestFailed(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "routing message partially written",
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(RouteError::RequestFailed(e)),
        }
    }
}

/// Reads messages until the reply to `(pid, seq)` arrives.
///
/// The routing channel also carries messages for other processes and
/// unsolicited kernel notifications; those are skipped.
fn receive_reply<C: RouteChannel>(
    channel: &mut C,
    pid: i32,
    seq: i32,
) -> Result<RouteReply, RouteError> {
    let mut buffer = [0u8; REPLY_CAPACITY];
    loop {
        let len = read_message(channel, &mut buffer)?;
        let message = &buffer[..len];

        let kind = message_kind(message)?;
        if kind != RTM_GET {
            tracing::trace!("Skipping routing message type {kind}");
            continue;
        }

        let header = RouteHeader::decode(message)?;
        if header.pid != pid || header.seq != seq {
            tracing::trace!("Skipping reply to pid {} (seq {})", header.pid, header.seq);
            continue;
        }

        if header.errno != 0 {
            let error = io::Error::from_raw_os_error(header.errno);
            return Err(RouteError::Kernel(error));
        }

        return Ok(RouteReply::decode(message)?);
    }
}

/// Reads one message, retrying interrupted reads.
fn read_message<C: RouteChannel>(channel: &mut C, buffer: &mut [u8]) -> Result<usize, RouteError> {
    loop {
        match channel.recv(buffer) {
            Ok(0) => {
                return Err(RouteError::ReplyFailed(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "routing channel closed before the reply arrived",
                )));
            }
            Ok(len) => return Ok(len),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(RouteError::ReplyFailed(e)),
        }
    }
}

/// Builds the result from a decoded reply.
///
/// The interface address is required; the interface identity is required
/// only when the name was asked for. Link-local IPv6 sources are returned
/// with their scope moved out of the address bytes.
///
/// # Errors
///
/// Returns [`RouteError::IncompleteReply`] naming the first missing slot.
pub fn extract_resolution(
    reply: &RouteReply,
    want_interface_name: bool,
) -> Result<Resolution, RouteError> {
    let source = reply
        .address(AddressRole::InterfaceAddress)
        .filter(|record| record.family().is_inet())
        .ok_or(RouteError::IncompleteReply {
            missing: AddressRole::InterfaceAddress,
        })?;

    let interface_name = if want_interface_name {
        let name = reply
            .address(AddressRole::InterfacePresence)
            .and_then(|record| record.link_name())
            .ok_or(RouteError::IncompleteReply {
                missing: AddressRole::InterfacePresence,
            })?;
        Some(name)
    } else {
        None
    };

    Ok(Resolution {
        source_address: source.normalize_embedded_scope(),
        interface_name,
        path: ResolutionPath::Kernel,
    })
}
