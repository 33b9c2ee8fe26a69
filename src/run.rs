//! Command execution.
//!
//! Turns a parsed subcommand into a resolver call and prints the result
//! in the configured format.

use std::io::{self, Write};
use std::net::{AddrParseError, IpAddr};

use serde::Serialize;
use thiserror::Error;

use route_source::config::{Command, OutputFormat};
use route_source::network::{
    AddressRecord, AddressRole, InterfaceEnumerator, InterfaceName, ipv6_record,
};
use route_source::route::{
    KernelRouteQuery, Resolution, ResolutionPath, RouteError, RouteResolver,
};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The address argument could not be parsed.
    #[error("Invalid address '{value}': {reason}")]
    InvalidAddress {
        /// The argument as given
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Route resolution failed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Failed to serialize a result.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// Failed to write a result.
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// What a command reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report beyond success.
    Done,
    /// The address is assigned to a matching interface.
    Found,
    /// The address is not assigned to any matching interface.
    NotFound,
}

/// A validated command ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    Resolve {
        destination: AddressRecord,
    },
    Query {
        destination: AddressRecord,
        scope: Option<InterfaceName>,
        want_interface_name: bool,
    },
    Owns {
        address: AddressRecord,
        interface: Option<InterfaceName>,
    },
}

impl Request {
    /// Parses the command's arguments; `None` for commands that do not resolve anything.
    fn from_command(command: &Command) -> Result<Option<Self>, RunError> {
        let request = match command {
            Command::Resolve { destination } => Self::Resolve {
                destination: parse_address(destination, AddressRole::Destination)?,
            },
            Command::Query {
                destination,
                scope,
                no_interface_name,
            } => Self::Query {
                destination: parse_address(destination, AddressRole::Destination)?,
                scope: scope.as_deref().map(InterfaceName::new),
                want_interface_name: !no_interface_name,
            },
            Command::Owns { address, interface } => Self::Owns {
                address: parse_address(address, AddressRole::InterfaceAddress)?,
                interface: interface.as_deref().map(InterfaceName::new),
            },
            Command::Init { .. } => return Ok(None),
        };
        Ok(Some(request))
    }
}

/// Resolution result as printed in JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Destination as given (with scope, if any)
    pub destination: String,
    /// Source address, without scope
    pub source: String,
    /// Scope of a link-local source address
    pub scope_id: Option<u32>,
    /// Egress interface, when known
    pub interface: Option<InterfaceName>,
    /// Strategy that produced the result
    pub path: ResolutionPath,
}

impl ResolutionReport {
    /// Builds the report for one resolution.
    #[must_use]
    pub fn new(destination: &AddressRecord, resolution: &Resolution) -> Self {
        let source = &resolution.source_address;
        Self {
            destination: destination.to_string(),
            source: source
                .ip()
                .map_or_else(|| source.to_string(), |ip| ip.to_string()),
            scope_id: source.scope_id().filter(|&scope| scope != 0),
            interface: resolution.interface_name.clone(),
            path: resolution.path,
        }
    }
}

/// Ownership check result as printed in JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipReport {
    /// Address looked for
    pub address: String,
    /// Interface the search was restricted to
    pub interface: Option<InterfaceName>,
    /// Whether the address is assigned
    pub owned: bool,
}

/// Executes one command and writes its result to `out`.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, resolution fails, or the
/// result cannot be written.
pub fn execute<E, K, W>(
    resolver: &RouteResolver<E, K>,
    command: &Command,
    format: OutputFormat,
    out: &mut W,
) -> Result<Outcome, RunError>
where
    E: InterfaceEnumerator,
    K: KernelRouteQuery,
    W: Write,
{
    let Some(request) = Request::from_command(command)? else {
        return Ok(Outcome::Done);
    };

    match request {
        Request::Resolve { destination } => {
            let resolution = resolver.resolve(&destination)?;
            write_resolution(out, format, &destination, &resolution)?;
            Ok(Outcome::Done)
        }
        Request::Query {
            destination,
            scope,
            want_interface_name,
        } => {
            let resolution =
                resolver.query_kernel_route(&destination, scope, want_interface_name)?;
            write_resolution(out, format, &destination, &resolution)?;
            Ok(Outcome::Done)
        }
        Request::Owns { address, interface } => {
            let owned = resolver.interface_owns(&address, interface.as_ref());
            write_ownership(out, format, &address, interface, owned)?;
            Ok(if owned {
                Outcome::Found
            } else {
                Outcome::NotFound
            })
        }
    }
}

fn write_resolution<W: Write>(
    out: &mut W,
    format: OutputFormat,
    destination: &AddressRecord,
    resolution: &Resolution,
) -> Result<(), RunError> {
    match format {
        OutputFormat::Text => writeln!(out, "{resolution}")?,
        OutputFormat::Json => {
            let report = ResolutionReport::new(destination, resolution);
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        }
    }
    Ok(())
}

fn write_ownership<W: Write>(
    out: &mut W,
    format: OutputFormat,
    address: &AddressRecord,
    interface: Option<InterfaceName>,
    owned: bool,
) -> Result<(), RunError> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", if owned { "yes" } else { "no" })?,
        OutputFormat::Json => {
            let report = OwnershipReport {
                address: address.to_string(),
                interface,
                owned,
            };
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        }
    }
    Ok(())
}

/// Parses `ADDR` or, for IPv6, `ADDR%SCOPE` with a numeric scope.
fn parse_address(value: &str, role: AddressRole) -> Result<AddressRecord, RunError> {
    let invalid = |reason: String| RunError::InvalidAddress {
        value: value.to_string(),
        reason,
    };

    let (ip_part, scope_part) = match value.split_once('%') {
        Some((ip, scope)) => (ip, Some(scope)),
        None => (value, None),
    };
    let ip: IpAddr = ip_part
        .parse()
        .map_err(|e: AddrParseError| invalid(e.to_string()))?;

    match (ip, scope_part) {
        (ip, None) => Ok(AddressRecord::from_ip(ip, role)),
        (IpAddr::V6(v6), Some(scope)) => {
            let scope_id = scope
                .parse::<u32>()
                .map_err(|_| invalid("scope must be a numeric interface index".to_string()))?;
            Ok(ipv6_record(v6, scope_id, role))
        }
        (IpAddr::V4(_), Some(_)) => Err(invalid("only IPv6 addresses carry a scope".to_string())),
    }
}
