//! Network layer: address records and the local interface address index.
//!
//! This module provides types and traits for:
//! - Representing kernel socket addresses ([`AddressRecord`], [`AddressFamily`], [`AddressRole`])
//! - Bounded interface names ([`InterfaceName`])
//! - Enumerating interface addresses ([`InterfaceEnumerator`])
//! - Answering address ownership questions ([`InterfaceIndex`])
//! - Platform-specific implementations ([`platform`])

mod address;
mod interfaces;
pub mod platform;


pub use address::{
    AF_INET, AF_INET6, AF_LINK, AddressFamily, AddressRecord, AddressRole, IF_NAMESIZE,
    InterfaceName, SOCKADDR_DL_LEN, SOCKADDR_IN_LEN, SOCKADDR_IN6_LEN, ipv6_record,
};
pub use interfaces::{
    EnumerateError, InterfaceAddress, InterfaceEnumerator, InterfaceIndex, OwningInterface,
    contains_address, find_owner,
};
