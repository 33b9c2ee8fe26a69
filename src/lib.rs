//! route-source: source address and egress interface selection
//!
//! A library answering "which local address and interface would carry
//! traffic to this destination?", either from the addresses already
//! assigned to local interfaces or by asking the kernel routing table.

pub mod config;
pub mod network;
pub mod route;
