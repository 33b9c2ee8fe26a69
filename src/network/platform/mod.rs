//! Platform-specific interface enumeration.
//!
//! This module provides conditional compilation for platform-specific
//! implementations of the [`InterfaceEnumerator`] trait.
//!
//! # Platform Support
//!
//! - **Unix**: Uses `getifaddrs` via the `nix` crate.
//! - **Other**: Enumeration reports [`EnumerateError::Unsupported`].

#[cfg(unix)]
mod ifaddrs;

#[cfg(unix)]
pub use ifaddrs::SystemInterfaces;

// Re-export platform-specific enumerator as PlatformEnumerator for convenience
#[cfg(unix)]
pub use ifaddrs::SystemInterfaces as PlatformEnumerator;

#[cfg(not(unix))]
pub use unsupported::UnsupportedInterfaces as PlatformEnumerator;

#[cfg(not(unix))]
mod unsupported {
    use crate::network::{EnumerateError, InterfaceAddress, InterfaceEnumerator};

    /// Enumerator for platforms without an interface enumeration backend.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UnsupportedInterfaces;

    impl InterfaceEnumerator for UnsupportedInterfaces {
        fn enumerate(&self) -> Result<Vec<InterfaceAddress>, EnumerateError> {
            Err(EnumerateError::Unsupported)
        }
    }
}
