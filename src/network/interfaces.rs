//! Local interface address index.
//!
//! Answers "does some interface already hold address X?" from a fresh
//! snapshot of the system's interface address assignments.

use thiserror::Error;

use super::{AddressFamily, AddressRecord, AddressRole, InterfaceName};

/// Error type for interface enumeration.
///
/// Describes what went wrong without dictating recovery strategy.
#[derive(Debug, Error)]
pub enum EnumerateError {
    /// A system call failed.
    #[cfg(unix)]
    #[error("System call failed: {0}")]
    Os(#[from] nix::Error),

    /// No enumeration backend exists for this platform.
    #[error("Interface enumeration is not supported on this platform")]
    Unsupported,

    /// Platform-specific error with a generic message.
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform-specific failure.
        message: String,
    },
}

/// One address assignment on one interface.
///
/// Mirrors a single `ifaddrs` entry: interfaces with several addresses
/// appear once per address, in the order the system reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    /// Interface name (e.g. "en0").
    pub name: InterfaceName,
    /// Assigned address; `None` for entries that carry no address.
    pub address: Option<AddressRecord>,
}

impl InterfaceAddress {
    /// Creates an entry.
    #[must_use]
    pub fn new(name: impl Into<InterfaceName>, address: Option<AddressRecord>) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    fn family(&self) -> Option<AddressFamily> {
        self.address.as_ref().map(AddressRecord::family)
    }

    fn holds(&self, target: &AddressRecord) -> bool {
        !self.name.is_empty()
            && self
                .address
                .as_ref()
                .is_some_and(|address| address.same_scoped_address(target))
    }
}

/// Trait for taking a snapshot of all interface address assignments.
///
/// # Implementation Notes
///
/// - Return every entry; filtering is done by the caller
/// - Any system resource backing the snapshot must be released before
///   returning, on success and on failure
pub trait InterfaceEnumerator: Send + Sync {
    /// Enumerates all local interface address assignments.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerateError`] when the platform call fails.
    fn enumerate(&self) -> Result<Vec<InterfaceAddress>, EnumerateError>;
}

impl<T: InterfaceEnumerator + ?Sized> InterfaceEnumerator for &T {
    fn enumerate(&self) -> Result<Vec<InterfaceAddress>, EnumerateError> {
        (**self).enumerate()
    }
}

/// The interface found to hold an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwningInterface {
    /// Name of the interface holding the address.
    pub name: InterfaceName,
    /// First address of the same family listed for that interface.
    pub primary_address: AddressRecord,
}

/// Finds the interface holding `target` within a snapshot.
///
/// The first entry whose family and address bytes equal the target's wins.
/// When both the entry and the target carry a non-zero scope id, the scopes
/// must match as well.
/// The owner's primary address is the first entry of the same interface
/// and family, which may be the matched entry itself.
#[must_use]
pub fn find_owner(
    entries: &[InterfaceAddress],
    target: &AddressRecord,
    filter: Option<&InterfaceName>,
) -> Option<OwningInterface> {
    let owner = entries
        .iter()
        .filter(|entry| filter.is_none_or(|name| entry.name == *name))
        .find(|entry| entry.holds(target))?;

    let primary = entries
        .iter()
        .find(|entry| entry.name == owner.name && entry.family() == Some(target.family()))
        .and_then(|entry| entry.address.as_ref())?;

    Some(OwningInterface {
        name: owner.name.clone(),
        primary_address: primary.with_role(AddressRole::InterfaceAddress),
    })
}

/// Returns true if any entry (restricted to `filter` when given) holds `address`.
#[must_use]
pub fn contains_address(
    entries: &[InterfaceAddress],
    address: &AddressRecord,
    filter: Option<&InterfaceName>,
) -> bool {
    entries
        .iter()
        .filter(|entry| filter.is_none_or(|name| entry.name == *name))
        .any(|entry| entry.holds(address))
}

/// Interface address lookups, one fresh snapshot per call.
#[derive(Debug, Clone, Default)]
pub struct InterfaceIndex<E> {
    enumerator: E,
}

impl<E: InterfaceEnumerator> InterfaceIndex<E> {
    /// Creates an index over the given enumerator.
    #[must_use]
    pub const fn new(enumerator: E) -> Self {
        Self { enumerator }
    }

    /// Finds the interface that holds `target`, together with its primary address.
    ///
    /// Absence is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerateError`] if the snapshot cannot be taken.
    pub fn find_owning_interface(
        &self,
        target: &AddressRecord,
        filter: Option<&InterfaceName>,
    ) -> Result<Option<OwningInterface>, EnumerateError> {
        let entries = self.enumerator.enumerate()?;
        Ok(find_owner(&entries, target, filter))
    }

    /// Checks whether `address` is assigned to an interface.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerateError`] if the snapshot cannot be taken.
    pub fn address_exists(
        &self,
        address: &AddressRecord,
        filter: Option<&InterfaceName>,
    ) -> Result<bool, EnumerateError> {
        let entries = self.enumerator.enumerate()?;
        Ok(contains_address(&entries, address, filter))
    }

    /// Returns the wrapped enumerator.
    #[must_use]
    pub const fn enumerator(&self) -> &E {
        &self.enumerator
    }
}
