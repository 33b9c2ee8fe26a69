//! Route resolver combining the local-interface fast path with a kernel query.

use std::fmt;

use crate::network::{
    AddressFamily, AddressRecord, InterfaceEnumerator, InterfaceIndex, InterfaceName,
};

use super::{KernelRouteQuery, Resolution, ResolutionPath, RouteError, RouteQuery};

/// Which destination families may be answered from local interface addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FastPathPolicy {
    /// IPv4 destinations only; IPv6 always goes to the kernel.
    #[default]
    Ipv4Only,
    /// IPv4 and IPv6 destinations.
    AllFamilies,
    /// Always query the kernel.
    Disabled,
}

impl FastPathPolicy {
    /// Returns true if destinations of `family` may use the fast path.
    #[must_use]
    pub const fn allows(self, family: AddressFamily) -> bool {
        match self {
            Self::Ipv4Only => matches!(family, AddressFamily::Ipv4),
            Self::AllFamilies => family.is_inet(),
            Self::Disabled => false,
        }
    }
}

impl fmt::Display for FastPathPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4Only => write!(f, "ipv4"),
            Self::AllFamilies => write!(f, "all"),
            Self::Disabled => write!(f, "off"),
        }
    }
}

/// Answers "which source address and interface would reach this destination?".
///
/// Two independent strategies, tried in order:
///
/// 1. [`RouteResolver::resolve_locally`]: a local interface holds the
///    destination, so that interface and its primary address are the answer.
/// 2. [`KernelRouteQuery::query_route`]: ask the kernel routing table.
///
/// Results are never combined across strategies.
///
/// # Example
///
/// ```no_run
/// use route_source::network::{AddressRecord, AddressRole};
/// use route_source::route::PlatformResolver;
///
/// let resolver = PlatformResolver::platform();
/// let destination = AddressRecord::from_ip("93.184.216.34".parse().unwrap(), AddressRole::Destination);
/// let resolution = resolver.resolve(&destination).expect("no route");
/// println!("{resolution}");
/// ```
#[derive(Debug, Clone)]
pub struct RouteResolver<E, K> {
    interfaces: InterfaceIndex<E>,
    kernel: K,
    policy: FastPathPolicy,
}

impl<E: InterfaceEnumerator, K: KernelRouteQuery> RouteResolver<E, K> {
    /// Creates a resolver with the default fast-path policy.
    #[must_use]
    pub fn new(enumerator: E, kernel: K) -> Self {
        Self {
            interfaces: InterfaceIndex::new(enumerator),
            kernel,
            policy: FastPathPolicy::default(),
        }
    }

    /// Sets the fast-path policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: FastPathPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the configured fast-path policy.
    #[must_use]
    pub const fn policy(&self) -> FastPathPolicy {
        self.policy
    }

    /// Resolves the source address and interface for `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Unresolvable`] carrying the kernel failure when
    /// the fast path misses and the kernel query fails.
    pub fn resolve(&self, destination: &AddressRecord) -> Result<Resolution, RouteError> {
        if let Some(resolution) = self.resolve_locally(destination) {
            return Ok(resolution);
        }

        self.kernel
            .query_route(RouteQuery::new(destination))
            .map_err(|source| RouteError::Unresolvable {
                destination: destination.clone(),
                source: Box::new(source),
            })
    }

    /// The fast path: succeeds only if a local interface holds `destination`.
    ///
    /// An enumeration failure counts as a miss.
    #[must_use]
    pub fn resolve_locally(&self, destination: &AddressRecord) -> Option<Resolution> {
        if !self.policy.allows(destination.family()) {
            tracing::debug!(
                "Fast path skipped for {destination} (policy: {})",
                self.policy
            );
            return None;
        }

        match self.interfaces.find_owning_interface(destination, None) {
            Ok(Some(owner)) => {
                tracing::debug!("{destination} is held by {}", owner.name);
                Some(Resolution {
                    source_address: owner.primary_address,
                    interface_name: Some(owner.name),
                    path: ResolutionPath::FastPath,
                })
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Cannot enumerate interfaces, falling back to kernel query: {e}");
                None
            }
        }
    }

    /// Checks whether `address` is assigned to `interface` (or to any interface).
    ///
    /// An enumeration failure is reported as "not assigned".
    #[must_use]
    pub fn interface_owns(
        &self,
        address: &AddressRecord,
        interface: Option<&InterfaceName>,
    ) -> bool {
        self.interfaces
            .address_exists(address, interface)
            .unwrap_or_else(|e| {
                tracing::warn!("Cannot enumerate interfaces: {e}");
                false
            })
    }

    /// Queries the kernel directly, optionally within one interface's scope.
    ///
    /// # Errors
    ///
    /// Returns the kernel client's [`RouteError`] unchanged.
    pub fn query_kernel_route(
        &self,
        destination: &AddressRecord,
        scope_interface: Option<InterfaceName>,
        want_interface_name: bool,
    ) -> Result<Resolution, RouteError> {
        let query = RouteQuery::new(destination)
            .with_scope(scope_interface)
            .with_interface_name(want_interface_name);
        self.kernel.query_route(query)
    }

    /// Returns the kernel strategy.
    #[must_use]
    pub const fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Returns the interface index.
    #[must_use]
    pub const fn interfaces(&self) -> &InterfaceIndex<E> {
        &self.interfaces
    }
}
