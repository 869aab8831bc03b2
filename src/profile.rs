//! Resolver profiles.

use crate::address::ResolverAddress;
use std::time::SystemTime;

/// Whether a profile ships with the crate or was created by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Immutable built-in catalog entry.
    Predefined,
    /// User-created, mutable name and address list.
    Custom,
}

/// A named group of resolver addresses that can be made active.
///
/// Profiles are caller-owned data: this crate never persists them, and
/// "which profile is active" lives wherever the caller keeps it. On a
/// successful [`apply`](crate::DnsSwitcher::apply) the caller commits the
/// applied profile's [`id`](Self::id) as the new active state.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Opaque stable identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Built-in or user-created.
    pub kind: ProfileKind,

    /// One or more resolver endpoints, in preference order.
    pub addresses: Vec<ResolverAddress>,

    /// Last modification time. Only meaningful for custom profiles.
    pub modified: Option<SystemTime>,
}

impl Profile {
    /// Creates a built-in catalog profile.
    #[must_use]
    pub fn predefined(
        id: impl Into<String>,
        name: impl Into<String>,
        addresses: Vec<ResolverAddress>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ProfileKind::Predefined,
            addresses,
            modified: None,
        }
    }

    /// Creates a user-defined profile stamped with the current time.
    #[must_use]
    pub fn custom(
        id: impl Into<String>,
        name: impl Into<String>,
        addresses: Vec<ResolverAddress>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ProfileKind::Custom,
            addresses,
            modified: Some(SystemTime::now()),
        }
    }

    /// Returns the host to ping when measuring this profile's latency.
    ///
    /// Probing uses raw reachability, not the DNS service port, so the
    /// first configured address is taken with any port stripped. `None`
    /// if the profile has no addresses.
    #[must_use]
    pub fn probe_target(&self) -> Option<&str> {
        self.addresses.first().map(ResolverAddress::host_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_has_no_timestamp() {
        let p = Profile::predefined("x", "X", vec![ResolverAddress::new("1.1.1.1")]);
        assert_eq!(p.kind, ProfileKind::Predefined);
        assert!(p.modified.is_none());
    }

    #[test]
    fn custom_is_stamped() {
        let p = Profile::custom("y", "Y", vec![ResolverAddress::new("1.1.1.1")]);
        assert_eq!(p.kind, ProfileKind::Custom);
        assert!(p.modified.is_some());
    }

    #[test]
    fn probe_target_strips_port() {
        let p = Profile::custom("z", "Z", vec![ResolverAddress::with_port("127.0.0.1", 5353)]);
        assert_eq!(p.probe_target(), Some("127.0.0.1"));
    }

    #[test]
    fn probe_target_empty_profile() {
        let p = Profile::custom("z", "Z", vec![]);
        assert_eq!(p.probe_target(), None);
    }
}
