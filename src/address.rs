//! Resolver endpoint parsing and formatting.

use std::fmt;

/// Standard DNS port. Addresses carrying this port explicitly behave
/// exactly like addresses with no port at all.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// A single resolver endpoint: an IPv4/IPv6 literal plus an optional
/// non-standard port.
///
/// # Example
///
/// ```
/// use macos_dns_switch::ResolverAddress;
///
/// let addr = ResolverAddress::parse("127.0.0.1:5353").unwrap();
/// assert_eq!(addr.host, "127.0.0.1");
/// assert_eq!(addr.port, Some(5353));
///
/// let v6 = ResolverAddress::parse("[2606:4700:4700::1111]:5353").unwrap();
/// assert_eq!(v6.host, "2606:4700:4700::1111");
/// assert_eq!(v6.port, Some(5353));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverAddress {
    /// IPv4 or IPv6 host literal, never bracketed.
    pub host: String,

    /// Explicit port, if one was given. `None` means the protocol default.
    pub port: Option<u16>,
}

impl ResolverAddress {
    /// Creates an address with no explicit port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
        }
    }

    /// Creates an address with an explicit port.
    #[must_use]
    pub fn with_port(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
        }
    }

    /// Parses a user-entered address string.
    ///
    /// Accepted forms:
    ///
    /// - `1.1.1.1` — bare IPv4
    /// - `1.1.1.1:5353` — IPv4 with port (single colon, numeric suffix)
    /// - `2620:fe::fe` — bare IPv6 (multiple colons, never a port)
    /// - `[2620:fe::fe]:5353` — bracketed IPv6 with port
    ///
    /// A suffix that looks like a port but is not numeric is folded back
    /// into the host rather than rejected, so `host:name` parses as the
    /// bare address `host:name`. Empty or whitespace-only input yields
    /// `None`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        // Bracketed IPv6: [host] or [host]:port.
        if let Some(rest) = trimmed.strip_prefix('[') {
            if let Some((host, remainder)) = rest.split_once(']') {
                if let Some(port_str) = remainder.strip_prefix(':') {
                    if let Ok(port) = port_str.parse::<u16>() {
                        return Some(Self::with_port(host, port));
                    }
                }
                return Some(Self::new(host));
            }
        }

        // IPv4 with port: exactly one colon, numeric suffix.
        if let Some((host, port_str)) = trimmed.split_once(':') {
            if !host.contains(':') && !port_str.contains(':') {
                if let Ok(port) = port_str.parse::<u16>() {
                    return Some(Self::with_port(host, port));
                }
            }
        }

        // IPv6 or plain address with no port.
        Some(Self::new(trimmed))
    }

    /// Returns `true` unless the address carries a non-standard port.
    #[must_use]
    pub fn is_default_port(&self) -> bool {
        self.port.is_none_or(|p| p == DEFAULT_DNS_PORT)
    }

    /// Returns the host with any port information stripped.
    #[must_use]
    pub fn host_only(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for ResolverAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) if self.host.contains(':') => write!(f, "[{}]:{port}", self.host),
            Some(port) => write!(f, "{}:{port}", self.host),
            None => f.write_str(&self.host),
        }
    }
}

/// Splits comma-separated multi-value entries and trims each piece.
///
/// Custom profiles historically allowed several addresses in one field;
/// this normalizes such fields into one entry per address, dropping
/// empties.
#[must_use]
pub fn flatten_entries(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_ipv4() {
        let a = ResolverAddress::parse("8.8.8.8").unwrap();
        assert_eq!(a.host, "8.8.8.8");
        assert_eq!(a.port, None);
    }

    #[test]
    fn parse_ipv4_with_port() {
        let a = ResolverAddress::parse("127.0.0.1:5353").unwrap();
        assert_eq!(a.host, "127.0.0.1");
        assert_eq!(a.port, Some(5353));
    }

    #[test]
    fn parse_bare_ipv6_is_not_a_port() {
        let a = ResolverAddress::parse("2606:4700:4700::1111").unwrap();
        assert_eq!(a.host, "2606:4700:4700::1111");
        assert_eq!(a.port, None);
    }

    #[test]
    fn parse_bracketed_ipv6_with_port() {
        let a = ResolverAddress::parse("[2620:fe::fe]:5353").unwrap();
        assert_eq!(a.host, "2620:fe::fe");
        assert_eq!(a.port, Some(5353));
    }

    #[test]
    fn parse_bracketed_ipv6_without_port() {
        let a = ResolverAddress::parse("[2620:fe::fe]").unwrap();
        assert_eq!(a.host, "2620:fe::fe");
        assert_eq!(a.port, None);
    }

    #[test]
    fn non_numeric_port_suffix_folds_into_host() {
        let a = ResolverAddress::parse("1.1.1.1:dns").unwrap();
        assert_eq!(a.host, "1.1.1.1:dns");
        assert_eq!(a.port, None);
    }

    #[test]
    fn empty_input_is_none() {
        assert_eq!(ResolverAddress::parse(""), None);
        assert_eq!(ResolverAddress::parse("   "), None);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let a = ResolverAddress::parse("  9.9.9.9  ").unwrap();
        assert_eq!(a.host, "9.9.9.9");
    }

    #[test]
    fn explicit_port_53_is_default() {
        assert!(ResolverAddress::parse("1.1.1.1:53").unwrap().is_default_port());
        assert!(ResolverAddress::parse("1.1.1.1").unwrap().is_default_port());
        assert!(!ResolverAddress::parse("1.1.1.1:5353").unwrap().is_default_port());
    }

    #[test]
    fn display_round_trips_common_forms() {
        for s in ["8.8.8.8", "127.0.0.1:5353", "2620:fe::fe", "[2620:fe::fe]:5353"] {
            assert_eq!(ResolverAddress::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn flatten_splits_commas_and_trims() {
        let entries = vec![
            "1.1.1.1, 1.0.0.1".to_string(),
            " 9.9.9.9 ".to_string(),
            String::new(),
        ];
        assert_eq!(
            flatten_entries(&entries),
            vec!["1.1.1.1", "1.0.0.1", "9.9.9.9"]
        );
    }
}
