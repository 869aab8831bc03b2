//! Network service discovery.
//!
//! Resolver changes only make sense on services that are actually carrying
//! traffic. This module asks `networksetup` for the configured services,
//! decides liveness per service, and narrows to the set a switch should
//! target. The result is recomputed on every call — link state changes
//! between calls, so caching would be wrong.

use crate::error::{Result, SwitchError};
use std::collections::HashMap;
use tokio::process::Command;

const NETWORKSETUP: &str = "/usr/sbin/networksetup";
const IFCONFIG: &str = "/sbin/ifconfig";

/// Returns the network services a DNS change should apply to.
///
/// Lists all enabled services in OS order, keeps those with a bound IPv4
/// address or an active underlying device, and falls back to the single
/// first-listed service when the liveness checks are inconclusive for
/// every service. DNS changes must land somewhere; a deterministic
/// first-service fallback beats a silent no-op. Empty only when no
/// services are configured at all.
pub async fn discover_active_services() -> Vec<String> {
    let services = match list_services().await {
        Ok(services) => services,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list network services");
            return Vec::new();
        }
    };
    if services.is_empty() {
        return Vec::new();
    }

    // Built lazily: only needed when -getinfo is inconclusive.
    let mut device_map: Option<HashMap<String, String>> = None;

    let mut live = Vec::new();
    for service in &services {
        if service_is_live(service, &mut device_map).await {
            live.push(service.clone());
        }
    }

    if live.is_empty() {
        tracing::debug!(
            fallback = %services[0],
            "No service passed liveness checks, falling back to first listed"
        );
        live.push(services[0].clone());
    }

    tracing::debug!(services = ?live, "Discovered active network services");
    live
}

/// Lists enabled network services in OS order.
///
/// # Errors
///
/// Returns [`SwitchError::Io`] when `networksetup` cannot be spawned and
/// [`SwitchError::CommandFailed`] when it exits non-zero.
pub async fn list_services() -> Result<Vec<String>> {
    let output = Command::new(NETWORKSETUP)
        .arg("-listallnetworkservices")
        .output()
        .await?;
    if !output.status.success() {
        return Err(SwitchError::CommandFailed {
            description: "list network services".to_string(),
        });
    }
    Ok(parse_service_listing(&String::from_utf8_lossy(
        &output.stdout,
    )))
}

async fn service_is_live(
    service: &str,
    device_map: &mut Option<HashMap<String, String>>,
) -> bool {
    // Direct check: a bound IPv4 address on the service.
    if let Some(info) = run_capture(NETWORKSETUP, &["-getinfo", service]).await {
        if parse_getinfo_ip(&info).is_some() {
            return true;
        }
    }

    // Inconclusive; fall back to the underlying device's link status.
    if device_map.is_none() {
        let order = run_capture(NETWORKSETUP, &["-listnetworkserviceorder"])
            .await
            .unwrap_or_default();
        *device_map = Some(parse_service_order(&order));
    }
    let Some(device) = device_map.as_ref().and_then(|m| m.get(service)) else {
        return false;
    };

    run_capture(IFCONFIG, &[device.as_str()])
        .await
        .is_some_and(|out| device_is_live(&out))
}

/// Runs a command and returns stdout on success, `None` otherwise.
async fn run_capture(program: &str, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output().await {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            tracing::debug!(program, ?args, status = ?output.status, "Command failed");
            None
        }
        Err(e) => {
            tracing::warn!(program, error = %e, "Failed to spawn command");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Output parsers
// ---------------------------------------------------------------------------

/// Parses `networksetup -listallnetworkservices` output.
///
/// The first line is explanatory text; `*`-prefixed entries are disabled
/// services. Both are dropped.
#[must_use]
pub fn parse_service_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('*'))
        .map(ToString::to_string)
        .collect()
}

/// Extracts the bound IPv4 address from `networksetup -getinfo` output.
///
/// Returns `None` for a missing line, `none`, or an unbound placeholder.
#[must_use]
pub fn parse_getinfo_ip(output: &str) -> Option<String> {
    for line in output.lines() {
        if let Some(value) = line.strip_prefix("IP address:") {
            let value = value.trim();
            if value.is_empty() || value.eq_ignore_ascii_case("none") || value == "0.0.0.0" {
                return None;
            }
            return Some(value.to_string());
        }
    }
    None
}

/// Parses `networksetup -listnetworkserviceorder` into a service → device
/// map.
///
/// The listing alternates `(1) Wi-Fi` name lines with
/// `(Hardware Port: Wi-Fi, Device: en0)` detail lines; a detail line binds
/// the most recent name line.
#[must_use]
pub fn parse_service_order(output: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut current: Option<String> = None;

    for line in output.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix('(') {
            if let Some((index, name)) = rest.split_once(')') {
                // `(1) Wi-Fi` — a numbered service name line.
                if index.chars().all(|c| c.is_ascii_digit()) && !index.is_empty() {
                    current = Some(name.trim().to_string());
                    continue;
                }
            }
            // `(Hardware Port: Wi-Fi, Device: en0)` — detail line.
            if let Some(device) = rest
                .trim_end_matches(')')
                .split(',')
                .filter_map(|part| part.trim().strip_prefix("Device:"))
                .map(str::trim)
                .find(|d| !d.is_empty())
            {
                if let Some(service) = current.take() {
                    map.insert(service, device.to_string());
                }
            }
        }
    }
    map
}

/// Decides liveness from `ifconfig <device>` output.
///
/// Live when the device reports `status: active`, or when it holds a
/// non-loopback, non-link-local IPv4/IPv6 address.
#[must_use]
pub fn device_is_live(output: &str) -> bool {
    for line in output.lines().map(str::trim) {
        if let Some(status) = line.strip_prefix("status:") {
            if status.trim() == "active" {
                return true;
            }
        }
        if let Some(addr) = line.strip_prefix("inet ") {
            let addr = addr.split_whitespace().next().unwrap_or("");
            if !addr.starts_with("127.") && !addr.starts_with("169.254.") && !addr.is_empty() {
                return true;
            }
        }
        if let Some(addr) = line.strip_prefix("inet6 ") {
            let addr = addr.split_whitespace().next().unwrap_or("");
            if !addr.starts_with("fe80") && addr != "::1" && !addr.is_empty() {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
An asterisk (*) denotes that a network service is disabled.
Wi-Fi
Ethernet
*Thunderbolt Bridge
";

    const ORDER: &str = "\
An asterisk (*) denotes that a network service is disabled.
(1) Wi-Fi
(Hardware Port: Wi-Fi, Device: en0)

(2) Ethernet
(Hardware Port: Ethernet, Device: en1)

(*) Thunderbolt Bridge
(Hardware Port: Thunderbolt Bridge, Device: bridge0)
";

    #[test]
    fn listing_drops_header_and_disabled() {
        assert_eq!(parse_service_listing(LISTING), vec!["Wi-Fi", "Ethernet"]);
    }

    #[test]
    fn listing_empty_output() {
        assert!(parse_service_listing("").is_empty());
        assert!(parse_service_listing("header only\n").is_empty());
    }

    #[test]
    fn getinfo_extracts_bound_address() {
        let out = "DHCP Configuration\nIP address: 192.168.1.23\nSubnet mask: 255.255.255.0\n";
        assert_eq!(parse_getinfo_ip(out), Some("192.168.1.23".to_string()));
    }

    #[test]
    fn getinfo_none_and_placeholder_are_unbound() {
        assert_eq!(parse_getinfo_ip("IP address: none\n"), None);
        assert_eq!(parse_getinfo_ip("IP address: 0.0.0.0\n"), None);
        assert_eq!(parse_getinfo_ip("Manual Configuration\n"), None);
    }

    #[test]
    fn service_order_maps_to_devices() {
        let map = parse_service_order(ORDER);
        assert_eq!(map.get("Wi-Fi").map(String::as_str), Some("en0"));
        assert_eq!(map.get("Ethernet").map(String::as_str), Some("en1"));
        // The starred entry has no numbered name line, so it is skipped.
        assert_eq!(map.get("Thunderbolt Bridge"), None);
    }

    #[test]
    fn device_active_status_is_live() {
        let out = "en0: flags=8863<UP,BROADCAST,SMART,RUNNING> mtu 1500\n\tstatus: active\n";
        assert!(device_is_live(out));
    }

    #[test]
    fn device_routable_inet_is_live() {
        let out = "\tinet 10.0.0.5 netmask 0xffffff00 broadcast 10.0.0.255\n\tstatus: inactive\n";
        assert!(device_is_live(out));
    }

    #[test]
    fn device_link_local_only_is_not_live() {
        let out = "\tinet6 fe80::1c2a:ffff%en0 prefixlen 64 scopeid 0xb\n\tstatus: inactive\n";
        assert!(!device_is_live(out));
    }

    #[test]
    fn device_loopback_is_not_live() {
        let out = "\tinet 127.0.0.1 netmask 0xff000000\n\tinet6 ::1 prefixlen 128\n";
        assert!(!device_is_live(out));
    }

    #[test]
    fn device_global_inet6_is_live() {
        let out = "\tinet6 2a01:db8::5 prefixlen 64\n";
        assert!(device_is_live(out));
    }
}
