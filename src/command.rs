//! Privileged command construction.
//!
//! Every OS-level mutation is expressed as a [`PrivilegedCommand`] with an
//! explicit argv — never an interpolated shell string — so profile names
//! and addresses containing shell metacharacters cannot inject. Rendering
//! to a shell string happens once, at the escalation boundary, through
//! [`PrivilegedCommand::shell_string`].

use crate::address::ResolverAddress;

/// Path of the catch-all resolver override file. macOS consults files
/// under `/etc/resolver/` per domain; `custom` acts as the switcher's
/// port-aware override.
pub const RESOLVER_ZONE_PATH: &str = "/etc/resolver/custom";

/// Directory holding resolver override files.
pub const RESOLVER_DIR: &str = "/etc/resolver";

/// Marker comment at the top of the zone file, identifying it as ours.
pub const ZONE_MARKER: &str = "# managed by macos-dns-switch";

const NETWORKSETUP: &str = "/usr/sbin/networksetup";

/// One OS-level command to run with elevated privilege.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegedCommand {
    /// Absolute program path.
    pub program: String,

    /// Argument vector, unescaped.
    pub args: Vec<String>,

    /// Content piped to the command's stdin, if any.
    pub stdin: Option<String>,

    /// Short human-readable step description, used in diagnostics.
    pub description: String,
}

impl PrivilegedCommand {
    fn new(program: &str, args: &[&str], description: &str) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            stdin: None,
            description: description.to_string(),
        }
    }

    /// Renders the command as a single safely-quoted shell string.
    ///
    /// Stdin content, when present, is fed through a quoted `printf` pipe
    /// so the rendered string stays self-contained for `do shell script`.
    #[must_use]
    pub fn shell_string(&self) -> String {
        let mut cmd = std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| shell_quote(s))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(content) = &self.stdin {
            cmd = format!("printf %s {} | {cmd}", shell_quote(content));
        }
        cmd
    }
}

/// Single-quotes a string for POSIX shells, escaping embedded quotes.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

// ---------------------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------------------

/// `networksetup -setdnsservers <service> <host>...`
#[must_use]
pub fn set_dns_servers(service: &str, hosts: &[String]) -> PrivilegedCommand {
    let mut args = vec!["-setdnsservers".to_string(), service.to_string()];
    args.extend(hosts.iter().cloned());
    PrivilegedCommand {
        program: NETWORKSETUP.to_string(),
        args,
        stdin: None,
        description: format!("set DNS servers on {service}"),
    }
}

/// `networksetup -setdnsservers <service> empty` — reset to defaults.
#[must_use]
pub fn clear_dns_servers(service: &str) -> PrivilegedCommand {
    PrivilegedCommand::new(
        NETWORKSETUP,
        &["-setdnsservers", service, "empty"],
        &format!("clear DNS servers on {service}"),
    )
}

/// Disable-then-reenable automatic IPv6 on a service.
///
/// A bare `-setdnsservers` does not reliably take effect for IPv6; the
/// toggle forces the service to re-adopt the new settings.
#[must_use]
pub fn ipv6_toggle_pair(service: &str) -> [PrivilegedCommand; 2] {
    [
        PrivilegedCommand::new(
            NETWORKSETUP,
            &["-setv6off", service],
            &format!("disable automatic IPv6 on {service}"),
        ),
        PrivilegedCommand::new(
            NETWORKSETUP,
            &["-setv6automatic", service],
            &format!("re-enable automatic IPv6 on {service}"),
        ),
    ]
}

/// The per-service command triple for a standard DNS change: set the
/// resolver list, then toggle automatic IPv6 off and back on.
#[must_use]
pub fn service_commands(service: &str, hosts: &[String]) -> [PrivilegedCommand; 3] {
    let [v6_off, v6_auto] = ipv6_toggle_pair(service);
    [set_dns_servers(service, hosts), v6_off, v6_auto]
}

/// The full ordered command plan for applying `hosts` across `services`.
#[must_use]
pub fn standard_plan(services: &[String], hosts: &[String]) -> Vec<PrivilegedCommand> {
    services
        .iter()
        .flat_map(|service| service_commands(service, hosts))
        .collect()
}

/// `mkdir -p /etc/resolver`
#[must_use]
pub fn create_resolver_dir() -> PrivilegedCommand {
    PrivilegedCommand::new(
        "/bin/mkdir",
        &["-p", RESOLVER_DIR],
        "create resolver directory",
    )
}

/// Writes the zone file via `tee` with the content on stdin.
#[must_use]
pub fn write_resolver_zone(content: &str) -> PrivilegedCommand {
    PrivilegedCommand {
        program: "/usr/bin/tee".to_string(),
        args: vec![RESOLVER_ZONE_PATH.to_string()],
        stdin: Some(content.to_string()),
        description: "write resolver zone file".to_string(),
    }
}

/// `chmod 644 /etc/resolver/custom` — world-readable, owner-writable.
#[must_use]
pub fn fix_zone_permissions() -> PrivilegedCommand {
    PrivilegedCommand::new(
        "/bin/chmod",
        &["644", RESOLVER_ZONE_PATH],
        "set resolver zone file permissions",
    )
}

/// `rm -f /etc/resolver/custom`
#[must_use]
pub fn remove_resolver_zone() -> PrivilegedCommand {
    PrivilegedCommand::new(
        "/bin/rm",
        &["-f", RESOLVER_ZONE_PATH],
        "remove resolver zone file",
    )
}

/// `dscacheutil -flushcache`
#[must_use]
pub fn flush_cache() -> PrivilegedCommand {
    PrivilegedCommand::new(
        "/usr/bin/dscacheutil",
        &["-flushcache"],
        "flush DNS cache",
    )
}

/// Restarts the resolution daemon under either of its two known process
/// names, succeeding when either restart works or neither process exists.
#[must_use]
pub fn restart_resolver_daemon() -> PrivilegedCommand {
    PrivilegedCommand::new(
        "/bin/sh",
        &[
            "-c",
            "killall -HUP mDNSResponder 2>/dev/null || killall -HUP mdnsresponder 2>/dev/null || true",
        ],
        "restart resolver daemon",
    )
}

/// Generates the resolver zone file content.
///
/// ```text
/// # managed by macos-dns-switch
/// nameserver 127.0.0.1
/// port 5353
/// nameserver 8.8.8.8
/// ```
///
/// A `port` line directly follows each address that carries one.
#[must_use]
pub fn zone_file_content(addresses: &[ResolverAddress]) -> String {
    let mut content = format!("{ZONE_MARKER}\n");
    for addr in addresses {
        content.push_str(&format!("nameserver {}\n", addr.host));
        if let Some(port) = addr.port {
            content.push_str(&format!("port {port}\n"));
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_dns_servers_builds_argv() {
        let cmd = set_dns_servers("Wi-Fi", &["1.1.1.1".to_string(), "1.0.0.1".to_string()]);
        assert_eq!(cmd.program, "/usr/sbin/networksetup");
        assert_eq!(cmd.args, vec!["-setdnsservers", "Wi-Fi", "1.1.1.1", "1.0.0.1"]);
        assert!(cmd.stdin.is_none());
    }

    #[test]
    fn clear_uses_the_empty_token() {
        let cmd = clear_dns_servers("Ethernet");
        assert_eq!(cmd.args, vec!["-setdnsservers", "Ethernet", "empty"]);
    }

    #[test]
    fn ipv6_pair_disables_then_reenables() {
        let [off, auto] = ipv6_toggle_pair("Wi-Fi");
        assert_eq!(off.args, vec!["-setv6off", "Wi-Fi"]);
        assert_eq!(auto.args, vec!["-setv6automatic", "Wi-Fi"]);
    }

    #[test]
    fn zone_content_interleaves_ports() {
        let addrs = vec![
            ResolverAddress::with_port("127.0.0.1", 5353),
            ResolverAddress::new("8.8.8.8"),
        ];
        let content = zone_file_content(&addrs);
        assert_eq!(
            content,
            "# managed by macos-dns-switch\nnameserver 127.0.0.1\nport 5353\nnameserver 8.8.8.8\n"
        );
    }

    #[test]
    fn standard_plan_is_ordered_per_service() {
        let services = vec!["Wi-Fi".to_string(), "Ethernet".to_string()];
        let hosts = vec!["1.1.1.1".to_string(), "1.0.0.1".to_string()];
        let plan = standard_plan(&services, &hosts);

        assert_eq!(plan.len(), 6);
        // One set-command plus one IPv6 toggle pair per service, in
        // service order.
        assert_eq!(plan[0].args[0], "-setdnsservers");
        assert_eq!(plan[0].args[1], "Wi-Fi");
        assert_eq!(plan[1].args, vec!["-setv6off", "Wi-Fi"]);
        assert_eq!(plan[2].args, vec!["-setv6automatic", "Wi-Fi"]);
        assert_eq!(plan[3].args[1], "Ethernet");
        assert_eq!(plan[4].args, vec!["-setv6off", "Ethernet"]);
        assert_eq!(plan[5].args, vec!["-setv6automatic", "Ethernet"]);
    }

    #[test]
    fn shell_quote_handles_metacharacters() {
        assert_eq!(shell_quote("Wi-Fi"), "'Wi-Fi'");
        assert_eq!(shell_quote("a'b"), "'a'\\''b'");
        assert_eq!(shell_quote("$(rm -rf /)"), "'$(rm -rf /)'");
    }

    #[test]
    fn shell_string_quotes_every_arg() {
        let cmd = set_dns_servers("My Wi-Fi; rm -rf /", &["1.1.1.1".to_string()]);
        assert_eq!(
            cmd.shell_string(),
            "'/usr/sbin/networksetup' '-setdnsservers' 'My Wi-Fi; rm -rf /' '1.1.1.1'"
        );
    }

    #[test]
    fn shell_string_pipes_stdin_through_printf() {
        let cmd = write_resolver_zone("nameserver 1.1.1.1\n");
        let rendered = cmd.shell_string();
        assert!(rendered.starts_with("printf %s 'nameserver 1.1.1.1\n' | "));
        assert!(rendered.ends_with("'/usr/bin/tee' '/etc/resolver/custom'"));
    }

    #[test]
    fn restart_tolerates_both_daemon_names() {
        let cmd = restart_resolver_daemon();
        let script = &cmd.args[1];
        assert!(script.contains("mDNSResponder"));
        assert!(script.contains("mdnsresponder"));
        assert!(script.ends_with("|| true"));
    }
}
