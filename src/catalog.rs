//! Built-in resolver catalog.
//!
//! A handful of public resolver services plus the Getflix geo-located
//! pool, one single-address entry per location. Each entry carries a
//! stable id so persisted "active profile" state survives reordering.

use crate::address::ResolverAddress;
use crate::profile::Profile;

/// Cloudflare public resolvers, IPv4 then IPv6, primary then secondary.
pub const CLOUDFLARE_SERVERS: [&str; 4] = [
    "1.1.1.1",
    "1.0.0.1",
    "2606:4700:4700::1111",
    "2606:4700:4700::1001",
];

/// Quad9 public resolvers.
pub const QUAD9_SERVERS: [&str; 4] = ["9.9.9.9", "149.112.112.112", "2620:fe::fe", "2620:fe::9"];

/// AdGuard public resolvers.
pub const ADGUARD_SERVERS: [&str; 4] = [
    "94.140.14.14",
    "94.140.15.15",
    "2a10:50c0::ad1:ff",
    "2a10:50c0::ad2:ff",
];

/// Getflix geo-located resolvers, one address per location.
pub const GETFLIX_LOCATIONS: [(&str, &str, &str); 25] = [
    ("getflix-au-melbourne", "Australia — Melbourne", "118.127.62.178"),
    ("getflix-au-perth", "Australia — Perth", "45.248.78.99"),
    ("getflix-au-sydney-1", "Australia — Sydney 1", "54.252.183.4"),
    ("getflix-au-sydney-2", "Australia — Sydney 2", "54.252.183.5"),
    ("getflix-br-sao-paulo", "Brazil — São Paulo", "54.94.175.250"),
    ("getflix-ca-toronto", "Canada — Toronto", "169.53.182.124"),
    ("getflix-dk-copenhagen", "Denmark — Copenhagen", "82.103.129.240"),
    ("getflix-de-frankfurt", "Germany — Frankfurt", "54.93.169.181"),
    ("getflix-gb-london", "Great Britain — London", "212.71.249.225"),
    ("getflix-hk", "Hong Kong", "119.9.73.44"),
    ("getflix-in-mumbai", "India — Mumbai", "103.13.112.251"),
    ("getflix-ie-dublin", "Ireland — Dublin", "54.72.70.84"),
    ("getflix-it-milan", "Italy — Milan", "95.141.39.238"),
    ("getflix-jp-tokyo", "Japan — Tokyo", "172.104.90.123"),
    ("getflix-nl-amsterdam", "Netherlands — Amsterdam", "46.166.189.67"),
    ("getflix-nz-auckland-1", "New Zealand — Auckland 1", "120.138.27.84"),
    ("getflix-nz-auckland-2", "New Zealand — Auckland 2", "120.138.22.174"),
    ("getflix-sg", "Singapore", "54.251.190.247"),
    ("getflix-za-johannesburg", "South Africa — Johannesburg", "102.130.116.140"),
    ("getflix-es-madrid", "Spain — Madrid", "185.93.3.168"),
    ("getflix-se-stockholm", "Sweden — Stockholm", "46.246.29.68"),
    ("getflix-tr-istanbul", "Turkey — Istanbul", "212.68.53.190"),
    ("getflix-us-dallas", "United States — Dallas (Central)", "169.55.51.86"),
    ("getflix-us-oregon", "United States — Oregon (West)", "54.187.61.200"),
    ("getflix-us-virginia", "United States — Virginia (East)", "54.164.176.2"),
];

/// Returns the full built-in catalog: public services first, then the
/// geo-located pool in location order.
#[must_use]
pub fn predefined_profiles() -> Vec<Profile> {
    let mut profiles = vec![
        service_profile("cloudflare", "Cloudflare", &CLOUDFLARE_SERVERS),
        service_profile("quad9", "Quad9", &QUAD9_SERVERS),
        service_profile("adguard", "AdGuard", &ADGUARD_SERVERS),
    ];
    profiles.extend(GETFLIX_LOCATIONS.iter().map(|&(id, name, addr)| {
        Profile::predefined(id, name, vec![ResolverAddress::new(addr)])
    }));
    profiles
}

fn service_profile(id: &str, name: &str, servers: &[&str]) -> Profile {
    Profile::predefined(
        id,
        name,
        servers.iter().map(|s| ResolverAddress::new(*s)).collect(),
    )
}
