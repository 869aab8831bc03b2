//! # macos-dns-switch
//!
//! Switch a Mac's active DNS resolver configuration between named
//! profiles, verify and clear overrides, and rank resolvers by ping
//! latency.
//!
//! Two cooperating services do the real work:
//!
//! - [`DnsSwitcher`] discovers the network services that are actually
//!   carrying traffic, builds the `networksetup` command set (plus an
//!   `/etc/resolver/custom` zone file when an address carries a
//!   non-standard port), and runs it under elevated privilege.
//! - [`LatencyProber`] pings one representative address per profile —
//!   at most five in flight, two echoes, one-second timeout — and
//!   returns results ranked by average round-trip time.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use macos_dns_switch::{
//!     catalog, DnsSwitcher, LatencyProber, OsascriptRunner, PingProbe,
//! };
//!
//! let switcher = DnsSwitcher::new(OsascriptRunner::new(
//!     "DNS Switch needs to modify network settings",
//! ));
//!
//! // Apply the first built-in profile and persist its id on success.
//! let profiles = catalog::predefined_profiles();
//! if switcher.apply(&profiles[0].addresses).await {
//!     store.set_active(Some(&profiles[0].id));
//! }
//!
//! // Find the fastest resolver.
//! let prober = LatencyProber::new(PingProbe);
//! let ranked = prober.test_all(&profiles).await;
//!
//! // Back to DHCP-provided resolvers.
//! switcher.disable().await;
//! ```
//!
//! ## Profiles and state
//!
//! Profiles and the "currently active profile" record are caller-owned:
//! this crate takes `&[Profile]` as plain input and reports the id to
//! persist after a successful apply. It never touches storage itself.
//!
//! ## Failure model
//!
//! Every public operation collapses to a boolean. A dismissed privilege
//! prompt, a failed command, and a half-applied multi-interface change
//! all surface as `false`; per-step detail is available through
//! `tracing` diagnostics only. A failed apply leaves the previously
//! persisted active profile unchanged — callers commit new state only
//! on success.
//!
//! ## Permissions
//!
//! Changing resolver settings requires elevation. [`OsascriptRunner`]
//! drives the system credential prompt; when the process already runs
//! as root, commands execute directly.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod address;
pub mod catalog;
pub mod command;
pub mod error;
pub mod interface;
pub mod privilege;
pub mod prober;
pub mod profile;
pub mod switcher;

pub use address::{DEFAULT_DNS_PORT, ResolverAddress, flatten_entries};
pub use command::{PrivilegedCommand, RESOLVER_ZONE_PATH};
pub use error::{Result, SwitchError};
pub use privilege::{OsascriptRunner, PrivilegeRunner};
pub use prober::{
    LatencyProber, MAX_CONCURRENT_PROBES, PROBE_FAILURE_MS, PingProbe, Probe, ProbeResult,
};
pub use profile::{Profile, ProfileKind};
pub use switcher::DnsSwitcher;
