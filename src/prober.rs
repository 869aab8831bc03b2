//! Concurrent resolver latency probing.
//!
//! One reachability probe per profile, bounded to five in flight at a
//! time, each probe two ICMP echoes with a one-second timeout. Results
//! are ranked ascending by average round-trip; a probe that fails or
//! times out ranks last with a sentinel time. A run can be cancelled
//! cooperatively, which kills in-flight ping processes and discards
//! partial results.

use crate::profile::Profile;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Sentinel round-trip time for a failed or timed-out probe.
pub const PROBE_FAILURE_MS: f64 = 999.0;

/// Hard ceiling on simultaneously in-flight probes.
pub const MAX_CONCURRENT_PROBES: usize = 5;

/// Delay between successive probe starts, scaled by probe index, so a
/// large catalog does not hit the local network stack all at once.
pub const PROBE_STAGGER: Duration = Duration::from_millis(50);

const PING_COUNT: &str = "2";
const PING_TIMEOUT_SECS: &str = "1";

/// Outcome of one latency probe. Produced fresh per run, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// Matches the probed profile's id.
    pub id: String,

    /// Profile display name.
    pub name: String,

    /// Average round-trip time in milliseconds; [`PROBE_FAILURE_MS`] on
    /// failure.
    pub time_ms: f64,

    /// `false` when the probe failed or timed out.
    pub success: bool,
}

/// A single bounded-timeout reachability measurement.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probes `host`, returning the average round-trip in milliseconds,
    /// or `None` on failure, timeout, or cancellation.
    async fn probe(&self, host: &str, cancel: &CancellationToken) -> Option<f64>;
}

/// Probes by spawning the system `ping` binary: two echo requests, one
/// second per-echo timeout, average extracted from the `min/avg/max`
/// summary line. Cancellation kills the child process.
pub struct PingProbe;

#[async_trait]
impl Probe for PingProbe {
    async fn probe(&self, host: &str, cancel: &CancellationToken) -> Option<f64> {
        let child = tokio::process::Command::new("/sbin/ping")
            .args(["-c", PING_COUNT, "-t", PING_TIMEOUT_SECS, host])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(host, error = %e, "Failed to spawn ping");
                return None;
            }
        };

        tokio::select! {
            output = child.wait_with_output() => {
                let output = output.ok()?;
                if !output.status.success() {
                    return None;
                }
                parse_ping_output(&String::from_utf8_lossy(&output.stdout))
            }
            () = cancel.cancelled() => {
                // Dropping the wait future reaps the child via
                // kill_on_drop.
                tracing::debug!(host, "Probe cancelled");
                None
            }
        }
    }
}

/// Extracts the average round-trip time from ping's summary line.
///
/// ```text
/// round-trip min/avg/max/stddev = 11.1/11.7/12.3/0.6 ms
/// ```
#[must_use]
pub fn parse_ping_output(output: &str) -> Option<f64> {
    for line in output.lines() {
        if !line.contains("min/avg/max") {
            continue;
        }
        let stats = line.split('=').nth(1)?.trim();
        let avg = stats.split('/').nth(1)?.trim();
        return avg.parse().ok();
    }
    None
}

/// Ranks resolver profiles by probe latency.
///
/// Single-flight: only one run may be active; a `test_all` call during
/// an active run returns an empty result set immediately rather than
/// queueing. Construct once and share.
pub struct LatencyProber<P: Probe> {
    probe: Arc<P>,
    active: AtomicBool,
    cancel: Mutex<CancellationToken>,
    stagger: Duration,
    max_concurrent: usize,
}

impl<P: Probe + 'static> LatencyProber<P> {
    /// Creates a prober with the default stagger and concurrency cap.
    #[must_use]
    pub fn new(probe: P) -> Self {
        Self {
            probe: Arc::new(probe),
            active: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
            stagger: PROBE_STAGGER,
            max_concurrent: MAX_CONCURRENT_PROBES,
        }
    }

    /// Overrides the start stagger (useful for testing).
    #[must_use]
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Overrides the concurrency cap (useful for testing).
    #[must_use]
    pub fn with_concurrency(mut self, cap: usize) -> Self {
        self.max_concurrent = cap.max(1);
        self
    }

    /// Probes every profile's first address and returns results ranked
    /// ascending by round-trip time, ties in input order.
    ///
    /// Profiles without any address are skipped. Returns an empty vec
    /// immediately when a run is already active, and an empty vec when
    /// the run was cancelled mid-flight.
    pub async fn test_all(&self, profiles: &[Profile]) -> Vec<ProbeResult> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Probe run already active, rejecting");
            return Vec::new();
        }

        let token = CancellationToken::new();
        *self.cancel.lock().unwrap() = token.clone();

        let targets: Vec<(usize, String, String, String)> = profiles
            .iter()
            .filter_map(|p| {
                p.probe_target().map(|host| {
                    (p.id.clone(), p.name.clone(), host.to_string())
                })
            })
            .enumerate()
            .map(|(i, (id, name, host))| (i, id, name, host))
            .collect();

        tracing::info!(targets = targets.len(), "Starting latency probe run");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        for (index, id, name, host) in targets {
            let probe = Arc::clone(&self.probe);
            let semaphore = Arc::clone(&semaphore);
            let token = token.clone();
            let stagger = self.stagger;
            tasks.spawn(async move {
                tokio::time::sleep(stagger * u32::try_from(index).unwrap_or(u32::MAX)).await;
                let permit = tokio::select! {
                    permit = semaphore.acquire_owned() => permit.ok()?,
                    () = token.cancelled() => return None,
                };
                let time = probe.probe(&host, &token).await;
                drop(permit);
                if token.is_cancelled() {
                    return None;
                }
                Some((
                    index,
                    time.map_or(
                        ProbeResult {
                            id: id.clone(),
                            name: name.clone(),
                            time_ms: PROBE_FAILURE_MS,
                            success: false,
                        },
                        |ms| ProbeResult {
                            id: id.clone(),
                            name: name.clone(),
                            time_ms: ms,
                            success: true,
                        },
                    ),
                ))
            });
        }

        let mut indexed: Vec<(usize, ProbeResult)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Ok(Some(entry)) = joined {
                indexed.push(entry);
            }
        }

        if token.is_cancelled() {
            // Partial results are discarded; cancel() already cleared
            // the active flag, possibly for a newer run's benefit.
            tracing::info!("Probe run cancelled, discarding partial results");
            return Vec::new();
        }

        // Restore input order, then rank by time; the stable sort keeps
        // ties (including all failures at the sentinel) in input order.
        indexed.sort_by_key(|(index, _)| *index);
        let mut results: Vec<ProbeResult> = indexed.into_iter().map(|(_, r)| r).collect();
        results.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));

        self.active.store(false, Ordering::SeqCst);
        tracing::info!(results = results.len(), "Probe run complete");
        results
    }

    /// Cancels any in-flight run: stops accepting probe completions,
    /// kills running ping processes, and clears the active flag so a
    /// fresh run is accepted immediately. The cancelled `test_all` call
    /// resolves to an empty result set.
    pub fn cancel(&self) {
        self.cancel.lock().unwrap().cancel();
        self.active.store(false, Ordering::SeqCst);
    }

    /// Returns `true` while a probe run is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
