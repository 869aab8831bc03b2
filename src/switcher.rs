//! DNS switch orchestration.
//!
//! Ties discovery, command construction, and privileged execution into
//! the three public operations: apply a resolver list, clear overrides,
//! flush the resolver cache. All three collapse failures to a boolean;
//! which step or service failed is logged, never returned.
//!
//! Callers must serialize apply/disable/flush invocations per logical
//! DNS-change session — two overlapping switches race on the same
//! interface state and the outcome is undefined.

use crate::address::ResolverAddress;
use crate::command::{
    self, PrivilegedCommand, create_resolver_dir, fix_zone_permissions, remove_resolver_zone,
    write_resolver_zone, zone_file_content,
};
use crate::error::{Result, SwitchError};
use crate::interface;
use crate::privilege::PrivilegeRunner;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Switches the machine's active DNS resolver configuration.
///
/// Stateless: services are rediscovered and commands rebuilt on every
/// call. Construct once at process start and share by reference.
///
/// # Example
///
/// ```rust,ignore
/// use macos_dns_switch::{DnsSwitcher, OsascriptRunner, ResolverAddress};
///
/// let switcher = DnsSwitcher::new(OsascriptRunner::new(
///     "DNS Switch needs to modify network settings",
/// ));
/// let ok = switcher.apply(&[ResolverAddress::new("1.1.1.1")]).await;
/// ```
pub struct DnsSwitcher<R: PrivilegeRunner> {
    runner: Arc<R>,
    services_override: Option<Vec<String>>,
}

impl<R: PrivilegeRunner + 'static> DnsSwitcher<R> {
    /// Creates a switcher that discovers target services on every call.
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self {
            runner: Arc::new(runner),
            services_override: None,
        }
    }

    /// Creates a switcher targeting a fixed service list (useful for
    /// testing).
    #[must_use]
    pub fn with_services(runner: R, services: Vec<String>) -> Self {
        Self {
            runner: Arc::new(runner),
            services_override: Some(services),
        }
    }

    /// Applies a resolver address list to every active network service.
    ///
    /// An empty address list fails immediately, as does an empty
    /// discovery result. Addresses carrying a non-default port first
    /// install the resolver zone file (directory, file, permissions —
    /// each step short-circuits the rest on failure), then the standard
    /// per-service path applies the port-stripped hosts so plain
    /// resolution keeps working for applications that ignore the zone
    /// file.
    ///
    /// Returns `true` only if every service succeeded. Earlier services
    /// are not rolled back when a later one fails; the machine may be
    /// left partially switched and the caller sees only `false`.
    pub async fn apply(&self, addresses: &[ResolverAddress]) -> bool {
        match self.try_apply(addresses).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Apply failed");
                false
            }
        }
    }

    async fn try_apply(&self, addresses: &[ResolverAddress]) -> Result<()> {
        if addresses.is_empty() {
            return Err(SwitchError::EmptyAddresses);
        }

        let services = self.target_services().await;
        if services.is_empty() {
            return Err(SwitchError::NoServices);
        }

        let has_custom_ports = addresses.iter().any(|a| !a.is_default_port());
        if has_custom_ports {
            self.install_zone_file(addresses).await?;
        }

        let hosts: Vec<String> = addresses.iter().map(|a| a.host.clone()).collect();
        let ok = self.run_per_service(&services, move |service| {
            command::service_commands(service, &hosts).to_vec()
        })
        .await;
        if !ok {
            return Err(SwitchError::CommandFailed {
                description: "resolver update on one or more services".to_string(),
            });
        }

        tracing::info!(
            services = services.len(),
            zone_file = has_custom_ports,
            "Applied resolver configuration"
        );
        Ok(())
    }

    /// Clears resolver overrides: removes the zone file (best effort),
    /// then resets every active service's resolver list to the default.
    ///
    /// Idempotent — repeating it leaves the same final state. Returns
    /// `true` only if every service reset succeeded; the zone-file
    /// removal never blocks the resets.
    pub async fn disable(&self) -> bool {
        match self.try_disable().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Disable failed");
                false
            }
        }
    }

    async fn try_disable(&self) -> Result<()> {
        let services = self.target_services().await;
        if services.is_empty() {
            return Err(SwitchError::NoServices);
        }

        if !self.runner.run(&remove_resolver_zone()).await {
            tracing::debug!("Resolver zone removal failed, continuing with reset");
        }

        let ok = self.run_per_service(&services, |service| {
            vec![command::clear_dns_servers(service)]
        })
        .await;
        if !ok {
            return Err(SwitchError::CommandFailed {
                description: "resolver reset on one or more services".to_string(),
            });
        }

        tracing::info!(services = services.len(), "Cleared resolver overrides");
        Ok(())
    }

    /// Flushes the system resolver cache and, when the flush succeeds,
    /// nudges the resolution daemon to restart.
    ///
    /// The restart is best-effort: it tolerates either daemon process
    /// name or neither process running, and its outcome does not affect
    /// the returned flush result.
    pub async fn flush_cache(&self) -> bool {
        if !self.runner.run(&command::flush_cache()).await {
            tracing::warn!("Cache flush failed");
            return false;
        }
        if !self.runner.run(&command::restart_resolver_daemon()).await {
            tracing::debug!("Resolver daemon restart reported failure");
        }
        true
    }

    async fn target_services(&self) -> Vec<String> {
        match &self.services_override {
            Some(services) => services.clone(),
            None => interface::discover_active_services().await,
        }
    }

    /// Runs the dir/write/chmod sequence for a port-aware zone file.
    /// Each step's failure halts the remaining steps.
    async fn install_zone_file(&self, addresses: &[ResolverAddress]) -> Result<()> {
        let content = zone_file_content(addresses);
        let steps = [
            create_resolver_dir(),
            write_resolver_zone(&content),
            fix_zone_permissions(),
        ];
        for step in steps {
            if !self.runner.run(&step).await {
                tracing::warn!(step = %step.description, "Zone file installation halted");
                return Err(SwitchError::CommandFailed {
                    description: step.description,
                });
            }
        }
        Ok(())
    }

    /// Fans out per-service command sequences concurrently. Commands
    /// within one service run in order; services run in parallel, each
    /// contributing an independent success flag. All must succeed.
    async fn run_per_service<F>(&self, services: &[String], build: F) -> bool
    where
        F: Fn(&str) -> Vec<PrivilegedCommand>,
    {
        let mut tasks = JoinSet::new();
        for service in services {
            let runner = Arc::clone(&self.runner);
            let service = service.clone();
            let commands = build(&service);
            tasks.spawn(async move {
                for cmd in &commands {
                    if !runner.run(cmd).await {
                        tracing::warn!(service = %service, step = %cmd.description, "Service update failed");
                        return false;
                    }
                }
                true
            });
        }

        let mut all_ok = true;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(ok) => all_ok &= ok,
                Err(e) => {
                    tracing::error!(error = %e, "Service task panicked");
                    all_ok = false;
                }
            }
        }
        all_ok
    }
}
