//! Privileged command execution.
//!
//! The switcher does not care how privilege is obtained — it hands a
//! [`PrivilegedCommand`] to a [`PrivilegeRunner`] and gets back a plain
//! success flag. A dismissed prompt, a denied escalation, and a failing
//! command all look the same at this boundary; detail goes to the log.

use crate::command::PrivilegedCommand;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Executes commands with elevated privilege.
#[async_trait]
pub trait PrivilegeRunner: Send + Sync {
    /// Runs one command, returning `true` on success.
    ///
    /// Must not panic and must not hang beyond whatever timeout the
    /// escalation mechanism itself enforces.
    async fn run(&self, cmd: &PrivilegedCommand) -> bool;
}

/// Escalates through `osascript`'s `do shell script … with administrator
/// privileges`, which presents the system credential prompt (Touch ID
/// where available, password otherwise).
///
/// When the process already runs as root, commands execute directly with
/// no prompt.
pub struct OsascriptRunner {
    justification: String,
}

impl OsascriptRunner {
    /// Creates a runner with the given user-facing prompt justification.
    #[must_use]
    pub fn new(justification: impl Into<String>) -> Self {
        Self {
            justification: justification.into(),
        }
    }
}

#[async_trait]
impl PrivilegeRunner for OsascriptRunner {
    async fn run(&self, cmd: &PrivilegedCommand) -> bool {
        let ok = if is_root() {
            run_direct(cmd).await
        } else {
            run_escalated(cmd, &self.justification).await
        };
        if ok {
            tracing::debug!(step = %cmd.description, "Privileged command succeeded");
        } else {
            tracing::warn!(step = %cmd.description, "Privileged command failed");
        }
        ok
    }
}

/// Effective-uid check; root needs no escalation prompt.
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Runs the argv directly, feeding stdin content when present.
async fn run_direct(cmd: &PrivilegedCommand) -> bool {
    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if cmd.stdin.is_some() {
        command.stdin(Stdio::piped());
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(program = %cmd.program, error = %e, "Failed to spawn command");
            return false;
        }
    };

    if let (Some(content), Some(mut stdin)) = (&cmd.stdin, child.stdin.take()) {
        if let Err(e) = stdin.write_all(content.as_bytes()).await {
            tracing::warn!(program = %cmd.program, error = %e, "Failed to write stdin");
            return false;
        }
        drop(stdin);
    }

    match child.wait().await {
        Ok(status) => status.success(),
        Err(e) => {
            tracing::warn!(program = %cmd.program, error = %e, "Failed to wait for command");
            false
        }
    }
}

/// Runs the command through the admin-privilege prompt.
async fn run_escalated(cmd: &PrivilegedCommand, justification: &str) -> bool {
    let script = format!(
        "do shell script \"{}\" with administrator privileges with prompt \"{}\"",
        applescript_quote(&cmd.shell_string()),
        applescript_quote(justification),
    );

    match Command::new("/usr/bin/osascript")
        .args(["-e", &script])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
    {
        Ok(status) => status.success(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to spawn osascript");
            false
        }
    }
}

/// Escapes a string for embedding in an AppleScript string literal.
fn applescript_quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
