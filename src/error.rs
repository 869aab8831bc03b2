//! Error types.

use thiserror::Error;

/// Result alias for switcher operations.
pub type Result<T> = std::result::Result<T, SwitchError>;

/// Errors surfaced by the switching and probing internals.
///
/// The public `apply`/`disable`/`flush_cache` operations collapse these to
/// a boolean; the variants exist for internal plumbing and diagnostics.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Subprocess I/O failed (typically the command binary was not found).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No network services are configured on this machine.
    #[error("no network services found")]
    NoServices,

    /// An apply was requested with no resolver addresses.
    #[error("empty resolver address list")]
    EmptyAddresses,

    /// A privileged command reported failure.
    #[error("privileged command failed: {description}")]
    CommandFailed {
        /// Human-readable description of the failed step.
        description: String,
    },
}

impl SwitchError {
    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}
