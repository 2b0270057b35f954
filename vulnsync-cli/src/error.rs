//! CLI-specific error types and exit code mapping

use vulnsync_audit::AuditError;
use vulnsync_core::error::{TrackerError, VulnsyncError};

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The scanner binary could not be started.
    #[error("scanner unavailable: {0}")]
    ScannerUnavailable(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from vulnsync-core.
    #[error("{0}")]
    Core(#[from] VulnsyncError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success (even with failed tickets) |
    /// | 1    | General / tracker error          |
    /// | 2    | Configuration error              |
    /// | 3    | Scanner unavailable              |
    /// | 10   | IO / tracking store error        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Core(e) if e.is_config() => 2,
            Self::ScannerUnavailable(_) => 3,
            Self::Io(_) => 10,
            Self::Core(VulnsyncError::Store(_) | VulnsyncError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<AuditError> for CliError {
    fn from(e: AuditError) -> Self {
        if matches!(e, AuditError::Spawn { .. }) {
            Self::ScannerUnavailable(e.to_string())
        } else {
            Self::Core(e.into())
        }
    }
}

impl From<TrackerError> for CliError {
    fn from(e: TrackerError) -> Self {
        Self::Core(e.into())
    }
}
