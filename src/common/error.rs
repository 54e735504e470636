//! Error types for the regression runner
//!
//! Stage failures of every flavor (spawn error, non-zero exit, missing pass
//! marker) collapse into [`Error::StageFailed`] so the sequencer can treat
//! them uniformly.

use std::fmt;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Why a stage did not pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The executable could not be started
    SpawnFailed(String),
    /// An exit-status-gated process exited unsuccessfully
    NonZeroExit(Option<i32>),
    /// The captured output did not contain the pass marker
    MarkerAbsent,
}

impl FailureReason {
    /// Short machine-friendly code for logs
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::SpawnFailed(_) => "SPAWN_FAILED",
            FailureReason::NonZeroExit(_) => "NON_ZERO_EXIT",
            FailureReason::MarkerAbsent => "MARKER_ABSENT",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::SpawnFailed(msg) => write!(f, "failed to spawn: {msg}"),
            FailureReason::NonZeroExit(Some(code)) => write!(f, "exited with status {code}"),
            FailureReason::NonZeroExit(None) => write!(f, "terminated by signal"),
            FailureReason::MarkerAbsent => write!(f, "pass marker not found in output"),
        }
    }
}

/// Main error type for the regression runner
#[derive(Error, Debug)]
pub enum Error {
    // === Stage Errors ===
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: FailureReason },

    // === Dispatch Errors ===
    #[error("Unknown test suite '{0}'. Expected one of: normal, vol_del, recovery, mapping, sequence, load")]
    UnknownMode(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create a stage failure error
    pub fn stage_failed(stage: &str, reason: FailureReason) -> Self {
        Self::StageFailed {
            stage: stage.to_string(),
            reason,
        }
    }

    /// Process exit status the CLI should report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::StageFailed { .. } => 1,
            Error::UnknownMode(_) | Error::Config(_) | Error::ConfigParse(_) => 2,
            Error::FileRead { .. } => 2,
        }
    }
}
