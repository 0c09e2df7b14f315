use anyhow::Error;
use thiserror::Error;

/// Application-level error types for gbucketremove-rs.
///
/// ## Exit Codes
///
/// Each variant maps to an exit code (via `exit_code()`):
/// - 0: Non-error conditions (Cancelled)
/// - 1: General errors (DrainFailed, Io)
/// - 2: Configuration errors (InvalidConfig, ConfigFile)
#[derive(Error, Debug, PartialEq)]
pub enum GBucketRemoveError {
    /// Configuration error (non-retryable).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read or parsed.
    #[error("Invalid configuration file: {0}")]
    ConfigFile(String),

    /// At least one bucket could not be drained in the non-interactive path.
    #[error("gbucket empty failed")]
    DrainFailed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Operation cancelled by user (Ctrl+C).
    #[error("Operation cancelled by user")]
    Cancelled,
}

impl GBucketRemoveError {
    pub fn exit_code(&self) -> i32 {
        match self {
            GBucketRemoveError::Cancelled => 0,
            GBucketRemoveError::InvalidConfig(_) | GBucketRemoveError::ConfigFile(_) => 2,
            _ => 1,
        }
    }
}

/// Failure of a single bucket drain.
///
/// Every variant names the bucket so that the orchestrator can log it and
/// decide whether to retry the whole bucket or abandon it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrainError {
    /// A listing request failed.
    #[error("listing objects in {bucket} failed: {cause}")]
    List { bucket: String, cause: String },

    /// One or more delete requests failed.
    #[error("{failed} of {total} delete requests failed in {bucket}: {cause}")]
    Delete {
        bucket: String,
        failed: usize,
        total: usize,
        cause: String,
    },

    /// The bucket still had objects after the configured number of passes.
    #[error("{bucket} is not empty after {passes} passes")]
    NotEmpty { bucket: String, passes: u32 },

    /// The drain observed a cancellation request.
    #[error("draining {bucket} has been cancelled")]
    Cancelled { bucket: String },
}

impl DrainError {
    pub fn bucket(&self) -> &str {
        match self {
            DrainError::List { bucket, .. }
            | DrainError::Delete { bucket, .. }
            | DrainError::NotEmpty { bucket, .. }
            | DrainError::Cancelled { bucket } => bucket,
        }
    }
}

/// Failure to obtain an answer from the confirmation prompt.
///
/// The confirmation gate treats every `PromptError` as a "no".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("no answer received (end of input)")]
    EndOfInput,

    #[error("failed to read answer: {0}")]
    Io(String),
}

impl From<std::io::Error> for PromptError {
    fn from(e: std::io::Error) -> Self {
        PromptError::Io(e.to_string())
    }
}

/// Check if an anyhow::Error wraps a cancellation error.
pub fn is_cancelled_error(e: &Error) -> bool {
    if let Some(err) = e.downcast_ref::<GBucketRemoveError>() {
        return *err == GBucketRemoveError::Cancelled;
    }
    if let Some(DrainError::Cancelled { .. }) = e.downcast_ref::<DrainError>() {
        return true;
    }
    false
}

/// Extract the exit code from an anyhow::Error, defaulting to 1.
pub fn exit_code_from_error(e: &Error) -> i32 {
    if let Some(err) = e.downcast_ref::<GBucketRemoveError>() {
        return err.exit_code();
    }
    1
}
