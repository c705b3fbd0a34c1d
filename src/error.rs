//! Error types for the stagepub pipeline.
//!
//! Two layers live here:
//! - [`Error`] for the ambient surface (configuration, CLI plumbing)
//! - [`FailureReason`] and friends for pipeline outcomes, which are always
//!   reported through a [`crate::download::DownloadOutcome`] and never
//!   propagate out of the coordinator.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Pipeline errors
    #[error("{0} download(s) failed")]
    Download(usize),

    #[error("Write access to shared storage was refused")]
    PermissionDenied,

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a download request did not produce a published file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("Invalid locator: nothing to download")]
    InvalidInput,

    #[error("Permission to write shared storage was denied")]
    PermissionDenied,

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Staging storage exhausted: {0}")]
    StorageExhausted(String),

    #[error("Publish failed: {0}")]
    Publish(#[from] PublishError),

    #[error("Another download is already in progress")]
    Busy,
}

/// Failure reported by a [`crate::fetch::Fetcher`]. Wraps the underlying cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status} from {locator}")]
    Status { status: u16, locator: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error while staging: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Io(err.to_string())
    }
}

/// Failure reported by the [`crate::publish::Publisher`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("storage broker rejected the entry: {0}")]
    BrokerRejected(String),

    /// Bytes may already be visible in public storage when `partial_left` is set.
    #[error("copy into public storage failed: {reason}{}", partial_note(.partial_left))]
    CopyFailed { reason: String, partial_left: bool },

    #[error("legacy storage path requires write permission")]
    PermissionRequired,

    #[error("no publish strategy available (broker unavailable, no legacy root)")]
    NoStrategy,
}

fn partial_note(partial_left: &bool) -> &'static str {
    if *partial_left {
        " (partial entry left in place)"
    } else {
        ""
    }
}

/// Exit codes for the CLI.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const PERMISSION_DENIED: i32 = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_failed_mentions_partial_entry() {
        let err = PublishError::CopyFailed {
            reason: "disk full".into(),
            partial_left: true,
        };
        assert!(err.to_string().contains("partial entry left in place"));

        let err = PublishError::CopyFailed {
            reason: "disk full".into(),
            partial_left: false,
        };
        assert!(!err.to_string().contains("partial"));
    }

    #[test]
    fn test_failure_reason_wraps_causes() {
        let reason: FailureReason = FetchError::Transport("reset".into()).into();
        assert_eq!(reason.to_string(), "Fetch failed: transport error: reset");

        let reason: FailureReason = PublishError::NoStrategy.into();
        assert!(matches!(reason, FailureReason::Publish(PublishError::NoStrategy)));
    }
}
