//! Error types for the gateway and its collaborators.
//!
//! Errors in this crate split into two tiers. [`SentinelError`] covers
//! unrecoverable resource failures: a socket that cannot be bound, a replay
//! or record file that cannot be opened, a scenario file that does not
//! validate. Per-frame rejection on the datagram path is *not* an error -
//! malformed frames are counted and the loop continues - so frame validation
//! reports through [`crate::protocol::ParseReject`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T, E = SentinelError> = std::result::Result<T, E>;

/// Unrecoverable errors surfaced by the gateway, control node and tooling.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SentinelError {
    #[error("failed to bind UDP port {port}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record stream error")]
    Record {
        #[source]
        source: std::io::Error,
    },

    #[error("scenario error: {reason}")]
    Scenario { reason: String },

    #[error("control channel error: {reason}")]
    Control { reason: String },
}

impl SentinelError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            SentinelError::Bind { .. } => false,
            SentinelError::Connect { .. } => true,
            SentinelError::File { .. } => false,
            SentinelError::Record { .. } => true,
            SentinelError::Scenario { .. } => false,
            SentinelError::Control { .. } => true,
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SentinelError::File { path: path.into(), source }
    }

    /// Helper constructor for connection errors.
    pub fn connect_failed(addr: impl Into<String>, source: std::io::Error) -> Self {
        SentinelError::Connect { addr: addr.into(), source }
    }

    /// Helper constructor for scenario validation errors.
    pub fn scenario(reason: impl Into<String>) -> Self {
        SentinelError::Scenario { reason: reason.into() }
    }

    /// Helper constructor for control-channel errors.
    pub fn control(reason: impl Into<String>) -> Self {
        SentinelError::Control { reason: reason.into() }
    }
}
