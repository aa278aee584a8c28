//! Error taxonomy for the bills client.
//!
//! - [`NetworkError`]: a remote call failed (bill fetch or favorite confirmation)
//! - [`ValidationError`]: a caller passed parameters the fetch layer rejects
//! - [`PersistenceError`]: favorites storage is unavailable or unreadable
//!
//! Only fetch failures ever reach the caller, as [`FetchError`]. Confirmation
//! failures are absorbed by the favorites store (rollback plus a notice), and
//! persistence failures are logged and recovered from in memory.

use thiserror::Error;

/// A remote call failed.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Transport or body decoding failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote answered with a non-success status
    #[error("remote returned {status} {reason}")]
    Status { status: u16, reason: String },

    /// No answer within the configured bound
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The remote refused the operation
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Fetch parameters were invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("limit must be greater than 0")]
    NonPositiveLimit,
}

/// Favorites storage could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored favorites are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("stored favorites use unsupported version {0}")]
    UnsupportedVersion(u64),

    #[error("stored favorites have an unexpected shape: {0}")]
    Malformed(String),
}

/// Why a bill page could not be produced.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("invalid fetch parameters: {0}")]
    Validation(#[from] ValidationError),
}
