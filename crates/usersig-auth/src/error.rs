//! Error types.

use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
///
/// Issuance only fails when the issue time cannot be read. The remaining
/// variants wrap library errors that are unreachable for in-memory inputs
/// but are propagated rather than unwrapped.
#[derive(Debug, Error)]
pub enum Error {
    /// The clock could not produce a time since the Unix epoch.
    #[error("clock unavailable: {0}")]
    Clock(String),

    /// The secret key was rejected by the MAC.
    #[error("invalid signing key: {0}")]
    Key(String),

    /// Base64 text could not be decoded.
    #[error("invalid base64: {0}")]
    Decode(String),

    /// Envelope serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// zlib encoder error.
    #[error("compression failed: {0}")]
    Compress(#[from] std::io::Error),
}
