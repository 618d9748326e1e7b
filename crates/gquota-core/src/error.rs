//! Shared error type across gquota crates.

use thiserror::Error;

/// Stable error classification, used in logs and cycle reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed setting at startup.
    Config,
    /// Network, auth, or quota API failure.
    Fetch,
    /// A quota entry is missing a required field.
    MalformedRecord,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// String representation used in structured log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::Fetch => "FETCH",
            ErrorKind::MalformedRecord => "MALFORMED_RECORD",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, QuotaError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("config: {0}")]
    Config(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("malformed quota record: {0}")]
    MalformedRecord(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl QuotaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuotaError::Config(_) => ErrorKind::Config,
            QuotaError::Fetch(_) => ErrorKind::Fetch,
            QuotaError::MalformedRecord(_) => ErrorKind::MalformedRecord,
            QuotaError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Config errors are the only ones allowed to end the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, QuotaError::Config(_))
    }
}
