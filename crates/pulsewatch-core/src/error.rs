//! Shared error type across pulsewatch crates.

use thiserror::Error;

/// Machine-readable error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Storage backend unreachable or erroring.
    BackendUnavailable,
    /// Malformed caller input.
    InvalidInput,
    /// Unexpected failure inside the server.
    Internal,
    /// Configuration rejected at startup.
    BadConfig,
    /// Unsupported config schema version.
    UnsupportedVersion,
}

impl ErrorCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BackendUnavailable => "BACKEND_UNAVAILABLE",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Internal => "INTERNAL_ERROR",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PulseError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal fault: {0}")]
    InternalFault(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
}

impl PulseError {
    /// Map internal error to a stable client-facing code.
    pub fn code(&self) -> ErrorCode {
        match self {
            PulseError::BackendUnavailable(_) => ErrorCode::BackendUnavailable,
            PulseError::InvalidInput(_) => ErrorCode::InvalidInput,
            PulseError::InternalFault(_) => ErrorCode::Internal,
            PulseError::BadConfig(_) => ErrorCode::BadConfig,
            PulseError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
        }
    }

    /// Whether the failure came from the storage backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, PulseError::BackendUnavailable(_))
    }
}
