//! Unified error taxonomy shared by every core component.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kinds surfaced across the control plane.
///
/// Each variant carries the minimal context a caller needs; the mapping to
/// transport-level status codes lives in [`CoreError::http_status`] rather
/// than in the transport layer, so every consumer (HTTP, CLI, tests) agrees.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("unknown terminal: {0}")]
    UnknownTerminal(String),

    #[error("multiplexer unavailable: {0}")]
    MultiplexerUnavailable(String),

    #[error("no response found in captured output")]
    ParseNoResponse,

    #[error("extracted response was empty")]
    ParseEmptyResponse,

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("delivery failed for message {message_id}: {reason}")]
    DeliveryFailure { message_id: String, reason: String },

    #[error("invalid argument: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable wire-format code for each [`CoreError`] variant, independent of
/// the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Timeout,
    UnknownTerminal,
    MultiplexerUnavailable,
    ParseNoResponse,
    ParseEmptyResponse,
    PersistenceFailure,
    DeliveryFailure,
    BadRequest,
    Internal,
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::UnknownTerminal(_) => ErrorCode::UnknownTerminal,
            Self::MultiplexerUnavailable(_) => ErrorCode::MultiplexerUnavailable,
            Self::ParseNoResponse => ErrorCode::ParseNoResponse,
            Self::ParseEmptyResponse => ErrorCode::ParseEmptyResponse,
            Self::PersistenceFailure(_) => ErrorCode::PersistenceFailure,
            Self::DeliveryFailure { .. } => ErrorCode::DeliveryFailure,
            Self::BadRequest(_) => ErrorCode::BadRequest,
            Self::Other(_) => ErrorCode::Internal,
        }
    }
}

impl ErrorCode {
    /// HTTP status this error should be surfaced as at the API boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Timeout => 504,
            Self::UnknownTerminal => 404,
            Self::MultiplexerUnavailable => 503,
            Self::ParseNoResponse => 422,
            Self::ParseEmptyResponse => 422,
            Self::PersistenceFailure => 500,
            Self::DeliveryFailure => 502,
            Self::BadRequest => 400,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::UnknownTerminal => "UNKNOWN_TERMINAL",
            Self::MultiplexerUnavailable => "MULTIPLEXER_UNAVAILABLE",
            Self::ParseNoResponse => "PARSE_NO_RESPONSE",
            Self::ParseEmptyResponse => "PARSE_EMPTY_RESPONSE",
            Self::PersistenceFailure => "PERSISTENCE_FAILURE",
            Self::DeliveryFailure => "DELIVERY_FAILURE",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
