use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain error codes for the tracking service.
/// Client faults (bad input, unknown ids, credential problems) are separated
/// from server faults so the transport layer can map them to stable statuses.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    #[error("missing {0}")]
    MissingField(String),

    #[error("{0}")]
    OutOfRange(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("capability token required")]
    MissingToken,

    #[error("capability token rejected")]
    InvalidToken,

    #[error("{0}")]
    ServerError(String),
}

impl Error {
    /// Returns the stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::OutOfRange(_) => "out_of_range",
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::ServerError(_) => "server_error",
        }
    }

    /// True for faults the caller can correct.
    #[must_use]
    pub const fn is_client_fault(&self) -> bool {
        !matches!(self, Self::ServerError(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<Self>() {
            Ok(domain) => domain,
            Err(err) => {
                let stack = err.chain().fold(String::new(), |cause, e| format!("{cause} -> {e}"));
                Self::ServerError(stack.trim_start_matches(" -> ").to_string())
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
