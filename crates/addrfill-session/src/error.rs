//! Session errors.

use thiserror::Error;

use addrfill_protocols::ErrorKind;

/// Session error types.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Our backend is unreachable or timed out.
    #[error("{0}")]
    Unavailable(String),

    /// The caller is not authorized; carries the call-to-action.
    #[error("{0}")]
    Unauthorized(String),

    /// The backend reached the lookup service, which refused the request.
    #[error("{0}")]
    Upstream(String),

    /// The backend refused the request as malformed.
    #[error("{0}")]
    BadRequest(String),

    /// The identity flow produced no usable token.
    #[error("Authentication flow failed: {0}")]
    AuthFlow(String),

    /// The backend rejected the identity token.
    #[error("Token rejected: {0}")]
    AuthInvalid(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Upstream(_) => ErrorKind::UpstreamError,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::AuthFlow(_) => ErrorKind::AuthMissing,
            Self::AuthInvalid(_) => ErrorKind::AuthInvalid,
            Self::Serialization(_) | Self::Io(_) | Self::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
