//! Error taxonomy shared by every addrfill component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of failure, independent of which component raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No identity token was presented.
    AuthMissing,
    /// A token was presented but failed verification.
    AuthInvalid,
    /// The identity is verified but not allowed.
    Unauthorized,
    /// Malformed caller input.
    BadRequest,
    /// The third-party service failed or answered with a non-success status.
    UpstreamError,
    /// Our own backend is unreachable or timed out.
    Unavailable,
    /// Unexpected local failure, such as an unparseable response.
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthMissing => "auth_missing",
            ErrorKind::AuthInvalid => "auth_invalid",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::InternalError => "internal_error",
        }
    }

    /// Whether the end user should be asked to sign in again.
    pub fn needs_reauthentication(&self) -> bool {
        matches!(
            self,
            ErrorKind::AuthMissing | ErrorKind::AuthInvalid | ErrorKind::Unauthorized
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_serialize() {
        let json = serde_json::to_string(&ErrorKind::UpstreamError).unwrap();
        assert_eq!(json, "\"upstream_error\"");
    }

    #[test]
    fn test_error_kind_display_matches_serde() {
        for kind in [
            ErrorKind::AuthMissing,
            ErrorKind::AuthInvalid,
            ErrorKind::Unauthorized,
            ErrorKind::BadRequest,
            ErrorKind::UpstreamError,
            ErrorKind::Unavailable,
            ErrorKind::InternalError,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json.trim_matches('"'), kind.to_string());
        }
    }

    #[test]
    fn test_needs_reauthentication() {
        assert!(ErrorKind::AuthInvalid.needs_reauthentication());
        assert!(ErrorKind::Unauthorized.needs_reauthentication());
        assert!(!ErrorKind::UpstreamError.needs_reauthentication());
        assert!(!ErrorKind::Unavailable.needs_reauthentication());
    }
}
