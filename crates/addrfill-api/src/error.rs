//! Backend error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use addrfill_protocols::{AuthErrorBody, ErrorBody, ErrorKind, LookupErrorBody};

/// Backend error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No identity token in the request.
    #[error("Missing ID token")]
    AuthMissing,

    /// Token present but rejected.
    #[error("Invalid token: {0}")]
    AuthInvalid(String),

    /// Verified identity outside the allowed domain.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed caller input.
    #[error("{0}")]
    BadRequest(String),

    /// The Places service failed or answered with a non-success status.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The shared key was never configured.
    #[error("API key not configured on the server")]
    KeyNotConfigured,

    /// Unexpected local failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::AuthMissing => ErrorKind::AuthMissing,
            ApiError::AuthInvalid(_) => ErrorKind::AuthInvalid,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::BadRequest(_) => ErrorKind::BadRequest,
            ApiError::Upstream(_) => ErrorKind::UpstreamError,
            ApiError::KeyNotConfigured | ApiError::Internal(_) => ErrorKind::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::AuthMissing | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::AuthInvalid => StatusCode::UNAUTHORIZED,
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::UpstreamError | ErrorKind::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Render with the `{error, authorized:false}` body of the auth route.
    pub fn into_auth_response(self) -> Response {
        (self.status(), Json(AuthErrorBody::new(self.to_string()))).into_response()
    }

    /// Render with the `{error, status:"ERROR"}` body of the lookup routes.
    pub fn into_lookup_response(self) -> Response {
        (self.status(), Json(LookupErrorBody::new(self.to_string()))).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::AuthMissing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::AuthInvalid("expired".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unauthorized("a@other.com".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::BadRequest("Missing input parameter".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream("REQUEST_DENIED".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::KeyNotConfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ApiError::AuthMissing.kind(), ErrorKind::AuthMissing);
        assert_eq!(
            ApiError::Upstream("x".into()).kind(),
            ErrorKind::UpstreamError
        );
        assert_eq!(ApiError::KeyNotConfigured.kind(), ErrorKind::InternalError);
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(ApiError::AuthMissing.to_string(), "Missing ID token");
        assert_eq!(
            ApiError::AuthInvalid("Token expired".into()).to_string(),
            "Invalid token: Token expired"
        );
        assert_eq!(
            ApiError::KeyNotConfigured.to_string(),
            "API key not configured on the server"
        );
    }

    #[test]
    fn test_auth_response_status() {
        let response = ApiError::AuthInvalid("bad".into()).into_auth_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_lookup_response_status() {
        let response = ApiError::BadRequest("Missing place_id parameter".into())
            .into_lookup_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
