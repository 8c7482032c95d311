//! Authorization and credential payloads.

use serde::{Deserialize, Serialize};

/// Outcome of verifying an identity token and applying the access policy.
///
/// Carries nothing about the subject beyond the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub authorized: bool,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthorizationDecision {
    pub fn denied() -> Self {
        Self {
            authorized: false,
            email: None,
        }
    }
}

/// Error body of the `/auth/callback` route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthErrorBody {
    pub error: String,
    pub authorized: bool,
}

impl AuthErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            authorized: false,
        }
    }
}

/// Body of a successful `/api/maps-key` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key: String,
}

/// Plain `{error}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
