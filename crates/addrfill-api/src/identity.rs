//! Identity token verification.
//!
//! Signature checks are delegated to the provider's token-info endpoint.
//! The claims it returns are then checked locally against our client id and
//! the current time.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use addrfill_protocols::Clock;

use crate::error::ApiError;

const VALID_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: String,
    /// Absent when the provider reports the address as unverified.
    pub email: Option<String>,
}

/// Verifies identity tokens.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Fails with [`ApiError::AuthInvalid`] on any verification or network
    /// failure.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ApiError>;
}

/// Claims as reported by the token-info endpoint.
///
/// The endpoint encodes numbers and booleans as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub aud: String,
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub email_verified: Option<bool>,
    #[serde(deserialize_with = "lenient_i64")]
    pub exp: i64,
}

impl TokenClaims {
    /// Check audience, issuer and expiry.
    pub fn check(
        self,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedIdentity, ApiError> {
        if client_id.is_empty() || self.aud != client_id {
            return Err(ApiError::AuthInvalid(
                "Token audience does not match".to_string(),
            ));
        }
        if !VALID_ISSUERS.contains(&self.iss.as_str()) {
            return Err(ApiError::AuthInvalid(format!(
                "Unexpected issuer '{}'",
                self.iss
            )));
        }
        if now.timestamp() > self.exp {
            return Err(ApiError::AuthInvalid("Token used too late".to_string()));
        }

        let email = match self.email_verified {
            Some(false) => None,
            _ => self.email,
        };

        Ok(VerifiedIdentity {
            subject: self.sub,
            email,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenInfoError {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Verifier backed by the provider's token-info endpoint.
pub struct TokenInfoVerifier {
    client: Client,
    tokeninfo_url: String,
    client_id: String,
    clock: Arc<dyn Clock>,
}

impl TokenInfoVerifier {
    pub fn new(
        client: Client,
        tokeninfo_url: impl Into<String>,
        client_id: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            tokeninfo_url: tokeninfo_url.into(),
            client_id: client_id.into(),
            clock,
        }
    }
}

#[async_trait]
impl IdentityVerifier for TokenInfoVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::AuthInvalid("Malformed token".to_string()));
        }

        debug!("Verifying identity token with provider");

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| {
                warn!("Token-info request failed: {}", e);
                ApiError::AuthInvalid(format!("Provider unreachable: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::AuthInvalid(format!("Provider unreachable: {}", e)))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<TokenInfoError>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| format!("provider answered {}", status.as_u16()));
            return Err(ApiError::AuthInvalid(reason));
        }

        let claims: TokenClaims = serde_json::from_str(&body)
            .map_err(|e| ApiError::AuthInvalid(format!("Malformed token claims: {}", e)))?;

        claims.check(&self.client_id, self.clock.now())
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Str(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Bool(b)) => Some(b),
        Some(Raw::Str(s)) => Some(s.eq_ignore_ascii_case("true")),
        None => None,
    })
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
