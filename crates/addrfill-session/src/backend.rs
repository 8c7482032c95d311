//! Client for our own backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use addrfill_config::ClientConfig;
use addrfill_protocols::{
    ApiKeyResponse, AuthorizationDecision, AutocompleteResponse, DetailsResponse, LookupErrorBody,
};

use crate::error::SessionError;

pub(crate) const TIMEOUT_MESSAGE: &str = "Request timeout: backend may be down or slow";

/// Calls the client makes against the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /api/maps-key`.
    async fn fetch_api_key(&self) -> Result<String, SessionError>;

    /// `GET /auth/callback`. A rejected token is [`SessionError::AuthInvalid`].
    async fn verify_token(&self, id_token: &str) -> Result<AuthorizationDecision, SessionError>;

    /// `GET /api/place/autocomplete`.
    async fn autocomplete(&self, query: &str) -> Result<AutocompleteResponse, SessionError>;

    /// `GET /api/place/details`.
    async fn details(&self, place_id: &str) -> Result<DetailsResponse, SessionError>;
}

/// reqwest-backed [`Backend`].
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(client: Client, base_url: &str) -> Result<Self, SessionError> {
        Url::parse(base_url)
            .map_err(|e| SessionError::Internal(format!("Invalid backend URL '{}': {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Backend client whose every request is bounded by the fetch timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, SessionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| SessionError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Self::new(client, &config.backend_url)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<(StatusCode, String), SessionError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(request_error)?;
        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SessionError> {
        let (status, body) = self.get(path, query).await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), path, "Backend request failed");
            return Err(lookup_error(status, &body));
        }
        parse(&body)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_api_key(&self) -> Result<String, SessionError> {
        let (status, body) = self.get("api/maps-key", &[]).await?;
        if !status.is_success() {
            return Err(SessionError::Unavailable(format!(
                "Backend error: {} {}",
                status.as_u16(),
                body
            )));
        }

        let response: ApiKeyResponse = parse(&body)?;
        if response.api_key.is_empty() {
            return Err(SessionError::Unavailable(
                "Backend did not return a valid API key".to_string(),
            ));
        }
        Ok(response.api_key)
    }

    async fn verify_token(&self, id_token: &str) -> Result<AuthorizationDecision, SessionError> {
        let (status, body) = self.get("auth/callback", &[("id_token", id_token)]).await?;
        if !status.is_success() {
            return Err(SessionError::AuthInvalid(format!(
                "backend verification failed with HTTP {}",
                status.as_u16()
            )));
        }
        parse(&body)
    }

    async fn autocomplete(&self, query: &str) -> Result<AutocompleteResponse, SessionError> {
        debug!(query_len = query.len(), "Requesting predictions");
        self.get_json("api/place/autocomplete", &[("input", query)]).await
    }

    async fn details(&self, place_id: &str) -> Result<DetailsResponse, SessionError> {
        debug!("Requesting place details");
        self.get_json("api/place/details", &[("place_id", place_id)]).await
    }
}

fn request_error(e: reqwest::Error) -> SessionError {
    if e.is_timeout() {
        SessionError::Unavailable(TIMEOUT_MESSAGE.to_string())
    } else {
        SessionError::Unavailable(e.to_string())
    }
}

/// Map a failed lookup answer onto the error taxonomy, keeping the
/// backend's message when the body carries one.
fn lookup_error(status: StatusCode, body: &str) -> SessionError {
    let message = serde_json::from_str::<LookupErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("Backend returned HTTP {}", status.as_u16()));

    match status {
        StatusCode::BAD_REQUEST => SessionError::BadRequest(message),
        StatusCode::SERVICE_UNAVAILABLE => SessionError::Unavailable(message),
        _ => SessionError::Upstream(message),
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, SessionError> {
    serde_json::from_str(body)
        .map_err(|e| SessionError::Internal(format!("Failed to parse backend response: {}", e)))
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
