//! Places lookup proxy.
//!
//! Forwards autocomplete and details queries to the Places web service with
//! the server-held key attached. The key never appears in a response.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use addrfill_config::PlacesConfig;
use addrfill_protocols::{
    AutocompleteResponse, DetailsResponse, PlaceDetails, Prediction, STATUS_OK,
    STATUS_ZERO_RESULTS,
};

use crate::credentials::CredentialStore;
use crate::error::ApiError;

const DETAILS_FIELDS: &str = "formatted_address,address_components";

/// Places lookup proxy.
pub struct LookupProxy {
    client: Client,
    base_url: String,
    country: String,
    result_type: String,
    credentials: CredentialStore,
}

impl LookupProxy {
    pub fn new(client: Client, config: &PlacesConfig, credentials: CredentialStore) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country: config.country.clone(),
            result_type: config.result_type.clone(),
            credentials,
        }
    }

    /// Address suggestions for `input`, restricted to the configured
    /// country and result type.
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>, ApiError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ApiError::BadRequest("Missing input parameter".to_string()));
        }
        let key = self.key()?;

        debug!(input_len = input.len(), "Forwarding autocomplete request");

        let components = format!("country:{}", self.country);
        let response: AutocompleteResponse = self
            .get_json(
                "autocomplete/json",
                &[
                    ("input", input),
                    ("types", self.result_type.as_str()),
                    ("components", components.as_str()),
                    ("key", key),
                ],
            )
            .await?;

        match response.status.as_str() {
            STATUS_OK => Ok(response.predictions),
            STATUS_ZERO_RESULTS => Ok(Vec::new()),
            other => Err(upstream_status(other, response.error_message)),
        }
    }

    /// Resolve a place id to its formatted address and components.
    pub async fn details(&self, place_id: &str) -> Result<PlaceDetails, ApiError> {
        let place_id = place_id.trim();
        if place_id.is_empty() {
            return Err(ApiError::BadRequest("Missing place_id parameter".to_string()));
        }
        let key = self.key()?;

        debug!("Forwarding place details request");

        let response: DetailsResponse = self
            .get_json(
                "details/json",
                &[
                    ("place_id", place_id),
                    ("fields", DETAILS_FIELDS),
                    ("key", key),
                ],
            )
            .await?;

        if response.status != STATUS_OK {
            return Err(upstream_status(&response.status, response.error_message));
        }
        response
            .result
            .ok_or_else(|| ApiError::Upstream("Details response had no result".to_string()))
    }

    fn key(&self) -> Result<&str, ApiError> {
        self.credentials
            .maps_api_key()
            .ok_or(ApiError::KeyNotConfigured)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the URL, which carries the key.
                let e = e.without_url();
                warn!("Places request failed: {}", e);
                ApiError::Upstream(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Upstream(e.without_url().to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Places service returned an error");
            return Err(ApiError::Upstream(format!(
                "Places service returned HTTP {}",
                status.as_u16()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Internal(format!("Failed to parse Places response: {}", e)))
    }
}

fn upstream_status(status: &str, message: Option<String>) -> ApiError {
    warn!(status, "Places service returned non-OK status");
    match message {
        Some(message) => ApiError::Upstream(format!("{}: {}", status, message)),
        None => ApiError::Upstream(status.to_string()),
    }
}

#[cfg(test)]
#[path = "places_tests.rs"]
mod tests;
