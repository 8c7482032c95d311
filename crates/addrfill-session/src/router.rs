//! Message routing between the background process and its surfaces.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use addrfill_protocols::{PlaceDetails, Prediction};

use crate::cache::SessionCache;
use crate::error::SessionError;

pub(crate) const REAUTHENTICATE: &str =
    "Not authorized. Sign in with your company account from the extension popup and try again.";

/// Incoming message, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    AuthenticateUser,
    CheckAuthorization,
    GetPlacePredictions {
        query: String,
    },
    GetPlaceDetails {
        #[serde(rename = "placeId")]
        place_id: String,
    },
    GetApiKey,
}

/// Reply to a [`Request`]. Every request gets exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Status {
        status: String,
    },
    Authorization {
        #[serde(rename = "isAuthorized")]
        is_authorized: bool,
    },
    Predictions {
        predictions: Vec<Prediction>,
    },
    Place {
        place: PlaceDetails,
    },
    ApiKey {
        #[serde(rename = "apiKey")]
        api_key: String,
    },
    Error {
        error: String,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

impl From<SessionError> for Response {
    fn from(e: SessionError) -> Self {
        Self::error(e.to_string())
    }
}

/// Dispatches messages to the session cache and the backend.
pub struct MessageRouter {
    cache: Arc<SessionCache>,
}

impl MessageRouter {
    pub fn new(cache: Arc<SessionCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// Handle a raw JSON message. Malformed messages are answered with an
    /// error rather than dropped.
    pub async fn handle_value(&self, message: Value) -> Value {
        let response = match serde_json::from_value::<Request>(message) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                error!("Unrecognised message: {}", e);
                Response::error(format!("Unrecognised message: {}", e))
            }
        };
        serde_json::to_value(&response)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
    }

    pub async fn handle(&self, request: Request) -> Response {
        debug!(?request, "Received message");

        match request {
            Request::AuthenticateUser => {
                self.cache.spawn_authentication();
                Response::Status {
                    status: "Authentication started".to_string(),
                }
            }
            Request::CheckAuthorization => Response::Authorization {
                is_authorized: self.cache.get_authorization().await.authorized,
            },
            Request::GetPlacePredictions { query } => self
                .predictions(&query)
                .await
                .map(|predictions| Response::Predictions { predictions })
                .unwrap_or_else(Response::from),
            Request::GetPlaceDetails { place_id } => self
                .details(&place_id)
                .await
                .map(|place| Response::Place { place })
                .unwrap_or_else(Response::from),
            Request::GetApiKey => match self.require_authorization().await {
                Ok(()) => self
                    .cache
                    .get_api_key()
                    .await
                    .map(|api_key| Response::ApiKey { api_key })
                    .unwrap_or_else(Response::from),
                Err(e) => e.into(),
            },
        }
    }

    async fn require_authorization(&self) -> Result<(), SessionError> {
        if self.cache.get_authorization().await.authorized {
            Ok(())
        } else {
            info!("Rejecting lookup from unauthorized user");
            Err(SessionError::Unauthorized(REAUTHENTICATE.to_string()))
        }
    }

    async fn predictions(&self, query: &str) -> Result<Vec<Prediction>, SessionError> {
        self.require_authorization().await?;

        let response = self.cache.backend().autocomplete(query).await?;
        if !response.is_ok() {
            return Err(SessionError::Upstream(
                response
                    .error_message
                    .unwrap_or_else(|| "Failed to get predictions".to_string()),
            ));
        }
        debug!(count = response.predictions.len(), "Predictions received");
        Ok(response.predictions)
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails, SessionError> {
        self.require_authorization().await?;

        let response = self.cache.backend().details(place_id).await?;
        match response.result {
            Some(place) if response.status == addrfill_protocols::STATUS_OK => Ok(place),
            _ => Err(SessionError::Upstream(
                response
                    .error_message
                    .unwrap_or_else(|| "Failed to get place details".to_string()),
            )),
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
