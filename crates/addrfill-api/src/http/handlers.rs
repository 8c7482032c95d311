//! Route handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use addrfill_protocols::{ApiKeyResponse, AutocompleteResponse, DetailsResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// Query of `/auth/callback`.
#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub id_token: Option<String>,
}

/// Query of `/api/place/autocomplete`.
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub input: Option<String>,
}

/// Query of `/api/place/details`.
#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    pub place_id: Option<String>,
}

/// `GET /api/maps-key`: hand the shared key to a legacy client.
pub async fn maps_key(State(state): State<Arc<AppState>>) -> Response {
    match state.credentials.maps_api_key() {
        Some(key) => {
            info!(key = %state.credentials.key_hint(), "Serving Maps API key");
            Json(ApiKeyResponse {
                api_key: key.to_string(),
            })
            .into_response()
        }
        None => {
            error!("Maps API key requested but not configured");
            ApiError::KeyNotConfigured.into_response()
        }
    }
}

/// `GET /auth/callback`: verify an identity token and apply the policy.
pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthCallbackQuery>,
) -> Response {
    match state.authorize(query.id_token.as_deref()).await {
        Ok(decision) => {
            info!(authorized = decision.authorized, "Identity token verified");
            Json(decision).into_response()
        }
        Err(e) => {
            warn!("Identity verification failed: {}", e);
            e.into_auth_response()
        }
    }
}

/// `GET /api/place/autocomplete`.
pub async fn place_autocomplete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AutocompleteQuery>,
) -> Response {
    let input = query.input.unwrap_or_default();
    match state.places.autocomplete(&input).await {
        Ok(predictions) => Json(AutocompleteResponse::ok(predictions)).into_response(),
        Err(e) => {
            warn!("Autocomplete failed: {}", e);
            e.into_lookup_response()
        }
    }
}

/// `GET /api/place/details`.
pub async fn place_details(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetailsQuery>,
) -> Response {
    let place_id = query.place_id.unwrap_or_default();
    match state.places.details(&place_id).await {
        Ok(place) => Json(DetailsResponse::ok(place)).into_response(),
        Err(e) => {
            warn!("Place details failed: {}", e);
            e.into_lookup_response()
        }
    }
}

/// `GET /`: plain-text banner.
pub async fn index() -> &'static str {
    "addrfill address autocomplete proxy - use /api/maps-key to get the Maps API key"
}

/// `GET /health`.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime().as_secs(),
    }))
}

/// Fallback for unknown paths.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
