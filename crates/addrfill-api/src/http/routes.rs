//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Create the backend router.
///
/// ```text
/// GET /                        - Banner
/// GET /health                  - Liveness
/// GET /api/maps-key            - Shared key (legacy clients)
/// GET /auth/callback           - Verify identity token
/// GET /api/place/autocomplete  - Proxied autocomplete
/// GET /api/place/details       - Proxied place details
/// ```
///
/// Any `OPTIONS` request is answered by the CORS layer with an empty body.
pub fn create_router(state: Arc<AppState>) -> Router {
    let place_routes = Router::new()
        .route("/autocomplete", get(handlers::place_autocomplete))
        .route("/details", get(handlers::place_details));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/maps-key", get(handlers::maps_key))
        .route("/auth/callback", get(handlers::auth_callback))
        .nest("/api/place", place_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
