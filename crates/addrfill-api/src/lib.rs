//! # addrfill API
//!
//! Backend half of addrfill: a small credential proxy that holds the shared
//! Places API key, verifies identity tokens for the client, and performs
//! address lookups so the key never has to leave the server.
//!
//! ## Routes
//!
//! ```text
//! GET /api/maps-key            legacy: hand the key to the client
//! GET /auth/callback           verify an identity token, apply the domain policy
//! GET /api/place/autocomplete  proxy an autocomplete query
//! GET /api/place/details       proxy a place details query
//! GET /health                  liveness
//! ```
//!
//! Every response carries permissive CORS headers; the client runs on an
//! extension origin we do not control.

pub mod credentials;
pub mod error;
pub mod http;
pub mod identity;
pub mod places;
pub mod policy;
pub mod server;
pub mod state;

pub use credentials::CredentialStore;
pub use error::ApiError;
pub use http::routes::create_router;
pub use identity::{IdentityVerifier, TokenClaims, TokenInfoVerifier, VerifiedIdentity};
pub use places::LookupProxy;
pub use policy::AccessPolicy;
pub use server::{InterfaceConfig, InterfaceServer};
pub use state::AppState;
