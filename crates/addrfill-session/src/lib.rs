//! # addrfill session
//!
//! The long-lived client process. It owns the two-tier session cache
//! (authorization decision and API key, each with its own TTL), drives the
//! identity flow, answers messages from the popup and content surfaces, and
//! debounces popup input into lookups.
//!
//! ## Message protocol
//!
//! ```text
//! {action:"authenticateUser"}                 -> {status}
//! {action:"checkAuthorization"}               -> {isAuthorized}
//! {action:"getPlacePredictions", query}       -> {predictions} | {error}
//! {action:"getPlaceDetails", placeId}         -> {place} | {error}
//! {action:"getApiKey"}                        -> {apiKey} | {error}
//! ```

pub mod backend;
pub mod cache;
pub mod debounce;
pub mod error;
pub mod flow;
pub mod popup;
pub mod record;
pub mod router;
pub mod store;

#[cfg(test)]
mod test_support;

pub use backend::{Backend, HttpBackend};
pub use cache::{SessionCache, SessionSettings};
pub use debounce::{QueryDebouncer, Ticket};
pub use error::SessionError;
pub use flow::{authorization_url, extract_id_token, IdentityFlow};
pub use popup::{AddressInput, SuggestionEvent};
pub use record::{ApiKeyRecord, AuthorizationRecord};
pub use router::{MessageRouter, Request, Response};
pub use store::{AuthStore, FileAuthStore, MemoryAuthStore};
