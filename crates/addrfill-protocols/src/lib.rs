//! # addrfill protocols
//!
//! Wire-level types exchanged between the credential proxy backend and the
//! client background process, plus the error taxonomy both sides report in.

pub mod auth;
pub mod clock;
pub mod error;
pub mod places;

pub use auth::{ApiKeyResponse, AuthErrorBody, AuthorizationDecision, ErrorBody};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ErrorKind;
pub use places::{
    AddressComponent, AutocompleteResponse, DetailsResponse, LookupErrorBody, PlaceDetails,
    Prediction, STATUS_ERROR, STATUS_OK, STATUS_ZERO_RESULTS,
};
