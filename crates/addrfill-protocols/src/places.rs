//! Place lookup payloads.
//!
//! Field names follow the upstream Places web service so that responses can
//! be passed through unchanged. Fields we do not model are preserved in
//! `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_OK: &str = "OK";
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
pub const STATUS_ERROR: &str = "ERROR";

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Prediction {
    pub fn new(description: impl Into<String>, place_id: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            place_id: place_id.into(),
            extra: Map::new(),
        }
    }
}

/// One component of a resolved address (street number, route, locality...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Resolved place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlaceDetails {
    /// First component carrying `kind` in its types, if any.
    pub fn component(&self, kind: &str) -> Option<&AddressComponent> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
    }
}

/// Autocomplete response, both upstream and on our own surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AutocompleteResponse {
    pub fn ok(predictions: Vec<Prediction>) -> Self {
        Self {
            predictions,
            status: STATUS_OK.to_string(),
            error_message: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Details response, both upstream and on our own surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PlaceDetails>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DetailsResponse {
    pub fn ok(result: PlaceDetails) -> Self {
        Self {
            result: Some(result),
            status: STATUS_OK.to_string(),
            error_message: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Error body of the lookup routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupErrorBody {
    pub error: String,
    pub status: String,
}

impl LookupErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: STATUS_ERROR.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "places_tests.rs"]
mod tests;
