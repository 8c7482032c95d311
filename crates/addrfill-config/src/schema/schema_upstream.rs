//! Identity provider and Places service endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::secs;

/// Identity provider endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Token-info endpoint that validates signatures on our behalf.
    #[serde(default = "default_tokeninfo_url")]
    pub tokeninfo_url: String,

    /// Authorization endpoint used by the client sign-in flow.
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_identity_timeout")]
    pub timeout_secs: u64,
}

impl IdentityConfig {
    pub fn timeout(&self) -> Duration {
        secs(self.timeout_secs)
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            tokeninfo_url: default_tokeninfo_url(),
            authorize_url: default_authorize_url(),
            timeout_secs: default_identity_timeout(),
        }
    }
}

fn default_tokeninfo_url() -> String {
    "https://oauth2.googleapis.com/tokeninfo".to_string()
}

fn default_authorize_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_identity_timeout() -> u64 {
    10
}

/// Places web service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    #[serde(default = "default_places_base_url")]
    pub base_url: String,

    /// Country restriction applied to every autocomplete request.
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_result_type")]
    pub result_type: String,

    #[serde(default = "default_places_timeout")]
    pub timeout_secs: u64,
}

impl PlacesConfig {
    pub fn timeout(&self) -> Duration {
        secs(self.timeout_secs)
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: default_places_base_url(),
            country: default_country(),
            result_type: default_result_type(),
            timeout_secs: default_places_timeout(),
        }
    }
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_result_type() -> String {
    "address".to_string()
}

fn default_places_timeout() -> u64 {
    10
}
