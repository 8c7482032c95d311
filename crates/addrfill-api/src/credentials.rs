//! Credential store.
//!
//! Holds the shared Places key and the identity-provider client id. Built
//! once at startup and never mutated afterwards.

use std::fmt;

use addrfill_config::CredentialsConfig;

#[derive(Clone)]
pub struct CredentialStore {
    maps_api_key: Option<String>,
    client_id: String,
}

impl CredentialStore {
    pub fn new(maps_api_key: Option<String>, client_id: impl Into<String>) -> Self {
        Self {
            maps_api_key: maps_api_key.filter(|k| !k.is_empty()),
            client_id: client_id.into(),
        }
    }

    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::new(config.maps_api_key.clone(), config.google_client_id.clone())
    }

    pub fn maps_api_key(&self) -> Option<&str> {
        self.maps_api_key.as_deref()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Short prefix of the key, safe for logs.
    pub fn key_hint(&self) -> String {
        match self.maps_api_key.as_deref() {
            Some(key) => format!("{}...", key.chars().take(5).collect::<String>()),
            None => "<unset>".to_string(),
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("maps_api_key", &self.key_hint())
            .field("client_id", &self.client_id)
            .finish()
    }
}
