//! Client background process settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::secs;

/// Settings for the long-lived client process and the popup input path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_auth_ttl")]
    pub auth_ttl_secs: u64,

    #[serde(default = "default_key_ttl")]
    pub key_ttl_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,

    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    /// Where the authorization decision is persisted.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

impl ClientConfig {
    pub fn auth_ttl(&self) -> Duration {
        secs(self.auth_ttl_secs)
    }

    pub fn key_ttl(&self) -> Duration {
        secs(self.key_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            auth_ttl_secs: default_auth_ttl(),
            key_ttl_secs: default_key_ttl(),
            fetch_timeout_ms: default_fetch_timeout(),
            debounce_ms: default_debounce(),
            min_query_len: default_min_query_len(),
            state_path: default_state_path(),
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_auth_ttl() -> u64 {
    24 * 60 * 60
}

fn default_key_ttl() -> u64 {
    60 * 60
}

fn default_fetch_timeout() -> u64 {
    5_000
}

fn default_debounce() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    3
}

fn default_state_path() -> PathBuf {
    PathBuf::from("~/.addrfill/auth.json")
}
