//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

mod schema_client;
mod schema_upstream;

pub use schema_client::*;
pub use schema_upstream::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub places: PlacesConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Shared secrets and the identity-provider client identifier.
///
/// Loaded once at startup. The key is kept out of `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_api_key: Option<String>,

    #[serde(default)]
    pub google_client_id: String,

    #[serde(default = "default_allowed_domain")]
    pub allowed_domain: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            maps_api_key: None,
            google_client_id: String::new(),
            allowed_domain: default_allowed_domain(),
        }
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "maps_api_key",
                &self.maps_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("google_client_id", &self.google_client_id)
            .field("allowed_domain", &self.allowed_domain)
            .finish()
    }
}

fn default_allowed_domain() -> String {
    "prostructengineering.com".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
