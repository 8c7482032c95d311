//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::resolve_paths(&mut config);
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides are applied in both cases.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            let mut config = Config::default();
            Self::resolve_paths(&mut config);
            config
        };
        Self::apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Apply the process environment on top of `config`.
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides resolved through `lookup`.
    ///
    /// Recognised names: `PORT`, `GOOGLE_MAPS_API_KEY`, `GOOGLE_CLIENT_ID`,
    /// `ALLOWED_EMAIL_DOMAIN`, `ADDRFILL_BACKEND_URL`.
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            config.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                message: format!("'{}' is not a valid port", port),
            })?;
        }
        if let Some(key) = lookup("GOOGLE_MAPS_API_KEY").filter(|v| !v.is_empty()) {
            config.credentials.maps_api_key = Some(key);
        }
        if let Some(client_id) = lookup("GOOGLE_CLIENT_ID") {
            config.credentials.google_client_id = client_id;
        }
        if let Some(domain) = lookup("ALLOWED_EMAIL_DOMAIN") {
            config.credentials.allowed_domain = domain;
        }
        if let Some(url) = lookup("ADDRFILL_BACKEND_URL") {
            config.client.backend_url = url;
        }
        Ok(())
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        static VAR_RE: OnceLock<Regex> = OnceLock::new();
        let re = VAR_RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    fn resolve_paths(config: &mut Config) {
        config.client.state_path = Self::expand_pathbuf(&config.client.state_path);
        if let Some(dir) = config.logging.dir.as_ref() {
            config.logging.dir = Some(Self::expand_pathbuf(dir));
        }
    }

    fn expand_pathbuf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }

    /// Expand shell-style paths (e.g., `~/.addrfill`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
