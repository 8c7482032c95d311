//! Configuration validation.

use url::Url;

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_credentials(config, &mut result);
        Self::validate_urls(config, &mut result);
        Self::validate_client(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_credentials(config: &Config, result: &mut ValidationResult) {
        let creds = &config.credentials;

        if creds.maps_api_key.as_deref().is_none_or(str::is_empty) {
            result.add_warning(ValidationWarning::new(
                "credentials.maps_api_key",
                "No Maps API key configured; key and lookup routes will fail",
            ));
        }

        if creds.google_client_id.is_empty() {
            result.add_warning(ValidationWarning::new(
                "credentials.google_client_id",
                "No client id configured; every identity token will be rejected",
            ));
        }

        let domain = creds.allowed_domain.trim();
        if domain.is_empty() || domain.contains('@') || !domain.contains('.') {
            result.add_error(ValidationError::new(
                "credentials.allowed_domain",
                format!("'{}' is not a bare domain name", creds.allowed_domain),
            ));
        }
    }

    fn validate_urls(config: &Config, result: &mut ValidationResult) {
        let urls = [
            ("identity.tokeninfo_url", &config.identity.tokeninfo_url),
            ("identity.authorize_url", &config.identity.authorize_url),
            ("places.base_url", &config.places.base_url),
            ("client.backend_url", &config.client.backend_url),
        ];

        for (path, value) in urls {
            match Url::parse(value) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => result.add_error(ValidationError::new(
                    path,
                    format!("Unsupported scheme '{}'", url.scheme()),
                )),
                Err(e) => result.add_error(ValidationError::new(path, e.to_string())),
            }
        }
    }

    fn validate_client(config: &Config, result: &mut ValidationResult) {
        let client = &config.client;

        if client.auth_ttl_secs == 0 {
            result.add_error(ValidationError::new(
                "client.auth_ttl_secs",
                "auth_ttl_secs must be greater than 0",
            ));
        }

        if client.key_ttl_secs == 0 {
            result.add_error(ValidationError::new(
                "client.key_ttl_secs",
                "key_ttl_secs must be greater than 0",
            ));
        }

        if client.fetch_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "client.fetch_timeout_ms",
                "fetch_timeout_ms must be greater than 0",
            ));
        }

        if client.min_query_len == 0 {
            result.add_warning(ValidationWarning::new(
                "client.min_query_len",
                "min_query_len of 0 sends a lookup for every keystroke",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
