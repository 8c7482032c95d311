//! Domain allow-list policy.

use tracing::debug;

/// Decides whether a verified email may use the service.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    suffix: String,
}

impl AccessPolicy {
    pub fn new(allowed_domain: &str) -> Self {
        Self {
            suffix: format!("@{}", allowed_domain.trim()),
        }
    }

    /// Authorized iff the email is present and ends with `@<domain>`.
    ///
    /// Comparison is exact; `a@sub.<domain>` is not authorized.
    pub fn is_authorized(&self, email: Option<&str>) -> bool {
        let authorized = email.is_some_and(|e| e.len() > self.suffix.len() && e.ends_with(&self.suffix));
        debug!(authorized, "Access policy evaluated");
        authorized
    }

    pub fn allowed_domain(&self) -> &str {
        &self.suffix[1..]
    }
}
