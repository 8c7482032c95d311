//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::info;

use addrfill_config::Config;
use addrfill_protocols::{AuthorizationDecision, Clock, SystemClock};

use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::identity::{IdentityVerifier, TokenInfoVerifier};
use crate::places::LookupProxy;
use crate::policy::AccessPolicy;

/// Application state shared across handlers.
pub struct AppState {
    pub credentials: CredentialStore,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub policy: AccessPolicy,
    pub places: LookupProxy,
    start_time: Instant,
}

impl AppState {
    pub fn new(
        credentials: CredentialStore,
        verifier: Arc<dyn IdentityVerifier>,
        policy: AccessPolicy,
        places: LookupProxy,
    ) -> Self {
        Self {
            credentials,
            verifier,
            policy,
            places,
            start_time: Instant::now(),
        }
    }

    /// Build the production state: token-info verifier on the system clock
    /// and a Places proxy, each with its own HTTP timeout.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let credentials = CredentialStore::from_config(&config.credentials);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let verifier = TokenInfoVerifier::new(
            http_client(config.identity.timeout())?,
            config.identity.tokeninfo_url.clone(),
            credentials.client_id(),
            clock,
        );
        let places = LookupProxy::new(
            http_client(config.places.timeout())?,
            &config.places,
            credentials.clone(),
        );

        info!(
            key = %credentials.key_hint(),
            allowed_domain = %config.credentials.allowed_domain,
            "Credential store loaded"
        );

        Ok(Self::new(
            credentials,
            Arc::new(verifier),
            AccessPolicy::new(&config.credentials.allowed_domain),
            places,
        ))
    }

    /// Verify `token` and apply the access policy.
    ///
    /// A missing token is [`ApiError::AuthMissing`]; a verified identity
    /// outside the allowed domain is a successful, negative decision.
    pub async fn authorize(&self, token: Option<&str>) -> Result<AuthorizationDecision, ApiError> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ApiError::AuthMissing)?;

        let identity = self.verifier.verify(token).await?;
        let authorized = self.policy.is_authorized(identity.email.as_deref());

        Ok(AuthorizationDecision {
            authorized,
            email: identity.email,
        })
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

fn http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))
}
