//! Two-tier session cache.
//!
//! Holds the authorization decision and the API key, each with its own TTL
//! measured against an injected [`Clock`]. Neither lookup ever blocks on the
//! identity flow: a stale authorization answers `false` straight away and
//! kicks off a fresh flow in the background.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::TimeDelta;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use addrfill_config::Config;
use addrfill_protocols::Clock;

use crate::backend::{Backend, TIMEOUT_MESSAGE};
use crate::error::SessionError;
use crate::flow::{authorization_url, extract_id_token, IdentityFlow};
use crate::record::{ApiKeyRecord, AuthorizationRecord};
use crate::store::AuthStore;

/// Cache timings and identity-flow parameters.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub auth_ttl: TimeDelta,
    pub key_ttl: TimeDelta,
    pub fetch_timeout: Duration,
    pub authorize_url: String,
    pub client_id: String,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        Ok(Self {
            auth_ttl: delta(config.client.auth_ttl())?,
            key_ttl: delta(config.client.key_ttl())?,
            fetch_timeout: config.client.fetch_timeout(),
            authorize_url: config.identity.authorize_url.clone(),
            client_id: config.credentials.google_client_id.clone(),
        })
    }
}

fn delta(duration: Duration) -> Result<TimeDelta, SessionError> {
    TimeDelta::from_std(duration)
        .map_err(|e| SessionError::Internal(format!("TTL out of range: {}", e)))
}

/// The session cache.
pub struct SessionCache {
    settings: SessionSettings,
    clock: Arc<dyn Clock>,
    backend: Arc<dyn Backend>,
    flow: Arc<dyn IdentityFlow>,
    store: Arc<dyn AuthStore>,
    auth: Mutex<Option<AuthorizationRecord>>,
    key: Mutex<Option<ApiKeyRecord>>,
    auth_in_flight: AtomicBool,
    backend_warned: AtomicBool,
    auth_tx: watch::Sender<bool>,
}

impl SessionCache {
    pub fn new(
        settings: SessionSettings,
        clock: Arc<dyn Clock>,
        backend: Arc<dyn Backend>,
        flow: Arc<dyn IdentityFlow>,
        store: Arc<dyn AuthStore>,
    ) -> Self {
        let (auth_tx, _) = watch::channel(false);
        Self {
            settings,
            clock,
            backend,
            flow,
            store,
            auth: Mutex::new(None),
            key: Mutex::new(None),
            auth_in_flight: AtomicBool::new(false),
            backend_warned: AtomicBool::new(false),
            auth_tx,
        }
    }

    /// Authorization changes, as they are recorded.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.auth_tx.subscribe()
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Cached-or-persisted authorization.
    ///
    /// When neither is valid a fresh identity flow is started in the
    /// background and a conservative `authorized: false` is returned.
    pub async fn get_authorization(self: &Arc<Self>) -> AuthorizationRecord {
        let now = self.clock.now();

        if let Some(record) = self.cached_authorization() {
            debug!(authorized = record.authorized, "Using cached authorization");
            return record;
        }

        if let Some(record) = self.load_persisted().await {
            if record.is_valid(now, self.settings.auth_ttl) {
                debug!(authorized = record.authorized, "Using stored authorization");
                *self.auth.lock() = Some(record);
                return record;
            }
        }

        debug!("No valid authorization, starting identity flow");
        self.spawn_authentication();
        AuthorizationRecord::new(false, now)
    }

    /// Run the identity flow unless the persisted decision is still valid.
    ///
    /// Returns `true` when a flow was started.
    pub async fn on_startup(self: &Arc<Self>) -> bool {
        let now = self.clock.now();
        if let Some(record) = self.load_persisted().await {
            if record.is_valid(now, self.settings.auth_ttl) {
                *self.auth.lock() = Some(record);
                self.auth_tx.send_replace(record.authorized);
                return false;
            }
        }

        info!("Authorization expired or absent, re-authenticating");
        self.spawn_authentication()
    }

    /// Start the identity flow in the background.
    ///
    /// Coalesces with a flow that is already running; returns `false` then.
    pub fn spawn_authentication(self: &Arc<Self>) -> bool {
        if self.auth_in_flight.swap(true, Ordering::AcqRel) {
            debug!("Identity flow already in flight");
            return false;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.authenticate().await;
            this.auth_in_flight.store(false, Ordering::Release);
        });
        true
    }

    /// Run the identity flow and record what the backend decided.
    ///
    /// Only a verification round-trip changes the record: a rejected token
    /// or a failed verify call records `authorized: false`. A flow that
    /// yields no token (window closed, no `id_token` in the redirect) leaves
    /// the record untouched and returns `None`, so the next lookup starts a
    /// new flow.
    pub async fn authenticate(&self) -> Option<AuthorizationRecord> {
        let token = match self.obtain_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Sign-in did not complete: {}", e);
                return None;
            }
        };

        debug!("Identity token obtained, verifying with backend");
        let authorized = match self.backend.verify_token(&token).await {
            Ok(decision) => {
                if !decision.authorized {
                    warn!("User is not authorized; features stay disabled");
                }
                decision.authorized
            }
            Err(e) => {
                warn!("Token verification failed: {}", e);
                false
            }
        };
        Some(self.record_authorization(authorized).await)
    }

    async fn obtain_token(&self) -> Result<String, SessionError> {
        let nonce = Uuid::new_v4().simple().to_string();
        let auth_url = authorization_url(
            &self.settings.authorize_url,
            &self.settings.client_id,
            &self.flow.redirect_uri(),
            &nonce,
        )?;

        let response = self.flow.launch(auth_url).await?;
        extract_id_token(&response)
    }

    async fn record_authorization(&self, authorized: bool) -> AuthorizationRecord {
        let record = AuthorizationRecord::new(authorized, self.clock.now());
        *self.auth.lock() = Some(record);

        if let Err(e) = self.store.save(&record).await {
            warn!("Failed to persist authorization: {}", e);
        }

        info!(authorized, "Authorization recorded");
        self.auth_tx.send_replace(authorized);
        record
    }

    fn cached_authorization(&self) -> Option<AuthorizationRecord> {
        let now = self.clock.now();
        self.auth
            .lock()
            .filter(|record| record.is_valid(now, self.settings.auth_ttl))
    }

    async fn load_persisted(&self) -> Option<AuthorizationRecord> {
        match self.store.load().await {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unreadable authorization record: {}", e);
                None
            }
        }
    }

    /// Cached-or-fetched API key.
    ///
    /// The fetch is bounded by the configured timeout. A failure leaves the
    /// previous record untouched and surfaces the backend's message.
    pub async fn get_api_key(&self) -> Result<String, SessionError> {
        let now = self.clock.now();
        let cached = self
            .key
            .lock()
            .as_ref()
            .filter(|record| record.is_valid(now, self.settings.key_ttl))
            .map(|record| record.key.clone());
        if let Some(key) = cached {
            debug!("Using cached API key");
            return Ok(key);
        }

        let fetched = tokio::time::timeout(self.settings.fetch_timeout, self.backend.fetch_api_key())
            .await
            .unwrap_or_else(|_| Err(SessionError::Unavailable(TIMEOUT_MESSAGE.to_string())));

        match fetched {
            Ok(key) => {
                let record = ApiKeyRecord::new(key, self.clock.now());
                info!(key = %record.hint(), "Received API key from backend");
                let key = record.key.clone();
                *self.key.lock() = Some(record);
                Ok(key)
            }
            Err(e) => {
                warn!("Failed to fetch API key: {}", e);
                if !self.backend_warned.swap(true, Ordering::Relaxed) {
                    warn!(
                        "Unable to fetch the API key from the backend; check that it is deployed and configured"
                    );
                }
                Err(match e {
                    SessionError::Unavailable(message) => SessionError::Unavailable(message),
                    other => SessionError::Unavailable(other.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
