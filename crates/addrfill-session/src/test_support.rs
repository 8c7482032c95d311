//! Fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;
use url::Url;

use addrfill_protocols::{
    AuthorizationDecision, AutocompleteResponse, DetailsResponse, ManualClock, PlaceDetails,
    Prediction,
};

use crate::backend::Backend;
use crate::cache::{SessionCache, SessionSettings};
use crate::error::SessionError;
use crate::flow::IdentityFlow;
use crate::record::AuthorizationRecord;
use crate::store::{AuthStore, MemoryAuthStore};

pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
}

pub(crate) fn settings() -> SessionSettings {
    SessionSettings {
        auth_ttl: TimeDelta::hours(24),
        key_ttl: TimeDelta::hours(1),
        fetch_timeout: Duration::from_secs(5),
        authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
        client_id: "client-1".to_string(),
    }
}

pub(crate) struct FakeBackend {
    pub key_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub lookups: Mutex<Vec<String>>,
    pub key_result: Mutex<Result<String, String>>,
    pub key_delay: Mutex<Duration>,
    pub decision: Mutex<Result<AuthorizationDecision, String>>,
    pub lookup_delays: Mutex<HashMap<String, Duration>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            key_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            lookups: Mutex::new(Vec::new()),
            key_result: Mutex::new(Ok("AIza-test-key".to_string())),
            key_delay: Mutex::new(Duration::ZERO),
            decision: Mutex::new(Ok(AuthorizationDecision {
                authorized: true,
                email: Some("a@prostructengineering.com".to_string()),
            })),
            lookup_delays: Mutex::new(HashMap::new()),
        }
    }

    pub fn key_calls(&self) -> usize {
        self.key_calls.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    async fn record_lookup(&self, query: &str) {
        self.lookups.lock().push(query.to_string());
        let delay = self.lookup_delays.lock().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_api_key(&self) -> Result<String, SessionError> {
        self.key_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.key_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.key_result.lock().clone().map_err(SessionError::Unavailable)
    }

    async fn verify_token(&self, _id_token: &str) -> Result<AuthorizationDecision, SessionError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.decision.lock().clone().map_err(SessionError::AuthInvalid)
    }

    async fn autocomplete(&self, query: &str) -> Result<AutocompleteResponse, SessionError> {
        self.record_lookup(query).await;
        if query == "denied" {
            return Ok(AutocompleteResponse {
                predictions: Vec::new(),
                status: "REQUEST_DENIED".to_string(),
                error_message: Some("The provided API key is invalid.".to_string()),
            });
        }
        Ok(AutocompleteResponse::ok(vec![Prediction::new(
            format!("{} St, Springfield", query),
            format!("id:{}", query),
        )]))
    }

    async fn details(&self, place_id: &str) -> Result<DetailsResponse, SessionError> {
        self.record_lookup(place_id).await;
        if place_id == "missing" {
            return Ok(DetailsResponse {
                result: None,
                status: "NOT_FOUND".to_string(),
                error_message: None,
            });
        }
        Ok(DetailsResponse::ok(PlaceDetails {
            formatted_address: format!("Formatted {}", place_id),
            address_components: Vec::new(),
            extra: Default::default(),
        }))
    }
}

pub(crate) struct FakeFlow {
    pub launches: AtomicUsize,
    pub response: Mutex<Result<String, String>>,
    pub delay: Duration,
    pub last_url: Mutex<Option<Url>>,
}

impl FakeFlow {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            launches: AtomicUsize::new(0),
            response: Mutex::new(Ok(
                "https://ext.example/auth#id_token=tok&authuser=0".to_string()
            )),
            delay,
            last_url: Mutex::new(None),
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityFlow for FakeFlow {
    fn redirect_uri(&self) -> String {
        "https://ext.example/auth".to_string()
    }

    async fn launch(&self, auth_url: Url) -> Result<Url, SessionError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock() = Some(auth_url);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let response = self.response.lock().clone().map_err(SessionError::AuthFlow)?;
        Url::parse(&response).map_err(|e| SessionError::AuthFlow(e.to_string()))
    }
}

pub(crate) struct Harness {
    pub clock: ManualClock,
    pub backend: Arc<FakeBackend>,
    pub flow: Arc<FakeFlow>,
    pub store: Arc<MemoryAuthStore>,
    pub cache: Arc<SessionCache>,
}

impl Harness {
    pub fn new(flow: FakeFlow, store: MemoryAuthStore) -> Self {
        let clock = ManualClock::new(start());
        let backend = Arc::new(FakeBackend::new());
        let flow = Arc::new(flow);
        let store = Arc::new(store);
        let cache = Arc::new(SessionCache::new(
            settings(),
            Arc::new(clock.clone()),
            backend.clone(),
            flow.clone(),
            store.clone(),
        ));
        Self {
            clock,
            backend,
            flow,
            store,
            cache,
        }
    }

    pub fn empty() -> Self {
        Self::new(FakeFlow::new(), MemoryAuthStore::new())
    }

    /// A harness whose persisted record authorizes the user.
    pub fn authorized() -> Self {
        Self::new(
            FakeFlow::new(),
            MemoryAuthStore::with_record(AuthorizationRecord::new(true, start())),
        )
    }

    pub async fn persisted(&self) -> Option<AuthorizationRecord> {
        self.store.load().await.unwrap()
    }
}
