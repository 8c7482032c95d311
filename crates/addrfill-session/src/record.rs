//! Cached session records.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// The authorization decision and when it was made.
///
/// Persisted as `{"isAuthorized": bool, "authCheckedTime": <epoch ms>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    #[serde(rename = "isAuthorized")]
    pub authorized: bool,
    #[serde(rename = "authCheckedTime", with = "chrono::serde::ts_milliseconds")]
    pub checked_at: DateTime<Utc>,
}

impl AuthorizationRecord {
    pub fn new(authorized: bool, checked_at: DateTime<Utc>) -> Self {
        Self {
            authorized,
            checked_at,
        }
    }

    /// Valid while `now - checked_at < ttl`.
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.checked_at) < ttl
    }
}

/// A fetched API key. Memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub key: String,
    pub fetched_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    pub fn new(key: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            fetched_at,
        }
    }

    /// Valid while `now - fetched_at < ttl`.
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl
    }

    /// Loggable form of the key.
    pub fn hint(&self) -> String {
        let prefix: String = self.key.chars().take(5).collect();
        format!("{}...", prefix)
    }
}

impl std::fmt::Debug for ApiKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyRecord")
            .field("key", &self.hint())
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}
