//! Persistence of the authorization decision.
//!
//! Only the authorization record survives a restart; the API key is never
//! written anywhere.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::SessionError;
use crate::record::AuthorizationRecord;

/// Authorization record storage.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Load the persisted record, if any.
    async fn load(&self) -> Result<Option<AuthorizationRecord>, SessionError>;

    /// Replace the persisted record.
    async fn save(&self, record: &AuthorizationRecord) -> Result<(), SessionError>;
}

/// In-memory store for testing.
#[derive(Default)]
pub struct MemoryAuthStore {
    record: tokio::sync::RwLock<Option<AuthorizationRecord>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `record`.
    pub fn with_record(record: AuthorizationRecord) -> Self {
        Self {
            record: tokio::sync::RwLock::new(Some(record)),
        }
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn load(&self) -> Result<Option<AuthorizationRecord>, SessionError> {
        Ok(*self.record.read().await)
    }

    async fn save(&self, record: &AuthorizationRecord) -> Result<(), SessionError> {
        *self.record.write().await = Some(*record);
        Ok(())
    }
}

/// Flat JSON file holding one record.
pub struct FileAuthStore {
    path: PathBuf,
}

impl FileAuthStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl AuthStore for FileAuthStore {
    async fn load(&self) -> Result<Option<AuthorizationRecord>, SessionError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        let record = serde_json::from_str(&content)?;
        debug!("Loaded authorization record from {:?}", self.path);
        Ok(Some(record))
    }

    async fn save(&self, record: &AuthorizationRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string(record)?;
        fs::write(&self.path, content).await?;
        debug!("Saved authorization record to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
