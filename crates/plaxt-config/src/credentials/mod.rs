//! Keyed persistence of Trakt credentials.
//!
//! Every backend implements [`CredentialStore`]. Each single operation is
//! atomic for its key; sequences of operations (get then put) are not.

mod disk;
mod memory;
mod postgres;
mod redis;

pub use disk::DiskStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use plaxt_models::Credential;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::StorageConfig;
use crate::paths::PathManager;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid credential id '{0}'")]
    InvalidId(String),
    #[error("corrupt credential record '{id}': {reason}")]
    Corrupt { id: String, reason: String },
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode credential: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    fn backend_name(&self) -> &str;

    async fn get(&self, id: &str) -> Result<Option<Credential>, StoreError>;
    async fn put(&self, credential: &Credential) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Liveness probe used by the health check.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Open the backend selected by configuration.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn CredentialStore>, StoreError> {
    let store: Arc<dyn CredentialStore> = match config {
        StorageConfig::Postgres { url } => Arc::new(PostgresStore::connect(url).await?),
        StorageConfig::Redis { uri, password } => {
            Arc::new(RedisStore::connect(uri, password.as_deref()).await?)
        }
        StorageConfig::Disk { path } => {
            let dir = path
                .clone()
                .unwrap_or_else(|| PathManager::default().keystore_dir());
            Arc::new(DiskStore::new(dir))
        }
        StorageConfig::Memory => Arc::new(MemoryStore::new()),
    };
    info!(backend = store.backend_name(), "Opened credential store");
    Ok(store)
}

/// Ids become file names and cache keys, so only a conservative alphabet is accepted.
pub(crate) fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

/// Parse a stored `updated` value: RFC 3339, or the legacy `MM-DD-YYYY` day format.
pub(crate) fn parse_updated(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%m-%d-%Y")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
