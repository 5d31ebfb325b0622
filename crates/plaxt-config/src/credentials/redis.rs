use async_trait::async_trait;
use plaxt_models::Credential;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use super::{parse_updated, validate_id, CredentialStore, StoreError};

const KEY_PREFIX: &str = "goplaxt:user:";

/// Stores each credential as a hash at `goplaxt:user:{id}`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisStore {
    /// Connect to `uri` (`host:port` or a full `redis://` URL).
    pub async fn connect(uri: &str, password: Option<&str>) -> Result<Self, StoreError> {
        let url = if uri.contains("://") {
            uri.to_string()
        } else {
            format!("redis://{}", uri)
        };
        let mut info = url.as_str().into_connection_info()?;
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            info.redis.password = Some(password.to_string());
        }

        info!(addr = ?info.addr, "Connecting to Redis credential store");
        let client = redis::Client::open(info)?;
        let conn = ConnectionManager::new(client).await?;

        let store = Self { conn };
        store.ping().await?;
        Ok(store)
    }

    pub fn key(id: &str) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }
}

#[async_trait]
impl CredentialStore for RedisStore {
    fn backend_name(&self) -> &str {
        "redis"
    }

    async fn get(&self, id: &str) -> Result<Option<Credential>, StoreError> {
        validate_id(id)?;
        let mut conn = self.conn.clone();
        let data: HashMap<String, String> = conn.hgetall(Self::key(id)).await?;
        if data.is_empty() {
            debug!("Redis credential miss for {}", id);
            return Ok(None);
        }

        let field = |name: &str| {
            data.get(name).cloned().ok_or_else(|| StoreError::Corrupt {
                id: id.to_string(),
                reason: format!("missing field '{}'", name),
            })
        };
        let updated_raw = field("updated")?;
        let updated = parse_updated(&updated_raw).ok_or_else(|| StoreError::Corrupt {
            id: id.to_string(),
            reason: format!("unparseable updated timestamp '{}'", updated_raw),
        })?;

        Ok(Some(Credential::with_id(
            id.to_string(),
            &field("username")?,
            field("access")?,
            field("refresh")?,
            updated,
        )))
    }

    async fn put(&self, credential: &Credential) -> Result<(), StoreError> {
        validate_id(&credential.id)?;
        let mut conn = self.conn.clone();
        let fields = [
            ("username", credential.username.clone()),
            ("access", credential.access_token.clone()),
            ("refresh", credential.refresh_token.clone()),
            ("updated", credential.updated_at.to_rfc3339()),
        ];
        let _: () = conn.hset_multiple(Self::key(&credential.id), &fields).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_id(id)?;
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::key(id)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(RedisStore::key("id123"), "goplaxt:user:id123");
    }
}
