use chrono::{Duration, Utc};
use plaxt_config::CredentialStore;
use plaxt_models::Credential;
use plaxt_sources::trakt::redirect_uri;
use plaxt_sources::{TokenGrant, TraktApi};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use crate::error::ScrobbleError;

type RefreshLock = Arc<tokio::sync::Mutex<()>>;
type LockTable = Mutex<HashMap<String, RefreshLock>>;

/// Keeps stored Trakt credentials usable.
///
/// A credential older than `max_age` is refreshed before use. Refreshes of
/// the same credential are serialized: a request that waited on the lock
/// re-reads the store and reuses the tokens the first one obtained.
///
/// A refresh runs on its own task. Dropping the caller's future does not
/// abandon an exchange whose new tokens still have to be written back.
pub struct TokenLifecycleManager {
    inner: Arc<Refresher>,
}

struct Refresher {
    store: Arc<dyn CredentialStore>,
    trakt: Arc<dyn TraktApi>,
    max_age: Duration,
    locks: Arc<LockTable>,
}

/// Holds a credential's refresh lock handle; the table entry goes away
/// with the last lease.
struct LockLease {
    locks: Arc<LockTable>,
    id: String,
    lock: RefreshLock,
}

impl LockLease {
    fn acquire(locks: &Arc<LockTable>, id: &str) -> Self {
        let lock = {
            let mut table = locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            table.entry(id.to_string()).or_default().clone()
        };
        Self {
            locks: Arc::clone(locks),
            id: id.to_string(),
            lock,
        }
    }
}

impl Drop for LockLease {
    fn drop(&mut self) {
        let mut table = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Only the table and this lease left
        if Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.id);
        }
    }
}

impl TokenLifecycleManager {
    pub fn new(store: Arc<dyn CredentialStore>, trakt: Arc<dyn TraktApi>, max_age: Duration) -> Self {
        Self {
            inner: Arc::new(Refresher {
                store,
                trakt,
                max_age,
                locks: Arc::new(Mutex::new(HashMap::new())),
            }),
        }
    }

    pub fn is_stale(&self, credential: &Credential) -> bool {
        self.inner.is_stale(credential)
    }

    /// Return a credential safe to use, refreshing it first when stale.
    ///
    /// `origin` is the public origin of the current request; Trakt requires
    /// the redirect URI used at authorization time.
    pub async fn ensure_fresh(&self, credential: Credential, origin: &str) -> Result<Credential, ScrobbleError> {
        if !self.is_stale(&credential) {
            return Ok(credential);
        }

        info!(
            credential_id = %credential.id,
            age_days = credential.age(Utc::now()).num_days(),
            "User access token outdated, refreshing..."
        );

        let refresher = Arc::clone(&self.inner);
        let id = credential.id;
        let origin = origin.to_string();
        let task = tokio::spawn(async move {
            let lease = LockLease::acquire(&refresher.locks, &id);
            let guard = lease.lock.lock().await;
            let refreshed = refresher.refresh_locked(&id, &origin).await;
            drop(guard);
            refreshed
        });
        task.await?
    }

    /// Exchange an authorization code and persist the new credential.
    pub async fn authorize(&self, origin: &str, username: &str, code: &str) -> Result<Credential, ScrobbleError> {
        let username = username.to_lowercase();
        let redirect = redirect_uri(origin, &username);

        let tokens = self
            .inner
            .trakt
            .exchange_token(&TokenGrant::AuthorizationCode(code.to_string()), &redirect)
            .await
            .map_err(|e| {
                if e.is_rejection() {
                    ScrobbleError::Unauthorized(e.to_string())
                } else {
                    ScrobbleError::Upstream(e)
                }
            })?;

        let credential = Credential::new(&username, tokens.access_token, tokens.refresh_token);
        self.inner.store.put(&credential).await?;
        info!(credential_id = %credential.id, username = %credential.username, "Authorized");
        Ok(credential)
    }

    #[cfg(test)]
    fn pending_locks(&self) -> usize {
        self.inner.locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}

impl Refresher {
    fn is_stale(&self, credential: &Credential) -> bool {
        credential.is_stale(Utc::now(), self.max_age)
    }

    async fn refresh_locked(&self, id: &str, origin: &str) -> Result<Credential, ScrobbleError> {
        // Someone may have refreshed (or deleted) the credential while we waited
        let mut credential = match self.store.get(id).await? {
            Some(c) => c,
            None => {
                return Err(ScrobbleError::Unauthorized(format!(
                    "credential {} was removed during refresh",
                    id
                )))
            }
        };
        if !self.is_stale(&credential) {
            info!(credential_id = %id, "Token already refreshed by a concurrent request");
            return Ok(credential);
        }

        let redirect = redirect_uri(origin, &credential.username);
        let grant = TokenGrant::RefreshToken(credential.refresh_token.clone());

        match self.trakt.exchange_token(&grant, &redirect).await {
            Ok(tokens) => {
                credential.rotate_tokens(tokens.access_token, tokens.refresh_token, Utc::now());
                self.store.put(&credential).await?;
                info!(credential_id = %id, "Refreshed, continuing");
                Ok(credential)
            }
            Err(e) if e.is_rejection() => {
                warn!(credential_id = %id, error = %e, "Refresh failed, skipping and deleting user");
                if let Err(delete_err) = self.store.delete(id).await {
                    error!(credential_id = %id, error = %delete_err, "Failed to delete rejected credential");
                }
                Err(ScrobbleError::Unauthorized(e.to_string()))
            }
            Err(e) => {
                error!(credential_id = %id, error = %e, "Token refresh did not complete, keeping credential");
                Err(ScrobbleError::Upstream(e))
            }
        }
    }
}
