use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Trakt tokens are valid for three months; they are refreshed after two.
pub const TOKEN_REFRESH_AGE_DAYS: i64 = 60;

/// Stored Trakt OAuth credential for one Plex account.
///
/// The `id` is handed out at authorization time and becomes part of the
/// webhook URL configured in Plex (`/api?id=...`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub id: String,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential with a freshly generated id.
    pub fn new(username: &str, access_token: String, refresh_token: String) -> Self {
        Self::with_id(
            uuid::Uuid::new_v4().simple().to_string(),
            username,
            access_token,
            refresh_token,
            Utc::now(),
        )
    }

    pub fn with_id(
        id: String,
        username: &str,
        access_token: String,
        refresh_token: String,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.to_lowercase(),
            access_token,
            refresh_token,
            updated_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.updated_at
    }

    /// True once the credential is older than `max_age`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) > max_age
    }

    /// Replace both tokens and bump `updated_at`.
    ///
    /// The pair is always swapped together; there is no way to update one
    /// token without the other.
    pub fn rotate_tokens(&mut self, access_token: String, refresh_token: String, now: DateTime<Utc>) {
        self.access_token = access_token;
        self.refresh_token = refresh_token;
        self.updated_at = now;
    }

    /// Case-insensitive comparison against a Plex account title.
    pub fn matches_account(&self, account: &str) -> bool {
        self.username == account.to_lowercase()
    }
}
