use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plaxt_models::Credential;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use super::{CredentialStore, StoreError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    access TEXT NOT NULL,
    refresh TEXT NOT NULL,
    updated TIMESTAMPTZ NOT NULL
)";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL credential store");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the `users` table if needed.
    pub async fn from_pool(pool: PgPool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl CredentialStore for PostgresStore {
    fn backend_name(&self) -> &str {
        "postgres"
    }

    async fn get(&self, id: &str) -> Result<Option<Credential>, StoreError> {
        let row: Option<(String, String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT username, access, refresh, updated FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(username, access, refresh, updated)| {
            Credential::with_id(id.to_string(), &username, access, refresh, updated)
        }))
    }

    async fn put(&self, credential: &Credential) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, username, access, refresh, updated)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                access = EXCLUDED.access,
                refresh = EXCLUDED.refresh,
                updated = EXCLUDED.updated",
        )
        .bind(&credential.id)
        .bind(&credential.username)
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
