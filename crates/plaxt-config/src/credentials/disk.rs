use async_trait::async_trait;
use plaxt_models::Credential;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{parse_updated, validate_id, CredentialStore, StoreError};

#[derive(Debug, Serialize, Deserialize)]
struct CredentialRecord {
    username: String,
    access: String,
    refresh: String,
    updated: String,
}

/// Per-field files written by older plaxt releases, `<dir>/<id>.<field>`.
const LEGACY_FIELDS: [&str; 4] = ["username", "access", "refresh", "updated"];

/// Stores each credential as `<dir>/<id>.toml`.
///
/// Keystores from older releases hold one file per field instead. Those are
/// still readable, and the next write for the id replaces them with a record.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn record_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{}.toml", id)))
    }

    fn legacy_path(&self, id: &str, field: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, field))
    }

    async fn read_legacy_field(&self, id: &str, field: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.legacy_path(id, field)).await {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn require_legacy_field(&self, id: &str, field: &str) -> Result<String, StoreError> {
        self.read_legacy_field(id, field)
            .await?
            .ok_or_else(|| StoreError::Corrupt {
                id: id.to_string(),
                reason: format!("legacy keystore is missing {}.{}", id, field),
            })
    }

    async fn read_legacy(&self, id: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let Some(username) = self.read_legacy_field(id, "username").await? else {
            return Ok(None);
        };

        Ok(Some(CredentialRecord {
            username,
            access: self.require_legacy_field(id, "access").await?,
            refresh: self.require_legacy_field(id, "refresh").await?,
            updated: self.require_legacy_field(id, "updated").await?,
        }))
    }

    async fn remove_legacy(&self, id: &str) -> Result<(), StoreError> {
        for field in LEGACY_FIELDS {
            match tokio::fs::remove_file(self.legacy_path(id, field)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for DiskStore {
    fn backend_name(&self) -> &str {
        "disk"
    }

    async fn get(&self, id: &str) -> Result<Option<Credential>, StoreError> {
        let path = self.record_path(id)?;
        let record = match tokio::fs::read_to_string(&path).await {
            Ok(content) => toml::from_str::<CredentialRecord>(&content).map_err(|e| StoreError::Corrupt {
                id: id.to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => match self.read_legacy(id).await? {
                Some(record) => record,
                None => return Ok(None),
            },
            Err(e) => return Err(e.into()),
        };
        let updated = parse_updated(&record.updated).ok_or_else(|| StoreError::Corrupt {
            id: id.to_string(),
            reason: format!("unparseable updated timestamp '{}'", record.updated),
        })?;

        Ok(Some(Credential::with_id(
            id.to_string(),
            &record.username,
            record.access,
            record.refresh,
            updated,
        )))
    }

    async fn put(&self, credential: &Credential) -> Result<(), StoreError> {
        let path = self.record_path(&credential.id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let record = CredentialRecord {
            username: credential.username.clone(),
            access: credential.access_token.clone(),
            refresh: credential.refresh_token.clone(),
            updated: credential.updated_at.to_rfc3339(),
        };
        let content = toml::to_string_pretty(&record)?;

        // Write then rename so readers never observe a half-written record
        let tmp = self.dir.join(format!(
            "{}.{}.tmp",
            credential.id,
            uuid::Uuid::new_v4().simple()
        ));
        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        self.remove_legacy(&credential.id).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.remove_legacy(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let metadata = tokio::fs::metadata(&self.dir).await?;
        if metadata.permissions().readonly() {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                format!("{} is read-only", self.dir.display()),
            )));
        }
        Ok(())
    }
}
