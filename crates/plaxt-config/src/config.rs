use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::PathManager;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trakt: TraktConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Timeout applied to every outbound Trakt request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Credentials older than this are refreshed before use
    #[serde(default = "default_refresh_after_days")]
    pub refresh_after_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Empty means every host is accepted
    #[serde(default)]
    pub allowed_hostnames: Vec<String>,
}

/// Which credential store backend to open at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Disk {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Redis {
        uri: String,
        #[serde(default)]
        password: Option<String>,
    },
    Postgres {
        url: String,
    },
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Force JSON output on or off; unset picks JSON when stdout is not a terminal
    #[serde(default)]
    pub json: Option<bool>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "https://api.trakt.tv".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_refresh_after_days() -> i64 {
    plaxt_models::TOKEN_REFRESH_AGE_DAYS
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            refresh_after_days: default_refresh_after_days(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            allowed_hostnames: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Disk { path: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: None,
        }
    }
}

impl Config {
    /// Load the TOML file (if present) and overlay the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => PathManager::default().config_file(),
        };

        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get("TRAKT_ID") {
            self.trakt.client_id = id;
        }
        if let Some(secret) = get("TRAKT_SECRET") {
            self.trakt.client_secret = secret;
        }
        if let Some(url) = get("TRAKT_API_URL") {
            self.trakt.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = get("TRAKT_TIMEOUT_SECS") {
            self.trakt.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid TRAKT_TIMEOUT_SECS '{}': {}", timeout, e))?;
        }
        if let Some(listen) = get("LISTEN") {
            self.server.listen = listen;
        }

        // REDIRECT_URI is the legacy name and wins when both are set
        if let Some(hosts) = get("REDIRECT_URI").or_else(|| get("ALLOWED_HOSTNAMES")) {
            self.server.allowed_hostnames = parse_allowed_hostnames(&hosts);
        }

        if let Some(url) = get("POSTGRESQL_URL") {
            self.storage = StorageConfig::Postgres { url };
        } else if let Some(uri) = get("REDIS_URI") {
            self.storage = StorageConfig::Redis {
                uri,
                password: get("REDIS_PASSWORD"),
            };
        } else if let Some(path) = get("KEYSTORE_PATH") {
            self.storage = StorageConfig::Disk {
                path: Some(PathBuf::from(path)),
            };
        }

        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.trakt.client_id.trim().is_empty() {
            return Err(anyhow!("Trakt client id is not configured (set TRAKT_ID)"));
        }
        if self.trakt.client_secret.trim().is_empty() {
            return Err(anyhow!("Trakt client secret is not configured (set TRAKT_SECRET)"));
        }
        if self.trakt.timeout_secs == 0 {
            return Err(anyhow!("trakt.timeout_secs must be greater than zero"));
        }
        if self.trakt.refresh_after_days <= 0 {
            return Err(anyhow!("trakt.refresh_after_days must be greater than zero"));
        }
        Ok(())
    }
}

/// Normalize a comma separated host list: lower-case, drop schemes and whitespace.
pub fn parse_allowed_hostnames(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .to_lowercase()
        .replace("https://", "")
        .replace("http://", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    cleaned
        .split(',')
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string())
        .collect()
}
