use anyhow::Result;
use std::path::PathBuf;

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("PLAXT_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

/// Where plaxt looks for its config file and disk keystore.
pub struct PathManager {
    base: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("plaxt");
        Ok(Self::at(base))
    }

    pub fn at(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn from_container_env() -> Self {
        Self::at(container_base_path())
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// Directory used by the disk credential store.
    pub fn keystore_dir(&self) -> PathBuf {
        self.base.join("keystore")
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container base directory only exists inside the image
        let base = container_base_path();
        if base.exists() {
            return Self::at(base);
        }

        Self::new().unwrap_or_else(|_| Self::from_container_env())
    }
}
