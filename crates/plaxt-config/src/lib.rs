pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{parse_allowed_hostnames, Config, LoggingConfig, ServerConfig, StorageConfig, TraktConfig};
pub use credentials::{open_store, CredentialStore, DiskStore, MemoryStore, PostgresStore, RedisStore, StoreError};
pub use paths::{container_base_path, PathManager};
