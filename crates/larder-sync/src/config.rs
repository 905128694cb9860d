//! Environment-driven configuration.

use std::path::PathBuf;

use larder_store::PoolConfig;

/// Default remote store URL.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/larder";

/// Default device-local store directory.
pub const DEFAULT_DATA_DIR: &str = ".larder";

/// Configuration for a [`SyncService`](crate::SyncService).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// PostgreSQL URL of the remote store.
    pub database_url: String,
    /// Directory of the sled-backed device cache.
    pub data_dir: PathBuf,
    /// Remote connection pool settings.
    pub pool: PoolConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            pool: PoolConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `DATABASE_URL` | `postgres://localhost/larder` | Remote store URL |
    /// | `LARDER_DATA_DIR` | `.larder` | Device cache directory |
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let data_dir = std::env::var("LARDER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        Self {
            database_url,
            data_dir,
            pool: PoolConfig::default(),
        }
    }

    /// Override the device cache directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Override the remote store URL.
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn test_builders() {
        let config = SyncConfig::default()
            .with_data_dir("/tmp/larder-test")
            .with_database_url("postgres://example/db");

        assert_eq!(config.data_dir, PathBuf::from("/tmp/larder-test"));
        assert_eq!(config.database_url, "postgres://example/db");
    }
}
