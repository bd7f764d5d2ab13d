//! Configuration System
//!
//! Layered client configuration: optional TOML file, then `QUILL_*`
//! environment overrides, then defaults. The loaded value is validated
//! before use and can be written back out as a starter file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StorageError};
use crate::logging::LoggingConfig;
use crate::storage::{KeyValueStore, MemoryKeyValueStore, NullKeyValueStore, SledKeyValueStore};
use std::sync::Arc;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service endpoint settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Token persistence settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.realworld.io/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Articles per list page
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_base_url() -> String {
    "https://api.realworld.io/api".to_string()
}

fn default_page_size() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
        }
    }
}

/// Which key-value backend holds the session token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Persistent, the native analog of browser local storage.
    #[default]
    Sled,
    /// Process-lifetime only.
    Memory,
    /// Always absent: authentication stays anonymous across restarts.
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Sled database directory; defaults to the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        directories::ProjectDirs::from("io", "quill", "quill")
            .map(|dirs| dirs.data_dir().join("tokens"))
            .unwrap_or_else(|| PathBuf::from(".quill/tokens"))
    }

    /// Construct the configured key-value capability.
    pub fn build(&self) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        Ok(match self.backend {
            StorageBackend::Sled => Arc::new(SledKeyValueStore::new(self.resolved_path())?),
            StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
            StorageBackend::None => Arc::new(NullKeyValueStore),
        })
    }
}

impl ClientConfig {
    /// Load from an explicit file (or `quill.toml` in the working directory
    /// when none is given), then apply `QUILL_*` environment overrides.
    ///
    /// Nested keys use double underscores: `QUILL_API__PAGE_SIZE=20`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        builder = match path {
            Some(path) => builder.add_source(config::File::from(path.to_path_buf())),
            None => builder.add_source(config::File::with_name("quill").required(false)),
        };
        builder = builder.add_source(config::Environment::with_prefix("QUILL").separator("__"));

        let raw = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        let parsed: ClientConfig = raw
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url cannot be empty".to_string()));
        }
        if self.api.page_size == 0 {
            return Err(ConfigError::Invalid(
                "api.page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the configuration out as TOML (starter-file support).
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let rendered =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, rendered)?;
        Ok(())
    }
}
