//! Key-Value Capability
//!
//! Injected persistence seam for the one piece of state that survives a
//! restart: the session token. Backends: sled (the native analog of browser
//! local storage), in-memory (tests), and null (execution contexts with no
//! persistence at all: every read is absent, every write is discarded, so
//! authentication is always anonymous there).

pub mod persistence;

pub use persistence::SledKeyValueStore;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::StorageError;

/// Fixed key the session token is persisted under.
pub const TOKEN_KEY: &str = "jwtToken";

/// Key-value capability interface. No logic lives behind it.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing an absent key succeeds silently.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Always-absent backend: reads miss, writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullKeyValueStore;

impl KeyValueStore for NullKeyValueStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Fixed-key wrapper owning the session token entry.
///
/// The session store is the only writer; the HTTP transport reads through
/// the vault for header injection. Nothing else touches the persisted
/// token.
pub struct TokenVault {
    store: Arc<dyn KeyValueStore>,
}

impl TokenVault {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(TOKEN_KEY)
    }

    pub fn save(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn destroy(&self) -> Result<(), StorageError> {
        self.store.remove(TOKEN_KEY)
    }
}
