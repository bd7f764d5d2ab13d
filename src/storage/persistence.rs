//! Sled-backed key-value capability.

use std::path::Path;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Sled-based implementation of [`KeyValueStore`].
///
/// Values are stored as raw UTF-8 strings; this backend carries nothing but
/// small client-side entries (the session token), so no framing is needed.
pub struct SledKeyValueStore {
    db: sled::Db,
}

impl SledKeyValueStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(to_backend)?;
        Ok(Self { db })
    }

    pub fn db(&self) -> &sled::Db {
        &self.db
    }
}

impl KeyValueStore for SledKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(raw) = self.db.get(key.as_bytes()).map_err(to_backend)? else {
            return Ok(None);
        };
        let value = String::from_utf8(raw.to_vec())
            .map_err(|e| StorageError::Backend(format!("Non-UTF-8 value under {key}: {e}")))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(to_backend)?;
        self.db.flush().map_err(to_backend)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(key.as_bytes()).map_err(to_backend)?;
        self.db.flush().map_err(to_backend)?;
        Ok(())
    }
}

fn to_backend(err: sled::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}
