//! Error types for the client state synchronization engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key-value capability errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Field-keyed validation feedback returned by a rejected write action.
///
/// Mirrors the service's `{"errors": {"field": ["message", ...]}}` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSet {
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ErrorSet {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Flatten into `"field message"` lines for display.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field} {m}")))
            .collect()
    }
}

impl std::fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

/// Transport-related errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Validation rejected: {0}")]
    Validation(ErrorSet),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Response decode failed: {0}")]
    Decode(String),

    #[error("Transport not configured: {0}")]
    NotConfigured(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl TransportError {
    /// The validation feedback carried by this error, if any.
    pub fn validation(&self) -> Option<&ErrorSet> {
        match self {
            TransportError::Validation(set) => Some(set),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration load failed: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
