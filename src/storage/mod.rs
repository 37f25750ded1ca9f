//! Storage layer
//!
//! A small key-value abstraction with two backends:
//! - `LocalStorage`: one JSON file per key under a base directory (native)
//! - `MemoryStorage`: process-local map (wasm, fallback, tests)
//!
//! `RoomService` sits on top and manages the saved-room collection.

pub mod local;
pub mod memory;
pub mod rooms;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use rooms::{RoomService, ROOMS_KEY};

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Requested record does not exist
    #[error("{0} not found")]
    NotFound(String),
    /// Key contains characters that cannot be mapped to a file name
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StorageError {
    pub fn room_not_found() -> Self {
        StorageError::NotFound("Room".to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Minimal string key-value store
pub trait KeyValueStore {
    /// Value for `key`, or `None` when nothing is stored under it
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Keys are restricted so they map 1:1 onto file names
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key.len() <= 128
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !key.starts_with('.');
    if ok { Ok(()) } else { Err(StorageError::InvalidKey(key.to_string())) }
}
