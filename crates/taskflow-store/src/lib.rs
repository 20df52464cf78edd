//! Key-value storage for taskflow records.
//!
//! Backends implement [`KeyValueStore`] over raw string values. [`Storage`]
//! layers JSON encoding on top and never lets a backend failure escape its
//! `load`/`save`/`remove` operations.

use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;

mod file;
mod memory;
mod storage;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use storage::{Seeded, Storage};

/// Errors raised by storage backends and JSON encoding.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the raw value failed.
    #[error("failed to read {key}: {source}")]
    Read {
        /// Storage key.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing the raw value failed.
    #[error("failed to write {key}: {source}")]
    Write {
        /// Storage key.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Removing the raw value failed.
    #[error("failed to remove {key}: {source}")]
    Remove {
        /// Storage key.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The value would not fit in the backend's quota.
    #[error("quota exceeded writing {key}: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        /// Storage key.
        key: String,
        /// Bytes the store would hold after the write.
        needed: usize,
        /// Configured capacity in bytes.
        limit: usize,
    },
    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    /// Serializing a record failed.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Storage key.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Stored JSON could not be decoded.
    #[error("failed to decode {key}: {source}")]
    Decode {
        /// Storage key.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Names of the persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Task collection.
    Tasks,
    /// List collection.
    Lists,
    /// User settings.
    Settings,
}

impl StorageKey {
    /// Every record key.
    pub const ALL: [Self; 3] = [Self::Tasks, Self::Lists, Self::Settings];

    /// Namespaced key under which the record is stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "taskflow_tasks",
            Self::Lists => "taskflow_lists",
            Self::Settings => "taskflow_settings",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value for `key`, `None` when absent.
    ///
    /// # Errors
    /// Returns a backend-specific error when the value cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    /// Returns a backend-specific error when the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`; succeeds when the key is already absent.
    ///
    /// # Errors
    /// Returns a backend-specific error when the entry cannot be removed.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
