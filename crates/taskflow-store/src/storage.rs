use serde::Serialize;
use serde::de::DeserializeOwned;
use taskflow_core::{Settings, Task, default_lists};
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::{KeyValueStore, StorageKey, StoreError};

/// Keys written by [`Storage::initialize_defaults`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seeded {
    /// Empty task collection was written.
    pub tasks: bool,
    /// Default lists were written.
    pub lists: bool,
    /// Default settings were written.
    pub settings: bool,
}

impl Seeded {
    /// Returns true when nothing had to be seeded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.tasks && !self.lists && !self.settings
    }
}

/// JSON adapter over a [`KeyValueStore`].
///
/// `load`, `save` and `remove` recover from every backend or encoding failure
/// by logging it; use the `try_` variants to observe failures.
#[derive(Debug)]
pub struct Storage<B> {
    backend: B,
}

impl<B> Storage<B> {
    /// Wrap a backend.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: KeyValueStore> Storage<B> {
    /// Decode the record under `key`, `Ok(None)` when absent or empty.
    ///
    /// # Errors
    /// Returns an error when the backend read fails or the JSON cannot be decoded.
    pub fn try_load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.raw(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.as_str().to_owned(),
                source,
            })
    }

    /// Decode the record under `key`, or return `default` when it is absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(%key, "No stored value, using default");
                default
            }
            Err(err) => {
                warn!(%key, error = %err, "Error loading record, using default");
                default
            }
        }
    }

    /// Encode `data` as JSON and replace the record under `key`.
    ///
    /// # Errors
    /// Returns an error when encoding or the backend write fails.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: StorageKey, data: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(data).map_err(|source| StoreError::Encode {
            key: key.as_str().to_owned(),
            source,
        })?;
        self.backend.set(key.as_str(), &encoded)
    }

    /// Encode `data` and replace the record under `key`; failures are logged, not returned.
    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, data: &T) {
        if let Err(err) = self.try_save(key, data) {
            error!(%key, error = %err, "Error saving record");
        }
    }

    /// Delete the record under `key`; failures are logged, not returned.
    pub fn remove(&self, key: StorageKey) {
        if let Err(err) = self.backend.remove(key.as_str()) {
            error!(%key, error = %err, "Error removing record");
        }
    }

    /// Whether a non-empty raw value exists for `key`; read failures count as absent.
    pub fn contains(&self, key: StorageKey) -> bool {
        match self.raw(key) {
            Ok(value) => value.is_some(),
            Err(err) => {
                warn!(%key, error = %err, "Error checking record");
                false
            }
        }
    }

    /// Seed empty tasks, the default lists and default settings for keys that are absent.
    ///
    /// Existing values, including an empty array, are never overwritten. A key
    /// whose current value cannot be read is left untouched.
    pub fn initialize_defaults(&self, now: OffsetDateTime) -> Seeded {
        let seeded = Seeded {
            tasks: self.seed_if_absent(StorageKey::Tasks, Vec::<Task>::new),
            lists: self.seed_if_absent(StorageKey::Lists, || default_lists(now)),
            settings: self.seed_if_absent(StorageKey::Settings, Settings::default),
        };

        if !seeded.is_empty() {
            info!(
                tasks = seeded.tasks,
                lists = seeded.lists,
                settings = seeded.settings,
                "Seeded default records"
            );
        }
        seeded
    }

    fn seed_if_absent<T: Serialize>(&self, key: StorageKey, value: impl FnOnce() -> T) -> bool {
        match self.raw(key) {
            Ok(Some(_)) => false,
            Ok(None) => {
                self.save(key, &value());
                true
            }
            Err(err) => {
                warn!(%key, error = %err, "Cannot read record, leaving it unseeded");
                false
            }
        }
    }

    fn raw(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        Ok(self
            .backend
            .get(key.as_str())?
            .filter(|raw| !raw.is_empty()))
    }
}
