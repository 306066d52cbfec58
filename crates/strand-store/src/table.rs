use std::{collections::HashMap, sync::Mutex};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::StoreError;

/// A JSON-serialized value plus the CAS version it was written at.
///
/// `version` simulates the "per-key version=0 transaction" a replicated KV
/// layer would use for `create` (spec.md §4.I, §6): version starts at `1` on
/// first write and increments on every `update`, even though nothing here
/// reads it back — it documents the CAS contract an actual Raft-backed
/// implementation of these traits must honor.
struct VersionedEntry {
    version: u64,
    json: String,
}

/// A single-key-namespace CAS table, generic over the stored value type.
///
/// Shared by [`crate::InMemoryStore`]'s four sub-stores (Node/Route/Mic/
/// Firmware); each sub-store owns one `KvTable<T>` keyed by its own ID
/// space.
pub struct KvTable<T> {
    entries: Mutex<HashMap<String, VersionedEntry>>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned + Clone> KvTable<T> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()), _marker: std::marker::PhantomData }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, HashMap<String, VersionedEntry>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// All values currently stored, in unspecified order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serde`] if a stored value fails to
    /// deserialize.
    pub fn list(&self) -> Result<Vec<T>, StoreError> {
        self.guard()
            .iter()
            .map(|(key, entry)| {
                serde_json::from_str(&entry.json)
                    .map_err(|source| StoreError::Serde { key: key.clone(), source })
            })
            .collect()
    }

    /// Fetch the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `key` is absent, or
    /// [`StoreError::Serde`] if the stored value fails to deserialize.
    pub fn get(&self, key: &str) -> Result<T, StoreError> {
        let entries = self.guard();
        let entry = entries.get(key).ok_or_else(|| StoreError::NotFound(key.to_owned()))?;
        serde_json::from_str(&entry.json)
            .map_err(|source| StoreError::Serde { key: key.to_owned(), source })
    }

    /// Insert `value` at `key` as a transactional compare-and-put against
    /// version `0` — fails if `key` is already present (spec.md §4.I
    /// `create`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if `key` is present, or
    /// [`StoreError::Serde`] if `value` fails to serialize.
    pub fn create(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let mut entries = self.guard();
        if entries.contains_key(key) {
            return Err(StoreError::AlreadyExists(key.to_owned()));
        }
        let json = serde_json::to_string(value)
            .map_err(|source| StoreError::Serde { key: key.to_owned(), source })?;
        entries.insert(key.to_owned(), VersionedEntry { version: 1, json });
        tracing::debug!(key, "created store entry");
        Ok(())
    }

    /// Overwrite the value stored at `key`. Requires the key already exist
    /// (spec.md §4.I "`update` requires `get`-verified existence").
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `key` is absent, or
    /// [`StoreError::Serde`] if `value` fails to serialize.
    pub fn update(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let mut entries = self.guard();
        let current_version = entries.get(key).map(|e| e.version).ok_or_else(|| StoreError::NotFound(key.to_owned()))?;
        let json = serde_json::to_string(value)
            .map_err(|source| StoreError::Serde { key: key.to_owned(), source })?;
        entries.insert(key.to_owned(), VersionedEntry { version: current_version + 1, json });
        tracing::debug!(key, version = current_version + 1, "updated store entry");
        Ok(())
    }

    /// Remove the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `key` is absent.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.guard();
        if entries.remove(key).is_none() {
            return Err(StoreError::NotFound(key.to_owned()));
        }
        tracing::debug!(key, "deleted store entry");
        Ok(())
    }

    /// Mutate the value stored at `key` in place via `f`, re-serializing the
    /// result. Used by [`crate::MicStore::revoke`]-style partial updates
    /// that don't want the caller to round-trip a full `get`+`update`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `key` is absent, or
    /// [`StoreError::Serde`] on a (de)serialization failure.
    pub fn mutate(&self, key: &str, f: impl FnOnce(&mut T)) -> Result<(), StoreError> {
        let mut entries = self.guard();
        let entry = entries.get_mut(key).ok_or_else(|| StoreError::NotFound(key.to_owned()))?;
        let mut value: T = serde_json::from_str(&entry.json)
            .map_err(|source| StoreError::Serde { key: key.to_owned(), source })?;
        f(&mut value);
        entry.json = serde_json::to_string(&value)
            .map_err(|source| StoreError::Serde { key: key.to_owned(), source })?;
        entry.version += 1;
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned + Clone> Default for KvTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
