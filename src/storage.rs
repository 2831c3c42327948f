//! Pluggable key-value storage for persisted front-end state.
//!
//! The [`Storage`] port is deliberately narrow (`get`/`set`/`remove` by
//! string key, string values) so every store can be exercised against
//! [`InMemoryStorage`] in tests and [`FileStorage`] in the CLI. Values are
//! JSON documents; [`read_json`] and [`write_json`] do the conversion.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::error::Result;

/// Storage key of the selected-hotels list.
pub const SELECTED_HOTELS_KEY: &str = "selectedHotels";

/// Storage key of the search filter form.
pub const SEARCH_FILTERS_KEY: &str = "searchFilters";

/// Storage key of the last search outcome.
pub const LAST_SEARCH_KEY: &str = "lastSearch";

/// Storage key of the signed-in user session.
pub const USER_SESSION_KEY: &str = "userSession";

/// Storage key of the admin session marker.
pub const ADMIN_SESSION_KEY: &str = "adminSession";

/// Blocking key-value storage backend.
///
/// All methods take `&self`; implementations use interior mutability
/// (e.g. `Mutex`) for thread-safe mutation. A `set` replaces the whole
/// value: the last write wins.
pub trait Storage: core::fmt::Debug + Send + Sync {
    /// Returns the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`; missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: Storage + ?Sized> Storage for &T {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    #[inline]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<T: Storage + ?Sized> Storage for Arc<T> {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    #[inline]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Reads and deserializes the JSON value under `key`.
///
/// Absent keys, unreadable storage, and malformed JSON all yield `None`;
/// the latter two are logged.
#[inline]
pub fn read_json<T: DeserializeOwned, S: Storage + ?Sized>(storage: &S, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read persisted state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring malformed persisted state");
            None
        }
    }
}

/// Serializes `value` as JSON and stores it under `key`.
///
/// # Errors
///
/// Returns an error if serialization or the storage write fails.
#[inline]
pub fn write_json<T: Serialize + ?Sized, S: Storage + ?Sized>(
    storage: &S,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}
