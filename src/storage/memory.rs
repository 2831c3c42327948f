//! In-memory storage backend for testing.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! the [`Storage`] port. Ideal for unit tests where file I/O is
//! undesirable.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::Storage;
use crate::error::{HotelError, Result};

/// Thread-safe in-memory key-value storage.
///
/// # Example
///
/// ```rust
/// use hotel_compare::storage::{InMemoryStorage, Storage};
///
/// let storage = InMemoryStorage::new();
/// storage.set("greeting", "\"hello\"").unwrap();
/// assert_eq!(storage.get("greeting").unwrap().as_deref(), Some("\"hello\""));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// Stored values behind a single mutex for interior mutability.
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    #[inline]
    pub fn len(&self) -> Result<usize> {
        self.with_lock(|entries| entries.len())
    }

    /// Returns `true` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    #[inline]
    pub fn is_empty(&self) -> Result<bool> {
        self.with_lock(|entries| entries.is_empty())
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R, F: FnOnce(&mut HashMap<String, String>) -> R>(&self, f: F) -> Result<R> {
        let mut entries = self.entries.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut entries))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &PoisonError<T>) -> HotelError {
    HotelError::Storage(err.to_string().into())
}

impl Storage for InMemoryStorage {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_lock(|entries| entries.get(key).cloned())
    }

    #[inline]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_lock(|entries| {
            let _old = entries.insert(key.to_owned(), value.to_owned());
        })
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<()> {
        self.with_lock(|entries| {
            let _old = entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn empty_storage_returns_none() {
        let storage = InMemoryStorage::new();
        assert!(storage.get("missing").unwrap().is_none());
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn set_replaces_previous_value() {
        let storage = InMemoryStorage::new();
        storage.set("k", "1").unwrap();
        storage.set("k", "2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.len().unwrap(), 1);
    }

    #[test]
    fn remove_deletes_and_tolerates_missing() {
        let storage = InMemoryStorage::new();
        storage.set("k", "1").unwrap();
        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test]
    fn concurrent_writers_are_safe() {
        let storage = Arc::new(InMemoryStorage::new());
        let handles: Vec<_> = (0..8_usize)
            .map(|idx| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    storage.set(&format!("key-{idx}"), "v").unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(storage.len().unwrap(), 8);
    }
}
