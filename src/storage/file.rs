//! JSON-file-based storage backend.
//!
//! Stores each key in its own `<key>.json` file under a configurable
//! directory (default: `$XDG_DATA_HOME/hotel-compare/`).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Storage;
use crate::error::{HotelError, Result};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "hotel-compare";

/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// Extension of value files.
const VALUE_EXT: &str = "json";

/// File-backed key-value storage.
///
/// Each key is stored in a separate `<key>.json` file; keys are limited to
/// ASCII letters, digits, `-` and `_` so they map safely onto file names.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file lock
/// on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]). Reads take a shared lock, writes an
/// exclusive one, and every write goes to a temporary file first and is
/// then renamed into place.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock          (cross-process lock sentinel)
///   selectedHotels.json
///   searchFilters.json
///   lastSearch.json
///   userSession.json
///   adminSession.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing all JSON files.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist, and opens
    /// (or creates) the `storage.lock` sentinel.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        tracing::debug!(dir = %dir.display(), "opened file storage");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/hotel-compare/` (typically
    /// `~/.local/share/hotel-compare/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| HotelError::Storage("could not determine platform data directory".into()))
    }

    /// Returns the storage root directory.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the value file path for `key`, rejecting keys that are not
    /// plain file-name stems.
    fn value_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(HotelError::Storage(
                format!("invalid storage key {key:?}").into(),
            ));
        }
        Ok(self.dir.join(format!("{key}.{VALUE_EXT}")))
    }

    /// Acquires an in-process mutex guard and a shared (read) file lock,
    /// executes `op`, then releases the file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // Only surface the unlock error when the operation succeeded;
        // otherwise the original error is more useful.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write) file
    /// lock, executes `op`, then releases the file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }
}

/// Wraps an I/O error into a [`HotelError::Storage`].
fn storage_io_error(err: std::io::Error) -> HotelError {
    HotelError::Storage(Box::new(err))
}

/// Wraps a mutex poison error into a [`HotelError::Storage`].
fn lock_poison_error<T>(err: &PoisonError<T>) -> HotelError {
    HotelError::Storage(err.to_string().into())
}

impl Storage for FileStorage {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;
        self.with_shared_lock(|| match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_io_error(err)),
        })
    }

    #[inline]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.value_path(key)?;
        let tmp_path = path.with_extension(format!("{VALUE_EXT}.tmp"));
        self.with_exclusive_lock(|| {
            fs::write(&tmp_path, value).map_err(storage_io_error)?;
            fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
            tracing::trace!(key, bytes = value.len(), "wrote storage value");
            Ok(())
        })
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key)?;
        self.with_exclusive_lock(|| match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_io_error(err)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    /// Helper to create a [`FileStorage`] in a temporary directory.
    fn temp_storage() -> (FileStorage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        (storage, dir)
    }

    #[test]
    fn missing_key_is_none() {
        let (storage, _dir) = temp_storage();
        assert!(storage.get("selectedHotels").unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let (storage, _dir) = temp_storage();
        storage.set("selectedHotels", "[]").unwrap();
        assert_eq!(storage.get("selectedHotels").unwrap().as_deref(), Some("[]"));
        assert!(storage.dir().join("selectedHotels.json").exists());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::new(dir.path().to_path_buf())
            .unwrap()
            .set("searchFilters", r#"{"destination":"Paris"}"#)
            .unwrap();
        let reopened = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            reopened.get("searchFilters").unwrap().as_deref(),
            Some(r#"{"destination":"Paris"}"#)
        );
    }

    #[test]
    fn remove_deletes_file_and_tolerates_missing() {
        let (storage, _dir) = temp_storage();
        storage.set("adminSession", "{}").unwrap();
        storage.remove("adminSession").unwrap();
        storage.remove("adminSession").unwrap();
        assert!(storage.get("adminSession").unwrap().is_none());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (storage, dir) = temp_storage();
        storage.set("lastSearch", "{}").unwrap();
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn path_like_keys_rejected() {
        let (storage, _dir) = temp_storage();
        assert!(matches!(
            storage.set("../escape", "x"),
            Err(HotelError::Storage(_))
        ));
        assert!(storage.get("").is_err());
    }

    #[test]
    fn lockfile_created_on_construction() {
        let (storage, _dir) = temp_storage();
        assert!(storage.dir().join(LOCK_FILE).exists());
    }

    #[test]
    fn default_dir_returns_path() {
        if let Ok(path) = FileStorage::default_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }

    #[test]
    fn concurrent_writes_are_safe() {
        let (storage, _dir) = temp_storage();
        let storage = Arc::new(storage);
        let handles: Vec<_> = (0..8_usize)
            .map(|thread_idx| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    for item_idx in 0..20_usize {
                        let key = format!("t{thread_idx}-{item_idx}");
                        storage.set(&key, "1").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(storage.get("t7-19").unwrap().as_deref(), Some("1"));
    }
}
