//! String-keyed, string-valued persistence.
//!
//! [`KeyValueStorage`] is the capability the store, the record cache, and the
//! session guard persist through. [`MemoryStorage`] keeps values in process
//! for tests and throwaway runs; [`FileStorage`] keeps one file per key in a
//! capability-scoped directory so state survives between CLI invocations.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::atomic_io::write_atomic;
use crate::error::StorageError;

/// Minimal key-value persistence, modelled on browser local storage.
///
/// Writes replace the whole value; there is no merge or partial update.
pub trait KeyValueStorage: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// In-process storage. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// On-disk storage: one file per key inside a single directory.
///
/// Keys may contain ASCII letters, digits, `_` and `-`, so each maps to
/// exactly one file name inside the directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: Dir,
    root: Utf8PathBuf,
}

impl FileStorage {
    /// Opens (creating if needed) the storage directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created or
    /// opened.
    pub fn open(path: &Utf8Path) -> Result<Self, StorageError> {
        let open_error = |err: io::Error| StorageError::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(open_error)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(open_error)?;

        Ok(Self {
            dir,
            root: path.to_path_buf(),
        })
    }

    /// Returns the directory this storage writes into.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file_name = checked_key(key)?;
        match self.dir.read_to_string(file_name) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io {
                key: key.to_owned(),
                message: err.to_string(),
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        write_atomic(&self.dir, checked_key(key)?, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match self.dir.remove_file(checked_key(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io {
                key: key.to_owned(),
                message: err.to_string(),
            }),
        }
    }
}

fn checked_key(key: &str) -> Result<&str, StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(key)
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn memory_storage_round_trips_values() {
        let storage = MemoryStorage::new();
        storage.set_item("lendsqr_users", "[]").expect("set");

        assert_eq!(
            storage.get_item("lendsqr_users").expect("get"),
            Some("[]".to_owned())
        );
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn memory_storage_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("absent").expect("get"), None);
    }

    #[test]
    fn memory_storage_clones_share_state() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        clone.set_item("k", "v").expect("set");

        assert_eq!(storage.get_item("k").expect("get"), Some("v".to_owned()));
    }

    #[test]
    fn memory_storage_remove_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "v").expect("set");
        storage.remove_item("k").expect("remove");
        storage.remove_item("k").expect("remove again");

        assert!(storage.is_empty());
    }

    #[test]
    fn arc_storage_delegates() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        storage.set_item("k", "v").expect("set");
        assert_eq!(storage.get_item("k").expect("get"), Some("v".to_owned()));
    }

    #[rstest]
    #[case("lendsqr_users")]
    #[case("user_LSQFfab12cd34")]
    #[case("lendsqr-auth")]
    fn accepts_safe_keys(#[case] key: &str) {
        assert_eq!(checked_key(key), Ok(key));
    }

    #[rstest]
    #[case("")]
    #[case("../escape")]
    #[case("nested/key")]
    #[case(".hidden")]
    #[case("with space")]
    fn rejects_unsafe_keys(#[case] key: &str) {
        assert_eq!(
            checked_key(key),
            Err(StorageError::InvalidKey {
                key: key.to_owned()
            })
        );
    }
}
