//! Storage
//!
//! Durable key/value slots the cart store persists into. Keys and values are plain
//! strings, mirroring the browser's local storage.

use std::{
    cell::RefCell,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing the value would exceed the configured quota.
    #[error("Storage quota exceeded writing {key}: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        /// Slot key
        key: String,

        /// Total bytes the storage would hold after the write
        needed: usize,

        /// Maximum number of bytes allowed
        quota: usize,
    },

    /// The key cannot be mapped to a slot (empty or containing path separators).
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A string key/value store.
#[cfg_attr(test, mockall::automock)]
pub trait Storage {
    /// Read the value stored under `key`, or `None` if the slot is absent.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the write is rejected.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the slot under `key`. Deleting an absent slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
///
/// Clones share the same slots, the way every tab of one browser sees the same local
/// storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<FxHashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage that rejects writes once keys and values exceed `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: Rc::default(),
            quota: Some(quota),
        }
    }

    /// Number of bytes held across all keys and values.
    pub fn used_bytes(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let replaced = self
                .slots
                .borrow()
                .get(key)
                .map_or(0, |previous| key.len() + previous.len());

            let needed = self.used_bytes() - replaced + key.len() + value.len();

            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.borrow_mut().remove(key);

        Ok(())
    }
}

/// Filesystem storage: one `<key>.json` file per slot inside a directory.
///
/// Writes go to a temporary file which is then renamed over the slot, so a slot is
/// never observed half-written. Two handles on the same directory behave like two tabs:
/// the last write wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        fs::create_dir_all(&self.dir)?;
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.slot_path(key)?) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_get_missing_is_none() -> TestResult {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("cart")?, None);

        Ok(())
    }

    #[test]
    fn memory_set_overwrites_and_delete_clears() -> TestResult {
        let mut storage = MemoryStorage::new();

        storage.set("cart", "[]")?;
        storage.set("cart", "[1]")?;
        assert_eq!(storage.get("cart")?.as_deref(), Some("[1]"));

        storage.delete("cart")?;
        storage.delete("cart")?;
        assert_eq!(storage.get("cart")?, None);

        Ok(())
    }

    #[test]
    fn memory_clones_share_slots() -> TestResult {
        let mut first = MemoryStorage::new();
        let second = first.clone();

        first.set("cart", "[]")?;

        assert_eq!(second.get("cart")?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn memory_quota_rejects_oversized_write_and_keeps_old_value() -> TestResult {
        let mut storage = MemoryStorage::with_quota(10);

        storage.set("cart", "[]")?;
        let result = storage.set("cart", "[1,2,3,4,5]");

        assert!(
            matches!(
                result,
                Err(StorageError::QuotaExceeded {
                    needed: 15,
                    quota: 10,
                    ..
                })
            ),
            "expected QuotaExceeded, got {result:?}"
        );
        assert_eq!(storage.get("cart")?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn memory_quota_counts_replaced_value_once() -> TestResult {
        let mut storage = MemoryStorage::with_quota(10);

        storage.set("cart", "123456")?;
        storage.set("cart", "654321")?;

        assert_eq!(storage.used_bytes(), 10);

        Ok(())
    }

    #[test]
    fn file_round_trip() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path().join("slots"));

        assert_eq!(storage.get("cart")?, None);

        storage.set("cart", r#"[{"name":"Pão","price":5.0}]"#)?;
        assert_eq!(
            storage.get("cart")?.as_deref(),
            Some(r#"[{"name":"Pão","price":5.0}]"#)
        );
        assert!(dir.path().join("slots").join("cart.json").exists());

        storage.delete("cart")?;
        storage.delete("cart")?;
        assert_eq!(storage.get("cart")?, None);

        Ok(())
    }

    #[test]
    fn file_rejects_path_like_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path());

        for key in ["", "..", "../cart", "a/b", "a\\b"] {
            let result = storage.set(key, "[]");

            assert!(
                matches!(result, Err(StorageError::InvalidKey(_))),
                "expected InvalidKey for {key:?}, got {result:?}"
            );
        }

        Ok(())
    }
}
