use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::errors::{KeywardError, Result};
use crate::core::traits::kv_store::KeyValueStore;

/// Key-value store backed by a single JSON document.
///
/// Every write rewrites the whole document through a temporary file in
/// the same directory followed by a rename, so a crash never leaves a
/// half-written store behind.
///
/// Example `store.json`:
/// ```text
/// {
///   "keyward.keyring.attributes": { "localhost|#|keyward": {} },
///   "keyward.keyring.localhost|#|keyward.publicKeys": []
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Return the file path this store reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| KeywardError::Storage {
            detail: format!("Corrupt store file {}: {e}", self.path.display()),
        })
    }

    fn write_all(&self, values: &BTreeMap<String, Value>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let body = serde_json::to_string_pretty(values).map_err(|e| KeywardError::Storage {
            detail: format!("Failed to serialize store: {e}"),
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| KeywardError::Storage {
            detail: format!("Failed to replace {}: {e}", self.path.display()),
        })?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, store) = temp_store();
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn values_survive_reopen() {
        let (dir, store) = temp_store();
        store.set("keyward.keyring.attributes", json!({"a": {}})).unwrap();
        store.set("other", json!([1, 2, 3])).unwrap();

        let reopened = JsonFileStore::new(dir.path().join("store.json"));
        assert_eq!(
            reopened.get("keyward.keyring.attributes").unwrap(),
            Some(json!({"a": {}}))
        );
        assert_eq!(reopened.get("other").unwrap(), Some(json!([1, 2, 3])));
    }

    #[test]
    fn remove_deletes_only_that_key() {
        let (_dir, store) = temp_store();
        store.set("a", json!(1)).unwrap();
        store.set("b", json!(2)).unwrap();

        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
        assert_eq!(store.get("b").unwrap(), Some(json!(2)));
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.get("a").unwrap_err();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}
