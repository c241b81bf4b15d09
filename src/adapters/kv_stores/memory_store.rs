use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::core::errors::{KeywardError, Result};
use crate::core::traits::kv_store::KeyValueStore;

/// In-process key-value store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.values.lock().map_err(|_| KeywardError::Storage {
            detail: "memory store lock poisoned".into(),
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());

        store.set("a", json!({"x": 1})).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!({"x": 1})));

        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }
}
