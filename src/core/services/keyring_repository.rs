use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::errors::{KeywardError, Result};
use crate::core::models::change_log::ChangeLog;
use crate::core::models::keyring::{KeyringAttributes, LOCAL_KEYRING_ID};
use crate::core::traits::kv_store::KeyValueStore;

/// Key holding `keyring id → attributes`; also the list of keyrings.
pub const ATTRIBUTES_KEY: &str = "keyward.keyring.attributes";

const MAX_KEYRING_ID_LEN: usize = 255;

/// A keyring as persisted: armored keys, attributes and changelog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredKeyring {
    pub id: String,
    pub public_keys: Vec<String>,
    pub private_keys: Vec<String>,
    pub attributes: KeyringAttributes,
    pub change_log: ChangeLog,
}

impl StoredKeyring {
    pub fn empty(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }
}

/// Reject ids that cannot be stored or displayed safely.
pub fn validate_keyring_id(id: &str) -> Result<()> {
    let invalid = |detail: &str| KeywardError::InvalidKeyringId {
        keyring_id: id.to_string(),
        detail: detail.to_string(),
    };

    if id.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if id.len() > MAX_KEYRING_ID_LEN {
        return Err(invalid("longer than 255 bytes"));
    }
    if id.chars().any(char::is_control) {
        return Err(invalid("contains control characters"));
    }
    Ok(())
}

fn public_keys_key(id: &str) -> String {
    format!("keyward.keyring.{id}.publicKeys")
}

fn private_keys_key(id: &str) -> String {
    format!("keyward.keyring.{id}.privateKeys")
}

fn change_log_key(id: &str) -> String {
    format!("keyward.keyring.{id}.changeLog")
}

/// Persists keyrings in a `KeyValueStore`.
///
/// Layout:
/// - `keyward.keyring.attributes`: map of every keyring id to its attributes
/// - `keyward.keyring.<id>.publicKeys` / `.privateKeys`: armored keys
/// - `keyward.keyring.<id>.changeLog`: the sync changelog
pub struct KeyringRepository<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> KeyringRepository<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.kv.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| KeywardError::Storage {
                    detail: format!("Malformed value under '{key}': {e}"),
                }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| KeywardError::Storage {
            detail: format!("Failed to serialize '{key}': {e}"),
        })?;
        self.kv.set(key, value)
    }

    fn attribute_map(&self) -> Result<BTreeMap<String, KeyringAttributes>> {
        Ok(self.read(ATTRIBUTES_KEY)?.unwrap_or_default())
    }

    /// Ids of all stored keyrings, sorted.
    pub fn list_ids(&self) -> Result<Vec<String>> {
        Ok(self.attribute_map()?.into_keys().collect())
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.attribute_map()?.contains_key(id))
    }

    /// Create an empty keyring.
    pub fn create(&self, id: &str) -> Result<StoredKeyring> {
        validate_keyring_id(id)?;
        if self.exists(id)? {
            return Err(KeywardError::KeyringAlreadyExists {
                keyring_id: id.to_string(),
            });
        }
        let keyring = StoredKeyring::empty(id);
        self.put(&keyring)?;
        Ok(keyring)
    }

    pub fn get(&self, id: &str) -> Result<Option<StoredKeyring>> {
        let Some(attributes) = self.attribute_map()?.remove(id) else {
            return Ok(None);
        };

        Ok(Some(StoredKeyring {
            id: id.to_string(),
            public_keys: self.read(&public_keys_key(id))?.unwrap_or_default(),
            private_keys: self.read(&private_keys_key(id))?.unwrap_or_default(),
            attributes,
            change_log: self.read(&change_log_key(id))?.unwrap_or_default(),
        }))
    }

    /// Write a keyring as-is. Attributes are stored without the revision
    /// guard; use `set_attributes` for caller-supplied changes.
    pub fn put(&self, keyring: &StoredKeyring) -> Result<()> {
        let mut attributes = self.attribute_map()?;
        attributes.insert(keyring.id.clone(), keyring.attributes.clone());

        self.write(&public_keys_key(&keyring.id), &keyring.public_keys)?;
        self.write(&private_keys_key(&keyring.id), &keyring.private_keys)?;
        self.write(&change_log_key(&keyring.id), &keyring.change_log)?;
        self.write(ATTRIBUTES_KEY, &attributes)
    }

    pub fn list_all(&self) -> Result<Vec<StoredKeyring>> {
        let mut keyrings = Vec::new();
        for id in self.list_ids()? {
            if let Some(keyring) = self.get(&id)? {
                keyrings.push(keyring);
            }
        }
        Ok(keyrings)
    }

    /// Delete a keyring and all its keys. The local keyring is permanent.
    pub fn delete(&self, id: &str) -> Result<()> {
        if id == LOCAL_KEYRING_ID {
            return Err(KeywardError::InvalidKeyringId {
                keyring_id: id.to_string(),
                detail: "the local keyring cannot be deleted".into(),
            });
        }

        let mut attributes = self.attribute_map()?;
        if attributes.remove(id).is_none() {
            return Err(KeywardError::keyring_not_found(id));
        }

        self.write(ATTRIBUTES_KEY, &attributes)?;
        self.kv.remove(&public_keys_key(id))?;
        self.kv.remove(&private_keys_key(id))?;
        self.kv.remove(&change_log_key(id))
    }

    pub fn get_attributes(&self, id: &str) -> Result<KeyringAttributes> {
        self.attribute_map()?
            .remove(id)
            .ok_or_else(|| KeywardError::keyring_not_found(id))
    }

    /// Merge `incoming` into the stored attributes, enforcing a strictly
    /// increasing `logo_revision`. Returns the merged attributes.
    pub fn set_attributes(
        &self,
        id: &str,
        incoming: KeyringAttributes,
    ) -> Result<KeyringAttributes> {
        let mut attributes = self.attribute_map()?;
        let current = attributes
            .get_mut(id)
            .ok_or_else(|| KeywardError::keyring_not_found(id))?;
        current.merge(incoming)?;
        let merged = current.clone();

        self.write(ATTRIBUTES_KEY, &attributes)?;
        Ok(merged)
    }
}
