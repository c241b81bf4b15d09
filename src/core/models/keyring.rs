use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::{KeywardError, Result};
use crate::core::models::change_log::{ChangeLog, ChangeType};
use crate::core::models::fingerprint::{Fingerprint, KeyId};
use crate::core::models::key_entry::{KeyEntry, KeyKind};
use crate::core::traits::openpgp::OpenPgpKey;

/// Separates the provider domain from the account part of a keyring id.
pub const KEYRING_DELIMITER: &str = "|#|";

/// Keyring that always exists and holds keys not bound to a provider.
pub const LOCAL_KEYRING_ID: &str = "localhost|#|keyward";

/// Provider domain of a keyring id: everything before the first
/// delimiter, or the whole id when there is none.
pub fn provider_domain(keyring_id: &str) -> &str {
    keyring_id
        .split_once(KEYRING_DELIMITER)
        .map(|(domain, _)| domain)
        .unwrap_or(keyring_id)
}

/// Free-form keyring metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyringAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_revision: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_data_url: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl KeyringAttributes {
    /// Merge `incoming` over the current attributes.
    ///
    /// `logo_revision` only moves forward: an incoming revision less than
    /// or equal to the stored one is rejected and nothing is changed.
    pub fn merge(&mut self, incoming: KeyringAttributes) -> Result<()> {
        if let (Some(new), Some(old)) = (incoming.logo_revision, self.logo_revision)
            && new <= old
        {
            return Err(KeywardError::RevisionInvalid {
                incoming: new,
                existing: old,
            });
        }

        if incoming.logo_revision.is_some() {
            self.logo_revision = incoming.logo_revision;
        }
        if incoming.logo_data_url.is_some() {
            self.logo_data_url = incoming.logo_data_url;
        }
        self.extra.extend(incoming.extra);
        Ok(())
    }
}

/// Result of adding a key to a keyring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Added,
    /// A key with the same fingerprint was replaced by the new object.
    Replaced,
    /// A private key with this fingerprint is already present.
    Unchanged,
}

/// A named collection of keys plus attributes and changelog.
#[derive(Debug, Clone)]
pub struct Keyring<K> {
    id: String,
    public_keys: Vec<KeyEntry<K>>,
    private_keys: Vec<KeyEntry<K>>,
    attributes: KeyringAttributes,
    change_log: ChangeLog,
}

impl<K: OpenPgpKey> Keyring<K> {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            public_keys: Vec::new(),
            private_keys: Vec::new(),
            attributes: KeyringAttributes::default(),
            change_log: ChangeLog::new(),
        }
    }

    /// Rebuild a keyring from persisted parts without touching the changelog.
    pub fn from_parts(
        id: &str,
        keys: Vec<K>,
        attributes: KeyringAttributes,
        change_log: ChangeLog,
    ) -> Self {
        let mut keyring = Self {
            attributes,
            change_log,
            ..Self::new(id)
        };
        for key in keys {
            keyring.place(KeyEntry::from_key(key));
        }
        keyring
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn provider_domain(&self) -> &str {
        provider_domain(&self.id)
    }

    pub fn public_keys(&self) -> &[KeyEntry<K>] {
        &self.public_keys
    }

    pub fn private_keys(&self) -> &[KeyEntry<K>] {
        &self.private_keys
    }

    /// Public keys first, then private keys.
    pub fn keys(&self) -> impl Iterator<Item = &KeyEntry<K>> {
        self.public_keys.iter().chain(self.private_keys.iter())
    }

    pub fn attributes(&self) -> &KeyringAttributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, incoming: KeyringAttributes) -> Result<()> {
        self.attributes.merge(incoming)
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    pub fn change_log_mut(&mut self) -> &mut ChangeLog {
        &mut self.change_log
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&KeyEntry<K>> {
        self.keys().find(|e| &e.fingerprint == fingerprint)
    }

    /// Private keys first; matches the primary or the signing key id.
    pub fn get_for_key_id(&self, key_id: &KeyId) -> Option<&KeyEntry<K>> {
        self.private_keys
            .iter()
            .chain(self.public_keys.iter())
            .find(|e| &e.key_id == key_id || e.key.signing_key_id().as_ref() == Some(key_id))
    }

    pub fn get_private_for_key_id(&self, key_id: &KeyId) -> Option<&KeyEntry<K>> {
        self.private_keys
            .iter()
            .find(|e| &e.key_id == key_id || e.key.signing_key_id().as_ref() == Some(key_id))
    }

    pub fn has_private_key(&self) -> bool {
        !self.private_keys.is_empty()
    }

    /// Add a key and record an INSERT at `time`.
    pub fn insert_key(&mut self, key: K, time: DateTime<Utc>) -> InsertOutcome {
        let entry = KeyEntry::from_key(key);
        let fingerprint = entry.fingerprint.clone();
        let outcome = self.place(entry);
        if outcome != InsertOutcome::Unchanged {
            self.change_log.record_insert(fingerprint, time);
        }
        outcome
    }

    /// Remove a key of either kind and record a DELETE at `time`.
    pub fn remove_key(
        &mut self,
        fingerprint: &Fingerprint,
        time: DateTime<Utc>,
    ) -> Result<KeyEntry<K>> {
        let removed = self
            .take(fingerprint, KeyKind::Private)
            .or_else(|| self.take(fingerprint, KeyKind::Public))
            .ok_or_else(|| KeywardError::KeyNotFound {
                keyring_id: self.id.clone(),
                fingerprint: fingerprint.to_string(),
            })?;
        self.change_log.record_delete(fingerprint.clone(), time);
        Ok(removed)
    }

    /// Remove a public key without touching the changelog.
    pub fn remove_public_key(&mut self, fingerprint: &Fingerprint) -> Option<KeyEntry<K>> {
        self.take(fingerprint, KeyKind::Public)
    }

    /// Every key present must have an INSERT entry in the changelog.
    pub fn check_change_log(&self) -> Result<()> {
        let missing: Vec<String> = self
            .keys()
            .filter(|e| {
                self.change_log
                    .get(&e.fingerprint)
                    .is_none_or(|log| log.change != ChangeType::Insert)
            })
            .map(|e| e.fingerprint.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(KeywardError::ChangeLogInconsistent {
                keyring_id: self.id.clone(),
                fingerprints: missing.join(", "),
            })
        }
    }

    fn place(&mut self, entry: KeyEntry<K>) -> InsertOutcome {
        match entry.kind {
            KeyKind::Private => {
                let replaced_public = self.take(&entry.fingerprint, KeyKind::Public).is_some();
                let replaced_private = self.replace_in(KeyKind::Private, entry);
                if replaced_public || replaced_private {
                    InsertOutcome::Replaced
                } else {
                    InsertOutcome::Added
                }
            }
            KeyKind::Public => {
                if self
                    .private_keys
                    .iter()
                    .any(|e| e.fingerprint == entry.fingerprint)
                {
                    return InsertOutcome::Unchanged;
                }
                if self.replace_in(KeyKind::Public, entry) {
                    InsertOutcome::Replaced
                } else {
                    InsertOutcome::Added
                }
            }
        }
    }

    /// Replace the entry with the same fingerprint or append. Returns true
    /// when an existing entry was replaced.
    fn replace_in(&mut self, kind: KeyKind, entry: KeyEntry<K>) -> bool {
        let list = self.list_mut(kind);
        match list.iter_mut().find(|e| e.fingerprint == entry.fingerprint) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => {
                list.push(entry);
                false
            }
        }
    }

    fn take(&mut self, fingerprint: &Fingerprint, kind: KeyKind) -> Option<KeyEntry<K>> {
        let list = self.list_mut(kind);
        let idx = list.iter().position(|e| &e.fingerprint == fingerprint)?;
        Some(list.remove(idx))
    }

    fn list_mut(&mut self, kind: KeyKind) -> &mut Vec<KeyEntry<K>> {
        match kind {
            KeyKind::Public => &mut self.public_keys,
            KeyKind::Private => &mut self.private_keys,
        }
    }
}
