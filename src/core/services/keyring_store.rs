use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::core::errors::{KeywardError, Result};
use crate::core::models::change_log::ChangeType;
use crate::core::models::fingerprint::{Fingerprint, KeyId};
use crate::core::models::key_entry::{KeyEntry, KeyKind};
use crate::core::models::keyring::{InsertOutcome, Keyring, KeyringAttributes, LOCAL_KEYRING_ID};
use crate::core::models::sync_package::{SyncApplyReport, SyncImport};
use crate::core::services::keyring_repository::{KeyringRepository, StoredKeyring};
use crate::core::traits::kv_store::KeyValueStore;
use crate::core::traits::openpgp::{OpenPgpKey, OpenPgpProvider};

/// Live keyrings, hydrated from a `KeyringRepository` through the provider.
///
/// All mutation goes through `&mut self`, so one owner per store at a
/// time. Every mutating call persists the touched keyring before
/// returning.
pub struct KeyringStore<P: OpenPgpProvider, S: KeyValueStore> {
    provider: Arc<P>,
    repo: KeyringRepository<S>,
    keyrings: BTreeMap<String, Keyring<P::Key>>,
    /// Stored keys the provider could not parse, written back unchanged.
    unreadable: BTreeMap<String, Vec<(KeyKind, String)>>,
}

impl<P: OpenPgpProvider, S: KeyValueStore> KeyringStore<P, S> {
    /// Load every stored keyring, creating the local keyring if needed.
    ///
    /// Keys that fail to parse are logged and kept aside so that a later
    /// save does not drop them.
    pub fn load(provider: Arc<P>, kv: S) -> Result<Self> {
        let repo = KeyringRepository::new(kv);
        if !repo.exists(LOCAL_KEYRING_ID)? {
            repo.create(LOCAL_KEYRING_ID)?;
        }

        let mut store = Self {
            provider,
            repo,
            keyrings: BTreeMap::new(),
            unreadable: BTreeMap::new(),
        };

        for stored in store.repo.list_all()? {
            store.hydrate(stored);
        }

        info!(keyrings = store.keyrings.len(), "keyring store loaded");
        Ok(store)
    }

    fn hydrate(&mut self, stored: StoredKeyring) {
        let mut keys = Vec::new();
        let mut unreadable = Vec::new();

        let armored = stored
            .public_keys
            .into_iter()
            .map(|a| (KeyKind::Public, a))
            .chain(stored.private_keys.into_iter().map(|a| (KeyKind::Private, a)));

        for (kind, text) in armored {
            match self.provider.parse_armored_key(&text) {
                Ok(key) => keys.push(key),
                Err(e) => {
                    warn!(keyring = %stored.id, error = %e, "skipping unreadable stored key");
                    unreadable.push((kind, text));
                }
            }
        }

        if !unreadable.is_empty() {
            self.unreadable.insert(stored.id.clone(), unreadable);
        }
        let keyring = Keyring::from_parts(&stored.id, keys, stored.attributes, stored.change_log);
        self.keyrings.insert(stored.id, keyring);
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn get(&self, id: &str) -> Option<&Keyring<P::Key>> {
        self.keyrings.get(id)
    }

    /// Like `get`, but a missing keyring is an error.
    pub fn require(&self, id: &str) -> Result<&Keyring<P::Key>> {
        self.keyrings
            .get(id)
            .ok_or_else(|| KeywardError::keyring_not_found(id))
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Keyring<P::Key>> {
        self.keyrings
            .get_mut(id)
            .ok_or_else(|| KeywardError::keyring_not_found(id))
    }

    pub fn list_all(&self) -> impl Iterator<Item = &Keyring<P::Key>> {
        self.keyrings.values()
    }

    pub fn create_keyring(&mut self, id: &str) -> Result<&Keyring<P::Key>> {
        self.repo.create(id)?;
        info!(keyring = id, "keyring created");
        Ok(self
            .keyrings
            .entry(id.to_string())
            .or_insert_with(|| Keyring::new(id)))
    }

    pub fn delete_keyring(&mut self, id: &str) -> Result<()> {
        self.repo.delete(id)?;
        self.keyrings.remove(id);
        self.unreadable.remove(id);
        info!(keyring = id, "keyring deleted");
        Ok(())
    }

    /// Parse and add a key, recording an INSERT in the changelog.
    pub fn import_key(&mut self, id: &str, armored: &str) -> Result<(Fingerprint, InsertOutcome)> {
        let key = self.provider.parse_armored_key(armored)?;
        let fingerprint = key.fingerprint();

        let outcome = self.require_mut(id)?.insert_key(key, Utc::now());
        self.persist(id)?;
        debug!(keyring = id, %fingerprint, ?outcome, "key imported");
        Ok((fingerprint, outcome))
    }

    /// Remove a key, recording a DELETE in the changelog.
    pub fn remove_key(&mut self, id: &str, fingerprint: &Fingerprint) -> Result<()> {
        self.require_mut(id)?.remove_key(fingerprint, Utc::now())?;
        self.persist(id)
    }

    pub fn get_attributes(&self, id: &str) -> Result<KeyringAttributes> {
        Ok(self.require(id)?.attributes().clone())
    }

    /// Guarded attribute update; see `KeyringAttributes::merge`.
    pub fn set_attributes(&mut self, id: &str, incoming: KeyringAttributes) -> Result<()> {
        let keyring = self.require_mut(id)?;
        keyring.set_attributes(incoming)?;
        let merged = keyring.attributes().clone();

        let mut stored = self
            .repo
            .get(id)?
            .ok_or_else(|| KeywardError::keyring_not_found(id))?;
        stored.attributes = merged;
        self.repo.put(&stored)
    }

    /// Apply a decrypted sync message, last writer wins by timestamp.
    ///
    /// A remote entry wins when there is no local entry for the
    /// fingerprint or the local one is older. Winning INSERTs import the
    /// candidate public key; winning DELETEs remove the public key. Private
    /// keys are never removed by sync.
    pub fn apply_sync_import(&mut self, id: &str, import: SyncImport) -> Result<SyncApplyReport> {
        let mut report = SyncApplyReport::default();

        let mut candidates: BTreeMap<Fingerprint, P::Key> = BTreeMap::new();
        for candidate in &import.keys {
            match self.provider.parse_armored_key(&candidate.armored) {
                Ok(key) => {
                    candidates.insert(key.fingerprint(), key.to_public());
                }
                Err(e) => {
                    warn!(keyring = id, error = %e, "rejecting unparseable sync key");
                    report.rejected.push(format!("unparseable key: {e}"));
                }
            }
        }

        let keyring = self.require_mut(id)?;
        for (fingerprint, remote) in import.change_log.iter() {
            let local = keyring.change_log().get(fingerprint).copied();
            if local.is_some_and(|l| l.time >= remote.time) {
                continue;
            }

            match remote.change {
                ChangeType::Insert => {
                    let Some(key) = candidates.remove(fingerprint) else {
                        warn!(keyring = id, %fingerprint, "INSERT without key in sync package");
                        report.rejected.push(fingerprint.to_string());
                        continue;
                    };
                    if keyring.insert_key(key, remote.time) != InsertOutcome::Unchanged {
                        report.imported.push(fingerprint.clone());
                    }
                }
                ChangeType::Delete => {
                    if keyring
                        .private_keys()
                        .iter()
                        .any(|e| &e.fingerprint == fingerprint)
                    {
                        warn!(keyring = id, %fingerprint, "sync DELETE ignored for private key");
                        continue;
                    }
                    if keyring.remove_public_key(fingerprint).is_some() {
                        report.deleted.push(fingerprint.clone());
                    }
                }
            }
            keyring.change_log_mut().record(fingerprint.clone(), *remote);
        }

        self.persist(id)?;
        info!(
            keyring = id,
            imported = report.imported.len(),
            deleted = report.deleted.len(),
            rejected = report.rejected.len(),
            "sync applied"
        );
        Ok(report)
    }

    /// First private key matching any of `key_ids`, searching one keyring
    /// or all of them.
    pub fn find_private_key(
        &self,
        key_ids: &[KeyId],
        keyring_id: Option<&str>,
    ) -> Result<&KeyEntry<P::Key>> {
        let keyrings: Vec<&Keyring<P::Key>> = match keyring_id {
            Some(id) => vec![self.require(id)?],
            None => self.keyrings.values().collect(),
        };

        key_ids
            .iter()
            .find_map(|key_id| {
                keyrings
                    .iter()
                    .find_map(|keyring| keyring.get_private_for_key_id(key_id))
            })
            .ok_or_else(|| KeywardError::NoKeyFound {
                key_ids: key_ids
                    .iter()
                    .map(|k| k.as_str().to_uppercase())
                    .collect::<Vec<_>>()
                    .join(" or "),
            })
    }

    /// Write one keyring back to the repository.
    pub fn persist(&self, id: &str) -> Result<()> {
        let keyring = self.require(id)?;

        let mut stored = StoredKeyring {
            id: id.to_string(),
            public_keys: armor_all(keyring.public_keys())?,
            private_keys: armor_all(keyring.private_keys())?,
            attributes: keyring.attributes().clone(),
            change_log: keyring.change_log().clone(),
        };
        for (kind, text) in self.unreadable.get(id).into_iter().flatten() {
            match kind {
                KeyKind::Public => stored.public_keys.push(text.clone()),
                KeyKind::Private => stored.private_keys.push(text.clone()),
            }
        }

        self.repo.put(&stored)
    }
}

fn armor_all<K: OpenPgpKey>(entries: &[KeyEntry<K>]) -> Result<Vec<String>> {
    entries.iter().map(|e| e.key.armor()).collect()
}
