use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::errors::{ErrorPayload, KeywardError, Result};
use crate::core::models::fingerprint::{Fingerprint, KeyId};
use crate::core::models::key_entry::KeyEntry;
use crate::core::models::keyring::{Keyring, KeyringAttributes};
use crate::core::services::keyring_store::KeyringStore;
use crate::core::services::trust_override::{TrustOverrideEngine, TrustRegistry};
use crate::core::traits::kv_store::KeyValueStore;
use crate::core::traits::openpgp::{OpenPgpKey, OpenPgpProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyringInfo {
    pub revision: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidKey {
    pub fingerprint: Fingerprint,
    pub last_modified: DateTime<Utc>,
}

/// `{error, data}` envelope returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    pub error: Option<ErrorPayload>,
    pub data: Option<T>,
}

impl<T> From<Result<T>> for ApiResponse<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self {
                error: None,
                data: Some(data),
            },
            Err(e) => Self {
                error: Some(ErrorPayload::from(&e)),
                data: None,
            },
        }
    }
}

/// Per-keyring operations exposed to client pages.
///
/// A key counts as valid when its primary key is valid and the trust
/// certificate of the keyring's provider has not pseudo-revoked it.
pub struct KeyringApi<'a, P: OpenPgpProvider, S: KeyValueStore> {
    store: &'a mut KeyringStore<P, S>,
    registry: &'a TrustRegistry<P::Key>,
}

impl<'a, P: OpenPgpProvider, S: KeyValueStore> KeyringApi<'a, P, S> {
    pub fn new(store: &'a mut KeyringStore<P, S>, registry: &'a TrustRegistry<P::Key>) -> Self {
        Self { store, registry }
    }

    /// Logo revision of the keyring, `None` if the keyring is unknown.
    pub fn get_keyring(&self, id: &str) -> Option<KeyringInfo> {
        self.store.get(id).map(|keyring| KeyringInfo {
            revision: keyring.attributes().logo_revision,
        })
    }

    pub fn create_keyring(&mut self, id: &str) -> Result<()> {
        self.store.create_keyring(id).map(|_| ())
    }

    /// Valid keys for each address, newest first; `None` for addresses
    /// without any valid key.
    pub fn query_valid_keys(
        &self,
        id: &str,
        emails: &[&str],
    ) -> Result<BTreeMap<String, Option<Vec<ValidKey>>>> {
        let keyring = self.store.require(id)?;

        Ok(emails
            .iter()
            .map(|email| {
                let keys: Vec<ValidKey> = self
                    .valid_keys_for(keyring, email, keyring.keys())
                    .into_iter()
                    .map(|entry| ValidKey {
                        fingerprint: entry.fingerprint.clone(),
                        last_modified: entry.last_modified,
                    })
                    .collect();
                let keys = (!keys.is_empty()).then_some(keys);
                (email.to_string(), keys)
            })
            .collect())
    }

    /// Armored public part of the newest valid key pair for `email`.
    pub fn export_own_pub_key(&self, id: &str, email: &str) -> Result<String> {
        let keyring = self.store.require(id)?;
        let entry = self
            .valid_keys_for(keyring, email, keyring.private_keys().iter())
            .into_iter()
            .next()
            .ok_or_else(|| KeywardError::NoKeyForAddress {
                email: email.to_string(),
            })?;
        entry.key.to_public().armor()
    }

    /// Store a new logo; the revision must be newer than the stored one.
    pub fn set_logo(&mut self, id: &str, revision: u64, data_url: &str) -> Result<()> {
        self.store.set_attributes(
            id,
            KeyringAttributes {
                logo_revision: Some(revision),
                logo_data_url: Some(data_url.to_string()),
                ..Default::default()
            },
        )
    }

    /// Without a fingerprint: whether the keyring holds any private key.
    /// With one (or a key ID, spaces and case ignored): whether that
    /// private key exists and is valid.
    pub fn has_private_key(&self, id: &str, fingerprint: Option<&str>) -> Result<bool> {
        let keyring = self.store.require(id)?;

        let Some(raw) = fingerprint else {
            return Ok(!keyring.private_keys().is_empty());
        };

        let entry = match Fingerprint::parse(raw) {
            Ok(fpr) => keyring.private_keys().iter().find(|e| e.fingerprint == fpr),
            Err(_) => keyring.get_private_for_key_id(&KeyId::parse(raw)?),
        };
        let engine = self.engine();
        Ok(entry.is_some_and(|entry| is_valid(&engine, id, entry)))
    }

    fn engine(&self) -> TrustOverrideEngine<'_, P> {
        TrustOverrideEngine::new(self.store.provider(), self.registry)
    }

    fn valid_keys_for<'k>(
        &self,
        keyring: &Keyring<P::Key>,
        email: &str,
        candidates: impl Iterator<Item = &'k KeyEntry<P::Key>>,
    ) -> Vec<&'k KeyEntry<P::Key>> {
        let engine = self.engine();
        let mut keys: Vec<&KeyEntry<P::Key>> = candidates
            .filter(|entry| entry.has_email(email))
            .filter(|entry| is_valid(&engine, keyring.id(), entry))
            .collect();
        keys.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        keys
    }
}

fn is_valid<P: OpenPgpProvider>(
    engine: &TrustOverrideEngine<'_, P>,
    keyring_id: &str,
    entry: &KeyEntry<P::Key>,
) -> bool {
    entry.key.is_primary_key_valid() && !engine.is_key_pseudo_revoked(keyring_id, &entry.key)
}
