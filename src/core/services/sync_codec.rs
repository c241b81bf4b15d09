use tracing::{debug, warn};

use crate::core::errors::{KeywardError, Result};
use crate::core::models::change_log::{ChangeLog, ChangeLogEntry, ChangeType};
use crate::core::models::key_entry::{KeyEntry, KeyKind};
use crate::core::models::keyring::Keyring;
use crate::core::models::sync_package::{
    DeletedKey, ImportCandidate, InsertedKey, SkipReason, SkippedKey, SyncExport, SyncImport,
    SyncPackage,
};
use crate::core::traits::openpgp::{OpenPgpKey, OpenPgpProvider};

/// Encodes a keyring's public-key state as a message only the keyring's
/// own key pair can open, and decodes it again.
pub struct SyncCodec<'a, P: OpenPgpProvider> {
    pub provider: &'a P,
}

impl<'a, P: OpenPgpProvider> SyncCodec<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Build, sign and encrypt a sync package for `key`.
    ///
    /// Keys without a usable changelog entry are left out and listed in
    /// `SyncExport::skipped`; the rest of the export still succeeds.
    pub fn encrypt_sync_message(
        &self,
        key: &P::Key,
        change_log: &ChangeLog,
        keyring: &Keyring<P::Key>,
    ) -> Result<SyncExport> {
        let mut package = SyncPackage::default();
        let mut skipped = Vec::new();

        for entry in keyring.keys() {
            match change_log.get(&entry.fingerprint) {
                None => {
                    warn!(
                        keyring = keyring.id(),
                        fingerprint = %entry.fingerprint,
                        "key has no changelog entry, left out of sync"
                    );
                    skipped.push(SkippedKey {
                        fingerprint: entry.fingerprint.clone(),
                        reason: SkipReason::MissingChangeLogEntry,
                    });
                }
                Some(log) if log.change == ChangeType::Delete => {
                    warn!(
                        keyring = keyring.id(),
                        fingerprint = %entry.fingerprint,
                        "key is marked deleted but still present, left out of sync"
                    );
                    skipped.push(SkippedKey {
                        fingerprint: entry.fingerprint.clone(),
                        reason: SkipReason::DeletedButPresent,
                    });
                }
                Some(log) => {
                    package.inserted_keys.insert(
                        entry.fingerprint.clone(),
                        InsertedKey {
                            armored: public_armor(entry)?,
                            time: log.time,
                        },
                    );
                }
            }
        }

        for (fingerprint, log) in change_log.deletions() {
            package
                .deleted_keys
                .insert(fingerprint.clone(), DeletedKey { time: log.time });
        }

        let plaintext = serde_json::to_string(&package).map_err(|e| {
            KeywardError::MalformedSyncPackage {
                detail: format!("cannot serialize package: {e}"),
            }
        })?;
        let message = self
            .provider
            .sign_and_encrypt(std::slice::from_ref(key), key, &plaintext)?;

        debug!(
            keyring = keyring.id(),
            inserted = package.inserted_keys.len(),
            deleted = package.deleted_keys.len(),
            skipped = skipped.len(),
            "sync message sealed"
        );
        Ok(SyncExport { message, skipped })
    }

    /// Open a sync message with `key` and check that `key` itself signed it.
    pub fn decrypt_sync_message(&self, key: &P::Key, message: &str) -> Result<SyncImport> {
        let decrypted = self
            .provider
            .decrypt_and_verify(key, std::slice::from_ref(key), message)?;

        let expected = key
            .signing_key_id()
            .ok_or_else(|| KeywardError::InvalidSyncSignature {
                reason: "the keyring key has no signing key".into(),
            })?;

        let signature = decrypted
            .signatures
            .iter()
            .find(|sig| sig.valid.is_some())
            .ok_or_else(|| KeywardError::InvalidSyncSignature {
                reason: "message is not signed by the keyring key".into(),
            })?;
        if signature.valid != Some(true) {
            return Err(KeywardError::InvalidSyncSignature {
                reason: format!("signature by {} does not verify", signature.key_id),
            });
        }
        if signature.key_id != expected {
            return Err(KeywardError::InvalidSyncSignature {
                reason: format!("signed by {}, expected {expected}", signature.key_id),
            });
        }

        let package: SyncPackage = serde_json::from_str(&decrypted.text).map_err(|e| {
            KeywardError::MalformedSyncPackage {
                detail: e.to_string(),
            }
        })?;

        let mut change_log = ChangeLog::new();
        let mut keys = Vec::with_capacity(package.inserted_keys.len());
        for (fingerprint, inserted) in package.inserted_keys {
            change_log.record(fingerprint, ChangeLogEntry::insert(inserted.time));
            keys.push(ImportCandidate {
                kind: KeyKind::Public,
                armored: inserted.armored,
            });
        }
        for (fingerprint, deleted) in package.deleted_keys {
            change_log.record(fingerprint, ChangeLogEntry::delete(deleted.time));
        }

        Ok(SyncImport { change_log, keys })
    }
}

fn public_armor<K: OpenPgpKey>(entry: &KeyEntry<K>) -> Result<String> {
    match entry.kind {
        KeyKind::Public => entry.key.armor(),
        KeyKind::Private => entry.key.to_public().armor(),
    }
}
