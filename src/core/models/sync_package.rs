use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::change_log::ChangeLog;
use crate::core::models::fingerprint::Fingerprint;
use crate::core::models::key_entry::KeyKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertedKey {
    pub armored: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedKey {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
}

/// Plaintext payload of a sync message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPackage {
    #[serde(default)]
    pub inserted_keys: BTreeMap<Fingerprint, InsertedKey>,
    #[serde(default)]
    pub deleted_keys: BTreeMap<Fingerprint, DeletedKey>,
}

impl SyncPackage {
    pub fn is_empty(&self) -> bool {
        self.inserted_keys.is_empty() && self.deleted_keys.is_empty()
    }
}

/// Why a key present in the keyring was left out of a sync package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingChangeLogEntry,
    DeletedButPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedKey {
    pub fingerprint: Fingerprint,
    pub reason: SkipReason,
}

/// Sealed sync message plus the keys that could not be included.
#[derive(Debug, Clone)]
pub struct SyncExport {
    pub message: String,
    pub skipped: Vec<SkippedKey>,
}

/// A key to import, as recovered from a sync package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCandidate {
    pub kind: KeyKind,
    pub armored: String,
}

/// Decrypted sync message, ready for the caller to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncImport {
    pub change_log: ChangeLog,
    pub keys: Vec<ImportCandidate>,
}

/// What `KeyringStore::apply_sync_import` changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncApplyReport {
    pub imported: Vec<Fingerprint>,
    pub deleted: Vec<Fingerprint>,
    /// Candidates that failed to parse or did not match their entry.
    pub rejected: Vec<String>,
}
