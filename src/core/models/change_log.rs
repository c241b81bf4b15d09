use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::fingerprint::Fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Insert,
    Delete,
}

/// Latest change recorded for one fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    #[serde(rename = "type")]
    pub change: ChangeType,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
}

impl ChangeLogEntry {
    pub fn insert(time: DateTime<Utc>) -> Self {
        Self {
            change: ChangeType::Insert,
            time,
        }
    }

    pub fn delete(time: DateTime<Utc>) -> Self {
        Self {
            change: ChangeType::Delete,
            time,
        }
    }
}

/// Per-keyring ledger of INSERT/DELETE events, one entry per fingerprint.
///
/// Serialized as a JSON object keyed by lowercase fingerprint with
/// millisecond timestamps: `{"<fpr>": {"type": "INSERT", "time": 1000}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: BTreeMap<Fingerprint, ChangeLogEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&ChangeLogEntry> {
        self.entries.get(fingerprint)
    }

    /// Record or overwrite the entry for `fingerprint`.
    pub fn record(&mut self, fingerprint: Fingerprint, entry: ChangeLogEntry) {
        self.entries.insert(fingerprint, entry);
    }

    pub fn record_insert(&mut self, fingerprint: Fingerprint, time: DateTime<Utc>) {
        self.record(fingerprint, ChangeLogEntry::insert(time));
    }

    pub fn record_delete(&mut self, fingerprint: Fingerprint, time: DateTime<Utc>) {
        self.record(fingerprint, ChangeLogEntry::delete(time));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &ChangeLogEntry)> {
        self.entries.iter()
    }

    /// Entries of type DELETE.
    pub fn deletions(&self) -> impl Iterator<Item = (&Fingerprint, &ChangeLogEntry)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.change == ChangeType::Delete)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Fingerprint, ChangeLogEntry)> for ChangeLog {
    fn from_iter<T: IntoIterator<Item = (Fingerprint, ChangeLogEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fpr(n: u8) -> Fingerprint {
        Fingerprint::parse(&format!("{n:02x}").repeat(20)).unwrap()
    }

    #[test]
    fn serializes_as_fingerprint_map_with_millis() {
        let mut log = ChangeLog::new();
        log.record_insert(fpr(0xab), Utc.timestamp_millis_opt(1000).unwrap());

        let json = serde_json::to_value(&log).unwrap();
        let entry = &json["ab".repeat(20)];
        assert_eq!(entry["type"], "INSERT");
        assert_eq!(entry["time"], 1000);
    }

    #[test]
    fn record_overwrites_previous_entry() {
        let mut log = ChangeLog::new();
        log.record_insert(fpr(1), Utc.timestamp_millis_opt(1).unwrap());
        log.record_delete(fpr(1), Utc.timestamp_millis_opt(2).unwrap());

        assert_eq!(log.len(), 1);
        assert_eq!(log.get(&fpr(1)).unwrap().change, ChangeType::Delete);
        assert_eq!(log.deletions().count(), 1);
    }
}
