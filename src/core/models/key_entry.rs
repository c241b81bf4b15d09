use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::models::fingerprint::{Fingerprint, KeyId};
use crate::core::traits::openpgp::OpenPgpKey;

/// A parsed `Name <email>` user ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserId {
    pub name: String,
    pub email: String,
}

fn user_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?P<name>[^<]*?)\s*<(?P<email>[^>]+)>\s*$").expect("valid user id regex")
    })
}

impl UserId {
    /// Parse a raw user ID string.
    ///
    /// `"Alice <alice@acme.com>"` gives name and email; a bare
    /// `"alice@acme.com"` gives an empty name.
    pub fn parse(raw: &str) -> Self {
        if let Some(caps) = user_id_pattern().captures(raw) {
            return Self {
                name: caps["name"].to_string(),
                email: caps["email"].trim().to_lowercase(),
            };
        }

        let trimmed = raw.trim();
        if trimmed.contains('@') && !trimmed.contains(' ') {
            Self {
                name: String::new(),
                email: trimmed.to_lowercase(),
            }
        } else {
            Self {
                name: trimmed.to_string(),
                email: String::new(),
            }
        }
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.name.is_empty(), self.email.is_empty()) {
            (true, _) => write!(f, "{}", self.email),
            (false, true) => write!(f, "{}", self.name),
            (false, false) => write!(f, "{} <{}>", self.name, self.email),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Public,
    Private,
}

/// One key held by a keyring, with the metadata derived from it.
#[derive(Debug, Clone)]
pub struct KeyEntry<K> {
    pub kind: KeyKind,
    pub fingerprint: Fingerprint,
    pub key_id: KeyId,
    pub user_ids: Vec<UserId>,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub key: K,
}

impl<K: OpenPgpKey> KeyEntry<K> {
    pub fn from_key(key: K) -> Self {
        let times = key.packet_creation_times();
        let created = times.first().copied().unwrap_or(DateTime::UNIX_EPOCH);
        let last_modified = times.iter().copied().max().unwrap_or(DateTime::UNIX_EPOCH);

        Self {
            kind: if key.is_private() {
                KeyKind::Private
            } else {
                KeyKind::Public
            },
            fingerprint: key.fingerprint(),
            key_id: key.key_id(),
            user_ids: key.user_ids(),
            created,
            last_modified,
            key,
        }
    }

    /// True if one of the user IDs carries `email` (case-insensitive).
    pub fn has_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.user_ids.iter().any(|uid| uid.email == email)
    }

    /// First user ID, formatted for display.
    pub fn primary_user_id(&self) -> Option<String> {
        self.user_ids.first().map(|uid| uid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::FakeKey;
    use chrono::TimeZone;

    #[test]
    fn parse_name_and_email() {
        let uid = UserId::parse("Alice Example <Alice@Acme.com>");
        assert_eq!(uid.name, "Alice Example");
        assert_eq!(uid.email, "alice@acme.com");
        assert_eq!(uid.to_string(), "Alice Example <alice@acme.com>");
    }

    #[test]
    fn parse_bare_email() {
        let uid = UserId::parse("bob@acme.com");
        assert_eq!(uid.name, "");
        assert_eq!(uid.email, "bob@acme.com");
    }

    #[test]
    fn parse_name_only() {
        let uid = UserId::parse("Carol");
        assert_eq!(uid.name, "Carol");
        assert!(uid.email.is_empty());
    }

    #[test]
    fn last_modified_is_max_packet_time() {
        let created = Utc.timestamp_opt(1_000, 0).unwrap();
        let later = Utc.timestamp_opt(5_000, 0).unwrap();
        let key = FakeKey::private(1, "alice@acme.com").with_packet_times(vec![created, later]);

        let entry = KeyEntry::from_key(key);
        assert_eq!(entry.kind, KeyKind::Private);
        assert_eq!(entry.created, created);
        assert_eq!(entry.last_modified, later);
        assert!(entry.has_email("ALICE@acme.com"));
    }
}
