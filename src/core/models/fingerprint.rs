use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::errors::{KeywardError, Result};

/// A v4 OpenPGP fingerprint: 40 hex characters.
///
/// Stored lowercase so that comparisons are case-insensitive.
/// Whitespace is stripped on parse, so `"ABCD 1234 ..."` as printed by
/// most tools is accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

/// The trailing 8 bytes (16 hex characters) of a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(String);

fn normalize_hex(value: &str, expected_len: usize) -> Result<String> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if cleaned.len() != expected_len {
        return Err(KeywardError::InvalidFingerprint {
            value: value.to_string(),
            detail: format!("expected {expected_len} hex characters, got {}", cleaned.len()),
        });
    }
    if !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(KeywardError::InvalidFingerprint {
            value: value.to_string(),
            detail: "contains non-hex characters".into(),
        });
    }
    Ok(cleaned)
}

impl Fingerprint {
    pub const HEX_LEN: usize = 40;

    pub fn parse(value: &str) -> Result<Self> {
        normalize_hex(value, Self::HEX_LEN).map(Self)
    }

    /// Derive the key ID (last 16 hex characters).
    pub fn key_id(&self) -> KeyId {
        KeyId(self.0[Self::HEX_LEN - KeyId::HEX_LEN..].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl KeyId {
    pub const HEX_LEN: usize = 16;

    pub fn parse(value: &str) -> Result<Self> {
        normalize_hex(value, Self::HEX_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Fingerprint {
    type Err = KeywardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromStr for KeyId {
    type Err = KeywardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for KeyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for KeyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
