use serde::{Deserialize, Serialize};

/// OpenPGP packet tags this crate inspects (RFC 4880 §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketTag {
    SymKeyEncryptedSessionKey,
    LiteralData,
    SymEncryptedIntegrityProtectedData,
    Other(u8),
}

impl PacketTag {
    pub fn from_u8(tag: u8) -> Self {
        match tag {
            3 => Self::SymKeyEncryptedSessionKey,
            11 => Self::LiteralData,
            18 => Self::SymEncryptedIntegrityProtectedData,
            other => Self::Other(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::SymKeyEncryptedSessionKey => 3,
            Self::LiteralData => 11,
            Self::SymEncryptedIntegrityProtectedData => 18,
            Self::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymmetricAlgorithm {
    Aes128,
    Aes192,
    Aes256,
    Other(String),
}

/// Structural view of one packet of a parsed, still encrypted message.
///
/// The algorithm fields are only populated for session key packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketHeader {
    pub tag: PacketTag,
    pub session_key_algorithm: Option<SymmetricAlgorithm>,
    pub session_key_encryption_algorithm: Option<SymmetricAlgorithm>,
}

impl PacketHeader {
    pub fn new(tag: PacketTag) -> Self {
        Self {
            tag,
            session_key_algorithm: None,
            session_key_encryption_algorithm: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_numbers_match_rfc() {
        assert_eq!(PacketTag::from_u8(3), PacketTag::SymKeyEncryptedSessionKey);
        assert_eq!(PacketTag::from_u8(18).as_u8(), 18);
        assert_eq!(PacketTag::from_u8(9), PacketTag::Other(9));
    }
}
