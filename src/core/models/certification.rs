use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::fingerprint::KeyId;

/// Reason-for-revocation code a provider uses for a soft revoke.
pub const SOFT_REVOKE_REASON: u8 = 101;

/// A certification signature over a user ID, as exposed by the provider.
///
/// `packet` holds the raw signature packet; only the provider interprets
/// it (verification, expiry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub issuer_key_id: KeyId,
    pub created: DateTime<Utc>,
    pub revocation_reason: Option<u8>,
    pub packet: Vec<u8>,
}

/// One user ID of a key with the certifications bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    /// `None` for user attribute packets.
    pub user_id: Option<String>,
    pub revocation_certifications: Vec<Certification>,
    pub other_certifications: Vec<Certification>,
}

/// Verification outcome for one signature of a decrypted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCheck {
    pub key_id: KeyId,
    /// `None` when the signing key was not among the verification keys.
    pub valid: Option<bool>,
}

/// Plaintext and signature results of `decrypt_and_verify`.
#[derive(Debug, Clone)]
pub struct DecryptedMessage {
    pub text: String,
    pub signatures: Vec<SignatureCheck>,
}
