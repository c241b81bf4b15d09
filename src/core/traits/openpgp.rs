use chrono::{DateTime, Utc};

use crate::core::errors::Result;
use crate::core::models::certification::{Certification, DecryptedMessage, UserRecord};
use crate::core::models::fingerprint::{Fingerprint, KeyId};
use crate::core::models::key_entry::UserId;
use crate::core::models::packet::PacketHeader;

/// Introspection on a parsed OpenPGP key object.
pub trait OpenPgpKey: Clone + Send + Sync + 'static {
    fn fingerprint(&self) -> Fingerprint;

    /// Key ID of the primary key.
    fn key_id(&self) -> KeyId;

    /// Key ID of the (sub)key that produces signatures, if any.
    fn signing_key_id(&self) -> Option<KeyId>;

    fn user_ids(&self) -> Vec<UserId>;

    /// User ID records with their revocation and other certifications.
    fn users(&self) -> Vec<UserRecord>;

    /// Creation times of every packet, primary key first.
    fn packet_creation_times(&self) -> Vec<DateTime<Utc>>;

    fn is_private(&self) -> bool;

    /// True when the primary key is neither revoked nor expired and its
    /// self-signatures verify.
    fn is_primary_key_valid(&self) -> bool;

    /// Public projection of the key. Identity for public keys.
    fn to_public(&self) -> Self;

    /// ASCII-armored export.
    fn armor(&self) -> Result<String>;
}

/// Port for the OpenPGP primitive provider.
///
/// Implementations wrap a real OpenPGP library. keyward never parses or
/// produces packets on its own; it only composes these calls.
pub trait OpenPgpProvider: Send + Sync {
    type Key: OpenPgpKey;
    /// One packet of a packet list.
    type Packet: Clone + Send;
    /// A parsed message whose encrypted payload has not been touched yet.
    type Message: Send;

    fn parse_armored_key(&self, text: &str) -> Result<Self::Key>;

    /// Sign with `signing_key` and encrypt to `keys`; returns armored text.
    fn sign_and_encrypt(
        &self,
        keys: &[Self::Key],
        signing_key: &Self::Key,
        plaintext: &str,
    ) -> Result<String>;

    fn decrypt_and_verify(
        &self,
        decrypt_key: &Self::Key,
        verify_keys: &[Self::Key],
        sealed: &str,
    ) -> Result<DecryptedMessage>;

    /// The key's packet sequence (public and private material).
    fn key_packets(&self, key: &Self::Key) -> Vec<Self::Packet>;

    fn literal_packet(&self, text: &str) -> Self::Packet;

    /// Text of a literal data packet, `None` for any other packet.
    fn literal_text(&self, packet: &Self::Packet) -> Option<String>;

    fn key_from_packets(&self, packets: Vec<Self::Packet>) -> Result<Self::Key>;

    /// Encrypt a packet list under a passphrase (AES-256, integrity
    /// protected) and armor it.
    fn symmetric_encrypt(&self, packets: Vec<Self::Packet>, passphrase: &str) -> Result<String>;

    /// Dearmor and split into packets without decrypting anything.
    fn read_armored_message(&self, armored: &str) -> Result<Self::Message>;

    fn packet_headers(&self, message: &Self::Message) -> Vec<PacketHeader>;

    fn symmetric_decrypt(
        &self,
        message: Self::Message,
        passphrase: &str,
    ) -> Result<Vec<Self::Packet>>;

    /// Check `cert` as issued by `issuer` over `user_id` of `key`.
    fn verify_certification(
        &self,
        cert: &Certification,
        user_id: &str,
        key: &Self::Key,
        issuer: &Self::Key,
    ) -> Result<bool>;

    fn is_expired(&self, cert: &Certification) -> bool;
}
