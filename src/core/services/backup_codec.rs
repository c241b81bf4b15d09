use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::core::errors::{KeywardError, Result};
use crate::core::models::backup::{
    BACKUP_FORMAT_VERSION, PrivateKeyBackup, RestoredBackup, parse_meta_info, preamble,
};
use crate::core::models::packet::{PacketHeader, PacketTag, SymmetricAlgorithm};
use crate::core::traits::openpgp::{OpenPgpKey, OpenPgpProvider};

/// Characters a backup code is drawn from. No 0/O or 1/I.
pub const BACKUP_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const BACKUP_CODE_LEN: usize = 26;

/// Fresh random backup code from the thread-local, OS-seeded RNG.
pub fn generate_backup_code() -> SecretString {
    let mut rng = rand::thread_rng();
    let code: String = (0..BACKUP_CODE_LEN)
        .map(|_| BACKUP_CODE_ALPHABET[rng.gen_range(0..BACKUP_CODE_ALPHABET.len())] as char)
        .collect();
    SecretString::from(code)
}

/// Wraps a private key and its passphrase under a random backup code.
pub struct BackupCodec<'a, P: OpenPgpProvider> {
    pub provider: &'a P,
}

impl<'a, P: OpenPgpProvider> BackupCodec<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Encrypt `key` together with its passphrase under a new backup code.
    ///
    /// The passphrase is stored on one preamble line, so it must not
    /// contain a line break.
    pub fn create_private_key_backup(
        &self,
        key: &P::Key,
        key_pwd: &SecretString,
    ) -> Result<PrivateKeyBackup> {
        if !key.is_private() {
            return Err(KeywardError::NoPrivateKey {
                fingerprint: key.fingerprint().to_string(),
            });
        }

        if key_pwd.expose_secret().contains(['\r', '\n']) {
            return Err(KeywardError::InvalidBackupPassphrase {
                reason: "line breaks are not allowed".into(),
            });
        }

        let backup_code = generate_backup_code();
        let mut packets = vec![self.provider.literal_packet(&preamble(key_pwd.expose_secret()))];
        packets.extend(self.provider.key_packets(key));

        let message = self
            .provider
            .symmetric_encrypt(packets, backup_code.expose_secret())?;
        debug!(fingerprint = %key.fingerprint(), "private key backup created");

        Ok(PrivateKeyBackup {
            backup_code,
            message,
        })
    }

    /// Recover the private key and its passphrase from a backup.
    ///
    /// The packet layout is checked before any decryption is attempted,
    /// so a malformed backup and a wrong code fail with different errors.
    pub fn restore_private_key_backup(
        &self,
        armored: &str,
        code: &SecretString,
    ) -> Result<RestoredBackup<P::Key>> {
        let message = self
            .provider
            .read_armored_message(armored)
            .map_err(|e| KeywardError::BackupRestoreFailed {
                reason: e.to_string(),
            })?;

        check_backup_structure(&self.provider.packet_headers(&message))?;

        let packets = self
            .provider
            .symmetric_decrypt(message, code.expose_secret())
            .map_err(|e| {
                debug!(error = %e, "backup decryption failed");
                KeywardError::WrongRestoreCode
            })?;

        let mut packets = packets.into_iter();
        let meta_text = packets
            .next()
            .and_then(|packet| self.provider.literal_text(&packet))
            .ok_or_else(|| restore_failed("first packet is not literal data"))?;

        let mut meta = parse_meta_info(&meta_text);
        match meta.get("Version") {
            Some(version) if version == BACKUP_FORMAT_VERSION => {}
            Some(version) => {
                return Err(restore_failed(&format!(
                    "unsupported backup version {version}"
                )));
            }
            None => return Err(restore_failed("missing Version header")),
        }
        let password = meta
            .remove("Pwd")
            .ok_or_else(|| restore_failed("missing Pwd header"))?;

        let key = self
            .provider
            .key_from_packets(packets.collect())
            .map_err(|e| KeywardError::BackupRestoreFailed {
                reason: e.to_string(),
            })?;
        if !key.is_private() {
            return Err(restore_failed("backup does not contain a private key"));
        }

        Ok(RestoredBackup {
            key,
            password: SecretString::from(password),
        })
    }
}

fn restore_failed(reason: &str) -> KeywardError {
    KeywardError::BackupRestoreFailed {
        reason: reason.to_string(),
    }
}

fn illegal(detail: String) -> KeywardError {
    KeywardError::IllegalBackupStructure { detail }
}

/// Exactly a session key packet (AES-256) followed by an integrity
/// protected data packet.
fn check_backup_structure(headers: &[PacketHeader]) -> Result<()> {
    let [session, data] = headers else {
        return Err(illegal(format!("expected 2 packets, found {}", headers.len())));
    };

    if session.tag != PacketTag::SymKeyEncryptedSessionKey {
        return Err(illegal(format!(
            "first packet has tag {}, expected 3",
            session.tag.as_u8()
        )));
    }
    if session.session_key_algorithm != Some(SymmetricAlgorithm::Aes256) {
        return Err(illegal(format!(
            "session key algorithm {:?} is not AES-256",
            session.session_key_algorithm
        )));
    }
    if let Some(algorithm) = &session.session_key_encryption_algorithm
        && *algorithm != SymmetricAlgorithm::Aes256
    {
        return Err(illegal(format!(
            "session key encryption algorithm {algorithm:?} is not AES-256"
        )));
    }
    if data.tag != PacketTag::SymEncryptedIntegrityProtectedData {
        return Err(illegal(format!(
            "second packet has tag {}, expected 18",
            data.tag.as_u8()
        )));
    }
    Ok(())
}
