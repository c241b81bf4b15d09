use serde::Serialize;

/// All domain errors for keyward.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger. `code()` maps a variant to the stable
/// identifier callers switch on.
#[derive(Debug, thiserror::Error)]
pub enum KeywardError {
    #[error(
        "Illegal private key backup structure: {detail}\n\n  \
         The file is not a keyward key backup or it has been corrupted.\n  \
         No decryption was attempted."
    )]
    IllegalBackupStructure { detail: String },

    #[error(
        "Could not decrypt the backup with this restore code\n\n  \
         Check the code for typos and try again."
    )]
    WrongRestoreCode,

    #[error("Backup restore failed: {reason}")]
    BackupRestoreFailed { reason: String },

    #[error("Key {fingerprint} has no private key material to back up")]
    NoPrivateKey { fingerprint: String },

    #[error(
        "Passphrase cannot be stored in a backup: {reason}\n\n  \
         Change the key passphrase to a single line and try again."
    )]
    InvalidBackupPassphrase { reason: String },

    #[error("Signature of synced keyring is invalid: {reason}")]
    InvalidSyncSignature { reason: String },

    #[error("Malformed sync package: {detail}")]
    MalformedSyncPackage { detail: String },

    #[error(
        "Changelog of keyring '{keyring_id}' is inconsistent\n\n  \
         Keys without an INSERT entry: {fingerprints}"
    )]
    ChangeLogInconsistent {
        keyring_id: String,
        fingerprints: String,
    },

    #[error("New logo revision {incoming} is not newer than existing revision {existing}")]
    RevisionInvalid { incoming: u64, existing: u64 },

    #[error(
        "Keyring '{keyring_id}' not found\n\n  \
         Run 'keyward keyring list' to see available keyrings."
    )]
    KeyringNotFound { keyring_id: String },

    #[error("Keyring '{keyring_id}' already exists")]
    KeyringAlreadyExists { keyring_id: String },

    #[error("Invalid keyring id '{keyring_id}': {detail}")]
    InvalidKeyringId { keyring_id: String, detail: String },

    #[error("No key pair found for this email address: {email}")]
    NoKeyForAddress { email: String },

    #[error("No private key found for key id(s) {key_ids}")]
    NoKeyFound { key_ids: String },

    #[error("Key '{fingerprint}' not found in keyring '{keyring_id}'")]
    KeyNotFound {
        keyring_id: String,
        fingerprint: String,
    },

    #[error("Invalid fingerprint or key id '{value}': {detail}")]
    InvalidFingerprint { value: String, detail: String },

    #[error("OpenPGP provider failed during {operation}: {detail}")]
    Provider { operation: String, detail: String },

    #[error("Storage error: {detail}")]
    Storage { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "This project uses format version {project_version}, but your keyward \
         only supports up to version {supported_version}.\n\n  \
         Solutions:\n    \
         → Install the latest release: cargo install keyward --force"
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error("Audit log error: {detail}")]
    AuditError { detail: String },

    #[error("Unlock queue is closed, the passphrase worker has stopped")]
    UnlockQueueClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KeywardError {
    /// Stable error code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::IllegalBackupStructure { .. } => "ILLEGAL_BACKUP_STRUCTURE",
            Self::WrongRestoreCode => "WRONG_RESTORE_CODE",
            Self::BackupRestoreFailed { .. } => "BACKUP_RESTORE_FAILED",
            Self::NoPrivateKey { .. } => "NO_PRIVATE_KEY",
            Self::InvalidBackupPassphrase { .. } => "INVALID_BACKUP_PASSPHRASE",
            Self::InvalidSyncSignature { .. } => "INVALID_SYNC_SIGNATURE",
            Self::MalformedSyncPackage { .. } => "MALFORMED_SYNC_PACKAGE",
            Self::ChangeLogInconsistent { .. } => "CHANGELOG_INCONSISTENT",
            Self::RevisionInvalid { .. } => "REVISION_INVALID",
            Self::KeyringNotFound { .. } => "KEYRING_NOT_FOUND",
            Self::KeyringAlreadyExists { .. } => "KEYRING_EXISTS",
            Self::InvalidKeyringId { .. } => "INVALID_KEYRING_ID",
            Self::NoKeyForAddress { .. } => "NO_KEY_FOR_ADDRESS",
            Self::NoKeyFound { .. } => "NO_KEY_FOUND",
            Self::KeyNotFound { .. } => "KEY_NOT_FOUND",
            Self::InvalidFingerprint { .. } => "INVALID_FINGERPRINT",
            Self::Provider { .. } => "PROVIDER_ERROR",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::InvalidConfig { .. } | Self::FormatVersionTooNew { .. } => "INVALID_CONFIG",
            Self::AuditError { .. } => "AUDIT_ERROR",
            Self::UnlockQueueClosed => "UNLOCK_QUEUE_CLOSED",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Wrap a primitive provider failure, keeping its original text.
    pub fn provider(operation: &str, detail: impl std::fmt::Display) -> Self {
        Self::Provider {
            operation: operation.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shorthand for a missing keyring.
    pub fn keyring_not_found(keyring_id: &str) -> Self {
        Self::KeyringNotFound {
            keyring_id: keyring_id.to_string(),
        }
    }
}

/// The `{code, message}` object handed to controller callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl From<&KeywardError> for ErrorPayload {
    fn from(err: &KeywardError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KeywardError>;
