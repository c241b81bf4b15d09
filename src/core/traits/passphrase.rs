use async_trait::async_trait;

use crate::core::errors::Result;
use crate::core::models::fingerprint::KeyId;

/// A private key waiting for its passphrase.
#[derive(Debug, Clone)]
pub struct UnlockRequest<K> {
    pub keyring_id: String,
    pub key_id: KeyId,
    pub key: K,
    /// Shown in the prompt, e.g. the primary user ID.
    pub user_id: Option<String>,
}

/// Port for the single modal passphrase prompt.
///
/// Only one prompt may be on screen at a time; `UnlockQueue` makes sure
/// calls never overlap.
#[async_trait]
pub trait PassphraseDialog<K: Send + 'static>: Send + Sync + 'static {
    /// Prompt for the passphrase and return the request with its key
    /// unlocked. Fails when the user cancels or the passphrase is wrong.
    async fn unlock_key(&self, request: UnlockRequest<K>) -> Result<UnlockRequest<K>>;
}
