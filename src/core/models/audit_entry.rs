use serde::{Deserialize, Serialize};

/// Keyring operations that get recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Init,
    KeyringCreate,
    KeyringDelete,
    LogoSet,
}

/// A single entry in the audit log (JSON lines format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub author: String,
    pub action: AuditAction,
    pub keyring_id: Option<String>,
    pub detail: Option<String>,
    pub state_hash: Option<String>,
}
