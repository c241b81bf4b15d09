use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::adapters::audit::json_audit_logger::JsonAuditLogger;
use crate::cli::{context, output};
use crate::config::app_config::AppConfig;
use crate::core::models::audit_entry::{AuditAction, AuditEntry};
use crate::core::traits::audit::AuditLogger;

/// Name of the user running the command, from `USER` or `USERNAME`.
pub fn current_author() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Hex SHA-256 of the file at `path`, `None` if it cannot be read.
pub fn file_sha256(path: &Path) -> Option<String> {
    let data = std::fs::read(path).ok()?;
    let digest = Sha256::digest(&data);
    Some(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Record an audit event. Warns on failure instead of propagating
/// the error, since audit should not block the main operation.
///
/// `state_hash` is the hash of the store file after the change.
pub fn log_audit(
    config: &AppConfig,
    action: AuditAction,
    keyring_id: Option<&str>,
    detail: Option<String>,
) {
    let audit_section = config.audit.as_ref();
    if !JsonAuditLogger::is_enabled(audit_section) {
        return;
    }

    let logger = JsonAuditLogger::from_config(context::keyward_dir(), audit_section);
    let entry = AuditEntry {
        timestamp: Utc::now(),
        author: current_author(),
        action,
        keyring_id: keyring_id.map(str::to_string),
        detail,
        state_hash: file_sha256(&context::store_path(config)),
    };

    if let Err(e) = logger.log_event(&entry) {
        output::warning(&format!("Could not write audit log: {e}"));
    }
}
