use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditEntry;

/// Port for recording and querying security log events.
pub trait AuditLogger: Send + Sync {
    /// Append an entry to the audit log.
    fn log_event(&self, entry: &AuditEntry) -> Result<()>;

    /// Query all entries, optionally filtered by keyring and start date.
    fn query(
        &self,
        keyring_id: Option<&str>,
        since: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Vec<AuditEntry>>;
}
