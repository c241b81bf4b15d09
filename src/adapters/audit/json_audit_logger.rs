use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::app_config::AuditSection;
use crate::core::errors::{KeywardError, Result};
use crate::core::models::audit_entry::AuditEntry;
use crate::core::traits::audit::AuditLogger;

/// Audit logger that appends entries as JSON lines to a file.
///
/// Each line in the log file is a self-contained JSON object representing
/// one `AuditEntry`, so appends never rewrite earlier history.
pub struct JsonAuditLogger {
    log_path: PathBuf,
}

impl JsonAuditLogger {
    /// Create a logger that writes to `{keyward_dir}/{log_file}`.
    pub fn new(keyward_dir: &Path, log_file: &str) -> Self {
        Self {
            log_path: keyward_dir.join(log_file),
        }
    }

    /// Create a logger from the `[audit]` section, falling back to
    /// `audit.log` when the section is missing.
    pub fn from_config(keyward_dir: &Path, audit_section: Option<&AuditSection>) -> Self {
        let log_file = audit_section
            .map(|a| a.log_file.as_str())
            .unwrap_or("audit.log");
        Self::new(keyward_dir, log_file)
    }

    /// Auditing is on unless the `[audit]` section turns it off.
    pub fn is_enabled(audit_section: Option<&AuditSection>) -> bool {
        audit_section.map(|a| a.enabled).unwrap_or(true)
    }
}

impl AuditLogger for JsonAuditLogger {
    fn log_event(&self, entry: &AuditEntry) -> Result<()> {
        let line = serde_json::to_string(entry).map_err(|e| KeywardError::AuditError {
            detail: format!("Failed to serialize audit entry: {e}"),
        })?;

        if let Some(parent) = self.log_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| KeywardError::AuditError {
                detail: format!("Cannot open audit log at {}: {e}", self.log_path.display()),
            })?;

        writeln!(file, "{line}").map_err(|e| KeywardError::AuditError {
            detail: format!("Failed to write audit entry: {e}"),
        })?;

        Ok(())
    }

    fn query(
        &self,
        keyring_id: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.log_path).map_err(|e| KeywardError::AuditError {
            detail: format!("Cannot read audit log: {e}"),
        })?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| KeywardError::AuditError {
                detail: format!("Error reading audit log line {}: {e}", line_num + 1),
            })?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let entry: AuditEntry =
                serde_json::from_str(trimmed).map_err(|e| KeywardError::AuditError {
                    detail: format!("Malformed audit entry at line {}: {e}", line_num + 1),
                })?;

            if let Some(wanted) = keyring_id
                && entry.keyring_id.as_deref() != Some(wanted)
            {
                continue;
            }

            if let Some(since_date) = since
                && entry.timestamp < since_date
            {
                continue;
            }

            entries.push(entry);
        }

        Ok(entries)
    }
}
