use chrono::{NaiveDate, TimeZone, Utc};
use colored::Colorize;

use crate::adapters::audit::json_audit_logger::JsonAuditLogger;
use crate::cli::{context, output};
use crate::core::errors::{KeywardError, Result};
use crate::core::models::audit_entry::{AuditAction, AuditEntry};
use crate::core::traits::audit::AuditLogger;

/// Execute the `keyward log` command.
///
/// Displays the audit log with optional filters for keyring, date,
/// and entry count.
pub fn execute(keyring: Option<&str>, since: Option<&str>, last: Option<usize>) -> Result<()> {
    let config = context::load_config()?;
    let logger = JsonAuditLogger::from_config(context::keyward_dir(), config.audit.as_ref());

    let since_dt = since.map(parse_since).transpose()?;
    let entries = logger.query(keyring, since_dt)?;

    if entries.is_empty() {
        output::header("keyward log");
        output::warning("No audit entries found");
        if keyring.is_some() || since.is_some() {
            println!("  Try removing filters to see all entries.");
        }
        return Ok(());
    }

    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));
    let display = &entries[skip..];

    output::header(&format!("keyward log ({} entries)", display.len()));
    println!();

    for entry in display {
        print_entry(entry);
    }

    Ok(())
}

/// Parse a date string (ISO 8601: `YYYY-MM-DD`) into a UTC DateTime.
fn parse_since(s: &str) -> Result<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| KeywardError::InvalidConfig {
        detail: format!(
            "Invalid date format: '{s}'. Expected ISO 8601 (YYYY-MM-DD), e.g. 2026-01-15"
        ),
    })?;
    Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
}

fn print_entry(entry: &AuditEntry) {
    let date = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let keyring = entry
        .keyring_id
        .as_deref()
        .map(str::to_string)
        .unwrap_or_else(|| "—".dimmed().to_string());
    let detail = entry.detail.as_deref().unwrap_or("").dimmed().to_string();

    println!(
        "  {} {} {:<14} {} {} {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        format_action(&entry.action),
        entry.author,
        keyring,
        detail,
    );
}

fn format_action(action: &AuditAction) -> String {
    match action {
        AuditAction::Init => "init".cyan().to_string(),
        AuditAction::KeyringCreate => "keyring create".green().to_string(),
        AuditAction::KeyringDelete => "keyring delete".red().to_string(),
        AuditAction::LogoSet => "logo".blue().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_is_midnight_utc() {
        let dt = parse_since("2026-01-15").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-15T00:00:00+00:00");
        assert!(parse_since("15/01/2026").is_err());
    }
}
