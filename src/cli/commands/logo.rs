use crate::cli::commands::audit_helpers;
use crate::cli::{context, output};
use crate::core::errors::{KeywardError, Result};
use crate::core::models::audit_entry::AuditAction;
use crate::core::models::keyring::KeyringAttributes;

/// Execute the `keyward logo` command.
///
/// Goes through the same revision guard as the keyring API: the new
/// revision must be greater than the stored one.
pub fn execute(keyring_id: &str, revision: u64, data_url: &str) -> Result<()> {
    if !data_url.starts_with("data:") {
        return Err(KeywardError::InvalidConfig {
            detail: format!("Logo must be a data URL (data:...), got '{data_url}'"),
        });
    }

    let config = context::load_config()?;
    context::open_repository(&config).set_attributes(
        keyring_id,
        KeyringAttributes {
            logo_revision: Some(revision),
            logo_data_url: Some(data_url.to_string()),
            ..Default::default()
        },
    )?;

    output::success(&format!("Logo of {keyring_id} set to revision {revision}"));
    audit_helpers::log_audit(
        &config,
        AuditAction::LogoSet,
        Some(keyring_id),
        Some(format!("revision {revision}")),
    );
    Ok(())
}
