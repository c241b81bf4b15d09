use colored::Colorize;

use crate::cli::commands::audit_helpers;
use crate::cli::{KeyringAction, context, output};
use crate::core::errors::{KeywardError, Result};
use crate::core::models::audit_entry::AuditAction;
use crate::core::models::change_log::ChangeType;
use crate::core::models::keyring::{LOCAL_KEYRING_ID, provider_domain};

/// Execute the `keyward keyring` command.
pub fn execute(action: &KeyringAction) -> Result<()> {
    match action {
        KeyringAction::Create { keyring_id } => execute_create(keyring_id),
        KeyringAction::List => execute_list(),
        KeyringAction::Show { keyring_id } => execute_show(keyring_id),
        KeyringAction::Delete { keyring_id } => execute_delete(keyring_id),
    }
}

fn execute_create(keyring_id: &str) -> Result<()> {
    let config = context::load_config()?;
    context::open_repository(&config).create(keyring_id)?;

    output::success(&format!("Created keyring {keyring_id}"));
    audit_helpers::log_audit(&config, AuditAction::KeyringCreate, Some(keyring_id), None);
    Ok(())
}

fn execute_list() -> Result<()> {
    let config = context::load_config()?;
    let keyrings = context::open_repository(&config).list_all()?;

    output::header(&format!("Keyrings ({})", keyrings.len()));
    for keyring in &keyrings {
        let marker = if keyring.id == LOCAL_KEYRING_ID {
            " (local)".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "  {}{marker}  {} public, {} private",
            keyring.id,
            keyring.public_keys.len(),
            keyring.private_keys.len(),
        );
    }
    Ok(())
}

fn execute_show(keyring_id: &str) -> Result<()> {
    let config = context::load_config()?;
    let keyring = context::open_repository(&config)
        .get(keyring_id)?
        .ok_or_else(|| KeywardError::keyring_not_found(keyring_id))?;

    let deletions = keyring
        .change_log
        .iter()
        .filter(|(_, e)| e.change == ChangeType::Delete)
        .count();

    output::header(&format!("Keyring {}", keyring.id));
    output::field("provider", provider_domain(&keyring.id));
    output::field("public keys", &keyring.public_keys.len().to_string());
    output::field("private keys", &keyring.private_keys.len().to_string());
    output::field(
        "logo revision",
        &keyring
            .attributes
            .logo_revision
            .map(|r| r.to_string())
            .unwrap_or_else(|| "none".into()),
    );
    output::field(
        "changelog",
        &format!(
            "{} entries ({} deletions)",
            keyring.change_log.len(),
            deletions
        ),
    );
    for (key, value) in &keyring.attributes.extra {
        output::field(key, &value.to_string());
    }
    Ok(())
}

fn execute_delete(keyring_id: &str) -> Result<()> {
    let config = context::load_config()?;
    context::open_repository(&config).delete(keyring_id)?;

    output::success(&format!("Deleted keyring {keyring_id}"));
    audit_helpers::log_audit(&config, AuditAction::KeyringDelete, Some(keyring_id), None);
    Ok(())
}
