use colored::Colorize;

use crate::cli::{context, output};
use crate::core::errors::{KeywardError, Result};
use crate::core::models::change_log::ChangeType;

/// Execute the `keyward changelog` command.
pub fn execute(keyring_id: &str) -> Result<()> {
    let config = context::load_config()?;
    let keyring = context::open_repository(&config)
        .get(keyring_id)?
        .ok_or_else(|| KeywardError::keyring_not_found(keyring_id))?;

    if keyring.change_log.is_empty() {
        output::header(&format!("Changelog of {keyring_id}"));
        output::warning("No changelog entries");
        return Ok(());
    }

    output::header(&format!(
        "Changelog of {keyring_id} ({} entries)",
        keyring.change_log.len()
    ));
    println!();

    for (fingerprint, entry) in keyring.change_log.iter() {
        let change = match entry.change {
            ChangeType::Insert => "INSERT".green(),
            ChangeType::Delete => "DELETE".red(),
        };
        println!(
            "  {} {} {:<6} {}",
            entry.time.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            "│".dimmed(),
            change,
            fingerprint.as_str().to_uppercase(),
        );
    }
    Ok(())
}
