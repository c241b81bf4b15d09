use crate::cli::commands::audit_helpers;
use crate::cli::{context, output};
use crate::config::app_config::AppConfig;
use crate::core::errors::{KeywardError, Result};
use crate::core::models::audit_entry::AuditAction;
use crate::core::models::keyring::LOCAL_KEYRING_ID;

const DEFAULT_CONFIG: &str = r#"[keyward]
version = "0.1.0"
format_version = 1
store_file = "store.json"

# Provider certificates allowed to override a self-revocation.
# [[trust.certificates]]
# domains = ["gmx.net", "web.de"]
# file = "certs/provider.asc"

[audit]
enabled = true
log_file = "audit.log"
"#;

/// Execute the `keyward init` command.
///
/// Creates the keyward directory with a default config, an empty
/// `certs/` folder and a store holding only the local keyring.
pub fn execute(verbose: bool) -> Result<()> {
    let dir = context::keyward_dir();

    if dir.exists() {
        return Err(KeywardError::InvalidConfig {
            detail: format!("keyward is already initialized here ({} exists)", dir.display()),
        });
    }

    output::header("keyward — Initializing");

    std::fs::create_dir_all(dir.join("certs"))?;
    output::success(&format!("Created {}/", dir.display()));

    std::fs::write(dir.join("config.toml"), DEFAULT_CONFIG)?;
    output::success("Generated config.toml with defaults");

    let config = AppConfig::load(dir)?;
    context::open_repository(&config).create(LOCAL_KEYRING_ID)?;
    output::success(&format!("Created local keyring {LOCAL_KEYRING_ID}"));

    audit_helpers::log_audit(
        &config,
        AuditAction::Init,
        None,
        Some("keyward initialized".to_string()),
    );

    output::success("Ready.\n");
    println!("  Next steps:");
    println!("     1. Add provider certificates under certs/ and list them in config.toml");
    println!("     2. Run 'keyward keyring create <id>' for each account");

    if verbose {
        println!();
        println!("  Files created:");
        println!("     config.toml   — keyward configuration");
        println!("     store.json    — keyrings, keys and changelogs");
        println!("     certs/        — provider trust certificates");
    }

    Ok(())
}
