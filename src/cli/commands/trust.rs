use colored::Colorize;

use crate::cli::{context, output};
use crate::core::errors::Result;

/// Execute the `keyward trust` command.
///
/// Lists the `[[trust.certificates]]` entries and whether each
/// certificate file is present.
pub fn execute() -> Result<()> {
    let config = context::load_config()?;
    let certificates = &config.trust.certificates;

    output::header(&format!("Trust certificates ({})", certificates.len()));
    if certificates.is_empty() {
        output::warning("No provider certificates configured");
        println!("  Add a [[trust.certificates]] entry to config.toml.");
        return Ok(());
    }

    for cert in certificates {
        let path = context::keyward_dir().join(&cert.file);
        let status = if path.exists() {
            "found".green()
        } else {
            "missing".red()
        };
        println!("  {} [{status}]  {}", cert.file, cert.domains.join(", "));
    }
    Ok(())
}
