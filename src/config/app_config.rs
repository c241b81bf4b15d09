use serde::Deserialize;
use std::path::Path;

use crate::core::errors::{KeywardError, Result};

/// Top-level keyward configuration read from `.keyward/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub keyward: KeywardSection,
    #[serde(default)]
    pub trust: TrustSection,
    pub audit: Option<AuditSection>,
}

impl AppConfig {
    /// Load the configuration from `.keyward/config.toml`.
    ///
    /// After parsing, validates every file name the config points at so a
    /// tampered config cannot make keyward read or write outside its
    /// directory.
    pub fn load(keyward_dir: &Path) -> Result<Self> {
        let config_path = keyward_dir.join("config.toml");
        if !config_path.exists() {
            return Err(KeywardError::InvalidConfig {
                detail: "config.toml not found. Run 'keyward init' first.".into(),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Parse and validate config text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| KeywardError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.keyward.format_version > CURRENT_FORMAT_VERSION {
            return Err(KeywardError::FormatVersionTooNew {
                project_version: config.keyward.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        crate::cli::context::validate_simple_filename(&config.keyward.store_file, "store file")?;

        if let Some(audit) = &config.audit {
            crate::cli::context::validate_simple_filename(&audit.log_file, "audit log file")?;
        }

        for cert in &config.trust.certificates {
            crate::cli::context::validate_relative_path(&cert.file, "trust certificate")?;
            if cert.domains.is_empty() {
                return Err(KeywardError::InvalidConfig {
                    detail: format!("Trust certificate '{}' lists no domains", cert.file),
                });
            }
        }

        Ok(config)
    }
}

/// Current format version supported by this build of keyward.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// The `[keyward]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywardSection {
    pub version: String,
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Key-value store document, relative to the keyward directory.
    #[serde(default = "default_store_file")]
    pub store_file: String,
}

fn default_format_version() -> u32 {
    1
}

fn default_store_file() -> String {
    "store.json".to_string()
}

/// The `[trust]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrustSection {
    #[serde(default)]
    pub certificates: Vec<TrustCertificateEntry>,
}

/// One `[[trust.certificates]]` entry: an armored provider certificate
/// and the domains it vouches for.
#[derive(Debug, Clone, Deserialize)]
pub struct TrustCertificateEntry {
    pub domains: Vec<String>,
    pub file: String,
}

/// The `[audit]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditSection {
    pub enabled: bool,
    pub log_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[keyward]
version = "0.1.0"
format_version = 1
store_file = "store.json"

[[trust.certificates]]
domains = ["gmx.net", "web.de"]
file = "certs/provider.asc"

[audit]
enabled = true
log_file = "audit.log"
"#;

    #[test]
    fn parses_full_config() {
        let config = AppConfig::parse(FULL).unwrap();
        assert_eq!(config.keyward.store_file, "store.json");
        assert_eq!(config.trust.certificates.len(), 1);
        assert_eq!(config.trust.certificates[0].domains, vec!["gmx.net", "web.de"]);
        assert!(config.audit.unwrap().enabled);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AppConfig::parse("[keyward]\nversion = \"0.1.0\"\n").unwrap();
        assert_eq!(config.keyward.format_version, 1);
        assert_eq!(config.keyward.store_file, "store.json");
        assert!(config.trust.certificates.is_empty());
        assert!(config.audit.is_none());
    }

    #[test]
    fn newer_format_version_is_rejected() {
        let err = AppConfig::parse("[keyward]\nversion = \"9.0.0\"\nformat_version = 99\n")
            .unwrap_err();
        assert!(matches!(err, KeywardError::FormatVersionTooNew { .. }));
        assert_eq!(err.code(), "INVALID_CONFIG");
    }

    #[test]
    fn traversal_in_file_names_is_rejected() {
        let store = "[keyward]\nversion = \"0.1.0\"\nstore_file = \"../store.json\"\n";
        assert!(AppConfig::parse(store).is_err());

        let cert = FULL.replace("certs/provider.asc", "../../etc/provider.asc");
        assert!(AppConfig::parse(&cert).is_err());

        let audit = FULL.replace("log_file = \"audit.log\"", "log_file = \"/tmp/audit.log\"");
        assert!(AppConfig::parse(&audit).is_err());
    }

    #[test]
    fn certificate_without_domains_is_rejected() {
        let config = FULL.replace(r#"domains = ["gmx.net", "web.de"]"#, "domains = []");
        assert!(AppConfig::parse(&config).is_err());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("keyward init"));
    }
}
