use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use crate::adapters::kv_stores::json_file_store::JsonFileStore;
use crate::config::app_config::AppConfig;
use crate::core::errors::{KeywardError, Result};
use crate::core::services::keyring_repository::KeyringRepository;

static KEYWARD_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global keyward directory path.
/// If `custom` is provided, uses that path; otherwise defaults to `.keyward`.
pub fn init(custom: Option<&str>) {
    let dir = custom
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".keyward"));
    let _ = KEYWARD_DIR.set(dir);
}

/// Get the current keyward directory path.
pub fn keyward_dir() -> &'static Path {
    KEYWARD_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(".keyward"))
}

/// Fail unless `keyward init` has been run, then load the config.
pub fn load_config() -> Result<AppConfig> {
    let dir = keyward_dir();
    if !dir.exists() {
        return Err(KeywardError::InvalidConfig {
            detail: format!(
                "keyward not initialized ({} missing). Run 'keyward init' first.",
                dir.display()
            ),
        });
    }
    AppConfig::load(dir)
}

/// Path of the key-value store document.
pub fn store_path(config: &AppConfig) -> PathBuf {
    keyward_dir().join(&config.keyward.store_file)
}

/// Keyring repository over the configured store file.
pub fn open_repository(config: &AppConfig) -> KeyringRepository<JsonFileStore> {
    KeyringRepository::new(JsonFileStore::new(store_path(config)))
}

/// Accept a bare file name only: no directories, no traversal.
pub fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(KeywardError::InvalidConfig {
            detail: format!("Invalid {what} '{name}': must be a plain file name"),
        });
    }
    Ok(())
}

/// Accept a relative path that stays inside the keyward directory.
pub fn validate_relative_path(path: &str, what: &str) -> Result<()> {
    let escapes = Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if path.is_empty() || path.contains('\0') || escapes {
        return Err(KeywardError::InvalidConfig {
            detail: format!("Invalid {what} path '{path}': must stay inside the keyward directory"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_filenames() {
        assert!(validate_simple_filename("audit.log", "audit log file").is_ok());
        assert!(validate_simple_filename("../audit.log", "audit log file").is_err());
        assert!(validate_simple_filename("dir/audit.log", "audit log file").is_err());
        assert!(validate_simple_filename("..", "audit log file").is_err());
        assert!(validate_simple_filename("", "audit log file").is_err());
    }

    #[test]
    fn relative_paths() {
        assert!(validate_relative_path("certs/gmx.asc", "trust certificate").is_ok());
        assert!(validate_relative_path("./gmx.asc", "trust certificate").is_ok());
        assert!(validate_relative_path("certs/../../x.asc", "trust certificate").is_err());
        assert!(validate_relative_path("/etc/x.asc", "trust certificate").is_err());
    }
}
