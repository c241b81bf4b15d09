pub mod audit_entry;
pub mod backup;
pub mod certification;
pub mod change_log;
pub mod fingerprint;
pub mod key_entry;
pub mod keyring;
pub mod packet;
pub mod sync_package;
