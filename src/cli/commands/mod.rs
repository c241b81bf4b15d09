pub mod audit_helpers;
pub mod changelog;
pub mod init;
pub mod keyring;
pub mod log;
pub mod logo;
pub mod trust;
