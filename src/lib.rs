//! keyward: multi-account PGP keyrings with self-signed changelog sync,
//! provider trust overrides and recovery-code key backups.
//!
//! The OpenPGP primitives come from an external provider plugged in
//! through [`core::traits::openpgp::OpenPgpProvider`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
