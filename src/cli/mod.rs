pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

/// Multi-account PGP keyrings: inspect and administer the keyward store.
#[derive(Parser, Debug)]
#[command(name = "keyward", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (also raises log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to an alternative keyward directory (default: .keyward)
    #[arg(long, global = true, env = "KEYWARD_DIR")]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize keyward in the current directory
    Init,

    /// Create, list, inspect and delete keyrings
    Keyring {
        #[command(subcommand)]
        action: KeyringAction,
    },

    /// Set the logo of a keyring
    Logo {
        /// Keyring id, e.g. "gmx.net|#|alice@gmx.net"
        keyring_id: String,
        /// New logo revision; must be greater than the stored one
        #[arg(long)]
        revision: u64,
        /// Logo as a data URL
        #[arg(long)]
        data_url: String,
    },

    /// Show the sync changelog of a keyring
    Changelog {
        /// Keyring id
        keyring_id: String,
    },

    /// List configured provider trust certificates
    Trust,

    /// Show operation history
    Log {
        /// Filter by keyring id
        #[arg(long)]
        keyring: Option<String>,
        /// Filter entries since this date (ISO 8601)
        #[arg(long)]
        since: Option<String>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyringAction {
    /// Create an empty keyring
    Create {
        /// Keyring id, e.g. "gmx.net|#|alice@gmx.net"
        keyring_id: String,
    },
    /// List all keyrings
    List,
    /// Show keys, attributes and changelog size of a keyring
    Show {
        /// Keyring id
        keyring_id: String,
    },
    /// Delete a keyring and all its keys
    Delete {
        /// Keyring id
        keyring_id: String,
    },
}
