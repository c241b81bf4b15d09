use clap::Parser;
use tracing_subscriber::EnvFilter;

use keyward::cli::{self, Cli, Commands};

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);
    cli::context::init(args.config.as_deref());

    let result = match &args.command {
        Commands::Init => cli::commands::init::execute(args.verbose),
        Commands::Keyring { action } => cli::commands::keyring::execute(action),
        Commands::Logo {
            keyring_id,
            revision,
            data_url,
        } => cli::commands::logo::execute(keyring_id, *revision, data_url),
        Commands::Changelog { keyring_id } => cli::commands::changelog::execute(keyring_id),
        Commands::Trust => cli::commands::trust::execute(),
        Commands::Log {
            keyring,
            since,
            last,
        } => cli::commands::log::execute(keyring.as_deref(), since.as_deref(), *last),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "keyward=debug" } else { "keyward=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
