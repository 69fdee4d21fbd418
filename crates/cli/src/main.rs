//! Blockgate - DNS gateway block list synchronizer
//!
//! Main entry point for the `blockgate` binary.

use std::process::ExitCode;

use blockgate_cli::utils::logging;
use blockgate_cli::{commands, exit_code, Cli, EXIT_FAILURE};
use blockgate_domain::SyncError;
use clap::Parser;
use tracing::{debug, error, warn};

fn main() -> ExitCode {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.log_format);

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "could not load .env file"),
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start async runtime");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match runtime.block_on(commands::execute(&cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err.chain().find_map(|cause| cause.downcast_ref::<SyncError>()).map_or("other", logging::error_label);
            error!(kind, error = %format!("{err:#}"), "blockgate failed");
            ExitCode::from(exit_code(&err))
        }
    }
}
