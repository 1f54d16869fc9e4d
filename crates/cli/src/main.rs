//! repo-admin CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Load configuration** from a `.env` file (if present) and the process
//!    environment, and parse the command line.
//! 2. **Wire logging** with `tracing-subscriber`, human-readable or JSON, to
//!    stderr. Every run gets a random `run_id` on its root span.
//! 3. **Construct infrastructure** (rate-limited HTTP client, GitHub or Azure
//!    DevOps adapter) and hand it to the selected command.
//! 4. **Report the outcome** on stdout and through the exit code.

mod cli;
mod commands;
mod input;
mod logging;
mod report;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info_span, warn, Instrument};

use domain::RunId;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to load environment file"),
    }

    let run_id = RunId::new_random();
    let span = info_span!("run", %run_id, command = cli.command.name());

    match commands::run(cli).instrument(span).await {
        Ok(()) => {
            println!("Processing completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Processing failed.");
            println!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}
