// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fdesk - front desk scenario runner

mod commands;
mod error;
mod output;
mod scenario;

use clap::{Parser, Subcommand};
use commands::{replay, transitions};
use error::CliError;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "fdesk",
    version,
    about = "Front desk - replay room and reservation scenarios"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file against an in-memory desk
    Replay(replay::ReplayArgs),
    /// Print the status transition table for rooms or reservations
    Transitions(transitions::TransitionsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging();

    let result = match cli.command {
        Commands::Replay(args) => replay::replay(args).await,
        Commands::Transitions(args) => transitions::transitions(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<CliError>() {
                Some(cli_err) => eprint!("{}", cli_err),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by `FDESK_LOG` (default `warn`)
fn setup_logging() {
    let filter = EnvFilter::try_from_env("FDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
