//! Binary crate for the `zipcast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Logging setup
//! - Driving the interactive weather session

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod session;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cmd = cli::Cli::parse();
    cmd.init_logging();
    cmd.run().await
}
