//! # stagewire — Stagewire CLI
//!
//! Runs demo compositions built with the staged factory engine and prints
//! the effective composition configuration.

mod commands;
mod output;
mod todo;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
