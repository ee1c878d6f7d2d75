//! CLI command definitions and dispatch.

pub mod calc;
pub mod config;
pub mod todo;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use stagewire_sdk::CompositionConfig;

/// Stagewire — staged, composable dependency injection.
#[derive(Parser, Debug)]
#[command(name = "stagewire", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// JSON composition config file (defaults to $STAGEWIRE_CONFIG, then built-in defaults).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the calculator chain and evaluate it.
    Calc(calc::CalcArgs),
    /// Compose the to-do manager and apply edits to a fresh store.
    Todo(todo::TodoArgs),
    /// Print the effective composition configuration.
    Config(config::ConfigArgs),
}

/// Options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Policies passed to every definition stage.
    pub composition: CompositionConfig,
    /// Whether to print JSON.
    pub json: bool,
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if configuration loading or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context {
        composition: load_config(cli.config.as_deref())?,
        json: cli.json,
    };
    tracing::debug!(config = ?ctx.composition, "loaded composition config");

    match cli.command {
        Command::Calc(args) => calc::execute(args, ctx),
        Command::Todo(args) => todo::execute(args, ctx),
        Command::Config(args) => config::execute(args, ctx),
    }
}

/// Loads the composition config from `path`, or from the environment.
///
/// # Errors
///
/// Returns an error if the file or environment value cannot be parsed.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CompositionConfig> {
    let config = match path {
        Some(path) => CompositionConfig::from_file(path)?,
        None => CompositionConfig::from_env()?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use std::io::Write;

    use stagewire_sdk::ValidationPolicy;

    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["stagewire", "calc", "3", "--json"]).expect("parse");
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Calc(_)));
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(br#"{"validation":"lazy"}"#).expect("write");
        let config = load_config(Some(file.path())).expect("load");
        assert_eq!(config.validation, ValidationPolicy::Lazy);
    }

    #[test]
    fn load_config_rejects_bad_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"not json").expect("write");
        assert!(load_config(Some(file.path())).is_err());
    }
}
