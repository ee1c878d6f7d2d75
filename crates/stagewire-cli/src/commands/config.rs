//! `stagewire config` — Print the effective composition configuration.

use clap::Args;

use super::Context;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Executes the `config` command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn execute(_args: ConfigArgs, ctx: Context) -> anyhow::Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string(&ctx.composition)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&ctx.composition)?);
    }
    Ok(())
}
