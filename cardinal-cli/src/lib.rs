//! Command-line client for Cardinal worlds.
//!
//! Parses [`config::Cli`] and runs one command against a world, printing the
//! result as JSON on stdout. Logs go to stderr.

pub mod config;
pub mod error;

use std::io::Write;

use config::{Cli, Command};
use error::CliError;
use serde_json::json;

/// Runs the parsed command, writing its result to `out`.
///
/// # Errors
///
/// Returns [`CliError`] if the key is missing or malformed, or the world
/// request fails.
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let result = match &cli.command {
        Command::Address => {
            let key = cli.persona_key()?;
            json!({ "address": key.address().to_checksum(None) })
        }
        Command::World => serde_json::to_value(cli.world_client().world().await?)?,
        Command::CreatePersona { persona_tag } => {
            cli.persona_key()?;
            let receipt = cli.world_client().create_persona(persona_tag).await?;
            tracing::info!(persona_tag = %persona_tag, tick = receipt.tick, "Persona creation accepted");
            serde_json::to_value(receipt)?
        }
        Command::Transact {
            name,
            persona_tag,
            payload,
        } => {
            cli.persona_key()?;
            let receipt = cli
                .world_client()
                .transact(name, persona_tag, payload.clone())
                .await?;
            tracing::info!(name = %name, tick = receipt.tick, "Transaction accepted");
            serde_json::to_value(receipt)?
        }
    };

    serde_json::to_writer_pretty(&mut *out, &result)?;
    writeln!(out)?;
    Ok(())
}
