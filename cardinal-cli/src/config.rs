//! Command-line and environment configuration.
//!
//! Every global option can also come from the environment, and a `.env` file
//! in the working directory is loaded before parsing.
//!
//! # Environment Variables
//!
//! - `CARDINAL_URL` - Base URL of the world (default: `http://localhost:4040`)
//! - `CARDINAL_PRIVATE_KEY` - Hex-encoded signing key
//! - `CARDINAL_NAMESPACE` - Sign with this namespace instead of fetching it
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::fmt;

use cardinal_evm::PersonaKey;
use cardinal_http::constants::DEFAULT_BASE_URL;
use cardinal_http::{SigningKey, WorldClient};
use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

use crate::error::CliError;

/// Sign and submit transactions to a Cardinal world.
#[derive(Parser)]
#[command(name = "cardinal", version)]
pub struct Cli {
    /// Base URL of the world
    #[arg(long, env = "CARDINAL_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub url: Url,

    /// Hex-encoded private key used to sign transactions
    #[arg(long, env = "CARDINAL_PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<String>,

    /// Sign with this namespace instead of fetching it from the world
    #[arg(long, env = "CARDINAL_NAMESPACE", global = true)]
    pub namespace: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("url", &self.url.as_str())
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("namespace", &self.namespace)
            .field("command", &self.command)
            .finish()
    }
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the world's info, including its namespace
    World,

    /// Print the address of the configured key
    Address,

    /// Claim a persona tag for the configured key
    CreatePersona {
        /// Persona tag to claim
        persona_tag: String,
    },

    /// Submit a game transaction
    Transact {
        /// Transaction name, as registered by the world
        name: String,

        /// Persona submitting the transaction
        #[arg(long, short)]
        persona_tag: String,

        /// Transaction payload as JSON
        #[arg(long, default_value = "{}", value_parser = parse_payload)]
        payload: Value,
    },
}

fn parse_payload(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw)
}

impl Cli {
    /// Parses the configured private key.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingKey`] when no key was given, or
    /// [`CliError::Key`] when it is not a valid secp256k1 key.
    pub fn persona_key(&self) -> Result<PersonaKey, CliError> {
        let key = self.private_key.as_deref().ok_or(CliError::MissingKey)?;
        Ok(PersonaKey::from_hex(key)?)
    }

    /// Builds a world client from the global options.
    #[must_use]
    pub fn world_client(&self) -> WorldClient {
        let client = match &self.namespace {
            Some(namespace) => WorldClient::with_query_namespace(self.url.clone(), namespace),
            None => WorldClient::new(self.url.clone()),
        };
        match &self.private_key {
            Some(key) => client.with_signing_key(SigningKey::new(key.as_str())),
            None => client,
        }
    }
}
