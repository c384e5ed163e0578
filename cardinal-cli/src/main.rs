//! Cardinal command-line client.
//!
//! # Usage
//!
//! ```bash
//! # Print the address of a key
//! CARDINAL_PRIVATE_KEY=0x... cardinal address
//!
//! # Claim a persona and move it
//! cardinal create-persona alice
//! cardinal transact move --persona-tag alice --payload '{"direction":"up"}'
//!
//! # Verbose logging
//! RUST_LOG=cardinal_http=debug cardinal world
//! ```

use std::io;

use cardinal_cli::config::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = cardinal_cli::run(cli, &mut io::stdout().lock()).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
