//! PlexCast: link a Plex server to a Chromecast receiver.
//!
//! The command signs in to plex.tv, finds the account's reachable media
//! servers, browses the LAN for Chromecast receivers and stores the
//! chosen pair in `config.yaml` for downstream playback tooling.

mod cli;
mod prompt;
mod table;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Quiet by default so the prompts stay readable; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    cli::run(cli::Cli::parse()).await;
}
