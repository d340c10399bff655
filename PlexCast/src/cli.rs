//! Command definitions and the error → exit-code mapping.
//!
//! Library crates return typed errors untouched; this module is the only
//! place that converts them to exit codes. Every fatal path prints a
//! single `"<prompt>: <error>"` line to stdout.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use pcastchromecast::Chromecast;
use pcastconfig::{Configuration, CONFIG_FILE_NAME};
use pcastplex::{PlexAccount, PlexError, ReachableEndpoint, DEFAULT_SCAN_TIMEOUT};

use crate::prompt;
use crate::table::Table;

/// How long `configure` browses for receivers. `chromecast list` uses its
/// own, shorter `--timeout` default.
const CONFIGURE_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "plexcast", about = "Launch a plex stream on chromecast", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plex commands
    Plex {
        #[command(subcommand)]
        command: PlexCommand,
    },
    /// Chromecast commands
    Chromecast {
        #[command(subcommand)]
        command: CastCommand,
    },
    /// Store credentials for future use
    Configure(ConfigureArgs),
}

#[derive(Subcommand)]
enum PlexCommand {
    /// List all plex servers
    List {
        /// Plex username
        #[arg(long)]
        username: Option<String>,
        /// Plex password
        #[arg(long)]
        password: Option<String>,
        /// Timeout connecting to servers, in seconds
        #[arg(long, default_value_t = DEFAULT_SCAN_TIMEOUT.as_secs())]
        timeout: u64,
    },
    /// Get plex token
    Token {
        /// Plex username
        #[arg(long)]
        username: Option<String>,
        /// Plex password
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum CastCommand {
    /// Find chromecasts
    List {
        /// Wait for this many seconds to find chromecasts
        #[arg(long, default_value_t = 15)]
        timeout: u64,
    },
}

#[derive(Args)]
struct ConfigureArgs {
    /// Plex username
    #[arg(long)]
    username: Option<String>,
    /// Plex password
    #[arg(long)]
    password: Option<String>,
    /// Plex token (with --plex-url, skips sign-in)
    #[arg(long)]
    plex_token: Option<String>,
    /// Plex URL (skips the server scan)
    #[arg(long)]
    plex_url: Option<String>,
    /// Chromecast name (skips discovery)
    #[arg(long)]
    chromecast: Option<String>,
}

pub async fn run(cli: Cli) {
    match cli.command {
        Command::Plex {
            command:
                PlexCommand::List {
                    username,
                    password,
                    timeout,
                },
        } => plex_list(username, password, Duration::from_secs(timeout)).await,
        Command::Plex {
            command: PlexCommand::Token { username, password },
        } => plex_token(username, password).await,
        Command::Chromecast {
            command: CastCommand::List { timeout },
        } => chromecast_list(Duration::from_secs(timeout)).await,
        Command::Configure(args) => configure(args).await,
    }
}

/// Unwrap or print `"<prompt>: <error>"` and exit with `code`.
fn check<T, E: Display>(result: Result<T, E>, code: i32, prompt: &str) -> T {
    match result {
        Ok(value) => value,
        Err(error) => fail(code, prompt, error),
    }
}

fn fail(code: i32, prompt: &str, error: impl Display) -> ! {
    println!("{}: {}", prompt, error);
    process::exit(code);
}

/// Prompt for whatever credentials are missing and sign in.
async fn signed_in_account(username: Option<String>, password: Option<String>) -> PlexAccount {
    let username = check(prompt::username(username), 1, "Failed to get username");
    let password = check(prompt::password(password), 2, "Failed to get password");

    print!("Signing in ... ");
    let _ = io::stdout().flush();
    let account = check(
        pcastplex::sign_in(&username, &password).await,
        3,
        "failed to sign in",
    );
    println!("done");
    account
}

async fn plex_list(username: Option<String>, password: Option<String>, timeout: Duration) {
    let account = signed_in_account(username, password).await;

    let rows = check(
        pcastplex::probe_all(&account, timeout).await,
        4,
        "failed to get devices",
    );

    let mut table = Table::new(&["Server Name", "Username", "Url", "Status"]);
    for row in rows {
        let status = if row.reachable { "Up" } else { "" };
        table.add_row(vec![row.server, row.owner, row.uri, status.to_string()]);
    }
    table.print();
}

async fn plex_token(username: Option<String>, password: Option<String>) {
    let account = signed_in_account(username, password).await;
    println!("{}", account.token);
}

async fn chromecast_list(timeout: Duration) {
    println!("Searching for chromecasts for {}s ...", timeout.as_secs());
    let receivers = check(
        pcastchromecast::discover(timeout).await,
        5,
        "failed to find chromecasts",
    );
    debug!("discovery returned {} receiver(s)", receivers.len());

    let mut table = Table::new(&["Chromecast Name", "Address"]);
    for receiver in &receivers {
        table.add_row(vec![receiver.name.clone(), receiver.address()]);
    }
    table.print();
}

async fn configure(args: ConfigureArgs) {
    // Everything supplied on the command line: nothing to look up.
    if let (Some(token), Some(url), Some(name)) =
        (&args.plex_token, &args.plex_url, &args.chromecast)
    {
        write_configuration(Configuration {
            plex_token: token.clone(),
            plex_url: url.clone(),
            chromecast_name: name.clone(),
        });
        return;
    }

    let account = signed_in_account(args.username, args.password).await;

    let plex_url = match args.plex_url {
        Some(url) => url,
        None => {
            print!("Testing devices ... ");
            let _ = io::stdout().flush();
            let reachable = check(
                pcastplex::enumerate_servers(&account, DEFAULT_SCAN_TIMEOUT).await,
                4,
                "failed to get device",
            );
            let chosen = pick_server(reachable);
            println!("got device: {}", chosen.device.name);
            chosen.connection.uri
        }
    };

    let chromecast_name = match args.chromecast {
        Some(name) => name,
        None => {
            print!("Discovering chromecasts ... ");
            let _ = io::stdout().flush();
            let receivers = check(
                pcastchromecast::discover(CONFIGURE_DISCOVERY_TIMEOUT).await,
                5,
                "failed to find chromecasts",
            );
            println!("done");
            let receiver = pick_chromecast(receivers);
            println!("found {}", receiver.name);
            receiver.name
        }
    };

    write_configuration(Configuration {
        plex_token: args.plex_token.unwrap_or(account.token),
        plex_url,
        chromecast_name,
    });
}

/// Single server wins automatically; several go through the menu; none is
/// the well-known empty-scan condition.
fn pick_server(mut reachable: Vec<ReachableEndpoint>) -> ReachableEndpoint {
    match reachable.len() {
        0 => fail(4, "failed to get device", PlexError::NoReachableServer),
        1 => reachable.remove(0),
        count => {
            println!("Found {} valid devices", count);
            let labels: Vec<String> = reachable
                .iter()
                .map(|endpoint| {
                    format!("{} ({})", endpoint.device.name, endpoint.connection.uri)
                })
                .collect();
            let index = check(
                prompt::pick("Select a server", &labels),
                4,
                "failed to get device",
            );
            reachable.remove(index)
        }
    }
}

/// Receivers are not disambiguated interactively: one wins, several abort.
fn pick_chromecast(mut receivers: Vec<Chromecast>) -> Chromecast {
    match receivers.len() {
        0 => fail(5, "failed to find chromecasts", "no chromecasts found"),
        1 => receivers.remove(0),
        count => {
            println!("Found {} chromecasts", count);
            process::exit(6);
        }
    }
}

fn write_configuration(config: Configuration) {
    let yaml = check(config.to_yaml(), 6, "Failed to create config");
    check(
        pcastconfig::write_yaml(Path::new(CONFIG_FILE_NAME), &yaml),
        7,
        "Failed to write config",
    );
    println!("Done!");
}
