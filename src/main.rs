//! license-sync command line
//!
//! Usage:
//!   license-sync authtoken --host tower.example.com -u admin -p secret
//!   license-sync license --host tower.example.com -u admin -p secret -l license.json
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use license_sync::{sync_license, AuthClient, ClientConfig, SyncReport, DEFAULT_TIMEOUT_SECS, LICENSE_TASK};
use serde::Serialize;
use serde_json::json;
use tracing::{error, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "license-sync", version)]
#[command(about = "Keep a host's license in sync with a local license document")]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Authenticate and print the API token
    Authtoken(Connection),

    /// Upload the local license if the host's license differs
    License {
        #[command(flatten)]
        connection: Connection,

        /// Path to the license document (JSON)
        #[arg(short, long, env = "TOWER_LICENSE")]
        license: PathBuf,
    },
}

#[derive(Args, Debug)]
struct Connection {
    /// Host name (and optional port) of the API server
    #[arg(long, env = "TOWER_HOST")]
    host: String,

    #[arg(short, long, visible_alias = "tower-user", env = "TOWER_USERNAME")]
    username: String,

    #[arg(short, long, visible_alias = "tower-password", env = "TOWER_PASSWORD", hide_env_values = true)]
    password: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Skip TLS certificate validation
    #[arg(long)]
    insecure: bool,

    #[arg(long, default_value = "https", value_parser = ["https", "http"])]
    scheme: String,
}

impl Connection {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_scheme(self.scheme.as_str())
            .with_timeout(Duration::from_secs(self.timeout))
            .with_validate_certs(!self.insecure)
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Authtoken(connection) => {
            let auth = AuthClient::new(connection.client_config())?;
            let credential = auth
                .authenticate(&connection.host, &connection.username, &connection.password)
                .await
                .with_context(|| format!("Could not authenticate against {}", connection.host))?;

            print_json(&json!({ "changed": true, "authtoken": credential.as_str() }))?;
        }
        Command::License { connection, license } => {
            let result = sync_license(
                connection.client_config(),
                &connection.host,
                &connection.username,
                &connection.password,
                &license,
            )
            .await;

            let report = match result {
                Ok(outcome) => SyncReport::from_outcomes([(LICENSE_TASK, &outcome)]),
                Err(e) => {
                    error!("{}", e);
                    SyncReport::from_error(LICENSE_TASK, &e)
                }
            };

            print_json(&report)?;
            if report.failed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
