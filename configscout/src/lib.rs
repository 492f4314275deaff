//! Library module for the configscout binary.
//!
//! Holds the CLI definition and the presentation adapters so they can be
//! tested without spawning the binary. Scan wiring lives in `main.rs`.

pub mod display;
pub mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use configscout_core::{ConnectionParams, Credentials, StatusUpdate};
use std::path::PathBuf;
use std::time::Duration;

/// Exit code when the server could not be reached or the login failed.
pub const EXIT_CONNECTION_FAILED: u8 = 2;

/// Exit code when the CSV export could not be written.
pub const EXIT_EXPORT_FAILED: u8 = 3;

/// Whether a status line is printed to stderr.
///
/// `--quiet` hides progress but never the line reporting a failed scan.
pub const fn status_visible(update: &StatusUpdate, quiet: bool) -> bool {
    !quiet || matches!(update, StatusUpdate::Failed { .. })
}

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "configscout")]
#[command(about = "SQL Server security configuration scanner")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "
configscout - SQL Server security configuration scanner

Connects to a SQL Server instance and reads a fixed list of security-relevant
server options from sys.configurations, together with the server's
authentication mode. Nothing on the server is modified.

SERVER FORMATS:
  host            default instance on port 1433
  host,port       explicit TCP port
  host\\instance   named instance (resolved through SQL Browser)

AUTHENTICATION:
  --user given    SQL Server login
  no --user       integrated (Windows) authentication

EXAMPLES:
  configscout --server db01 --user auditor --prompt-password
  configscout --server db01\\SQLEXPRESS --output scan.csv
  configscout --server 10.0.0.5,1533 --user sa --json
")]
pub struct Cli {
    /// Verbosity options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand; `None` runs a scan
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Scan options
    #[command(flatten)]
    pub scan: ScanArgs,
}

/// Available subcommands; without one, a scan is run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the configuration options every scan reads
    Targets,
}

/// Connection, output and logging options of a scan.
#[derive(Args)]
pub struct ScanArgs {
    /// Server to scan
    #[arg(
        short,
        long,
        env = "SCOUT_SERVER",
        default_value = "localhost",
        help = "Server as host, host,port or host\\instance"
    )]
    pub server: String,

    /// Database to connect to
    #[arg(
        short,
        long,
        env = "SCOUT_DATABASE",
        default_value = "master",
        help = "Database used for the login"
    )]
    pub database: String,

    /// SQL Server login
    #[arg(
        short,
        long,
        env = "SCOUT_USER",
        help = "SQL Server login; omit for integrated authentication"
    )]
    pub user: Option<String>,

    /// SQL Server password
    #[arg(
        long,
        env = "SCOUT_PASSWORD",
        hide_env_values = true,
        conflicts_with = "prompt_password",
        help = "Password for --user (prefer --prompt-password)"
    )]
    pub password: Option<String>,

    /// Prompt for the password
    #[arg(long, help = "Read the password for --user from the terminal")]
    pub prompt_password: bool,

    /// CSV export path
    #[arg(short, long, value_name = "FILE", help = "Export the records to a CSV file")]
    pub output: Option<PathBuf>,

    /// JSON report
    #[arg(long, help = "Print the full scan report as JSON instead of a table")]
    pub json: bool,

    /// Trust the server certificate
    #[arg(long, help = "Accept the server certificate without validation")]
    pub trust_server_certificate: bool,

    /// Connect timeout in seconds
    #[arg(
        long,
        value_name = "SECS",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Upper bound for TCP connect plus login"
    )]
    pub connect_timeout: u64,

    /// Log file path
    #[arg(
        long,
        value_name = "FILE",
        help = "Append log lines to this file (default: <temp dir>/configscout.log)"
    )]
    pub log_file: Option<PathBuf>,
}

/// Verbosity options accepted by every command.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(
        short,
        long,
        global = true,
        help = "Suppress all log output except errors"
    )]
    pub quiet: bool,
}

impl std::fmt::Debug for ScanArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanArgs")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("prompt_password", &self.prompt_password)
            .field("output", &self.output)
            .field("json", &self.json)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("connect_timeout", &self.connect_timeout)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl ScanArgs {
    /// Resolves the login, reading the password with `prompt` when
    /// `--prompt-password` is set.
    ///
    /// Returns `None` for integrated authentication; a password given
    /// without `--user` is ignored.
    ///
    /// # Errors
    /// Returns error if the prompt fails.
    pub fn credentials<F>(&self, prompt: F) -> anyhow::Result<Option<Credentials>>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        let Some(user) = self.user.as_deref().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };

        let password = if self.prompt_password {
            Some(prompt().context("Failed to read password")?)
        } else {
            self.password.clone()
        };

        Ok(Some(Credentials::new(user.to_string(), password)))
    }

    /// Builds connection parameters from the arguments.
    pub fn connection_params(&self, credentials: Option<Credentials>) -> ConnectionParams {
        let params = ConnectionParams::new(self.server.trim(), self.database.trim())
            .with_trust_server_certificate(self.trust_server_certificate)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout));

        match credentials {
            Some(credentials) => params.with_credentials(credentials),
            None => params,
        }
    }
}
