//! SQL Server security configuration scanner.
//!
//! This binary connects to a SQL Server instance, reads a fixed list of
//! security-relevant server options and the authentication mode, shows them
//! as a table (or JSON) and optionally exports them to CSV.
//!
//! # Security Guarantees
//! - Read-only catalog queries only
//! - Passwords are never logged; connection strings are logged redacted
//! - Interactive password prompt via `--prompt-password`

use anyhow::Context;
use clap::Parser;
use configscout::display::TerminalTable;
use configscout::output::{show_records, write_json_report, write_targets};
use configscout::{
    Cli, Command, EXIT_CONNECTION_FAILED, EXIT_EXPORT_FAILED, ScanArgs, status_visible,
};
use configscout_core::logging::default_log_path;
use configscout_core::{MssqlConnector, ScanRunner, Scanner, export_csv, init_logging};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_path = cli.scan.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(cli.global.verbose, cli.global.quiet, Some(&log_path))?;

    match cli.command {
        Some(Command::Targets) => {
            let scanner = Scanner::new(MssqlConnector::new());
            write_targets(scanner.targets(), io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        None => scan(&cli.scan, cli.global.quiet).await,
    }
}

/// Runs one scan, shows the result and exports it if requested.
async fn scan(args: &ScanArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    let credentials = args.credentials(|| rpassword::prompt_password("Password: "))?;
    let params = args.connection_params(credentials);
    params.validate()?;

    info!("Target: {}", params.redacted_connection_string());

    let runner = ScanRunner::new(Scanner::new(MssqlConnector::new()));
    let mut handle = runner.submit(params)?;

    while let Some(update) = handle.next_update().await {
        if status_visible(&update, quiet) {
            eprintln!("{update}");
        }
    }

    let report = handle.wait().await?;

    if args.json {
        write_json_report(&report, io::stdout().lock())?;
    } else if report.is_completed() {
        let mut table = TerminalTable::new();
        show_records(&mut table, &report);
        table
            .render(io::stdout().lock())
            .context("Failed to write table")?;
    }

    if !report.is_completed() {
        return Ok(ExitCode::from(EXIT_CONNECTION_FAILED));
    }

    if let Some(path) = &args.output {
        if let Err(e) = export_csv(&report.records, path) {
            error!("Export failed: {}", e);
            return Ok(ExitCode::from(EXIT_EXPORT_FAILED));
        }
        if !quiet {
            eprintln!("Exported {} records to {}", report.record_count(), path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}
