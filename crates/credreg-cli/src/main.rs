//! # credreg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use credreg_cli::export::{run_export, ExportArgs};
use credreg_cli::health::run_health;
use credreg_cli::list::{run_list, ListArgs};
use credreg_cli::revoke::{run_revoke, RevokeArgs};
use credreg_cli::shell::{run_shell_command, ShellArgs};
use credreg_cli::verify::{run_verify, VerifyArgs};
use credreg_cli::RegistryArgs;

/// Administrative console for a university credential registry.
///
/// Lists, filters, exports, verifies and revokes certificates held by the
/// registry service.
#[derive(Parser, Debug)]
#[command(name = "credreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    registry: RegistryArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List certificates, optionally filtered.
    List(ListArgs),

    /// Export the filtered listing as CSV.
    Export(ExportArgs),

    /// Revoke a certificate. Irreversible.
    Revoke(RevokeArgs),

    /// Check a certificate against the public verification endpoint.
    Verify(VerifyArgs),

    /// Report registry health.
    Health,

    /// Interactive session with search history and revocation confirmation.
    Shell(ShellArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "credreg starting");

    let result = match &cli.command {
        Commands::List(args) => run_list(args, &cli.registry).await,
        Commands::Export(args) => run_export(args, &cli.registry).await,
        Commands::Revoke(args) => run_revoke(args, &cli.registry).await,
        Commands::Verify(args) => run_verify(args, &cli.registry).await,
        Commands::Health => run_health(&cli.registry).await,
        Commands::Shell(args) => run_shell_command(args, &cli.registry).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
