//! # pm3 CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Logs go to stderr so stdout carries only command output.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pm3_cli::commit::{run_commit, CommitArgs};
use pm3_cli::ops::{run_ops, OpsArgs};
use pm3_cli::replay::{run_replay, ReplayArgs};

/// PM3 custody ledger tooling.
///
/// Replays transaction scenarios against an in-memory ledger, computes
/// commitments of JSON documents, and lists the contracts' dispatch tables.
#[derive(Parser, Debug)]
#[command(name = "pm3", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output when RUST_LOG is unset (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a scripted list of transactions to a fresh in-memory ledger.
    Replay(ReplayArgs),

    /// Print the commitment of a JSON document.
    Commit(CommitArgs),

    /// Print the dispatch tables of pm3package and roleauth.
    Ops(OpsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Replay(args) => run_replay(args, &mut stdout),
        Commands::Commit(args) => run_commit(args, &mut stdout),
        Commands::Ops(args) => run_ops(args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
