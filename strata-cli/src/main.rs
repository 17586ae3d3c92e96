//! strata: incremental static site generator.
//!
//! # Usage
//!
//! ```text
//! strata [-v] build  [--config strata.yaml] [--full] [--dry-run]
//! strata [-v] status [--config strata.yaml] [--json]
//! strata      init   [PATH]
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{build::BuildArgs, init::InitArgs, status::StatusArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "strata",
    version,
    about = "Build a static site from Markdown sources, rewriting only what changed",
    long_about = None,
)]
struct Cli {
    /// Log more (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render stale pages, copy static files and prune orphaned output.
    Build(BuildArgs),

    /// Show which pages the next build would rewrite.
    Status(StatusArgs),

    /// Scaffold a new site.
    Init(InitArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Build(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Init(args) => args.run(),
    }
}

/// Logs go to stderr so `status --json` keeps stdout clean.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
