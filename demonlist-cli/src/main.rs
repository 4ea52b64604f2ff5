//! Integrated Demonlist CLI - Command-line interface
//!
//! Loads the TSL and TSL+ demonlists through the `demonlist` library and
//! prints them. Log output goes to stderr and is controlled by `RUST_LOG`
//! or `--verbose`.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use error::CliError;

/// Default log filter when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,reqwest=warn";

#[derive(Debug, Parser)]
#[command(
    name = "demonlist",
    version,
    about = "Fetch and print the TSL and TSL+ demonlists"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config.ini (defaults to the per-user config file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a list and print its entries
    Load(commands::load::LoadArgs),

    /// Check whether a list host is reachable
    Probe(commands::probe::ProbeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = commands::common::load_config(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Load(args) => commands::load::run(args, config).await,
            Commands::Probe(args) => commands::probe::run(args, config).await,
        }
    })
}
