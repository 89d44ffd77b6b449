mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use household_budget_core::models::settings::LedgerConfig;
use household_budget_core::storage::file::FileStore;
use household_budget_core::HouseholdLedger;

use commands::Command;

/// kakeibo: a local household budget (income/expense) ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file the ledger is stored in. Defaults to the user data directory.
    #[arg(long, env = "KAKEIBO_DATA_FILE", global = true)]
    data_file: Option<PathBuf>,

    /// Start from an empty ledger instead of the sample data on first run.
    #[arg(long, global = true)]
    no_seed: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    setup_logging();

    let args = Args::parse();

    let data_file = match args.data_file {
        Some(path) => path,
        None => default_data_file()?,
    };
    let store = FileStore::open(&data_file)
        .with_context(|| format!("Failed to open ledger file {}", data_file.display()))?;

    let config = if args.no_seed {
        LedgerConfig::without_seed()
    } else {
        LedgerConfig::default()
    };
    let mut ledger = HouseholdLedger::open(store, config).context("Failed to load ledger")?;
    tracing::debug!(path = %data_file.display(), transactions = ledger.len(), "ledger loaded");

    commands::run(args.command, &mut ledger)
}

/// Log to stderr so command output on stdout stays clean.
/// Verbosity comes from `RUST_LOG`, `warn` by default.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_data_file() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "household-budget", "HouseholdBudget")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().join("storage.json"))
}
