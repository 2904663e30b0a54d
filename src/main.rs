//! coverage-swap - replace one provider's coverage rows in a set of stores,
//! archiving the outgoing rows of the primary store first.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use coverage_swap::{Encoding, FileStore, Orchestrator, RunConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Json,
    Bitcode,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Json => Encoding::Json,
            EncodingArg::Bitcode => Encoding::Bitcode,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "coverage-swap", version)]
#[command(about = "Swap a provider's coverage data and archive what it replaces")]
struct Args {
    /// Directory holding the store files
    #[arg(long, env = "COVERAGE_SWAP_STORES")]
    stores: PathBuf,

    /// TOML run configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store holding the provider's complete new dataset
    #[arg(long)]
    new_dataset: Option<String>,

    /// Primary store, archived before replacement
    #[arg(long)]
    primary: Option<String>,

    /// Secondary store, replaced after the primary (repeatable)
    #[arg(long = "secondary")]
    secondaries: Vec<String>,

    /// Archive store for the primary's outgoing rows
    #[arg(long)]
    archive: Option<String>,

    /// Data round label stamped on archived rows
    #[arg(long)]
    round: Option<String>,

    /// Attribute naming the provider
    #[arg(long)]
    provider_field: Option<String>,

    /// Skip archival
    #[arg(long)]
    no_archive: bool,

    #[arg(long, value_enum, default_value = "json")]
    encoding: EncodingArg,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => {
                let (Some(dataset), Some(primary)) = (&self.new_dataset, &self.primary) else {
                    bail!("--new-dataset and --primary are required without --config");
                };
                RunConfig::new(dataset, primary)
            }
        };

        if let Some(dataset) = &self.new_dataset {
            config.new_dataset = dataset.clone();
        }
        if let Some(primary) = &self.primary {
            config.primary_store = primary.clone();
        }
        if !self.secondaries.is_empty() {
            config.secondary_stores = self.secondaries.clone();
        }
        if let Some(archive) = &self.archive {
            config.archive_store = Some(archive.clone());
        }
        if let Some(round) = &self.round {
            config.data_round = round.clone();
        }
        if let Some(field) = &self.provider_field {
            config.provider_field = field.clone();
            config.fields.provider_code = field.clone();
        }
        if self.no_archive {
            config.archive_enabled = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.run_config()?;
    let store = FileStore::open(&args.stores, args.encoding.into())
        .with_context(|| format!("opening stores under {}", args.stores.display()))?;
    info!(
        stores = %store.root().display(),
        encoding = ?store.encoding(),
        new_dataset = %config.new_dataset,
        primary = %config.primary_store,
        "starting run"
    );

    match Orchestrator::new(&store, config).run() {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(failure) => {
            println!("{}", serde_json::to_string_pretty(&failure.report)?);
            Err(failure.into())
        }
    }
}
