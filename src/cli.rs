//! Command-line interface for fixture-forge.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::builder::SyntheticDatasetBuilder;
use crate::config::GeneratorConfig;
use crate::export::{self, JsonFileSink};

#[derive(Parser)]
#[command(name = "fixture-forge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate both fixture databases
    Generate {
        /// Seed for a reproducible build (default: entropy)
        #[arg(long, env = "FORGE_SEED")]
        seed: Option<u64>,

        /// Directory the database documents are written under
        #[arg(long, default_value = "./generated-fixtures")]
        output_dir: PathBuf,

        /// Override the number of districts
        #[arg(long)]
        districts: Option<usize>,

        /// Write compact instead of pretty-printed JSON
        #[arg(long)]
        compact: bool,
    },
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs the parsed command.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Generate {
            seed,
            output_dir,
            districts,
            compact,
        } => {
            let mut config = GeneratorConfig::from_env()?;
            if let Some(seed) = seed {
                config.seed = Some(seed);
            }
            if let Some(districts) = districts {
                config.num_districts = districts;
            }

            let builder = SyntheticDatasetBuilder::new(config)?;
            let ctx = builder.build()?;

            let sink = if compact {
                JsonFileSink::compact()
            } else {
                JsonFileSink::new()
            };
            let summary = export::export_databases(&ctx, &output_dir, &sink)?;

            println!(
                "Generated {} users and {} administrations",
                summary.user_count, summary.administration_count
            );
            println!("  roster db: {}", summary.roster_path.display());
            println!("  engine db: {}", summary.engine_path.display());
            Ok(())
        }
    }
}
