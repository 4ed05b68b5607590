//! Optiscan command-line interface.
//!
//! Run a parameter scan from a JSON configuration file:
//! ```sh
//! optiscan run --config cavity.json --out results/
//! ```

mod config;
mod output;
mod runner;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use optiscan_core::Topology;
use optiscan_engine::{Engine, ProcessEngine};

#[derive(Parser)]
#[command(name = "optiscan")]
#[command(about = "Optiscan: parameter scans over simple optical topologies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scan from a JSON (or .toml) configuration file.
    Run {
        /// Path to the configuration file.
        #[arg(long)]
        config: PathBuf,
        /// Output directory, created if absent.
        #[arg(long)]
        out: PathBuf,
        /// Simulation engine executable.
        #[arg(long, env = "OPTISCAN_ENGINE", default_value = optiscan_engine::process::DEFAULT_PROGRAM)]
        engine: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            out,
            engine,
        } => {
            let raw = config::load_config(&config)?;
            let job = config::JobConfig::from_value(&raw)?;
            let topology = Topology::from_names(&job.system.system_type, &job.system.topology)?;
            log::info!("configuration {} selects {}", config.display(), topology);

            output::ensure_dir(&out)?;

            let engine = ProcessEngine::new(engine);
            engine.ensure_available()?;

            let table = runner::run_job(&job, topology, &engine)
                .with_context(|| format!("Run of '{}' failed", config.display()))?;
            let paths = output::write_outputs(&table, &out, topology.title())?;

            println!("Wrote: {}", paths.csv.display());
            println!("Wrote: {}", paths.png.display());
            Ok(())
        }
    }
}
