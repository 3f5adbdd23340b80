//! Benchmark automation for dynamic connectivity implementations.
//!
//! The harness generates input graphs with an external `graph_construction`
//! tool, caches them on disk, and runs the `benchmark_dynamic_connectivity*`
//! executables over a matrix of experiment profiles. Each profile streams
//! the benchmark output into one CSV file.

use std::path::PathBuf;

use clap::Parser;

#[macro_use]
pub mod utils;
pub mod config;
pub mod driver;
pub mod error;
pub mod graph_cache;
pub mod profiles;
pub mod runner;

use config::HarnessConfig;
use driver::{DriverReport, ExperimentMatrixDriver};

/// Run the dynamic connectivity experiments
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Number of threads. Overrides the configured thread count (default 4)
    pub threads: Option<usize>,
    /// Path to the harness config file. Default to `./harness.toml` if it exists
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Load the configuration and run all experiment profiles.
pub fn entry(cli: &Cli) -> anyhow::Result<DriverReport> {
    let mut config = HarnessConfig::load_or_default(cli.config.as_deref())?;
    if let Some(threads) = cli.threads {
        if threads == 0 {
            anyhow::bail!("Thread count must be at least 1");
        }
        config.threads = threads;
    }
    run(&config)
}

/// Run all experiment profiles of `config`.
pub fn run(config: &HarnessConfig) -> anyhow::Result<DriverReport> {
    config.validate()?;
    let driver = ExperimentMatrixDriver::new(config);
    Ok(driver.run()?)
}
