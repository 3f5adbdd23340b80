use std::{
    fs::File,
    path::{Path, PathBuf},
};

use colored::Colorize;
use log::info;

use crate::{
    config::HarnessConfig,
    error::HarnessResult,
    graph_cache::GraphCache,
    print_md,
    profiles::ExperimentProfile,
    runner::{ExperimentConfig, ExperimentRunner},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// The output file already existed, nothing was run.
    Skipped(PathBuf),
    /// The output file was written from scratch by `runs` benchmark invocations.
    Completed { path: PathBuf, runs: usize },
}

impl ProfileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ProfileOutcome::Skipped(path) => path,
            ProfileOutcome::Completed { path, .. } => path,
        }
    }
}

#[derive(Debug, Default)]
pub struct DriverReport {
    pub outcomes: Vec<ProfileOutcome>,
}

impl DriverReport {
    pub fn invocations(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                ProfileOutcome::Completed { runs, .. } => *runs,
                ProfileOutcome::Skipped(_) => 0,
            })
            .sum()
    }
}

/// Runs every experiment profile of a config in declaration order.
///
/// A profile whose CSV file already exists is considered done, regardless of
/// its content. The first failure aborts the whole driver run and leaves the
/// partially written CSV behind.
pub struct ExperimentMatrixDriver<'a> {
    config: &'a HarnessConfig,
    cache: GraphCache,
    runner: ExperimentRunner,
}

impl<'a> ExperimentMatrixDriver<'a> {
    pub fn new(config: &'a HarnessConfig) -> Self {
        Self {
            config,
            cache: GraphCache::new(config.data_dir(), config.build_dir()),
            runner: ExperimentRunner::new(config.build_dir(), config.timeout_per_iteration()),
        }
    }

    pub fn output_path(&self, profile: &ExperimentProfile) -> PathBuf {
        self.config
            .output_dir
            .join(profile.output_file_name(self.config.threads, self.config.iterations))
    }

    fn print_before_run(&self) {
        print_md!("# Dynamic Connectivity Experiments\n\n");
        print_md!("* profiles: `{}`", self.config.profiles.len());
        print_md!("* threads: `{}`", self.config.threads);
        print_md!("* iterations: `{}`", self.config.iterations);
        print_md!("* graphs: `{}`", self.cache.data_dir().display());
        print_md!("* executables: `{}`", self.runner.build_dir().display());
        println!();
    }

    fn print_after_run(&self, report: &DriverReport) {
        println!("\n{}\n", "✔ Experiments Finished.".green());
        print_md!("Results:\n");
        for outcome in &report.outcomes {
            match outcome {
                ProfileOutcome::Skipped(path) => {
                    print_md!("* `{}` (skipped)", path.display());
                }
                ProfileOutcome::Completed { path, runs } => {
                    print_md!("* `{}` ({} runs)", path.display(), runs);
                }
            }
        }
    }

    pub fn run_profile(&self, profile: &ExperimentProfile) -> HarnessResult<ProfileOutcome> {
        let path = self.output_path(profile);
        if path.exists() {
            info!("{} exists, skipping profile {}", path.display(), profile.name);
            return Ok(ProfileOutcome::Skipped(path));
        }
        println!("{}", format!("Running {}", profile.name).blue().bold());
        std::fs::create_dir_all(&self.config.output_dir)?;
        let output = File::create(&path)?;
        let points = profile.points(self.config.threads, self.config.iterations);
        for (i, point) in points.iter().enumerate() {
            let graph = self.cache.resolve(&point.graph)?;
            let config = ExperimentConfig {
                variant: point.variant.clone(),
                graph,
                num_threads: point.num_threads,
                thread_range: point.thread_range,
                num_iterations: point.num_iterations,
                emit_header: i == 0,
            };
            self.runner.run(&config, &output)?;
        }
        output.sync_all()?;
        Ok(ProfileOutcome::Completed {
            path,
            runs: points.len(),
        })
    }

    pub fn run(&self) -> HarnessResult<DriverReport> {
        self.print_before_run();
        let mut report = DriverReport::default();
        for profile in &self.config.profiles {
            let outcome = self.run_profile(profile)?;
            report.outcomes.push(outcome);
        }
        self.print_after_run(&report);
        Ok(report)
    }
}
