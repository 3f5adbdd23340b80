//! The harness configuration.
//!
//! Loaded from `--config <FILE>`, or `./harness.toml` when present. Every field
//! is optional:
//!
//! ```toml
//! root-dir = ".."            # project root
//! data-dir = "../data"       # graph cache. Default to `<root-dir>/data`
//! build-dir = "../build"     # external executables. Default to `<root-dir>/build`
//! output-dir = "."           # CSV results
//! threads = 4
//! iterations = 10
//! timeout-per-iteration = 300 # seconds
//! ```
//!
//! A `[[profiles]]` array replaces the built-in experiment table.
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    profiles::{ExperimentProfile, DEFAULT_PROFILES},
    runner::DEFAULT_TIMEOUT_PER_ITERATION,
};

pub const DEFAULT_CONFIG_FILE: &str = "harness.toml";

fn default_root_dir() -> PathBuf {
    PathBuf::from("..")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_threads() -> usize {
    4
}

fn default_iterations() -> usize {
    10
}

/// Upper bound for `timeout-per-iteration`, one day.
pub const MAX_TIMEOUT_PER_ITERATION: u64 = 24 * 60 * 60;

fn default_timeout_per_iteration() -> u64 {
    DEFAULT_TIMEOUT_PER_ITERATION.as_secs()
}

fn default_profiles() -> Vec<ExperimentProfile> {
    DEFAULT_PROFILES.clone()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct HarnessConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub build_dir: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Default thread count, overridable from the command line
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Time budget in seconds per benchmark iteration (per thread count in thread-range mode)
    #[serde(default = "default_timeout_per_iteration")]
    pub timeout_per_iteration: u64,
    #[serde(default = "default_profiles")]
    pub profiles: Vec<ExperimentProfile>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            data_dir: None,
            build_dir: None,
            output_dir: default_output_dir(),
            threads: default_threads(),
            iterations: default_iterations(),
            timeout_per_iteration: default_timeout_per_iteration(),
            profiles: default_profiles(),
        }
    }
}

impl HarnessConfig {
    /// A default config with all directories placed under `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            root_dir: root.to_owned(),
            output_dir: root.to_owned(),
            ..Default::default()
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| self.root_dir.join("data"))
    }

    pub fn build_dir(&self) -> PathBuf {
        self.build_dir
            .clone()
            .unwrap_or_else(|| self.root_dir.join("build"))
    }

    pub fn timeout_per_iteration(&self) -> Duration {
        Duration::from_secs(self.timeout_per_iteration)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config = toml::from_str::<HarnessConfig>(&s)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise `./harness.toml` if it exists, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.threads == 0 {
            anyhow::bail!("`threads` must be at least 1");
        }
        if self.iterations == 0 {
            anyhow::bail!("`iterations` must be at least 1");
        }
        if !(1..=MAX_TIMEOUT_PER_ITERATION).contains(&self.timeout_per_iteration) {
            anyhow::bail!(
                "`timeout-per-iteration` must be between 1 and {} seconds",
                MAX_TIMEOUT_PER_ITERATION
            );
        }
        for (i, profile) in self.profiles.iter().enumerate() {
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                anyhow::bail!("Duplicate experiment profile `{}`", profile.name);
            }
            profile.validate()?;
        }
        Ok(())
    }
}
