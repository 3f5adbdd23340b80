//! Failure reasons surfaced by the graph cache and the experiment runner.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// A required external binary is absent from the build directory.
    #[error("missing executable `{}`", .path.display())]
    MissingExecutable { path: PathBuf },

    /// The graph generator could not be started, exited non-zero, or wrote nothing.
    #[error("failed to generate graph `{}`: {reason}", .graph.display())]
    GraphGenerationFailure { graph: PathBuf, reason: String },

    /// Unrecognized benchmark task code.
    #[error("invalid benchmark variant `{0}`")]
    InvalidVariant(String),

    /// A benchmark could not be started or exited non-zero.
    #[error("benchmark `{command}` failed: {reason}")]
    BenchmarkFailure { command: String, reason: String },

    /// A benchmark exceeded its time budget and was killed.
    #[error("benchmark `{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
