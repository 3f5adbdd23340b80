use std::{
    fs::File,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::info;

use crate::{
    error::{HarnessError, HarnessResult},
    utils::cmd,
};

/// Common prefix of all benchmark executables.
pub const BENCHMARK_PREFIX: &str = "benchmark_dynamic_connectivity";

pub const DEFAULT_TIMEOUT_PER_ITERATION: Duration = Duration::from_secs(5 * 60);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Dynamic connectivity implementation under test, one per benchmark executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Sequential,
    B,
    C,
    D,
    E,
    F,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Sequential,
        Variant::B,
        Variant::C,
        Variant::D,
        Variant::E,
        Variant::F,
    ];

    pub fn from_code(code: &str) -> HarnessResult<Self> {
        match code {
            "a" => Ok(Variant::Sequential),
            "b" => Ok(Variant::B),
            "c" => Ok(Variant::C),
            "d" => Ok(Variant::D),
            "e" => Ok(Variant::E),
            "f" => Ok(Variant::F),
            _ => Err(HarnessError::InvalidVariant(code.to_owned())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Variant::Sequential => "a",
            Variant::B => "b",
            Variant::C => "c",
            Variant::D => "d",
            Variant::E => "e",
            Variant::F => "f",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Variant::Sequential => "_sequential",
            Variant::B => "_b",
            Variant::C => "_c",
            Variant::D => "_d",
            Variant::E => "_e",
            Variant::F => "",
        }
    }

    pub fn executable_name(&self) -> String {
        format!("{}{}", BENCHMARK_PREFIX, self.suffix())
    }
}

/// Upper bound on the wall time of one benchmark invocation.
///
/// In thread-range mode the benchmark repeats all iterations once per thread
/// count from 1 to `num_threads`, so the budget scales with the thread count.
/// Saturates at `Duration::MAX`.
pub fn timeout(
    num_iterations: usize,
    num_threads: usize,
    thread_range: bool,
    per_iteration: Duration,
) -> Duration {
    let rounds = num_iterations.saturating_mul(if thread_range { num_threads } else { 1 });
    per_iteration.saturating_mul(u32::try_from(rounds).unwrap_or(u32::MAX))
}

/// One fully resolved benchmark invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Task code, `a` to `f`
    pub variant: String,
    pub graph: PathBuf,
    pub num_threads: usize,
    pub thread_range: bool,
    pub num_iterations: usize,
    /// Whether the benchmark should print its CSV header row
    pub emit_header: bool,
}

impl ExperimentConfig {
    pub fn timeout(&self, per_iteration: Duration) -> Duration {
        timeout(
            self.num_iterations,
            self.num_threads,
            self.thread_range,
            per_iteration,
        )
    }
}

/// Runs benchmark executables from a build directory, one at a time.
pub struct ExperimentRunner {
    build_dir: PathBuf,
    timeout_per_iteration: Duration,
}

impl ExperimentRunner {
    pub fn new(build_dir: impl Into<PathBuf>, timeout_per_iteration: Duration) -> Self {
        Self {
            build_dir: build_dir.into(),
            timeout_per_iteration,
        }
    }

    pub fn executable(&self, variant: Variant) -> PathBuf {
        self.build_dir.join(variant.executable_name())
    }

    pub fn command(&self, variant: Variant, config: &ExperimentConfig) -> Command {
        let mut command = Command::new(self.executable(variant));
        command
            .arg("-graph")
            .arg(&config.graph)
            .arg("-num-threads")
            .arg(config.num_threads.to_string())
            .arg("-num-iterations")
            .arg(config.num_iterations.to_string());
        if config.thread_range {
            command.arg("-thread-range");
        }
        if !config.emit_header {
            command.arg("-no-header");
        }
        command
    }

    /// Run one benchmark to completion, appending its stdout to `sink`.
    pub fn run(&self, config: &ExperimentConfig, sink: &File) -> HarnessResult<()> {
        let variant = Variant::from_code(&config.variant)?;
        let executable = self.executable(variant);
        if !executable.is_file() {
            return Err(HarnessError::MissingExecutable { path: executable });
        }
        let mut command = self.command(variant, config);
        command.stdout(Stdio::from(sink.try_clone()?));
        let line = cmd::command_line(&command);
        info!("{}", line);
        let limit = config.timeout(self.timeout_per_iteration);
        let mut child = command
            .spawn()
            .map_err(|e| HarnessError::BenchmarkFailure {
                command: line.clone(),
                reason: format!("failed to start: {e}"),
            })?;
        match wait_timeout(&mut child, limit)? {
            Some(status) if status.success() => Ok(()),
            Some(status) => Err(HarnessError::BenchmarkFailure {
                command: line,
                reason: format!("exited with {status}"),
            }),
            None => Err(HarnessError::Timeout {
                command: line,
                timeout: limit,
            }),
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }
}

/// Wait for `child` to exit. Kills and reaps it once `limit` has elapsed, returning `None`.
fn wait_timeout(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let elapsed = start.elapsed();
        if elapsed >= limit {
            // The child may exit between `try_wait` and `kill`
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(limit - elapsed));
    }
}
