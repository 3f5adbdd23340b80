#![cfg(unix)]

use std::{
    fs::File,
    path::PathBuf,
    time::{Duration, Instant},
};

use dc_harness::{
    error::HarnessError,
    runner::{ExperimentConfig, ExperimentRunner, Variant, DEFAULT_TIMEOUT_PER_ITERATION},
};


fn experiment(variant: &str, emit_header: bool) -> ExperimentConfig {
    ExperimentConfig {
        variant: variant.to_owned(),
        graph: PathBuf::from("data/1e1x-1e4-2.graph"),
        num_threads: 4,
        thread_range: false,
        num_iterations: 2,
        emit_header,
    }
}

#[test]
fn test_output_is_appended_verbatim() -> anyhow::Result<()> {
    let _guard = helper::lock();
    let sandbox = helper::Sandbox::new()?;
    sandbox.install_benchmarks()?;
    let runner = ExperimentRunner::new(sandbox.build_dir(), DEFAULT_TIMEOUT_PER_ITERATION);
    let csv = sandbox.root().join("out.csv");
    let sink = File::create(&csv)?;
    runner.run(&experiment("a", true), &sink)?;
    let mut thread_range = experiment("f", false);
    thread_range.thread_range = true;
    runner.run(&thread_range, &sink)?;
    drop(sink);
    assert_eq!(
        helper::read_lines(&csv)?,
        [
            helper::CSV_HEADER,
            "a,data/1e1x-1e4-2.graph,4,2",
            "f,data/1e1x-1e4-2.graph,4,2",
        ]
    );
    assert_eq!(
        sandbox.benchmark_invocations()?,
        [
            "benchmark a -graph data/1e1x-1e4-2.graph -num-threads 4 -num-iterations 2",
            "benchmark f -graph data/1e1x-1e4-2.graph -num-threads 4 -num-iterations 2 -thread-range -no-header",
        ]
    );
    Ok(())
}

#[test]
fn test_invalid_variant() -> anyhow::Result<()> {
    let _guard = helper::lock();
    let sandbox = helper::Sandbox::new()?;
    sandbox.install_benchmarks()?;
    let runner = ExperimentRunner::new(sandbox.build_dir(), DEFAULT_TIMEOUT_PER_ITERATION);
    let sink = File::create(sandbox.root().join("out.csv"))?;
    let result = runner.run(&experiment("g", true), &sink);
    assert!(matches!(result, Err(HarnessError::InvalidVariant(code)) if code == "g"));
    assert!(sandbox.benchmark_invocations()?.is_empty());
    Ok(())
}

#[test]
fn test_missing_benchmark() -> anyhow::Result<()> {
    let _guard = helper::lock();
    let sandbox = helper::Sandbox::new()?;
    sandbox.install_benchmark(Variant::Sequential)?;
    let runner = ExperimentRunner::new(sandbox.build_dir(), DEFAULT_TIMEOUT_PER_ITERATION);
    let sink = File::create(sandbox.root().join("out.csv"))?;
    let result = runner.run(&experiment("b", true), &sink);
    match result {
        Err(HarnessError::MissingExecutable { path }) => {
            assert_eq!(path, sandbox.build_dir().join("benchmark_dynamic_connectivity_b"))
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[test]
fn test_nonzero_exit_is_benchmark_failure() -> anyhow::Result<()> {
    let _guard = helper::lock();
    let sandbox = helper::Sandbox::new()?;
    sandbox.benchmark_with(Variant::C, "echo \"c,partial\"\nexit 3")?;
    let runner = ExperimentRunner::new(sandbox.build_dir(), DEFAULT_TIMEOUT_PER_ITERATION);
    let csv = sandbox.root().join("out.csv");
    let sink = File::create(&csv)?;
    let result = runner.run(&experiment("c", true), &sink);
    assert!(matches!(result, Err(HarnessError::BenchmarkFailure { .. })));
    // Output written before the failure is kept as-is
    assert_eq!(helper::read_lines(&csv)?, ["c,partial"]);
    Ok(())
}

#[test]
fn test_timeout_kills_benchmark() -> anyhow::Result<()> {
    let _guard = helper::lock();
    let sandbox = helper::Sandbox::new()?;
    sandbox.benchmark_with(Variant::D, "exec sleep 30")?;
    let runner = ExperimentRunner::new(sandbox.build_dir(), Duration::from_secs(1));
    let sink = File::create(sandbox.root().join("out.csv"))?;
    let mut config = experiment("d", true);
    config.num_iterations = 1;
    let start = Instant::now();
    let result = runner.run(&config, &sink);
    match result {
        Err(HarnessError::Timeout { timeout, .. }) => {
            assert_eq!(timeout, Duration::from_secs(1))
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(start.elapsed() < Duration::from_secs(20));
    Ok(())
}
