//! Experiment profiles.
//!
//! A profile produces one CSV file. Its runs are the Cartesian product of
//! variants, component counts, nodes per component and average degrees, each
//! combination expanded into the profile's run settings in declaration order.
//!
//! Profiles can be replaced from the harness config file:
//!
//! ```toml
//! [[profiles]]
//! name = "exp1"
//! variants = "abcdef"
//! components = [10]
//! nodes = [10000, 50000]
//! degrees = [2]
//! runs = [{ threads = 1 }, {}]
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::graph_cache::GraphSpec;

/// How to invoke the benchmark for each graph of a profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    /// Thread count. Defaults to the harness thread count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Let the benchmark sweep thread counts from 1 up to `threads`
    #[serde(default, rename = "thread-range")]
    pub thread_range: bool,
    /// Iteration count. Defaults to the harness iteration count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExperimentProfile {
    /// Output file stem; results go to `<name>-<threads>-<iterations>.csv`
    pub name: String,
    /// Task codes, one character per variant
    pub variants: String,
    pub components: Vec<u64>,
    pub nodes: Vec<u64>,
    pub degrees: Vec<f64>,
    pub runs: Vec<RunSettings>,
}

/// A single enumerated run of a profile, before its graph is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentPoint {
    pub variant: String,
    pub graph: GraphSpec,
    pub num_threads: usize,
    pub thread_range: bool,
    pub num_iterations: usize,
}

impl ExperimentProfile {
    /// Reject profiles that would produce an empty CSV or a zero time budget.
    pub fn validate(&self) -> anyhow::Result<()> {
        let empty = [
            ("variants", self.variants.is_empty()),
            ("components", self.components.is_empty()),
            ("nodes", self.nodes.is_empty()),
            ("degrees", self.degrees.is_empty()),
            ("runs", self.runs.is_empty()),
        ];
        if let Some((field, _)) = empty.iter().find(|(_, is_empty)| *is_empty) {
            anyhow::bail!("Experiment profile `{}` has no {}", self.name, field);
        }
        for run in &self.runs {
            if run.threads == Some(0) || run.iterations == Some(0) {
                anyhow::bail!(
                    "Experiment profile `{}`: run `threads` and `iterations` must be at least 1",
                    self.name
                );
            }
        }
        Ok(())
    }

    pub fn output_file_name(&self, threads: usize, iterations: usize) -> String {
        format!("{}-{}-{}.csv", self.name, threads, iterations)
    }

    /// Enumerate all runs in output order: variant, components, nodes, degree, then run settings.
    pub fn points(&self, threads: usize, iterations: usize) -> Vec<ExperimentPoint> {
        let mut points = Vec::new();
        for variant in self.variants.chars() {
            for &num_components in &self.components {
                for &nodes_per_component in &self.nodes {
                    for &avg_degree in &self.degrees {
                        let graph =
                            GraphSpec::new(num_components, nodes_per_component, avg_degree);
                        for run in &self.runs {
                            points.push(ExperimentPoint {
                                variant: variant.to_string(),
                                graph,
                                num_threads: run.threads.unwrap_or(threads),
                                thread_range: run.thread_range,
                                num_iterations: run.iterations.unwrap_or(iterations),
                            });
                        }
                    }
                }
            }
        }
        points
    }
}

const ALL_VARIANTS: &str = "abcdef";

/// Scaling in graph size with one and with all threads.
fn graph_size_profile() -> ExperimentProfile {
    ExperimentProfile {
        name: "exp1".to_owned(),
        variants: ALL_VARIANTS.to_owned(),
        components: vec![10],
        nodes: vec![10_000, 50_000, 100_000, 500_000, 1_000_000],
        degrees: vec![2.0],
        runs: vec![
            RunSettings {
                threads: Some(1),
                ..Default::default()
            },
            RunSettings::default(),
        ],
    }
}

fn thread_sweep_profile(
    name: &str,
    components: u64,
    degree: f64,
    iterations: Option<usize>,
) -> ExperimentProfile {
    ExperimentProfile {
        name: name.to_owned(),
        variants: ALL_VARIANTS.to_owned(),
        components: vec![components],
        nodes: vec![100_000],
        degrees: vec![degree],
        runs: vec![RunSettings {
            threads: None,
            thread_range: true,
            iterations,
        }],
    }
}

pub static DEFAULT_PROFILES: Lazy<Vec<ExperimentProfile>> = Lazy::new(|| {
    vec![
        graph_size_profile(),
        thread_sweep_profile("exp2", 100, 2.0, None),
        thread_sweep_profile("exp3", 100, 1.1, Some(1)),
        thread_sweep_profile("exp4", 1000, 2.0, Some(1)),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_size_profile_enumeration() {
        let points = DEFAULT_PROFILES[0].points(8, 10);
        assert_eq!(points.len(), 5 * 6 * 2);
        // Single-threaded run first, then the configured thread count, on the same graph
        assert_eq!(points[0].variant, "a");
        assert_eq!(points[0].num_threads, 1);
        assert_eq!(points[1].num_threads, 8);
        assert_eq!(points[0].graph, points[1].graph);
        assert_eq!(points[2].graph.nodes_per_component, 50_000);
        assert!(points.iter().all(|p| !p.thread_range && p.num_iterations == 10));
        assert_eq!(points[59].variant, "f");
        assert_eq!(points[59].graph.nodes_per_component, 1_000_000);
    }

    #[test]
    fn thread_sweep_profiles() {
        let names = DEFAULT_PROFILES.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["exp1", "exp2", "exp3", "exp4"]);
        let exp3 = DEFAULT_PROFILES[2].points(4, 10);
        assert_eq!(exp3.len(), 6);
        assert!(exp3.iter().all(|p| p.thread_range && p.num_threads == 4 && p.num_iterations == 1));
        assert_eq!(exp3[0].graph.file_name(), "1e2x-1e5-1.1.graph");
        assert_eq!(DEFAULT_PROFILES[2].output_file_name(4, 10), "exp3-4-10.csv");
        let exp2 = DEFAULT_PROFILES[1].points(4, 10);
        assert!(exp2.iter().all(|p| p.num_iterations == 10));
        assert_eq!(DEFAULT_PROFILES[3].points(4, 10)[0].graph.num_components, 1000);
    }

    #[test]
    fn parse_profile_from_toml() -> anyhow::Result<()> {
        let profile: ExperimentProfile = toml::from_str(
            r#"
            name = "small"
            variants = "af"
            components = [2]
            nodes = [100, 1000]
            degrees = [1.5]
            runs = [{ threads = 1 }, { thread-range = true, iterations = 3 }]
            "#,
        )?;
        assert_eq!(profile.runs[0].threads, Some(1));
        assert_eq!(profile.runs[0].iterations, None);
        assert_eq!(profile.runs[1].threads, None);
        assert!(profile.runs[1].thread_range);
        let points = profile.points(6, 10);
        assert_eq!(points.len(), 2 * 2 * 2);
        assert_eq!(points[1].num_threads, 6);
        assert_eq!(points[1].num_iterations, 3);
        assert_eq!(points[4].variant, "f");
        Ok(())
    }
}
