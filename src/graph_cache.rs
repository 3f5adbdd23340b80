//! On-disk cache of generated input graphs.
//!
//! Graphs are named after their structural parameters, e.g. `1e1x-5e4-2.graph`
//! for 10 components of 50000 nodes with average degree 2. A graph file either
//! does not exist or was completely written by the generator: failed
//! generations are removed before the error is returned.

use std::{
    fs::File,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info, warn};

use crate::{
    error::{HarnessError, HarnessResult},
    utils::cmd,
};

/// File name of the graph generator inside the build directory.
pub const GRAPH_CONSTRUCTION: &str = "graph_construction";

/// Encode `n` as `1eK` when it is an exact power of ten, otherwise as plain decimal.
pub fn scientific(n: u64) -> String {
    let mut k = 0;
    let mut p = 1u64;
    while let Some(next) = p.checked_mul(10) {
        if next > n {
            break;
        }
        p = next;
        k += 1;
    }
    if p == n {
        format!("1e{k}")
    } else {
        n.to_string()
    }
}

/// Structural parameters of a generated graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSpec {
    pub num_components: u64,
    pub nodes_per_component: u64,
    pub avg_degree: f64,
}

impl GraphSpec {
    pub fn new(num_components: u64, nodes_per_component: u64, avg_degree: f64) -> Self {
        Self {
            num_components,
            nodes_per_component,
            avg_degree,
        }
    }

    /// Deterministic cache key, `<components>x-<nodes>-<degree>.graph`.
    pub fn file_name(&self) -> String {
        format!(
            "{}x-{}-{}.graph",
            scientific(self.num_components),
            scientific(self.nodes_per_component),
            self.avg_degree
        )
    }

    /// Generator arguments: the component count, then one `(nodes, degree)` pair per component.
    pub fn generator_args(&self) -> Vec<String> {
        let nodes = self.nodes_per_component.to_string();
        let degree = self.avg_degree.to_string();
        let mut args = Vec::with_capacity(1 + 2 * self.num_components as usize);
        args.push(self.num_components.to_string());
        for _ in 0..self.num_components {
            args.push(nodes.clone());
            args.push(degree.clone());
        }
        args
    }
}

pub struct GraphCache {
    data_dir: PathBuf,
    generator: PathBuf,
}

impl GraphCache {
    pub fn new(data_dir: impl Into<PathBuf>, build_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.into(),
            generator: build_dir.as_ref().join(GRAPH_CONSTRUCTION),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_of(&self, spec: &GraphSpec) -> PathBuf {
        self.data_dir.join(spec.file_name())
    }

    /// Return the graph file for `spec`, running the generator on a cache miss.
    pub fn resolve(&self, spec: &GraphSpec) -> HarnessResult<PathBuf> {
        let graph = self.path_of(spec);
        if graph.exists() {
            debug!("graph {} is cached", graph.display());
            return Ok(graph);
        }
        info!("graph {} does not exist", spec.file_name());
        self.generate(spec, &graph)?;
        // Only complete, non-empty graphs may stay on disk
        match std::fs::metadata(&graph) {
            Ok(meta) if meta.len() > 0 => Ok(graph),
            _ => {
                discard(&graph);
                Err(HarnessError::GraphGenerationFailure {
                    graph,
                    reason: "generator produced no output".to_owned(),
                })
            }
        }
    }

    fn generate(&self, spec: &GraphSpec, graph: &Path) -> HarnessResult<()> {
        if !self.generator.is_file() {
            return Err(HarnessError::MissingExecutable {
                path: self.generator.clone(),
            });
        }
        std::fs::create_dir_all(&self.data_dir)?;
        let output = File::create(graph)?;
        let mut command = Command::new(&self.generator);
        command.args(spec.generator_args()).stdout(output);
        info!("{}", cmd::truncate(&cmd::command_line(&command), 64));
        let reason = match command.status() {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => format!("generator exited with {status}"),
            Err(e) => format!("failed to start generator: {e}"),
        };
        discard(graph);
        Err(HarnessError::GraphGenerationFailure {
            graph: graph.to_owned(),
            reason,
        })
    }
}

fn discard(graph: &Path) {
    if graph.exists() {
        warn!("removing partial graph {}", graph.display());
        if let Err(e) = std::fs::remove_file(graph) {
            warn!("failed to remove {}: {}", graph.display(), e);
        }
    }
}
