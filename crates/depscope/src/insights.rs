//! Summary metrics and file impact analysis over a derived graph.

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::VecDeque;

use crate::graph::DepGraph;
use crate::types::{Node, RiskLevel};

/// How many files the ranked lists keep.
pub const TOP_FILES: usize = 5;

/// Files with fewer imports than this are left out of `most_imports`.
pub const MIN_IMPORTS: u32 = 3;

/// A file with the count it was ranked by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedFile {
    /// File path.
    pub path: String,
    /// Ranking count.
    pub count: u32,
}

/// Number of files per risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    /// Files nobody imports.
    pub low: usize,
    /// Files with one to three dependents.
    pub medium: usize,
    /// Files with four or more dependents.
    pub high: usize,
}

/// Overview of a dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    /// Files in the graph.
    pub total_files: usize,
    /// Distinct import edges.
    pub total_dependencies: usize,
    /// Imports per file.
    pub avg_dependencies: f64,
    /// Files with the most dependents.
    pub most_depended: Vec<RankedFile>,
    /// Files importing the most others.
    pub most_imports: Vec<RankedFile>,
    /// Files per risk level.
    pub risk_counts: RiskCounts,
}

/// Top files by `key`, highest first, ties broken by path.
fn ranked(nodes: &[Node], key: impl Fn(&Node) -> u32, min: u32) -> Vec<RankedFile> {
    let mut files: Vec<RankedFile> = nodes
        .iter()
        .map(|node| RankedFile {
            path: node.id.clone(),
            count: key(node),
        })
        .filter(|file| file.count >= min)
        .collect();
    files.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
    files.truncate(TOP_FILES);
    files
}

/// Compute summary metrics.
#[must_use]
pub fn summarize(graph: &DepGraph) -> GraphSummary {
    let mut risk_counts = RiskCounts::default();
    for node in graph.nodes() {
        match node.risk_level {
            RiskLevel::Low => risk_counts.low += 1,
            RiskLevel::Medium => risk_counts.medium += 1,
            RiskLevel::High => risk_counts.high += 1,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_dependencies = if graph.is_empty() {
        0.0
    } else {
        graph.edge_count() as f64 / graph.node_count() as f64
    };

    GraphSummary {
        total_files: graph.node_count(),
        total_dependencies: graph.edge_count(),
        avg_dependencies,
        most_depended: ranked(graph.nodes(), |n| n.dependent_count, 1),
        most_imports: ranked(graph.nodes(), |n| n.import_count, MIN_IMPORTS),
        risk_counts,
    }
}

/// Whether `path` looks like a test file.
///
/// Matches `test`, `tests` and `__tests__` directories, `test_*` and `*_test`
/// file names, `*.test.*` and `*.spec.*` files, and `conftest.py`. Case is
/// ignored.
///
/// ```
/// use depscope::insights::is_test_path;
///
/// assert!(is_test_path("src/__tests__/auth.ts"));
/// assert!(is_test_path("backend/test_engine.py"));
/// assert!(is_test_path("web/Button.spec.tsx"));
/// assert!(!is_test_path("src/contest.ts"));
/// ```
#[must_use]
pub fn is_test_path(path: &str) -> bool {
    let path = path.to_lowercase();
    let mut segments: Vec<&str> = path.split('/').collect();
    let file = segments.pop().unwrap_or_default();
    if segments
        .iter()
        .any(|s| matches!(*s, "test" | "tests" | "__tests__"))
    {
        return true;
    }

    let stem = file.split('.').next().unwrap_or_default();
    file == "conftest.py"
        || file.contains(".test.")
        || file.contains(".spec.")
        || stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with("_tests")
}

/// Files affected by a change to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileImpact {
    /// The changed file.
    pub file: String,
    /// Its risk level.
    pub risk_level: RiskLevel,
    /// Files it imports, sorted.
    pub dependencies: Vec<String>,
    /// Files importing it directly.
    pub direct_dependents: Vec<String>,
    /// Files reaching it only through other files, nearest first.
    pub transitive_dependents: Vec<String>,
    /// Affected files that look like tests, in dependent order.
    pub test_files: Vec<String>,
    /// Longest shortest-path distance to a dependent; zero if none.
    pub max_depth: usize,
}

impl FileImpact {
    /// Every affected file.
    #[must_use]
    pub fn total_affected(&self) -> usize {
        self.direct_dependents.len() + self.transitive_dependents.len()
    }
}

/// Walk dependents of `path` breadth first.
///
/// Returns `None` if the file is not in the graph.
#[must_use]
pub fn impact(graph: &DepGraph, path: &str) -> Option<FileImpact> {
    let start = graph.node_id(path)?;
    let directed = graph.to_directed();

    let mut depth: Vec<Option<usize>> = vec![None; directed.node_count()];
    let mut queue = VecDeque::new();
    let root = NodeIndex::new(start.index());
    depth[root.index()] = Some(0);
    queue.push_back(root);

    let mut reached: Vec<(usize, &str)> = Vec::new();
    while let Some(current) = queue.pop_front() {
        let d = depth[current.index()].unwrap_or_default();
        for dependent in directed.neighbors_directed(current, Direction::Incoming) {
            if depth[dependent.index()].is_some() {
                continue;
            }
            depth[dependent.index()] = Some(d + 1);
            reached.push((d + 1, graph.node(directed[dependent]).id.as_str()));
            queue.push_back(dependent);
        }
    }
    reached.sort_unstable();

    let max_depth = reached.last().map_or(0, |(d, _)| *d);
    let test_files = reached
        .iter()
        .filter(|(_, p)| is_test_path(p))
        .map(|(_, p)| (*p).to_string())
        .collect();
    let (direct, transitive): (Vec<_>, Vec<_>) = reached.into_iter().partition(|(d, _)| *d == 1);

    let mut dependencies: Vec<String> = graph
        .dependencies(start)
        .filter(|&id| id != start)
        .map(|id| graph.node(id).id.clone())
        .collect();
    dependencies.sort_unstable();

    let node = graph.node(start);
    Some(FileImpact {
        file: node.id.clone(),
        risk_level: node.risk_level,
        dependencies,
        direct_dependents: direct.into_iter().map(|(_, p)| p.to_string()).collect(),
        transitive_dependents: transitive.into_iter().map(|(_, p)| p.to_string()).collect(),
        test_files,
        max_depth,
    })
}
