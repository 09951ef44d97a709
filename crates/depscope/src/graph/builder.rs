//! Construction of a [`DepGraph`] from the raw backend document.

use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::DepGraph;
use crate::config::GraphConfig;
use crate::types::{ApiResponse, Node, Position, RawNode, RiskLevel};

/// Directory portion of a `/`-separated file path, or `"."` for root files.
///
/// ```
/// assert_eq!(depscope::directory_of("a/b/c.ts"), "a/b");
/// assert_eq!(depscope::directory_of("root.ts"), ".");
/// ```
#[must_use]
pub fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => ".",
        Some(i) => &path[..i],
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Turns an [`ApiResponse`] into a [`DepGraph`] with derived metrics.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: GraphConfig,
}

impl GraphBuilder {
    /// Create a builder with the given settings.
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Build the graph.
    ///
    /// Returns `None` when the response has no nodes. Edges referencing
    /// unknown files are dropped and duplicate edges collapse into one. A
    /// self-import becomes a single self edge that does not count towards
    /// the file's imports or dependents. Initial positions are drawn from
    /// `rng`.
    pub fn build<R: Rng + ?Sized>(&self, response: &ApiResponse, rng: &mut R) -> Option<DepGraph> {
        if response.nodes.is_empty() {
            return None;
        }

        let known: HashSet<&str> = response.nodes.iter().map(|n| n.id.as_str()).collect();

        // Degrees count each distinct ordered pair once
        let mut pairs: HashSet<(&str, &str)> = HashSet::with_capacity(response.edges.len());
        let mut dangling = 0usize;
        for edge in &response.edges {
            let (source, target) = (edge.source.as_str(), edge.target.as_str());
            if !known.contains(source) || !known.contains(target) {
                dangling += 1;
                continue;
            }
            if source != target {
                pairs.insert((source, target));
            }
        }

        let mut in_degree: HashMap<&str, u32> = HashMap::new();
        let mut out_degree: HashMap<&str, u32> = HashMap::new();
        for &(source, target) in &pairs {
            *out_degree.entry(source).or_default() += 1;
            *in_degree.entry(target).or_default() += 1;
        }

        let mut graph = DepGraph::new();
        let mut orphans_dropped = 0usize;
        for raw in &response.nodes {
            if graph.node_id(&raw.id).is_some() {
                debug!(id = %raw.id, "Skipping duplicate node id");
                continue;
            }
            let dependents = in_degree.get(raw.id.as_str()).copied().unwrap_or(0);
            let imports = out_degree.get(raw.id.as_str()).copied().unwrap_or(0);
            if !self.config.include_orphans && dependents == 0 && imports == 0 {
                orphans_dropped += 1;
                continue;
            }
            graph.add_node(self.make_node(raw, dependents, imports, rng));
        }

        for edge in &response.edges {
            if let (Some(source), Some(target)) =
                (graph.node_id(&edge.source), graph.node_id(&edge.target))
            {
                graph.add_edge(source, target, 1.0);
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dangling,
            orphans_dropped,
            "Built dependency graph"
        );
        Some(graph)
    }

    fn make_node<R: Rng + ?Sized>(
        &self,
        raw: &RawNode,
        dependents: u32,
        imports: u32,
        rng: &mut R,
    ) -> Node {
        let spread = self.config.initial_spread;
        Node {
            id: raw.id.clone(),
            label: raw
                .label
                .clone()
                .unwrap_or_else(|| file_name_of(&raw.id).to_string()),
            directory: directory_of(&raw.id).to_string(),
            language: raw.language.clone(),
            import_count: raw.import_count.unwrap_or(imports),
            dependent_count: dependents,
            risk_level: RiskLevel::from_dependent_count(dependents),
            cluster_id: 0,
            color: String::new(),
            size: self.config.min_node_size
                + self.config.node_size_scale * f64::from(dependents).sqrt(),
            position: Position::new(
                rng.gen_range(-spread..spread),
                rng.gen_range(-spread..spread),
            ),
        }
    }
}
