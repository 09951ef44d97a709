//! Cluster and color assignment.
//!
//! Clustering is only used for coloring, so it must never fail the pipeline:
//! the [`ClusterAssigner`] runs a [`ClusteringStrategy`] and, if it reports
//! an error, groups nodes by directory instead.
//!
//! # Algorithm
//!
//! The default strategy is Louvain modularity optimisation over the
//! undirected projection of the graph:
//!
//! 1. Local moving: each node joins the neighboring community with the best
//!    modularity gain, repeated until no node moves
//! 2. Aggregation: communities become nodes of a smaller weighted graph
//! 3. Repeat until a level produces no move
//!
//! Nodes are visited in arena order and ties keep the current community, so
//! the result is deterministic.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::config::ClusterConfig;
use crate::error::ClusterError;
use crate::graph::DepGraph;

/// Visually distinct cluster colors. Clusters beyond the palette wrap around.
pub const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf", "#393b79", "#e7ba52",
];

/// Palette color for a cluster index.
#[must_use]
pub fn palette_color(cluster: usize) -> &'static str {
    PALETTE[cluster % PALETTE.len()]
}

/// Maximum local-moving sweeps per level.
const MAX_SWEEPS: usize = 64;

/// Modularity gains below this are treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

/// A community-detection algorithm.
pub trait ClusteringStrategy {
    /// Return a community label per node, in arena order.
    ///
    /// Labels are arbitrary; the assigner renumbers them.
    fn detect(&self, graph: &DepGraph) -> Result<Vec<usize>, ClusterError>;
}

/// Louvain modularity optimisation.
#[derive(Debug, Clone)]
pub struct Louvain {
    resolution: f64,
}

impl Default for Louvain {
    fn default() -> Self {
        Self { resolution: 1.0 }
    }
}

impl Louvain {
    /// Create a Louvain strategy from configuration.
    #[must_use]
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            resolution: config.resolution,
        }
    }
}

/// Weighted undirected graph for one Louvain level.
struct Level {
    /// Neighbor lists without self-loops; each edge appears in both endpoints
    adjacency: Vec<Vec<(usize, f64)>>,
    /// Weight of edges internal to the node
    self_loops: Vec<f64>,
}

impl Level {
    fn len(&self) -> usize {
        self.adjacency.len()
    }

    fn degree(&self, node: usize) -> f64 {
        self.adjacency[node].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.self_loops[node]
    }

    /// Move nodes between communities until stable. Returns the community of
    /// each node and whether anything moved.
    fn local_moving(&self, resolution: f64, total: f64) -> (Vec<usize>, bool) {
        let n = self.len();
        let degrees: Vec<f64> = (0..n).map(|i| self.degree(i)).collect();
        let mut community: Vec<usize> = (0..n).collect();
        let mut community_total = degrees.clone();

        // Scratch space reused across nodes
        let mut weight_to: Vec<f64> = vec![0.0; n];
        let mut is_touched: Vec<bool> = vec![false; n];
        let mut touched: Vec<usize> = Vec::new();

        let mut any_move = false;
        for _ in 0..MAX_SWEEPS {
            let mut moved = false;
            for node in 0..n {
                let current = community[node];
                let k = degrees[node];

                for &(neighbor, w) in &self.adjacency[node] {
                    let c = community[neighbor];
                    if !is_touched[c] {
                        is_touched[c] = true;
                        touched.push(c);
                    }
                    weight_to[c] += w;
                }

                community_total[current] -= k;
                let gain = |c: usize, w: f64| w - resolution * community_total[c] * k / total;

                let mut best = current;
                let mut best_gain = gain(current, weight_to[current]);
                for &c in &touched {
                    let g = gain(c, weight_to[c]);
                    if g > best_gain + MIN_GAIN {
                        best = c;
                        best_gain = g;
                    }
                }

                community_total[best] += k;
                community[node] = best;
                if best != current {
                    moved = true;
                }

                for c in touched.drain(..) {
                    weight_to[c] = 0.0;
                    is_touched[c] = false;
                }
            }
            if !moved {
                break;
            }
            any_move = true;
        }
        (community, any_move)
    }

    /// Collapse communities (already renumbered densely) into a new level.
    fn aggregate(&self, community: &[usize], count: usize) -> Level {
        let mut self_loops = vec![0.0; count];
        let mut merged: Vec<HashMap<usize, f64>> = vec![HashMap::new(); count];

        for node in 0..self.len() {
            let c = community[node];
            self_loops[c] += self.self_loops[node];
            for &(neighbor, w) in &self.adjacency[node] {
                let d = community[neighbor];
                if c == d {
                    // Seen once from each endpoint
                    self_loops[c] += w / 2.0;
                } else {
                    *merged[c].entry(d).or_default() += w;
                }
            }
        }

        let adjacency = merged
            .into_iter()
            .map(|m| {
                let mut list: Vec<(usize, f64)> = m.into_iter().collect();
                list.sort_unstable_by_key(|&(d, _)| d);
                list
            })
            .collect();
        Level {
            adjacency,
            self_loops,
        }
    }
}

/// Renumber labels densely in first-encounter order.
fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let renumbered = labels
        .iter()
        .map(|&label| {
            let next = mapping.len();
            *mapping.entry(label).or_insert(next)
        })
        .collect();
    (renumbered, mapping.len())
}

impl ClusteringStrategy for Louvain {
    fn detect(&self, graph: &DepGraph) -> Result<Vec<usize>, ClusterError> {
        if graph.is_empty() {
            return Err(ClusterError::EmptyGraph);
        }

        let undirected = graph.to_undirected();
        let n = undirected.node_count();
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut self_loops = vec![0.0; n];
        for edge in undirected.raw_edges() {
            let (a, b) = (edge.source().index(), edge.target().index());
            if a == b {
                self_loops[a] += edge.weight;
                continue;
            }
            adjacency[a].push((b, edge.weight));
            adjacency[b].push((a, edge.weight));
        }
        let mut level = Level {
            adjacency,
            self_loops,
        };

        let total: f64 = (0..n).map(|i| level.degree(i)).sum();
        if total <= 0.0 {
            return Err(ClusterError::NoEdges);
        }

        let mut membership: Vec<usize> = (0..n).collect();
        loop {
            let (community, moved) = level.local_moving(self.resolution, total);
            if !moved {
                break;
            }
            let (community, count) = renumber(&community);
            for m in &mut membership {
                *m = community[*m];
            }
            if count == level.len() {
                break;
            }
            level = level.aggregate(&community, count);
        }

        Ok(membership)
    }
}

/// Groups nodes by their directory. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryGrouping;

impl ClusteringStrategy for DirectoryGrouping {
    fn detect(&self, graph: &DepGraph) -> Result<Vec<usize>, ClusterError> {
        let mut directories: HashMap<&str, usize> = HashMap::new();
        Ok(graph
            .nodes()
            .iter()
            .map(|node| {
                let next = directories.len();
                *directories.entry(node.directory.as_str()).or_insert(next)
            })
            .collect())
    }
}

/// How the clusters of a graph were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMethod {
    /// The clustering strategy succeeded
    Community,
    /// The strategy failed; nodes are grouped by directory
    DirectoryFallback,
}

/// Summary of a cluster assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterOutcome {
    /// Which grouping was applied.
    pub method: ClusterMethod,
    /// Number of distinct clusters.
    pub cluster_count: usize,
}

/// Assigns `cluster_id` and `color` to every node of a graph.
#[derive(Debug, Clone, Default)]
pub struct ClusterAssigner<S = Louvain> {
    strategy: S,
}

impl<S: ClusteringStrategy> ClusterAssigner<S> {
    /// Create an assigner around a strategy.
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Assign clusters and colors, falling back to directory grouping when
    /// the strategy fails.
    pub fn assign(&self, graph: &mut DepGraph) -> ClusterOutcome {
        let detected = self.strategy.detect(graph).and_then(|labels| {
            if labels.len() == graph.node_count() {
                Ok(labels)
            } else {
                Err(ClusterError::AssignmentMismatch {
                    expected: graph.node_count(),
                    actual: labels.len(),
                })
            }
        });

        let (labels, method) = match detected {
            Ok(labels) => (labels, ClusterMethod::Community),
            Err(e) => {
                debug!(error = %e, "Community detection failed, grouping by directory");
                let labels = DirectoryGrouping
                    .detect(graph)
                    .unwrap_or_else(|_| vec![0; graph.node_count()]);
                (labels, ClusterMethod::DirectoryFallback)
            }
        };

        let (clusters, cluster_count) = renumber(&labels);
        for (node, cluster) in graph.nodes_mut().iter_mut().zip(clusters) {
            node.cluster_id = cluster;
            node.color = palette_color(cluster).to_string();
        }

        debug!(?method, cluster_count, "Assigned clusters");
        ClusterOutcome {
            method,
            cluster_count,
        }
    }
}
