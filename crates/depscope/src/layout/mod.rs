//! Force-directed layout.
//!
//! The [`LayoutEngine`] owns the layout policy: how many iterations to run,
//! when to switch repulsion to the Barnes-Hut approximation, and how to
//! derive per-run [`LayoutSettings`] from configuration. The physics itself
//! sits behind the [`LayoutStrategy`] trait; [`ForceAtlas2`] is the default.
//!
//! There is no convergence check. A run always performs exactly
//! `iterations` steps, which bounds the cost for large graphs.

mod force_atlas;
mod quadtree;

pub use force_atlas::ForceAtlas2;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::graph::DepGraph;
use crate::types::Position;

/// Random source for initial positions.
///
/// A fixed seed makes the whole pipeline reproducible; without one the
/// generator is seeded from OS entropy.
#[must_use]
pub fn layout_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Resolved parameters for one layout run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSettings {
    /// Use the Barnes-Hut approximation for repulsion.
    pub barnes_hut: bool,
    /// Barnes-Hut accuracy.
    pub theta: f64,
    /// Repulsion strength.
    pub scaling_ratio: f64,
    /// Pull toward the centroid.
    pub gravity: f64,
    /// Gravity independent of distance.
    pub strong_gravity: bool,
    /// Anti-collision using node sizes.
    pub adjust_sizes: bool,
    /// Logarithmic attraction.
    pub lin_log_mode: bool,
    /// Divide attraction by source mass.
    pub outbound_attraction_distribution: bool,
    /// Exponent applied to edge weights.
    pub edge_weight_influence: f64,
    /// Movement damping.
    pub slow_down: f64,
}

/// Mutable simulation state, detached from the graph for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    /// Node positions in arena order.
    pub positions: Vec<Position>,
    /// Node masses (`1 + degree`).
    pub masses: Vec<f64>,
    /// Node sizes, used by anti-collision.
    pub sizes: Vec<f64>,
    /// Edges as `(source, target, weight)` arena indices.
    pub edges: Vec<(usize, usize, f64)>,
}

impl LayoutState {
    /// Capture the layout-relevant parts of a graph.
    #[must_use]
    pub fn from_graph(graph: &DepGraph) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let masses = graph
            .node_ids()
            .map(|id| 1.0 + graph.degree(id) as f64)
            .collect();
        Self {
            positions: graph.nodes().iter().map(|n| n.position).collect(),
            masses,
            sizes: graph.nodes().iter().map(|n| n.size).collect(),
            edges: graph
                .edges()
                .iter()
                .map(|e| (e.source.index(), e.target.index(), e.weight))
                .collect(),
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether there are no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn write_back(&self, graph: &mut DepGraph) {
        for (node, position) in graph.nodes_mut().iter_mut().zip(&self.positions) {
            node.position = *position;
        }
    }
}

/// One step of a force simulation.
pub trait LayoutStrategy {
    /// Advance the simulation by one iteration.
    fn step(&mut self, state: &mut LayoutState, settings: &LayoutSettings);
}

/// What a layout run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    /// Steps performed.
    pub iterations: usize,
    /// Whether Barnes-Hut repulsion was used.
    pub barnes_hut: bool,
    /// Nodes laid out.
    pub node_count: usize,
}

/// Runs a layout strategy over a graph under a fixed iteration budget.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create an engine from configuration.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Settings for a graph of `node_count` nodes.
    ///
    /// Barnes-Hut is enabled strictly above the configured threshold. When
    /// `slow_down` is not configured it grows with the log of the node count.
    #[must_use]
    pub fn settings_for(&self, node_count: usize) -> LayoutSettings {
        #[allow(clippy::cast_precision_loss)]
        let inferred_slow_down = 1.0 + (node_count.max(1) as f64).ln();
        LayoutSettings {
            barnes_hut: node_count > self.config.barnes_hut_threshold,
            theta: self.config.barnes_hut_theta,
            scaling_ratio: self.config.scaling_ratio,
            gravity: self.config.gravity,
            strong_gravity: self.config.strong_gravity,
            adjust_sizes: self.config.adjust_sizes,
            lin_log_mode: self.config.lin_log_mode,
            outbound_attraction_distribution: self.config.outbound_attraction_distribution,
            edge_weight_influence: self.config.edge_weight_influence,
            slow_down: self.config.slow_down.unwrap_or(inferred_slow_down),
        }
    }

    /// Lay out `graph` with [`ForceAtlas2`].
    pub fn run(&self, graph: &mut DepGraph) -> LayoutReport {
        self.run_with(&mut ForceAtlas2::default(), graph)
    }

    /// Lay out `graph` with a custom strategy, updating node positions.
    pub fn run_with<S: LayoutStrategy>(
        &self,
        strategy: &mut S,
        graph: &mut DepGraph,
    ) -> LayoutReport {
        let settings = self.settings_for(graph.node_count());
        if graph.is_empty() {
            return LayoutReport {
                iterations: 0,
                barnes_hut: settings.barnes_hut,
                node_count: 0,
            };
        }

        let mut state = LayoutState::from_graph(graph);
        for _ in 0..self.config.iterations {
            strategy.step(&mut state, &settings);
        }
        state.write_back(graph);

        debug!(
            nodes = state.len(),
            iterations = self.config.iterations,
            barnes_hut = settings.barnes_hut,
            "Layout finished"
        );
        LayoutReport {
            iterations: self.config.iterations,
            barnes_hut: settings.barnes_hut,
            node_count: state.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::graph::GraphBuilder;
    use crate::types::ApiResponse;

    /// Counts steps and records the settings it was given.
    #[derive(Default)]
    struct Recorder {
        steps: usize,
        settings: Option<LayoutSettings>,
    }

    impl LayoutStrategy for Recorder {
        fn step(&mut self, state: &mut LayoutState, settings: &LayoutSettings) {
            self.steps += 1;
            self.settings = Some(settings.clone());
            for p in &mut state.positions {
                p.x += 1.0;
            }
        }
    }

    fn chain(n: usize) -> DepGraph {
        let ids: Vec<String> = (0..n).map(|i| format!("src/f{i}.ts")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = refs.windows(2).map(|w| (w[0], w[1])).collect();
        GraphBuilder::new(GraphConfig::default())
            .build(&ApiResponse::from_pairs(&refs, &edges), &mut layout_rng(Some(3)))
            .unwrap()
    }

    #[test]
    fn runs_exact_iteration_budget() {
        let engine = LayoutEngine::new(LayoutConfig {
            iterations: 17,
            ..LayoutConfig::default()
        });
        let mut graph = chain(4);
        let before: Vec<f64> = graph.nodes().iter().map(|n| n.position.x).collect();
        let mut recorder = Recorder::default();

        let report = engine.run_with(&mut recorder, &mut graph);

        assert_eq!(recorder.steps, 17);
        assert_eq!(report.iterations, 17);
        for (node, x) in graph.nodes().iter().zip(before) {
            assert!((node.position.x - (x + 17.0)).abs() < 1e-9, "positions written back");
        }
    }

    #[test]
    fn barnes_hut_switches_above_threshold() {
        let engine = LayoutEngine::new(LayoutConfig {
            iterations: 1,
            barnes_hut_threshold: 5,
            ..LayoutConfig::default()
        });

        let mut small = Recorder::default();
        engine.run_with(&mut small, &mut chain(5));
        let mut large = Recorder::default();
        let report = engine.run_with(&mut large, &mut chain(6));

        assert!(!small.settings.unwrap().barnes_hut, "threshold itself is exact");
        assert!(large.settings.unwrap().barnes_hut);
        assert!(report.barnes_hut);
    }

    #[test]
    fn slow_down_inferred_unless_configured() {
        let inferred = LayoutEngine::default().settings_for(100);
        let fixed = LayoutEngine::new(LayoutConfig {
            slow_down: Some(2.0),
            ..LayoutConfig::default()
        })
        .settings_for(100);

        assert!((inferred.slow_down - (1.0 + 100f64.ln())).abs() < 1e-9);
        assert!((fixed.slow_down - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_graph_runs_nothing() {
        let mut recorder = Recorder::default();

        let report = LayoutEngine::default().run_with(&mut recorder, &mut DepGraph::new());

        assert_eq!(recorder.steps, 0);
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn state_masses_follow_degree() {
        let graph = chain(3);

        let state = LayoutState::from_graph(&graph);

        assert_eq!(state.masses, vec![2.0, 3.0, 2.0]);
        assert_eq!(state.edges.len(), 2);
    }
}
