//! End-to-end pipeline: raw import graph to clustered, laid-out view.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::cluster::{ClusterAssigner, ClusterOutcome, Louvain};
use crate::config::{Config, OverlayConfig};
use crate::error::{Error, Result};
use crate::graph::{DepGraph, GraphBuilder};
use crate::insights::{self, FileImpact, GraphSummary};
use crate::layout::{LayoutEngine, LayoutReport, layout_rng};
use crate::matrix::{self, DirectoryMatrix, FileMatrix};
use crate::overlay::{InteractionOverlay, SearchHit};
use crate::types::ApiResponse;

/// A built graph together with how it was clustered and laid out.
#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    /// The derived graph with clusters, colors and positions.
    pub graph: DepGraph,
    /// Cluster assignment summary.
    pub clustering: ClusterOutcome,
    /// Layout run summary.
    pub layout: LayoutReport,
}

impl GraphView {
    /// Summary metrics of the graph.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        insights::summarize(&self.graph)
    }

    /// Impact of changing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFile`] if the file is not in the graph.
    pub fn impact(&self, path: &str) -> Result<FileImpact> {
        insights::impact(&self.graph, path).ok_or_else(|| Error::UnknownFile(PathBuf::from(path)))
    }

    /// A fresh overlay over this view with nothing focused.
    #[must_use]
    pub fn overlay(&self, config: OverlayConfig) -> InteractionOverlay<'_> {
        InteractionOverlay::new(&self.graph, config)
    }
}

/// Dependency graph analysis.
///
/// Holds a validated [`Config`] and runs the graph, clustering and layout
/// stages in order. Matrices are computed from the raw input independently.
#[derive(Debug, Clone, Default)]
pub struct DepScope {
    config: Config,
}

impl DepScope {
    /// Create an analyzer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build, cluster and lay out the graph.
    ///
    /// Returns `None` when the input has no nodes.
    #[must_use]
    pub fn analyze(&self, response: &ApiResponse) -> Option<GraphView> {
        let start = Instant::now();
        let mut rng = layout_rng(self.config.layout.seed);

        let builder = GraphBuilder::new(self.config.graph.clone());
        let Some(mut graph) = builder.build(response, &mut rng) else {
            debug!("No nodes in input, nothing to analyze");
            return None;
        };

        let clustering =
            ClusterAssigner::new(Louvain::new(&self.config.cluster)).assign(&mut graph);
        let layout = LayoutEngine::new(self.config.layout.clone()).run(&mut graph);

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            clusters = clustering.cluster_count,
            elapsed_ms = start.elapsed().as_millis(),
            "Analyzed dependency graph"
        );
        Some(GraphView {
            graph,
            clustering,
            layout,
        })
    }

    /// Directory-level dependency matrix.
    #[must_use]
    pub fn directory_matrix(&self, response: &ApiResponse) -> DirectoryMatrix {
        matrix::build_directory_matrix(response)
    }

    /// File-level dependency matrix for one directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDirectory`] if no input file lives directly in
    /// `directory`.
    pub fn file_matrix(&self, response: &ApiResponse, directory: &str) -> Result<FileMatrix> {
        let files = matrix::build_file_matrix(response, directory);
        if files.is_empty() {
            return Err(Error::UnknownDirectory(directory.to_string()));
        }
        Ok(files)
    }

    /// Search a built view with the configured result limit.
    #[must_use]
    pub fn search(&self, view: &GraphView, query: &str) -> Vec<SearchHit> {
        crate::overlay::search(&view.graph, query, self.config.overlay.search_limit)
    }

    /// A fresh overlay over `view` using the configured overlay settings.
    #[must_use]
    pub fn overlay<'v>(&self, view: &'v GraphView) -> InteractionOverlay<'v> {
        view.overlay(self.config.overlay.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    fn seeded(seed: u64) -> DepScope {
        DepScope::new(Config {
            layout: LayoutConfig {
                iterations: 20,
                seed: Some(seed),
                ..LayoutConfig::default()
            },
            ..Config::default()
        })
        .unwrap()
    }

    fn response() -> ApiResponse {
        ApiResponse::from_pairs(
            &["src/a.ts", "src/b.ts", "lib/c.ts"],
            &[("src/a.ts", "src/b.ts"), ("src/b.ts", "lib/c.ts")],
        )
    }

    #[test]
    fn analyze_runs_every_stage() {
        let view = seeded(1).analyze(&response()).unwrap();

        assert_eq!(view.graph.node_count(), 3);
        assert_eq!(view.layout.iterations, 20);
        assert!(view.clustering.cluster_count >= 1);
        assert!(view.graph.nodes().iter().all(|n| n.color.starts_with('#')));
    }

    #[test]
    fn analyze_empty_input_is_none() {
        assert!(seeded(1).analyze(&ApiResponse::default()).is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            layout: LayoutConfig {
                iterations: 0,
                ..LayoutConfig::default()
            },
            ..Config::default()
        };

        assert!(matches!(DepScope::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn file_matrix_unknown_directory_errors() {
        let scope = seeded(1);

        let err = scope.file_matrix(&response(), "nowhere").unwrap_err();

        assert!(matches!(err, Error::UnknownDirectory(d) if d == "nowhere"));
        assert_eq!(scope.file_matrix(&response(), "src").unwrap().len(), 2);
    }

    #[test]
    fn impact_of_unknown_file_errors() {
        let view = seeded(1).analyze(&response()).unwrap();

        assert!(matches!(view.impact("ghost.ts"), Err(Error::UnknownFile(_))));
        assert_eq!(view.impact("lib/c.ts").unwrap().max_depth, 2);
    }
}
