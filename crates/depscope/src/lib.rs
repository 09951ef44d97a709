//! # depscope: Dependency Graph Views
//!
//! depscope turns a raw file-level import graph into two analytical views:
//!
//! - a clustered, force-laid-out graph for interactive exploration, with an
//!   overlay state machine for hover, click and search
//! - Dependency Structure Matrices at directory and file granularity, with
//!   pairwise cycle detection
//!
//! ## Design Philosophy
//!
//! - **Pure transforms** - Every stage is a synchronous function of its input
//! - **Arena graph** - Nodes live in a `Vec` indexed by [`NodeId`]; edges are id pairs
//! - **Swappable algorithms** - Clustering and layout sit behind [`ClusteringStrategy`] and [`LayoutStrategy`]
//! - **Reproducible on request** - A layout seed pins every random choice
//!
//! ## Quick Start
//!
//! ```
//! use depscope::{ApiResponse, Config, DepScope};
//!
//! let response = ApiResponse::from_pairs(
//!     &["src/app.ts", "src/routes/auth.ts", "src/db.ts"],
//!     &[("src/app.ts", "src/routes/auth.ts"), ("src/routes/auth.ts", "src/db.ts")],
//! );
//!
//! let scope = DepScope::new(Config::default())?;
//! let view = scope.analyze(&response).expect("input has nodes");
//! println!("{} files in {} clusters", view.graph.node_count(), view.clustering.cluster_count);
//!
//! let dsm = scope.directory_matrix(&response);
//! println!("{} cross-directory imports", dsm.total_deps);
//! # Ok::<(), depscope::Error>(())
//! ```

pub mod cluster;
pub mod config;
mod error;
pub mod graph;
pub mod insights;
pub mod layout;
pub mod matrix;
pub mod overlay;
mod pipeline;
mod types;

pub use cluster::{ClusterAssigner, ClusterMethod, ClusterOutcome, ClusteringStrategy, Louvain};
pub use config::{ClusterConfig, Config, GraphConfig, LayoutConfig, OverlayConfig};
pub use error::{ClusterError, Error, Result};
pub use graph::{DepGraph, GraphBuilder, directory_of};
pub use insights::{FileImpact, GraphSummary};
pub use layout::{ForceAtlas2, LayoutEngine, LayoutReport, LayoutStrategy};
pub use matrix::{
    DirectoryMatrix, FileMatrix, build_directory_matrix, build_file_matrix, find_cycles,
};
pub use overlay::{CameraRequest, Focus, InteractionOverlay, OverlayEvent, SearchHit};
pub use pipeline::{DepScope, GraphView};
pub use types::{ApiResponse, Edge, Node, NodeId, Position, RawEdge, RawNode, RiskLevel};
