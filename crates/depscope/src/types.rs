//! Domain types for depscope.
//!
//! These types represent the data flowing through the pipeline:
//! - **Input**: `RawNode`, `RawEdge`, `ApiResponse` (produced by the indexing backend)
//! - **Derived**: `Node`, `Edge`, `NodeId`, `RiskLevel`, `Position` (owned by [`DepGraph`](crate::DepGraph))
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Node references | `NodeId` into an arena | Import graphs are cyclic; ids keep ownership flat |
//! | Field casing | snake_case with camelCase aliases | The backend and the web client disagree |
//! | Summary counters | Kept, never trusted | Real counts are derived from the arrays |

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

// ============================================================================
// Input
// ============================================================================

/// A file node as produced by the indexing backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    /// Unique file path, `/`-separated.
    pub id: String,
    /// Display label. Defaults to the file name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Source language reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Number of imports reported by the backend.
    #[serde(
        default,
        alias = "importCount",
        alias = "imports",
        skip_serializing_if = "Option::is_none"
    )]
    pub import_count: Option<u32>,
}

impl RawNode {
    /// Create a node with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            language: None,
            import_count: None,
        }
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// An import relationship: `source` imports `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEdge {
    /// Importing file id.
    pub source: String,
    /// Imported file id.
    pub target: String,
}

impl RawEdge {
    /// Create an edge from `source` to `target`.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The raw dependency graph document returned by the indexing backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// File nodes.
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    /// Import edges.
    #[serde(default)]
    pub edges: Vec<RawEdge>,
    /// Advisory file count; not authoritative.
    #[serde(default, alias = "totalFiles", skip_serializing_if = "Option::is_none")]
    pub total_files: Option<u64>,
    /// Advisory dependency count; not authoritative.
    #[serde(
        default,
        alias = "totalDependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_dependencies: Option<u64>,
}

impl ApiResponse {
    /// Build a document from node ids and `(source, target)` pairs.
    ///
    /// Handy for tests and small tools; labels default to file names.
    #[must_use]
    pub fn from_pairs(nodes: &[&str], edges: &[(&str, &str)]) -> Self {
        Self {
            nodes: nodes.iter().map(|id| RawNode::new(*id)).collect(),
            edges: edges.iter().map(|(s, t)| RawEdge::new(*s, *t)).collect(),
            total_files: None,
            total_dependencies: None,
        }
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a document from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

// ============================================================================
// Derived graph
// ============================================================================

/// A strongly-typed index into the node arena of a [`DepGraph`](crate::DepGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeId {
    #[allow(clippy::cast_possible_truncation)]
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}

/// How risky a file is to change, based on how many files import it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// No dependents
    #[serde(rename = "low")]
    Low,
    /// One to three dependents
    #[serde(rename = "med")]
    Medium,
    /// Four or more dependents
    #[serde(rename = "high")]
    High,
}

impl RiskLevel {
    /// Dependent count at which a file becomes high risk.
    pub const HIGH_THRESHOLD: u32 = 4;

    /// Classify a file by its dependent count.
    #[must_use]
    pub fn from_dependent_count(count: u32) -> Self {
        match count {
            0 => Self::Low,
            c if c >= Self::HIGH_THRESHOLD => Self::High,
            _ => Self::Medium,
        }
    }

    /// Short lowercase name, matching the serialized form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "med",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A file node in the derived graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique file path.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Directory containing the file, or `"."` at the root.
    pub directory: String,
    /// Source language, when the backend reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Number of files this file imports.
    pub import_count: u32,
    /// Number of distinct files importing this file.
    pub dependent_count: u32,
    /// Change risk derived from `dependent_count`.
    pub risk_level: RiskLevel,
    /// Cluster assigned by the cluster assigner.
    pub cluster_id: usize,
    /// Palette color for the cluster, `#rrggbb`.
    pub color: String,
    /// Rendering size, grows with `dependent_count`.
    pub size: f64,
    /// Layout position.
    pub position: Position,
}

/// A deduplicated import edge between two arena nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Importing node.
    pub source: NodeId,
    /// Imported node.
    pub target: NodeId,
    /// Attraction weight used by the layout.
    pub weight: f64,
}
