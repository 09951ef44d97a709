//! Error types for depscope operations.
//!
//! The analytical transforms (graph building, clustering, layout, matrices)
//! are total over well-formed input and do not return errors:
//!
//! - An empty node list yields `None`, not an error
//! - Dangling edges are dropped
//! - Clustering failures are absorbed by the directory fallback
//!
//! Errors only surface at the edges: loading input and configuration files,
//! and resolving user-supplied names (directories, file paths).

use std::path::PathBuf;
use thiserror::Error;

/// Result type for depscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for depscope operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file is not a valid dependency graph document
    #[error("invalid graph input: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration file or configuration values
    #[error("configuration error: {0}")]
    Config(String),

    /// Directory requested for drill-down has no files in the input
    #[error("unknown directory: {0}")]
    UnknownDirectory(String),

    /// File path is not a node of the graph
    #[error("unknown file: {}", .0.display())]
    UnknownFile(PathBuf),
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Failure reported by a community-detection strategy.
///
/// These never escape [`ClusterAssigner`](crate::ClusterAssigner); they
/// trigger the directory fallback instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// The graph has no nodes
    #[error("graph has no nodes")]
    EmptyGraph,

    /// The undirected projection carries no edge weight, so modularity is undefined
    #[error("graph has no edges; modularity is undefined")]
    NoEdges,

    /// The strategy returned a different number of assignments than there are nodes
    #[error("strategy returned {actual} assignments for {expected} nodes")]
    AssignmentMismatch {
        /// Number of nodes in the graph
        expected: usize,
        /// Number of assignments returned
        actual: usize,
    },

    /// Strategy-specific failure
    #[error("community detection failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_file_display_includes_path() {
        let error = Error::UnknownFile(PathBuf::from("src/auth.ts"));

        assert_eq!(error.to_string(), "unknown file: src/auth.ts");
    }

    #[test]
    fn yaml_errors_become_config_errors() {
        let yaml_err = serde_yaml::from_str::<u32>("not: [a number").unwrap_err();

        let error = Error::from(yaml_err);

        assert!(matches!(error, Error::Config(_)));
        assert!(error.to_string().starts_with("configuration error"));
    }

    #[test]
    fn assignment_mismatch_reports_counts() {
        let error = ClusterError::AssignmentMismatch {
            expected: 4,
            actual: 2,
        };

        let display = error.to_string();
        assert!(display.contains('4'));
        assert!(display.contains('2'));
    }
}
