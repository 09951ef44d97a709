//! The derived dependency graph.
//!
//! [`DepGraph`] stores file nodes in an arena indexed by [`NodeId`] and import
//! edges as `(source, target)` id pairs. Adjacency lists are kept in both
//! directions so dependents and dependencies are cheap to enumerate.
//!
//! For algorithms that need it, the graph can be projected into petgraph:
//! - [`DepGraph::to_directed`] for reachability (impact analysis)
//! - [`DepGraph::to_undirected`] for community detection
//!
//! Projections preserve node order, so petgraph `NodeIndex::new(i)` and
//! `NodeId(i)` refer to the same file.

mod builder;

pub use builder::{GraphBuilder, directory_of};

use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::collections::HashMap;

use crate::types::{Edge, Node, NodeId};

/// A directed file dependency graph with derived per-node metrics.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    path_to_id: HashMap<String, NodeId>,
    /// Outgoing edge indices per node
    outgoing: Vec<Vec<usize>>,
    /// Incoming edge indices per node
    incoming: Vec<Vec<usize>>,
}

impl DepGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its id. A node whose path is already present is
    /// not replaced; the existing id is returned.
    pub(crate) fn add_node(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.path_to_id.get(&node.id) {
            return id;
        }
        let id = NodeId::from(self.nodes.len());
        self.path_to_id.insert(node.id.clone(), id);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Add an edge unless one already exists for the same ordered pair.
    ///
    /// Returns `true` if the edge was added.
    pub(crate) fn add_edge(&mut self, source: NodeId, target: NodeId, weight: f64) -> bool {
        // Outgoing lists are short for import graphs; a scan beats a side index
        if self.outgoing[source.index()]
            .iter()
            .any(|&e| self.edges[e].target == target)
        {
            return false;
        }
        let index = self.edges.len();
        self.edges.push(Edge {
            source,
            target,
            weight,
        });
        self.outgoing[source.index()].push(index);
        self.incoming[target.index()].push(index);
        true
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of (deduplicated) edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// All edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Ids of all nodes in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from)
    }

    /// Look up a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Look up a node by id, returning `None` for foreign ids.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Resolve a file path to its node id.
    #[must_use]
    pub fn node_id(&self, path: &str) -> Option<NodeId> {
        self.path_to_id.get(path).copied()
    }

    /// Whether an edge exists for the ordered pair.
    #[must_use]
    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.outgoing
            .get(source.index())
            .is_some_and(|out| out.iter().any(|&e| self.edges[e].target == target))
    }

    /// Files imported by `id`.
    pub fn dependencies(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing
            .get(id.index())
            .into_iter()
            .flatten()
            .map(|&e| self.edges[e].target)
    }

    /// Files importing `id`.
    pub fn dependents(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming
            .get(id.index())
            .into_iter()
            .flatten()
            .map(|&e| self.edges[e].source)
    }

    /// Number of edges linking `id` to other nodes, in either direction.
    /// Self-imports are not counted.
    #[must_use]
    pub fn degree(&self, id: NodeId) -> usize {
        self.dependencies(id)
            .chain(self.dependents(id))
            .filter(|&other| other != id)
            .count()
    }

    /// Direct neighbors of `id` ignoring edge direction, sorted and unique.
    /// A node is never its own neighbor.
    #[must_use]
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let mut neighbors: Vec<NodeId> = self
            .dependencies(id)
            .chain(self.dependents(id))
            .filter(|&other| other != id)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Directed petgraph projection. Edge weights are carried over.
    #[must_use]
    pub fn to_directed(&self) -> DiGraph<NodeId, f64> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        for id in self.node_ids() {
            graph.add_node(id);
        }
        for edge in &self.edges {
            graph.add_edge(
                NodeIndex::new(edge.source.index()),
                NodeIndex::new(edge.target.index()),
                edge.weight,
            );
        }
        graph
    }

    /// Undirected petgraph projection.
    ///
    /// Reciprocal imports (`a -> b` and `b -> a`) collapse into one edge whose
    /// weight is the sum of both directions.
    #[must_use]
    pub fn to_undirected(&self) -> UnGraph<NodeId, f64> {
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.edges.len());
        for id in self.node_ids() {
            graph.add_node(id);
        }
        for edge in &self.edges {
            let a = NodeIndex::new(edge.source.index());
            let b = NodeIndex::new(edge.target.index());
            match graph.find_edge(a, b) {
                Some(existing) => graph[existing] += edge.weight,
                None => {
                    graph.add_edge(a, b, edge.weight);
                }
            }
        }
        graph
    }
}

/// Edge as seen by consumers: endpoints by file path.
#[derive(Serialize)]
struct EdgeRecord<'a> {
    source: &'a str,
    target: &'a str,
    weight: f64,
}

impl Serialize for DepGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let edges: Vec<EdgeRecord<'_>> = self
            .edges
            .iter()
            .map(|e| EdgeRecord {
                source: &self.node(e.source).id,
                target: &self.node(e.target).id,
                weight: e.weight,
            })
            .collect();

        let mut state = serializer.serialize_struct("DepGraph", 2)?;
        state.serialize_field("nodes", &self.nodes)?;
        state.serialize_field("edges", &edges)?;
        state.end()
    }
}
