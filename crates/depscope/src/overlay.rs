//! Interaction overlay: focus state, highlight styles, search, and camera requests.
//!
//! The overlay holds a single [`Focus`] value and turns UI intents (hover,
//! click, double-click, search) into two kinds of output:
//!
//! - **Styles**: per-node and per-edge overrides computed by the pure
//!   functions [`node_style`] and [`edge_style`] from a [`Highlight`]
//! - **Events**: [`OverlayEvent`]s for the rendering collaborator (file
//!   selection, camera animation)
//!
//! ## State machine
//!
//! ```text
//!            hover_enter(n)              select_result(n)
//!   None ───────────────────► Hovered(n)        None ─────────────► Pinned(n)
//!     ▲                          │                                     │
//!     └──────── hover_leave ─────┘       clear_search / hover_leave ───┘
//! ```
//!
//! `click` and `double_click` never change the focus.

use serde::Serialize;
use std::collections::HashSet;

use crate::config::OverlayConfig;
use crate::graph::DepGraph;
use crate::types::{Edge, Node, NodeId};

/// What the user is currently focused on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "node", rename_all = "snake_case")]
pub enum Focus {
    /// Nothing focused; every element has its default style
    #[default]
    None,
    /// The pointer is over a node
    Hovered(NodeId),
    /// A node chosen from search results
    Pinned(NodeId),
}

impl Focus {
    /// The focused node, if any.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::None => None,
            Self::Hovered(id) | Self::Pinned(id) => Some(*id),
        }
    }
}

/// A camera instruction for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraRequest {
    /// Animate to a graph position at a zoom ratio (smaller is closer)
    Animate {
        /// Target x in layout space.
        x: f64,
        /// Target y in layout space.
        y: f64,
        /// Camera ratio.
        ratio: f64,
        /// Animation length.
        duration_ms: u64,
    },
    /// Fit the whole graph
    Reset {
        /// Animation length.
        duration_ms: u64,
    },
}

/// Output of the overlay for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum OverlayEvent {
    /// A file was activated
    SelectFile(String),
    /// The camera should move
    Camera(CameraRequest),
}

/// Visual role of a node under the current focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    /// No focus is active
    Default,
    /// The focused node itself
    Focused,
    /// A direct neighbor of the focused node
    Neighbor,
    /// Outside the focus neighborhood
    Faded,
}

/// Style override for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    /// Visual role.
    pub emphasis: Emphasis,
    /// Label to draw; `None` hides it.
    pub label: Option<String>,
    /// Fill color, `#rrggbb`.
    pub color: String,
    /// Border width; zero means no border.
    pub border_size: f64,
}

/// Style override for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    /// No focus is active
    Default,
    /// Both endpoints are in the focus neighborhood
    Emphasized,
    /// Not drawn
    Hidden,
}

/// The focused node and its neighborhood, resolved against a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    focused: Option<NodeId>,
    members: HashSet<NodeId>,
}

impl Highlight {
    /// Resolve a focus: the focused node plus its undirected neighbors.
    #[must_use]
    pub fn from_focus(graph: &DepGraph, focus: Focus) -> Self {
        match focus.node().filter(|id| graph.get(*id).is_some()) {
            None => Self::default(),
            Some(id) => {
                let mut members: HashSet<NodeId> = graph.neighbors(id).into_iter().collect();
                members.insert(id);
                Self {
                    focused: Some(id),
                    members,
                }
            }
        }
    }

    /// Whether a focus is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.focused.is_some()
    }

    /// Whether `id` is the focused node or one of its neighbors.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// Nodes in the neighborhood, including the focused node.
    #[must_use]
    pub fn members(&self) -> &HashSet<NodeId> {
        &self.members
    }
}

/// Style of a node under a highlight.
#[must_use]
pub fn node_style(
    highlight: &Highlight,
    id: NodeId,
    node: &Node,
    config: &OverlayConfig,
) -> NodeStyle {
    let emphasis = match highlight.focused {
        None => Emphasis::Default,
        Some(focused) if focused == id => Emphasis::Focused,
        Some(_) if highlight.contains(id) => Emphasis::Neighbor,
        Some(_) => Emphasis::Faded,
    };

    match emphasis {
        Emphasis::Default => NodeStyle {
            emphasis,
            label: Some(node.label.clone()),
            color: node.color.clone(),
            border_size: 0.0,
        },
        Emphasis::Focused => NodeStyle {
            emphasis,
            label: Some(node.label.clone()),
            color: node.color.clone(),
            border_size: config.focused_border_size,
        },
        Emphasis::Neighbor => NodeStyle {
            emphasis,
            label: Some(node.label.clone()),
            color: node.color.clone(),
            border_size: config.neighbor_border_size,
        },
        Emphasis::Faded => NodeStyle {
            emphasis,
            label: None,
            color: blend_colors(&node.color, &config.background_color, config.fade_amount),
            border_size: 0.0,
        },
    }
}

/// Style of an edge under a highlight.
#[must_use]
pub fn edge_style(highlight: &Highlight, edge: &Edge) -> EdgeStyle {
    if !highlight.is_active() {
        EdgeStyle::Default
    } else if highlight.contains(edge.source) && highlight.contains(edge.target) {
        EdgeStyle::Emphasized
    } else {
        EdgeStyle::Hidden
    }
}

/// Parse a `#rrggbb` color.
#[must_use]
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Move `color` toward `background` by `amount` (0 keeps the color, 1 is
/// the background). Unparsable colors become the background.
#[must_use]
pub fn blend_colors(color: &str, background: &str, amount: f64) -> String {
    let Some(bg) = parse_hex_color(background) else {
        return color.to_string();
    };
    let Some(fg) = parse_hex_color(color) else {
        return background.to_string();
    };
    let amount = amount.clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mix = |a: u8, b: u8| {
        (f64::from(a) + (f64::from(b) - f64::from(a)) * amount).round() as u8
    };
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(fg.0, bg.0),
        mix(fg.1, bg.1),
        mix(fg.2, bg.2)
    )
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Matched node.
    pub node: NodeId,
    /// File path.
    pub path: String,
    /// Display label.
    pub label: String,
    /// Whether the label starts with the query.
    pub prefix_match: bool,
}

/// Case-insensitive substring search over node ids and labels.
///
/// Label-prefix matches rank first; ties are broken by id. An empty or
/// whitespace-only query matches nothing; otherwise the query is matched as
/// typed, spaces included.
#[must_use]
pub fn search(graph: &DepGraph, query: &str, limit: usize) -> Vec<SearchHit> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    let mut hits: Vec<SearchHit> = graph
        .node_ids()
        .filter_map(|id| {
            let node = graph.node(id);
            let label = node.label.to_lowercase();
            if !(node.id.to_lowercase().contains(&needle) || label.contains(&needle)) {
                return None;
            }
            Some(SearchHit {
                node: id,
                path: node.id.clone(),
                label: node.label.clone(),
                prefix_match: label.starts_with(&needle),
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.prefix_match
            .cmp(&a.prefix_match)
            .then_with(|| a.path.cmp(&b.path))
    });
    hits.truncate(limit);
    hits
}

/// Focus state machine over a built graph.
#[derive(Debug, Clone)]
pub struct InteractionOverlay<'g> {
    graph: &'g DepGraph,
    config: OverlayConfig,
    focus: Focus,
    highlight: Highlight,
    query: String,
}

impl<'g> InteractionOverlay<'g> {
    /// Create an overlay with nothing focused.
    #[must_use]
    pub fn new(graph: &'g DepGraph, config: OverlayConfig) -> Self {
        Self {
            graph,
            config,
            focus: Focus::None,
            highlight: Highlight::default(),
            query: String::new(),
        }
    }

    /// Current focus.
    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Current search query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current highlight.
    #[must_use]
    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.highlight = Highlight::from_focus(self.graph, focus);
    }

    fn camera_to(&self, id: NodeId, ratio: f64) -> OverlayEvent {
        let position = self.graph.node(id).position;
        OverlayEvent::Camera(CameraRequest::Animate {
            x: position.x,
            y: position.y,
            ratio,
            duration_ms: self.config.animation_duration_ms,
        })
    }

    fn known(&self, id: NodeId) -> bool {
        self.graph.get(id).is_some()
    }

    /// The pointer entered a node. Returns `false` for unknown nodes.
    pub fn hover_enter(&mut self, id: NodeId) -> bool {
        if !self.known(id) {
            return false;
        }
        self.set_focus(Focus::Hovered(id));
        true
    }

    /// The pointer left the node; all overrides are cleared.
    pub fn hover_leave(&mut self) {
        self.set_focus(Focus::None);
    }

    /// A node was clicked.
    #[must_use]
    pub fn click(&self, id: NodeId) -> Option<OverlayEvent> {
        self.graph
            .get(id)
            .map(|node| OverlayEvent::SelectFile(node.id.clone()))
    }

    /// A node was double-clicked: zoom in on it.
    #[must_use]
    pub fn double_click(&self, id: NodeId) -> Option<OverlayEvent> {
        self.known(id)
            .then(|| self.camera_to(id, self.config.double_click_zoom_ratio))
    }

    /// Update the search query and return the ranked matches.
    pub fn search(&mut self, query: &str) -> Vec<SearchHit> {
        self.query = query.to_string();
        search(self.graph, query, self.config.search_limit)
    }

    /// A search result was chosen: pin it and move the camera there.
    pub fn select_result(&mut self, id: NodeId) -> Option<OverlayEvent> {
        if !self.known(id) {
            return None;
        }
        self.set_focus(Focus::Pinned(id));
        self.query.clear();
        Some(self.camera_to(id, self.config.search_zoom_ratio))
    }

    /// The search box was cleared or dismissed.
    pub fn clear_search(&mut self) -> OverlayEvent {
        self.set_focus(Focus::None);
        self.query.clear();
        OverlayEvent::Camera(CameraRequest::Reset {
            duration_ms: self.config.animation_duration_ms,
        })
    }

    /// Style of a node under the current focus, or `None` if `id` is not in
    /// the graph.
    #[must_use]
    pub fn node_style(&self, id: NodeId) -> Option<NodeStyle> {
        let node = self.graph.get(id)?;
        Some(node_style(&self.highlight, id, node, &self.config))
    }

    /// Style of an edge under the current focus.
    #[must_use]
    pub fn edge_style(&self, edge: &Edge) -> EdgeStyle {
        edge_style(&self.highlight, edge)
    }

    /// Styles of every node, in arena order.
    #[must_use]
    pub fn node_styles(&self) -> Vec<NodeStyle> {
        self.graph
            .node_ids()
            .zip(self.graph.nodes())
            .map(|(id, node)| node_style(&self.highlight, id, node, &self.config))
            .collect()
    }

    /// Styles of every edge, in edge order.
    #[must_use]
    pub fn edge_styles(&self) -> Vec<EdgeStyle> {
        self.graph
            .edges()
            .iter()
            .map(|edge| self.edge_style(edge))
            .collect()
    }
}
