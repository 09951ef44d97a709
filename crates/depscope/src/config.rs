//! Configuration for the depscope pipeline.
//!
//! Every tunable of the graph view lives here, grouped by component. A
//! configuration file is YAML with kebab-case keys; every key is optional and
//! falls back to the defaults below:
//!
//! ```yaml
//! graph:
//!   include-orphans: false
//! layout:
//!   iterations: 400
//!   seed: 42
//! overlay:
//!   search-limit: 8
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default number of layout iterations.
pub const DEFAULT_ITERATIONS: usize = 350;

/// Default node count above which repulsion switches to Barnes-Hut.
pub const DEFAULT_BARNES_HUT_THRESHOLD: usize = 100;

/// Default number of search results returned by the overlay.
pub const DEFAULT_SEARCH_LIMIT: usize = 8;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Graph construction settings.
    pub graph: GraphConfig,
    /// Community detection settings.
    pub cluster: ClusterConfig,
    /// Force layout settings.
    pub layout: LayoutConfig,
    /// Interaction overlay settings.
    pub overlay: OverlayConfig,
}

impl Config {
    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.graph.validate()?;
        self.cluster.validate()?;
        self.layout.validate()?;
        self.overlay.validate()
    }
}

/// Graph construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GraphConfig {
    /// Keep files with no incoming or outgoing edges.
    pub include_orphans: bool,
    /// Half-width of the square initial positions are drawn from.
    pub initial_spread: f64,
    /// Size of a node without dependents.
    pub min_node_size: f64,
    /// Growth of node size per square root of the dependent count.
    pub node_size_scale: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            include_orphans: true,
            initial_spread: 100.0,
            min_node_size: 3.0,
            node_size_scale: 2.0,
        }
    }
}

impl GraphConfig {
    fn validate(&self) -> Result<()> {
        if !(self.initial_spread.is_finite() && self.initial_spread > 0.0) {
            return Err(Error::Config("graph.initial-spread must be a positive number".to_string()));
        }
        if !(self.min_node_size.is_finite() && self.min_node_size > 0.0) {
            return Err(Error::Config("graph.min-node-size must be a positive number".to_string()));
        }
        if !(self.node_size_scale.is_finite() && self.node_size_scale >= 0.0) {
            return Err(Error::Config("graph.node-size-scale cannot be negative".to_string()));
        }
        Ok(())
    }
}

/// Community detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClusterConfig {
    /// Louvain resolution; higher values produce smaller communities.
    pub resolution: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { resolution: 1.0 }
    }
}

impl ClusterConfig {
    fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(Error::Config("cluster.resolution must be a positive number".to_string()));
        }
        Ok(())
    }
}

/// Force layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Fixed number of simulation steps. There is no convergence check.
    pub iterations: usize,
    /// Node count above which repulsion uses the Barnes-Hut approximation.
    pub barnes_hut_threshold: usize,
    /// Barnes-Hut accuracy; lower is more exact.
    pub barnes_hut_theta: f64,
    /// Repulsion strength.
    pub scaling_ratio: f64,
    /// Pull toward the centroid.
    pub gravity: f64,
    /// Gravity independent of distance.
    pub strong_gravity: bool,
    /// Take node sizes into account to avoid overlaps.
    pub adjust_sizes: bool,
    /// Logarithmic attraction along edges.
    pub lin_log_mode: bool,
    /// Divide attraction by the source mass, spreading hubs out.
    pub outbound_attraction_distribution: bool,
    /// Exponent applied to edge weights (0 ignores weights).
    pub edge_weight_influence: f64,
    /// Damping of node movement. Inferred from node count when absent.
    pub slow_down: Option<f64>,
    /// Fixed RNG seed for reproducible layouts. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            barnes_hut_threshold: DEFAULT_BARNES_HUT_THRESHOLD,
            barnes_hut_theta: 0.5,
            scaling_ratio: 10.0,
            gravity: 1.0,
            strong_gravity: false,
            adjust_sizes: false,
            lin_log_mode: false,
            outbound_attraction_distribution: true,
            edge_weight_influence: 1.0,
            slow_down: None,
            seed: None,
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::Config("layout.iterations must be at least 1".to_string()));
        }
        if !(self.barnes_hut_theta.is_finite() && self.barnes_hut_theta > 0.0) {
            return Err(Error::Config(
                "layout.barnes-hut-theta must be a positive number".to_string(),
            ));
        }
        if !(self.scaling_ratio.is_finite() && self.scaling_ratio > 0.0) {
            return Err(Error::Config("layout.scaling-ratio must be a positive number".to_string()));
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(Error::Config("layout.gravity cannot be negative".to_string()));
        }
        if !self.edge_weight_influence.is_finite() || self.edge_weight_influence < 0.0 {
            return Err(Error::Config(
                "layout.edge-weight-influence cannot be negative".to_string(),
            ));
        }
        match self.slow_down {
            Some(slow_down) if !(slow_down.is_finite() && slow_down > 0.0) => Err(Error::Config(
                "layout.slow-down must be a positive number".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Interaction overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OverlayConfig {
    /// Maximum number of search results.
    pub search_limit: usize,
    /// Camera ratio when focusing a search result.
    pub search_zoom_ratio: f64,
    /// Camera ratio when double-clicking a node.
    pub double_click_zoom_ratio: f64,
    /// Duration of camera animations.
    pub animation_duration_ms: u64,
    /// Background color faded nodes blend toward, `#rrggbb`.
    pub background_color: String,
    /// How far faded nodes move toward the background, 0 to 1.
    pub fade_amount: f64,
    /// Border width of the focused node.
    pub focused_border_size: f64,
    /// Border width of the focused node's neighbors.
    pub neighbor_border_size: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
            search_zoom_ratio: 0.3,
            double_click_zoom_ratio: 0.15,
            animation_duration_ms: 500,
            background_color: "#1a1a2e".to_string(),
            fade_amount: 0.8,
            focused_border_size: 3.0,
            neighbor_border_size: 1.0,
        }
    }
}

impl OverlayConfig {
    fn validate(&self) -> Result<()> {
        if self.search_limit == 0 {
            return Err(Error::Config("overlay.search-limit must be at least 1".to_string()));
        }
        for (key, ratio) in [
            ("search-zoom-ratio", self.search_zoom_ratio),
            ("double-click-zoom-ratio", self.double_click_zoom_ratio),
        ] {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(Error::Config(format!(
                    "overlay.{key} must be a positive number"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.fade_amount) {
            return Err(Error::Config("overlay.fade-amount must be between 0 and 1".to_string()));
        }
        if crate::overlay::parse_hex_color(&self.background_color).is_none() {
            return Err(Error::Config(format!(
                "overlay.background-color '{}' is not a #rrggbb color",
                self.background_color
            )));
        }
        Ok(())
    }
}
