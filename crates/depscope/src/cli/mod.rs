//! CLI command implementations.

mod display;

pub mod graph;
pub mod impact;
pub mod matrix;
pub mod search;
pub mod summary;

use std::path::Path;

use anyhow::{Context, Result};
use depscope::{ApiResponse, Config, DepScope};
use tracing::debug;

/// Build the analyzer from an optional config file and seed override.
pub fn load_scope(config_path: Option<&Path>, seed: Option<u64>) -> Result<DepScope> {
    let mut config = match config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if seed.is_some() {
        config.layout.seed = seed;
    }
    debug!(?config, "Loaded configuration");
    Ok(DepScope::new(config)?)
}

/// Read an import graph JSON file.
pub fn load_input(path: &Path) -> Result<ApiResponse> {
    ApiResponse::from_path(path).with_context(|| format!("failed to read {}", path.display()))
}
