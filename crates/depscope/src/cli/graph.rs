//! `depscope graph` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use depscope::DepScope;

use super::load_input;

/// Run the graph command.
pub fn run(scope: &DepScope, input: &Path, pretty: bool) -> Result<()> {
    let response = load_input(input)?;
    let Some(view) = scope.analyze(&response) else {
        println!("{{}}");
        return Ok(());
    };

    let json = if pretty {
        serde_json::to_string_pretty(&view)
    } else {
        serde_json::to_string(&view)
    }
    .context("failed to serialize graph view")?;
    println!("{json}");
    Ok(())
}
