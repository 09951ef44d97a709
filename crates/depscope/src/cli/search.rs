//! `depscope search` command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use depscope::DepScope;

use super::load_input;

/// Run the search command.
pub fn run(scope: &DepScope, input: &Path, query: &str) -> Result<()> {
    let response = load_input(input)?;
    let hits = scope
        .analyze(&response)
        .map(|view| scope.search(&view, query))
        .unwrap_or_default();

    if hits.is_empty() {
        println!("No files found matching \"{query}\"");
        if query.trim().is_empty() {
            println!("\n{}: The query is blank.", "hint".dimmed());
        }
        return Ok(());
    }

    println!(
        "Found {} files matching \"{}\":\n",
        hits.len().to_string().green(),
        query.cyan()
    );
    for hit in &hits {
        let label = if hit.prefix_match {
            hit.label.white().bold()
        } else {
            hit.label.normal()
        };
        println!("  {label}  {}", hit.path.dimmed());
    }

    Ok(())
}
