//! `depscope impact` command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use depscope::DepScope;

use super::display::{print_files, risk_label};
use super::load_input;

/// Run the impact command.
pub fn run(scope: &DepScope, input: &Path, file: &str) -> Result<()> {
    let response = load_input(input)?;
    let Some(view) = scope.analyze(&response) else {
        return Err(depscope::Error::UnknownFile(file.into()).into());
    };
    let impact = view.impact(file)?;

    println!(
        "Impact analysis for {} ({} risk):",
        file.cyan().bold(),
        risk_label(impact.risk_level)
    );
    println!();

    println!(
        "  {} ({} files):",
        "Imports".white().bold(),
        impact.dependencies.len().to_string().cyan()
    );
    print_files(&impact.dependencies, "(none)");
    println!();

    println!(
        "  {} ({} files):",
        "Direct dependents".white().bold(),
        impact.direct_dependents.len().to_string().green()
    );
    print_files(&impact.direct_dependents, "(none)");
    println!();

    println!(
        "  {} ({} files, depth {}):",
        "Transitive dependents".white().bold(),
        impact.transitive_dependents.len().to_string().yellow(),
        impact.max_depth
    );
    print_files(&impact.transitive_dependents, "(none beyond direct)");

    if !impact.test_files.is_empty() {
        println!();
        println!(
            "  {} ({} files):",
            "Related tests".white().bold(),
            impact.test_files.len().to_string().green()
        );
        print_files(&impact.test_files, "(none)");
    }

    Ok(())
}
