//! `depscope summary` command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use depscope::DepScope;

use super::display::{print_ranked, risk_label};
use super::load_input;

/// Run the summary command.
pub fn run(scope: &DepScope, input: &Path) -> Result<()> {
    let response = load_input(input)?;
    let Some(view) = scope.analyze(&response) else {
        println!("No files in {}", input.display());
        return Ok(());
    };
    let summary = view.summary();

    println!("{}", "Dependency Graph Summary".cyan().bold());
    println!();
    println!(
        "  {}: {}",
        "Files".white().bold(),
        summary.total_files.to_string().green()
    );
    println!(
        "  {}: {}",
        "Dependencies".white().bold(),
        summary.total_dependencies.to_string().green()
    );
    println!(
        "  {}: {:.2}",
        "Average per file".white().bold(),
        summary.avg_dependencies
    );
    println!(
        "  {}: {} ({:?})",
        "Clusters".white().bold(),
        view.clustering.cluster_count.to_string().green(),
        view.clustering.method
    );
    println!();

    println!("  {}:", "Risk".white().bold());
    for (level, count) in [
        (depscope::RiskLevel::High, summary.risk_counts.high),
        (depscope::RiskLevel::Medium, summary.risk_counts.medium),
        (depscope::RiskLevel::Low, summary.risk_counts.low),
    ] {
        println!("    {}: {count}", risk_label(level));
    }
    println!();

    println!("  {}:", "Most depended on".white().bold());
    print_ranked(&summary.most_depended, "dependents", "(no file is imported)");
    println!();

    println!("  {}:", "Most imports".white().bold());
    print_ranked(&summary.most_imports, "imports", "(none)");

    Ok(())
}
