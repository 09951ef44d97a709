//! Common display utilities for CLI commands.

use colored::{ColoredString, Colorize};
use depscope::RiskLevel;
use depscope::insights::RankedFile;

const MAX_DISPLAY_ITEMS: usize = 10;

/// Display a list of files with optional truncation.
///
/// Shows up to `MAX_DISPLAY_ITEMS` files with bullet points. If there are more,
/// shows "... and N more". If empty, shows the provided `empty_message`.
pub fn print_files(files: &[String], empty_message: &str) {
    if files.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for file in files.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {file}", "•".dimmed());
    }

    if files.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            files.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Display ranked files as `path (N unit)`.
pub fn print_ranked(files: &[RankedFile], unit: &str, empty_message: &str) {
    if files.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }
    for file in files {
        println!(
            "    {} {} ({} {unit})",
            "•".dimmed(),
            file.path,
            file.count.to_string().green()
        );
    }
}

/// Risk level colored by severity.
pub fn risk_label(level: RiskLevel) -> ColoredString {
    match level {
        RiskLevel::High => level.as_str().red().bold(),
        RiskLevel::Medium => level.as_str().yellow(),
        RiskLevel::Low => level.as_str().green(),
    }
}

/// Render one matrix cell, right-aligned to `width`.
///
/// Empty cells print as `·`, the diagonal is dimmed, and cells that are part
/// of a cycle are red.
pub fn matrix_cell(count: u32, diagonal: bool, cycle: bool, width: usize) -> ColoredString {
    let text = if count == 0 {
        format!("{:>width$}", "·")
    } else {
        format!("{count:>width$}")
    };
    if cycle {
        text.red().bold()
    } else if diagonal || count == 0 {
        text.dimmed()
    } else {
        text.normal()
    }
}
