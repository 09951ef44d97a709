//! `depscope matrix` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use depscope::{DepScope, DirectoryMatrix, FileMatrix};

use super::display::matrix_cell;
use super::load_input;

/// Run the matrix command.
pub fn run(scope: &DepScope, input: &Path, dir: Option<&str>, json: bool) -> Result<()> {
    let response = load_input(input)?;

    match dir {
        None => {
            let dsm = scope.directory_matrix(&response);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&dsm).context("failed to serialize matrix")?
                );
            } else {
                print_directory_matrix(&dsm);
            }
        }
        Some(directory) => {
            let fm = scope.file_matrix(&response, directory)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&fm).context("failed to serialize matrix")?
                );
            } else {
                print_file_matrix(&fm);
            }
        }
    }
    Ok(())
}

fn print_directory_matrix(dsm: &DirectoryMatrix) {
    println!("{}", "Directory Dependency Matrix".cyan().bold());
    println!();
    if dsm.is_empty() {
        println!("  {}", "(no directories)".dimmed());
        return;
    }

    let labels: Vec<String> = dsm
        .directories
        .iter()
        .zip(&dsm.file_counts)
        .map(|(dir, files)| format!("{dir} ({files})"))
        .collect();
    print_grid(&labels, &dsm.matrix, |i, j| dsm.is_cycle(i, j));

    println!();
    println!(
        "  {}: {}   {}: {}   {}: {}",
        "Cross-directory imports".white().bold(),
        dsm.total_deps.to_string().green(),
        "Internal".white().bold(),
        dsm.intra_deps(),
        "Cycles".white().bold(),
        if dsm.total_cycles > 0 {
            dsm.total_cycles.to_string().red().bold()
        } else {
            dsm.total_cycles.to_string().green()
        }
    );
    for &(i, j) in &dsm.cycles {
        println!(
            "    {} {} {} {}",
            "•".dimmed(),
            dsm.directories[i],
            "<->".red(),
            dsm.directories[j]
        );
    }
}

fn print_file_matrix(fm: &FileMatrix) {
    println!(
        "{} {}",
        "File Dependency Matrix:".cyan().bold(),
        fm.directory.white().bold()
    );
    println!();

    let labels: Vec<String> = fm.files.iter().map(|f| file_name(f).to_string()).collect();
    print_grid(&labels, &fm.matrix, |i, j| {
        i != j && fm.cycles.contains(&(i.min(j), i.max(j)))
    });

    if !fm.cycles.is_empty() {
        println!();
        println!(
            "  {}: {}",
            "Cycles".white().bold(),
            fm.cycles.len().to_string().red().bold()
        );
        for &(i, j) in &fm.cycles {
            println!(
                "    {} {} {} {}",
                "•".dimmed(),
                file_name(&fm.files[i]),
                "<->".red(),
                file_name(&fm.files[j])
            );
        }
    }
}

/// Rows labeled by name, columns by index to keep the table narrow.
fn print_grid(labels: &[String], matrix: &[Vec<u32>], is_cycle: impl Fn(usize, usize) -> bool) {
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);
    let max_count = matrix.iter().flatten().copied().max().unwrap_or(0);
    let width = max_count
        .to_string()
        .len()
        .max(labels.len().to_string().len())
        + 1;

    let header: String = (0..labels.len()).map(|j| format!("{j:>width$}")).collect();
    println!("  {:label_width$}     {}", "", header.dimmed());

    for (i, (label, row)) in labels.iter().zip(matrix).enumerate() {
        let cells: String = row
            .iter()
            .enumerate()
            .map(|(j, &count)| matrix_cell(count, i == j, is_cycle(i, j), width).to_string())
            .collect();
        println!("  {label:<label_width$} {:>3} {cells}", i.to_string().dimmed());
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
