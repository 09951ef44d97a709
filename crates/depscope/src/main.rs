//! depscope CLI - Dependency graph views from the command line.
//!
//! Reads a JSON import graph (`{"nodes": [...], "edges": [...]}`) and prints
//! the laid-out graph, dependency matrices, summary metrics, impact analysis
//! or search results.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// depscope: Clustered dependency graphs and dependency structure matrices.
#[derive(Parser)]
#[command(name = "depscope")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fixed layout seed for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, cluster and lay out the graph; print it as JSON
    Graph {
        /// Import graph JSON file
        input: PathBuf,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Show the dependency structure matrix
    Matrix {
        /// Import graph JSON file
        input: PathBuf,

        /// Drill down into the files of one directory
        #[arg(short, long)]
        dir: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show graph summary metrics
    Summary {
        /// Import graph JSON file
        input: PathBuf,
    },

    /// Show files affected by changing a file
    Impact {
        /// Import graph JSON file
        input: PathBuf,

        /// File path as it appears in the input
        file: String,
    },

    /// Search files by path or name
    Search {
        /// Import graph JSON file
        input: PathBuf,

        /// Case-insensitive search text
        query: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = cli::load_scope(cli.config.as_deref(), cli.seed).and_then(|scope| {
        match cli.command {
            Commands::Graph { input, pretty } => cli::graph::run(&scope, &input, pretty),
            Commands::Matrix { input, dir, json } => {
                cli::matrix::run(&scope, &input, dir.as_deref(), json)
            }
            Commands::Summary { input } => cli::summary::run(&scope, &input),
            Commands::Impact { input, file } => cli::impact::run(&scope, &input, &file),
            Commands::Search { input, query } => cli::search::run(&scope, &input, &query),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}
