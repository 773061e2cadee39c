//! Command-line interface
//!
//! One subcommand: `run` loads a players file, trains all six model
//! runs, and prints the comparison report.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::data::DataLoader;
use crate::error::Result;
use crate::pipeline;

#[derive(Parser)]
#[command(name = "rookiecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Career-longevity model training and comparison")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train every model on a players file and print the comparison report
    Run {
        /// Input data file (CSV or TSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Label column name
        #[arg(short, long, default_value = "Target")]
        target: String,

        /// Seed for every stochastic stage
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Decision threshold for probability-producing models
        #[arg(long, default_value = "0.5")]
        threshold: f64,

        /// Write the full report (ROC sweeps included) as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Execute the `run` subcommand
pub fn cmd_run(
    data: &Path,
    target: &str,
    seed: u64,
    threshold: f64,
    output: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();

    let path = data.to_string_lossy();
    let loader = DataLoader::new();
    let df = loader.load_auto(&path)?;
    println!(
        "{} {} ({} rows, {} columns)",
        "loaded".green(),
        path,
        df.height(),
        df.width()
    );

    let config = PipelineConfig::new(target)
        .with_seed(seed)
        .with_threshold(threshold);
    let result = pipeline::run(&df, &config)?;

    println!();
    println!("{}", "Model comparison".bold());
    println!("{}", result.table.to_text());

    println!("{}", "Forest permutation importance (accuracy drop)".bold());
    for (idx, score) in result.forest_importance.ranked() {
        let name = result
            .feature_names
            .get(idx)
            .map(String::as_str)
            .unwrap_or("?");
        println!("  {:<24} {:+.4}", name, score);
    }

    println!();
    println!(
        "ridge penalty {}   lasso penalty {}",
        format!("{}", result.ridge_selection.chosen).cyan(),
        format!("{}", result.lasso_selection.chosen).cyan()
    );

    if let Some(out_path) = output {
        std::fs::write(out_path, result.table.to_json()?)?;
        println!("{} {}", "report written to".green(), out_path.display());
    }

    println!(
        "{}",
        format!("finished in {:.1}s", start.elapsed().as_secs_f64()).dimmed()
    );
    Ok(())
}
