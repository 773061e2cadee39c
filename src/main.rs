//! rookiecast - Main Entry Point
//!
//! Trains and compares career-longevity classifiers from the command line.

use clap::Parser;
use rookiecast::cli::{cmd_run, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rookiecast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            target,
            seed,
            threshold,
            output,
        } => {
            cmd_run(&data, &target, seed, threshold, output.as_deref())?;
        }
    }

    Ok(())
}
