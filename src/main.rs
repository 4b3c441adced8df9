//! CLI entry point for manga-batcher.

use std::process;

use anyhow::Result;
use clap::Parser;
use log::{debug, error, info, warn};
use manga_batcher::PipelineOutcome;
use manga_batcher::prompt::StdinPrompter;

mod cli;

use cli::Args;

async fn run(args: Args) -> Result<()> {
    let config = args.to_builder().build()?;
    debug!("Pipeline configuration: {:?}", config);

    match config.run(&mut StdinPrompter).await? {
        PipelineOutcome::Completed(report) => {
            for failed in &report.failed {
                warn!("Batch {} was not converted.", failed.batch);
            }
            info!(
                "Script finished successfully. EPUBs are in {}",
                config.output_root.display()
            );
        }
        PipelineOutcome::CleanupDeclined => info!("Output directory kept; nothing was done."),
        PipelineOutcome::NoChapters | PipelineOutcome::NoBatches => {
            info!("Nothing to convert.")
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Parse CLI arguments first (before logging, so --help works without logs)
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(err) = run(args).await {
        error!("{err}");
        process::exit(1);
    }
}
