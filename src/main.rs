//! fileproc - Pluggable File Processing Pipeline
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use fileproc::classify::InferClassifier;
use fileproc::config::{CliArgs, ProcessConfig};
use fileproc::process::FileProcessor;
use fileproc::registry::WorkerRegistry;
use fileproc::report::JsonLogSink;
use fileproc::summary::{print_header, print_summary};
use fileproc::workers::{ArchiveLister, DirectoryLister, SizeWorker};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = ProcessConfig::from_args(args).context("Invalid configuration")?;

    // Register the built-in workers; the first lookup closes the registry
    let registry = Arc::new(WorkerRegistry::new());
    registry
        .register(Arc::new(SizeWorker::new()))
        .context("Failed to register SizeWorker")?;
    registry
        .register(Arc::new(DirectoryLister::new()))
        .context("Failed to register DirectoryLister")?;
    registry
        .register(Arc::new(ArchiveLister::new()))
        .context("Failed to register ArchiveLister")?;
    info!(workers = registry.worker_count(), "Workers registered");

    // Create processor
    let processor = FileProcessor::new(
        config,
        registry,
        Arc::new(InferClassifier::new()),
        Arc::new(JsonLogSink::new()),
    );

    // Print header
    let show_summary = processor.config().show_summary;
    if show_summary {
        print_header(
            &processor.config().root,
            &processor.config().operations,
            processor.config().worker_count,
        );
    }

    // Setup signal handler for graceful shutdown
    let shutdown_flag = processor.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    // Run the pipeline
    let outcome = processor.run().context("Run failed")?;

    // Print summary
    if show_summary {
        print_summary(&outcome);
    }

    // Report success/failure; a truncated run is an outcome, not an error
    if outcome.truncated {
        info!("Run was interrupted before completion");
    }

    if outcome.stats.failed > 0 {
        info!(failed = outcome.stats.failed, "Run finished with failure reports");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("fileproc=debug,warn")
    } else {
        EnvFilter::new("fileproc=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
