// src/main.rs

use anyhow::Result;
use clap::Parser;
use modfetch::cli::{Cli, Commands};
use modfetch::config::ConfigBuilder;
use modfetch::errors::Error;
#[cfg(feature = "progress")]
use modfetch::progress::IndicatifProgress;
use modfetch::progress::ProgressReporter;
use modfetch::signal::setup_signal_handler;
use modfetch::{build_fetcher, run, BatchReport, WalkOptions};
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging. Default to 'info' if RUST_LOG is not set.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                if cfg!(debug_assertions) {
                    "modfetch=debug".parse()?
                } else {
                    "modfetch=info".parse()?
                },
            ),
        )
        .init();

    log::info!("Starting modfetch v{}...", env!("CARGO_PKG_VERSION"));
    log::debug!("Raw arguments: {:?}", std::env::args().collect::<Vec<_>>());

    // --- Setup ---
    let mut cli = Cli::parse();
    let command = cli.command.take();

    // Decide whether to show a progress bar. Show it if stderr is a TTY.
    let progress_reporter: Option<Arc<dyn ProgressReporter>> = {
        #[cfg(feature = "progress")]
        {
            if atty::is(atty::Stream::Stderr) {
                Some(Arc::new(IndicatifProgress::new()))
            } else {
                None
            }
        }
        #[cfg(not(feature = "progress"))]
        {
            None
        }
    };

    // --- Configuration & Execution ---
    let config = match ConfigBuilder::from_cli(cli).build() {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };
    log::debug!("Configuration built successfully.");

    let token = setup_signal_handler()?;

    let result = match command {
        None => run(&config, &token, progress_reporter).map(|report| summarize(&report)),
        Some(command) => build_fetcher(config.client.clone(), &token, progress_reporter)
            .and_then(|fetcher| match command {
                Commands::Tree {
                    url,
                    destination,
                    merge,
                } => fetcher
                    .fetch_tree_recursive(&url, &destination, WalkOptions { merge_into_root: merge })
                    .map(|report| {
                        for failure in &report.failures {
                            eprintln!("skipped {}: {}", failure.location, failure.reason);
                        }
                        println!(
                            "{} files written to {}",
                            report.written.len(),
                            report.target.display()
                        );
                        report.is_complete()
                    }),
                Commands::Archive { url, destination } => fetcher
                    .fetch_archive_subtree(&url, &destination)
                    .map(|fetched| {
                        println!(
                            "{} files extracted from {} to {}",
                            fetched.files.len(),
                            fetched.prefix,
                            fetched.destination.display()
                        );
                        true
                    }),
                Commands::Release {
                    url,
                    destination,
                    asset,
                } => fetcher
                    .fetch_release_asset(&url, &destination, &asset)
                    .map(|path| {
                        println!("{} extracted to {}", asset, path.display());
                        true
                    }),
            }),
    };

    // --- Error Handling ---
    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => exit_with(e),
    }
}

/// Prints the per-entry outcome of a batch and tells whether all entries succeeded.
fn summarize(report: &BatchReport) -> bool {
    for entry in &report.entries {
        match &entry.result {
            Ok(path) => println!("ok      {} ({}) -> {}", entry.name, entry.kind, path.display()),
            Err(e) => println!("FAILED  {} ({}): {}", entry.name, entry.kind, e),
        }
        for skipped in &entry.skipped {
            println!("        skipped {}", skipped);
        }
    }
    for ignored in &report.ignored {
        println!("ignored {}", ignored);
    }
    println!(
        "{} installed, {} failed",
        report.entries.len() - report.failed_count(),
        report.failed_count()
    );
    report.is_success()
}

fn exit_with(error: Error) -> ! {
    match error {
        Error::Interrupted => {
            eprintln!("\nOperation cancelled.");
            std::process::exit(130);
        }
        e => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
