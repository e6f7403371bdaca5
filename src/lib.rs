//! `modfetch` is a library and command-line tool for fetching game content
//! (mods, mod packs, tile sets and sound packs) out of GitHub repositories.
//!
//! It offers three interchangeable retrieval strategies behind one
//! [`Fetcher`] handle:
//! 1.  **Tree walk**: list a folder through the contents API and download
//!     every file, tolerating individual failures
//!     ([`Fetcher::fetch_tree_recursive`]).
//! 2.  **Archive subtree**: download the repository zip once and extract only
//!     the requested folder ([`Fetcher::fetch_archive_subtree`]).
//! 3.  **Release asset**: download a named asset of the latest release
//!     ([`Fetcher::fetch_release_asset`]).
//!
//! A fetched tree can then be moved into its final named location with
//! [`install_tree`], and a JSON manifest of many repositories is processed by
//! [`run`].
//!
//! # Example: Library Usage
//!
//! ```no_run
//! use modfetch::{ClientConfig, Fetcher, WalkOptions};
//! use std::path::Path;
//!
//! # fn main() -> modfetch::Result<()> {
//! let fetcher = Fetcher::new(ClientConfig::default())?;
//!
//! // Clone one folder of a repository into ./mods/Magiclysm
//! let report = fetcher.fetch_tree_recursive(
//!     "https://github.com/owner/repo/tree/master/data/mods/Magiclysm",
//!     Path::new("mods"),
//!     WalkOptions::default(),
//! )?;
//! println!("{} files written, {} skipped", report.written.len(), report.failures.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod cancellation;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod fetcher;
pub mod git;
pub mod install;
pub mod path_resolve;
pub mod prelude;
pub mod progress;
pub mod signal;

// Re-export key public types for easier use as a library
pub use batch::{BatchReport, EntryKind, EntryOutcome};
pub use cancellation::CancellationToken;
pub use config::{Config, ConfigBuilder, Manifest};
pub use errors::{Error, Result};
pub use fetcher::Fetcher;
pub use git::{ArchiveFetch, ClientConfig, Transport, WalkFailure, WalkOptions, WalkReport};
pub use install::install_tree;

use crate::progress::ProgressReporter;
use std::sync::Arc;

/// Runs a whole manifest batch with the production HTTP transport.
///
/// This is the main entry point of the command-line tool. It builds a
/// [`Fetcher`] from `config.client`, wires in the cancellation token and the
/// optional progress reporter, and processes the manifest at
/// `config.manifest_path`.
///
/// # Errors
/// Fails as a whole only if the configuration or manifest is unusable, or the
/// run is cancelled ([`Error::Interrupted`]). Individual entry failures are
/// reported in the returned [`BatchReport`].
pub fn run(
    config: &Config,
    token: &CancellationToken,
    progress: Option<Arc<dyn ProgressReporter>>,
) -> Result<BatchReport> {
    let fetcher = build_fetcher(config.client.clone(), token, progress)?;
    batch::run(config, &fetcher)
}

/// Builds a [`Fetcher`] over HTTP with the given cancellation token and progress reporter.
pub fn build_fetcher(
    client: ClientConfig,
    token: &CancellationToken,
    progress: Option<Arc<dyn ProgressReporter>>,
) -> Result<Fetcher> {
    let mut fetcher = Fetcher::new(client)?.with_cancellation(token.clone());
    if let Some(progress) = progress {
        fetcher = fetcher.with_progress(progress);
    }
    Ok(fetcher)
}
