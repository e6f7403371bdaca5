//! The `modfetch` prelude for convenient library usage.
//!
//! This module re-exports the most commonly used types, traits, and functions
//! from the `modfetch` library.
//!
//! # Example
//!
//! ```no_run
//! use modfetch::prelude::*;
//! # fn main() -> Result<()> {
//!
//! let config = ConfigBuilder::new().manifest_path("mods.json").build()?;
//! let token = CancellationToken::new();
//! let report = run(&config, &token, None)?;
//! println!("{} entries failed", report.failed_count());
//!
//! # Ok(())
//! # }
//! ```

pub use crate::batch::{BatchReport, EntryKind, EntryOutcome};
pub use crate::cancellation::CancellationToken;
pub use crate::config::{Config, ConfigBuilder, Manifest, ModEntry, ModKind, ResourceEntry};
pub use crate::errors::{Error, Result};
pub use crate::fetcher::Fetcher;
pub use crate::git::{
    normalize_repo_url, parse_repo_url, ArchiveFetch, ClientConfig, HttpTransport, RepoReference,
    Transport, WalkFailure, WalkOptions, WalkReport,
};
pub use crate::install::install_tree;
pub use crate::progress::{NoOpProgress, ProgressReporter};
pub use crate::{build_fetcher, run};
