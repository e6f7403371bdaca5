// src/git/mod.rs
//! Retrieves repository contents from GitHub.
//!
//! This module provides functionality to:
//! - Parse GitHub URLs into [`RepoReference`]s.
//! - Walk a repository tree via the Contents API, downloading file by file.
//! - Download a branch archive and extract one of its subtrees.
//! - Download and extract a named asset from the latest release.

// Declare the sub-modules.
mod api;
mod archive;
pub(crate) mod client;
mod release;
mod url;

// Re-export the public-facing API.
pub use api::{WalkFailure, WalkOptions, WalkReport};
pub use archive::{extract_all, extract_subtree, ArchiveFetch, DownloadedArchive, ExtractionPrefix};
pub use client::{ClientConfig, HttpTransport, Transport};
pub use url::{normalize_repo_url, parse_repo_url, RepoReference};

#[cfg(test)]
pub(crate) use archive::testing as archive_testing;
