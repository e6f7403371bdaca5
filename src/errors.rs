//! Defines application-specific error types.
//!
//! This module provides the `Error` enum, which categorizes the failures the
//! fetch engine can report, offering more context than generic I/O or
//! `anyhow` errors.

use thiserror::Error;

/// Errors produced by `modfetch`.
///
/// Every variant names the URL or path involved so that a batch run can print
/// a useful message and move on to the next entry.
#[derive(Error, Debug)]
pub enum Error {
    // --- Input Errors ---
    /// The repository URL could not be decomposed into at least `owner/repo`.
    #[error("Invalid GitHub reference '{url}': {reason}")]
    InvalidReference {
        /// The URL as supplied by the caller.
        url: String,
        /// Why normalization rejected it.
        reason: String,
    },

    // --- Network Errors ---
    /// A listing, file, archive or release request failed (transport error or non-2xx status).
    #[error("Network request to '{url}' failed: {reason}")]
    NetworkFailure {
        /// The URL that was requested.
        url: String,
        /// The status line or transport error message.
        reason: String,
    },

    /// The latest release has no asset with the requested name.
    #[error("Release asset '{asset}' not found in latest release of {owner}/{repo}")]
    AssetNotFound {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
        /// The asset name that was requested.
        asset: String,
    },

    // --- Archive Errors ---
    /// The downloaded archive cannot be opened, or holds no entries.
    #[error("Archive from '{source_name}' is unusable: {reason}")]
    ArchiveFormatError {
        /// Where the archive came from (URL or description).
        source_name: String,
        /// The underlying problem.
        reason: String,
    },

    /// A remote or archive path would land outside of its destination root.
    #[error("Refusing to write '{path}' outside of '{root}'")]
    UnsafePath {
        /// The offending remote/archive path.
        path: String,
        /// The destination root it was resolved against.
        root: String,
    },

    // --- I/O Errors ---
    /// Error occurring during file or directory access (create, write, move, delete).
    #[error("I/O error accessing path '{path}': {source}")]
    Io {
        /// The path that caused the I/O error.
        path: String,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    // --- Configuration Errors ---
    /// The manifest file could not be read or parsed.
    #[error("Invalid manifest '{path}': {reason}")]
    Manifest {
        /// Path of the manifest file.
        path: String,
        /// The read or parse error.
        reason: String,
    },

    /// Generic error related to invalid configuration settings.
    #[error("Invalid configuration: {0}")]
    Config(String),

    // --- Signal Handling ---
    /// The operation was cancelled by the user (e.g., Ctrl+C).
    #[error("Operation cancelled by user (Ctrl+C)")]
    Interrupted,
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Helper function to create an `Error::Io` with path context.
///
/// # Arguments
/// * `source` - The original `std::io::Error`.
/// * `path` - The path associated with the error, convertible to `AsRef<std::path::Path>`.
pub fn io_error_with_path<P: AsRef<std::path::Path>>(source: std::io::Error, path: P) -> Error {
    Error::Io {
        path: path.as_ref().display().to_string(),
        source,
    }
}

impl Error {
    /// Builds a `NetworkFailure` for `url` from anything displayable.
    pub fn network(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::NetworkFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Builds an `InvalidReference` for `url`.
    pub fn invalid_reference(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidReference {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
