// src/constants.rs

/// Base URL of the GitHub REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Base URL of the GitHub web host, used for branch archives.
pub const DEFAULT_WEB_BASE: &str = "https://github.com";

/// `Accept` header sent to the API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Branch assumed for archive downloads when the URL names no ref.
/// The real archive root is detected from the archive itself.
pub const DEFAULT_ARCHIVE_BRANCH: &str = "master";

/// Size of the buffer used when streaming a file download to disk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of parallel file downloads during a tree walk.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Directory below the system temp dir holding the install lock files.
pub const INSTALL_LOCK_DIR: &str = "modfetch-locks";

/// Prefix of the per-fetch staging directories inside the download folder.
pub const STAGING_PREFIX: &str = "modfetch-";

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "mods.json";
