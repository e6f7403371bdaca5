// src/config/builder.rs

use super::{validation::validate_config, Config, FolderOverrides, Sections};
use crate::cli::Cli;
use crate::constants::DEFAULT_MANIFEST;
use crate::errors::Result;
use crate::git::ClientConfig;
use std::path::PathBuf;
use std::time::Duration;

/// A builder for creating a `Config` instance programmatically.
///
/// Every setting starts at its default, so only the values that differ need
/// to be set.
///
/// # Examples
/// ```
/// use modfetch::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .manifest_path("my-mods.json")
///     .mods_folder("data/mods")
///     .jobs(4)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.client.concurrency, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    manifest_path: Option<PathBuf>,
    output_root: Option<PathBuf>,
    folder_overrides: FolderOverrides,
    api_base: Option<String>,
    web_base: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    jobs: Option<usize>,
    skip_mods: bool,
    skip_tiles: bool,
    skip_sounds: bool,
    fail_fast: bool,
    keep_downloads: bool,
}

impl ConfigBuilder {
    /// Creates a new `ConfigBuilder` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-populated from parsed command line arguments.
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            manifest_path: Some(cli.manifest),
            output_root: Some(cli.output_root),
            folder_overrides: FolderOverrides {
                mods: cli.mods_folder,
                sound: cli.sound_folder,
                tiles: cli.tiles_folder,
                downloads: cli.download_folder,
            },
            api_base: cli.api_base,
            web_base: cli.web_base,
            user_agent: None,
            timeout_secs: Some(cli.timeout),
            jobs: Some(cli.jobs),
            skip_mods: cli.skip_mods,
            skip_tiles: cli.skip_tiles,
            skip_sounds: cli.skip_sounds,
            fail_fast: cli.fail_fast,
            keep_downloads: cli.keep_downloads,
        }
    }

    /// Sets the manifest to read.
    pub fn manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    /// Sets the directory output folders are resolved against.
    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = Some(path.into());
        self
    }

    /// Overrides the folder receiving mods and mod packs.
    pub fn mods_folder(mut self, name: impl Into<String>) -> Self {
        self.folder_overrides.mods = Some(name.into());
        self
    }

    /// Overrides the folder receiving sound packs.
    pub fn sound_folder(mut self, name: impl Into<String>) -> Self {
        self.folder_overrides.sound = Some(name.into());
        self
    }

    /// Overrides the folder receiving tile sets.
    pub fn tiles_folder(mut self, name: impl Into<String>) -> Self {
        self.folder_overrides.tiles = Some(name.into());
        self
    }

    /// Overrides the staging folder for archive downloads.
    pub fn download_folder(mut self, name: impl Into<String>) -> Self {
        self.folder_overrides.downloads = Some(name.into());
        self
    }

    /// Sets the base URL of the contents/releases API.
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = Some(url.into());
        self
    }

    /// Sets the base URL archives are downloaded from.
    pub fn web_base(mut self, url: impl Into<String>) -> Self {
        self.web_base = Some(url.into());
        self
    }

    /// Sets the `User-Agent` header sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Sets the per-request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets how many files a tree walk downloads in parallel.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Skips the `Mod_list` section.
    pub fn skip_mods(mut self, skip: bool) -> Self {
        self.skip_mods = skip;
        self
    }

    /// Skips the `Tile_set` section.
    pub fn skip_tiles(mut self, skip: bool) -> Self {
        self.skip_tiles = skip;
        self
    }

    /// Skips the `Sound_pack` section.
    pub fn skip_sounds(mut self, skip: bool) -> Self {
        self.skip_sounds = skip;
        self
    }

    /// Stops a batch at its first failed entry.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Keeps the staging folder after a batch.
    pub fn keep_downloads(mut self, keep: bool) -> Self {
        self.keep_downloads = keep;
        self
    }

    /// Builds the `Config`, validating the combination of settings.
    pub fn build(self) -> Result<Config> {
        let defaults = ClientConfig::default();
        let client = ClientConfig {
            api_base: self.api_base.unwrap_or(defaults.api_base),
            web_base: self.web_base.unwrap_or(defaults.web_base),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            concurrency: self.jobs.unwrap_or(defaults.concurrency),
        };

        let config = Config {
            manifest_path: self
                .manifest_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST)),
            output_root: self.output_root.unwrap_or_else(|| PathBuf::from(".")),
            folder_overrides: self.folder_overrides,
            client,
            sections: Sections {
                mods: !self.skip_mods,
                tiles: !self.skip_tiles,
                sounds: !self.skip_sounds,
            },
            fail_fast: self.fail_fast,
            keep_downloads: self.keep_downloads,
        };

        validate_config(&config)?;
        log::debug!("Built configuration: {:?}", config);
        Ok(config)
    }
}
