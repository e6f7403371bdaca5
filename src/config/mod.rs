//! Defines the core `Config` struct and related types for application configuration.
//!
//! This module consolidates the settings parsed from the CLI (or set
//! programmatically through [`ConfigBuilder`]) together with the manifest
//! describing which repositories to fetch.

use crate::errors::Result;
use crate::git::ClientConfig;
use std::path::{Path, PathBuf};

pub use builder::ConfigBuilder;
pub use manifest::{Manifest, ManifestSettings, ModEntry, ModKind, ResourceEntry};
mod builder;
mod manifest;
mod validation;

/// Folder names that may be overridden, either on the command line or in
/// the manifest's `settings` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderOverrides {
    /// Folder receiving mods and mod packs.
    pub mods: Option<String>,
    /// Folder receiving sound packs.
    pub sound: Option<String>,
    /// Folder receiving tile sets.
    pub tiles: Option<String>,
    /// Scratch folder for archive staging, removed after a batch.
    pub downloads: Option<String>,
}

/// Which manifest sections a batch run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    /// Process `Mod_list`.
    pub mods: bool,
    /// Process `Tile_set`.
    pub tiles: bool,
    /// Process `Sound_pack`.
    pub sounds: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            mods: true,
            tiles: true,
            sounds: true,
        }
    }
}

/// The fully resolved folders a batch writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folders {
    /// Destination of mods and mod packs.
    pub mods: PathBuf,
    /// Destination of sound packs.
    pub sound: PathBuf,
    /// Destination of tile sets.
    pub tiles: PathBuf,
    /// Staging area for archive downloads.
    pub downloads: PathBuf,
}

/// Application configuration.
///
/// Holds everything a batch run needs apart from the manifest content itself.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON manifest listing the repositories to fetch.
    pub manifest_path: PathBuf,
    /// Directory all folders are resolved against. Kept as given (usually
    /// relative) so remote paths carrying a folder name map onto it.
    pub output_root: PathBuf,
    /// Folder names set on the command line; these win over manifest settings.
    pub folder_overrides: FolderOverrides,
    /// Network settings shared by all fetches.
    pub client: ClientConfig,
    /// Sections of the manifest to process.
    pub sections: Sections,
    /// Stop the batch at the first failed entry.
    pub fail_fast: bool,
    /// Keep the download/staging folder after the batch.
    pub keep_downloads: bool,
}

impl Config {
    /// Resolves the output folders: command line first, then the manifest's
    /// `settings`, then the defaults (`mods`, `sound`, `gfx`, `temp_download`).
    ///
    /// # Errors
    /// [`crate::Error::Config`] if a folder name is empty or leaves the output
    /// root, or if the download folder overlaps a content folder.
    pub fn folders(&self, settings: &ManifestSettings) -> Result<Folders> {
        let pick = |label: &str,
                    cli: &Option<String>,
                    manifest: &Option<String>,
                    default: &str|
         -> Result<PathBuf> {
            let name = cli
                .as_deref()
                .or(manifest.as_deref())
                .unwrap_or(default);
            let relative = validation::folder_name(label, name)?;
            Ok(join_root(&self.output_root, &relative))
        };
        let folders = Folders {
            mods: pick("mods_folder", &self.folder_overrides.mods, &settings.mods_folder, "mods")?,
            sound: pick(
                "sound_folder",
                &self.folder_overrides.sound,
                &settings.sound_folder,
                "sound",
            )?,
            tiles: pick(
                "tiles_folder",
                &self.folder_overrides.tiles,
                &settings.tiles_folder,
                "gfx",
            )?,
            downloads: pick(
                "download_folder",
                &self.folder_overrides.downloads,
                &settings.download_folder,
                "temp_download",
            )?,
        };
        validation::validate_folders(&folders)?;
        Ok(folders)
    }
}

/// Joins `name` below `root`, without a leading `./` when the root is the current directory.
fn join_root(root: &Path, name: &Path) -> PathBuf {
    if root.as_os_str().is_empty() || root == Path::new(".") {
        name.to_path_buf()
    } else {
        root.join(name)
    }
}
