// src/config/manifest.rs
//! The JSON manifest listing mods, the tile set and the sound pack to fetch.
//!
//! ```json
//! {
//!   "Mod_list": [
//!     { "type": "mod", "url": "https://github.com/o/r/tree/master/data/mods/Foo", "name": "Foo" },
//!     { "type": "mod_pack", "url": "https://github.com/o/pack/tree/master/mods", "name": "Pack" }
//!   ],
//!   "Tile_set": { "url": "https://github.com/o/tiles/tree/master/gfx/Tiles", "name": "Tiles" },
//!   "Sound_pack": { "url": "https://github.com/o/sounds", "name": "CC-Sounds", "asset": "CC-Sounds.zip" }
//! }
//! ```

use crate::errors::{io_error_with_path, Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The parsed manifest.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Mods and mod packs, processed in order.
    #[serde(rename = "Mod_list", default)]
    pub mod_list: Vec<ModEntry>,
    /// An optional tile set.
    #[serde(rename = "Tile_set", default)]
    pub tile_set: Option<ResourceEntry>,
    /// An optional sound pack.
    #[serde(rename = "Sound_pack", default)]
    pub sound_pack: Option<ResourceEntry>,
    /// Folder names; command line overrides take precedence.
    #[serde(default)]
    pub settings: ManifestSettings,
}

/// How a `Mod_list` entry is installed.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModKind {
    /// A single mod, installed as `<mods>/<name>` from its archive.
    Mod,
    /// A folder of mods, merged into the mods folder file by file.
    ModPack,
    /// Any other value; the entry is skipped with a warning.
    #[serde(other)]
    Unknown,
}

/// One entry of `Mod_list`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModEntry {
    /// Installation strategy.
    #[serde(rename = "type")]
    pub kind: ModKind,
    /// Repository URL, optionally pointing at a subfolder.
    pub url: String,
    /// Folder name below the mods folder. Entries without one are skipped.
    #[serde(default)]
    pub name: Option<String>,
}

/// A tile set or sound pack entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Repository URL, optionally pointing at a subfolder.
    pub url: String,
    /// Display name used in logs and reports.
    #[serde(default)]
    pub name: Option<String>,
    /// Release asset to download instead of walking the repository tree.
    #[serde(default)]
    pub asset: Option<String>,
}

/// Folder names set by the manifest.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ManifestSettings {
    /// Folder for mods and mod packs.
    #[serde(default)]
    pub mods_folder: Option<String>,
    /// Folder for sound packs.
    #[serde(default)]
    pub sound_folder: Option<String>,
    /// Folder for tile sets.
    #[serde(default)]
    pub tiles_folder: Option<String>,
    /// Staging folder for archive downloads.
    #[serde(default)]
    pub download_folder: Option<String>,
}

impl Manifest {
    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| io_error_with_path(e, path))?;
        let manifest = Self::parse(&content).map_err(|reason| Error::Manifest {
            path: path.display().to_string(),
            reason,
        })?;
        log::debug!(
            "Loaded manifest {}: {} mod entries, tile set: {}, sound pack: {}",
            path.display(),
            manifest.mod_list.len(),
            manifest.tile_set.is_some(),
            manifest.sound_pack.is_some()
        );
        Ok(manifest)
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
}
