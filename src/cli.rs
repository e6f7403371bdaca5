// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fetches game mods, tile sets and sound packs from GitHub repositories.
///
/// Without a subcommand, modfetch reads a JSON manifest (default `mods.json`)
/// and installs every entry it lists: mods are downloaded as repository
/// archives and moved into the mods folder by name, mod packs and tile sets
/// are cloned file by file, and sound packs are taken from a release asset
/// when one is named. A failing entry is reported and the batch carries on.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // --- Manifest Options ---
    /// Path to the JSON manifest listing the repositories to fetch.
    #[arg(short = 'm', long, value_name = "FILE", default_value = "mods.json")]
    pub manifest: PathBuf,

    /// Directory the output folders are created in.
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output_root: PathBuf,

    /// Folder for mods and mod packs (default: manifest setting, then "mods").
    #[arg(long, value_name = "NAME")]
    pub mods_folder: Option<String>,

    /// Folder for sound packs (default: manifest setting, then "sound").
    #[arg(long, value_name = "NAME")]
    pub sound_folder: Option<String>,

    /// Folder for tile sets (default: manifest setting, then "gfx").
    #[arg(long, value_name = "NAME")]
    pub tiles_folder: Option<String>,

    /// Staging folder for archive downloads (default: manifest setting, then "temp_download").
    #[arg(long, value_name = "NAME")]
    pub download_folder: Option<String>,

    // --- Section Selection ---
    /// Do not process the manifest's mod list.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub skip_mods: bool,

    /// Do not process the manifest's tile set.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub skip_tiles: bool,

    /// Do not process the manifest's sound pack.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub skip_sounds: bool,

    // --- Execution Control ---
    /// Stop at the first entry that fails instead of continuing with the rest.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub fail_fast: bool,

    /// Keep the staging folder after the run.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub keep_downloads: bool,

    // --- Network Options ---
    /// Timeout for each network request, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = crate::constants::DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// Number of files downloaded in parallel while cloning a folder.
    #[arg(short = 'j', long, value_name = "N", default_value_t = crate::constants::DEFAULT_CONCURRENCY, global = true)]
    pub jobs: usize,

    /// Base URL of the GitHub API.
    #[arg(long, value_name = "URL", global = true)]
    pub api_base: Option<String>,

    /// Base URL archives are downloaded from.
    #[arg(long, value_name = "URL", global = true)]
    pub web_base: Option<String>,
}

/// Single fetches, bypassing the manifest.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Clone a repository or folder file by file through the contents API.
    Tree {
        /// Repository URL, e.g. https://github.com/owner/repo/tree/master/data/mods/Foo
        url: String,
        /// Directory to clone into.
        destination: PathBuf,
        /// Write the files directly into DESTINATION instead of DESTINATION/<folder name>.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        merge: bool,
    },
    /// Download the repository archive and extract one folder of it.
    Archive {
        /// Repository URL, optionally pointing at a folder.
        url: String,
        /// Directory the folder's contents are extracted into.
        destination: PathBuf,
    },
    /// Download and extract a named asset of the latest release.
    Release {
        /// Repository URL.
        url: String,
        /// Directory the asset is extracted into.
        destination: PathBuf,
        /// Exact name of the release asset, e.g. CC-Sounds.zip.
        #[arg(short = 'a', long, value_name = "NAME")]
        asset: String,
    },
}
