// src/batch.rs
//! Runs every entry of a manifest through the matching fetch strategy.

use crate::config::{Config, Folders, Manifest, ModEntry, ModKind, ResourceEntry};
use crate::constants::STAGING_PREFIX;
use crate::errors::{io_error_with_path, Error, Result};
use crate::fetcher::Fetcher;
use crate::git::WalkOptions;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Which manifest section an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A `Mod_list` entry of type `mod`.
    Mod,
    /// A `Mod_list` entry of type `mod_pack`.
    ModPack,
    /// The `Tile_set` entry.
    TileSet,
    /// The `Sound_pack` entry.
    SoundPack,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Mod => "mod",
            EntryKind::ModPack => "mod pack",
            EntryKind::TileSet => "tile set",
            EntryKind::SoundPack => "sound pack",
        };
        f.write_str(label)
    }
}

/// The result of one manifest entry.
#[derive(Debug)]
pub struct EntryOutcome {
    /// Entry name as given in the manifest.
    pub name: String,
    pub kind: EntryKind,
    /// Where the entry was installed, or why it failed.
    pub result: Result<PathBuf>,
    /// Files a tree walk had to skip; the entry still counts as installed.
    pub skipped: Vec<String>,
}

/// Outcome of a whole batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<EntryOutcome>,
    /// Names of entries that were ignored (no name, unknown type).
    pub ignored: Vec<String>,
}

impl BatchReport {
    /// Number of entries whose fetch failed.
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_err()).count()
    }

    /// True when every processed entry was installed.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// One unit of work derived from the manifest.
enum Job<'a> {
    Mod(&'a ModEntry, &'a str),
    ModPack(&'a ModEntry, &'a str),
    TileSet(&'a ResourceEntry, &'a str),
    SoundPack(&'a ResourceEntry, &'a str),
}

impl Job<'_> {
    fn name(&self) -> &str {
        match self {
            Job::Mod(_, name) | Job::ModPack(_, name) => name,
            Job::TileSet(_, name) | Job::SoundPack(_, name) => name,
        }
    }

    fn kind(&self) -> EntryKind {
        match self {
            Job::Mod(..) => EntryKind::Mod,
            Job::ModPack(..) => EntryKind::ModPack,
            Job::TileSet(..) => EntryKind::TileSet,
            Job::SoundPack(..) => EntryKind::SoundPack,
        }
    }
}

/// Loads the manifest named by `config` and processes it.
pub fn run(config: &Config, fetcher: &Fetcher) -> Result<BatchReport> {
    let manifest = Manifest::load(&config.manifest_path)?;
    run_manifest(config, &manifest, fetcher)
}

/// Processes an already parsed manifest.
///
/// Entries are fetched in manifest order: mods first, then the tile set, then
/// the sound pack. A failed entry is recorded and the batch moves on, unless
/// `config.fail_fast` is set. Cancellation aborts the batch with
/// [`Error::Interrupted`].
pub fn run_manifest(config: &Config, manifest: &Manifest, fetcher: &Fetcher) -> Result<BatchReport> {
    let folders = config.folders(&manifest.settings)?;
    log::debug!("Resolved folders: {:?}", folders);

    let mut report = BatchReport::default();
    let jobs = plan(config, manifest, &mut report.ignored);
    log::info!("Processing {} manifest entries", jobs.len());

    let result = process_jobs(&jobs, &folders, fetcher, config.fail_fast, &mut report);

    if !config.keep_downloads {
        cleanup_downloads(&folders);
    }
    if let Some(progress) = fetcher.progress() {
        progress.finish_with_message(format!(
            "{} installed, {} failed",
            report.entries.len() - report.failed_count(),
            report.failed_count()
        ));
    }

    result.map(|()| report)
}

fn plan<'a>(config: &Config, manifest: &'a Manifest, ignored: &mut Vec<String>) -> Vec<Job<'a>> {
    let mut jobs = Vec::new();

    if config.sections.mods {
        for entry in &manifest.mod_list {
            let Some(name) = entry.name.as_deref() else {
                log::warn!("Skipping mod entry without a name: {}", entry.url);
                ignored.push(entry.url.clone());
                continue;
            };
            match entry.kind {
                ModKind::Mod => jobs.push(Job::Mod(entry, name)),
                ModKind::ModPack => jobs.push(Job::ModPack(entry, name)),
                ModKind::Unknown => {
                    log::warn!("Skipping '{}': unknown entry type", name);
                    ignored.push(name.to_string());
                }
            }
        }
    }

    let resources = [
        (config.sections.tiles, manifest.tile_set.as_ref(), true),
        (config.sections.sounds, manifest.sound_pack.as_ref(), false),
    ];
    for (enabled, entry, is_tiles) in resources {
        let Some(entry) = entry.filter(|_| enabled) else {
            continue;
        };
        match entry.name.as_deref() {
            Some(name) if is_tiles => jobs.push(Job::TileSet(entry, name)),
            Some(name) => jobs.push(Job::SoundPack(entry, name)),
            None => {
                log::warn!("Skipping resource entry without a name: {}", entry.url);
                ignored.push(entry.url.clone());
            }
        }
    }

    jobs
}

fn process_jobs(
    jobs: &[Job<'_>],
    folders: &Folders,
    fetcher: &Fetcher,
    fail_fast: bool,
    report: &mut BatchReport,
) -> Result<()> {
    for job in jobs {
        fetcher.check_cancelled()?;
        let name = job.name().to_string();
        log::info!("{}: start fetching {}", name, job.kind());
        if let Some(progress) = fetcher.progress() {
            progress.set_message(format!("Fetching {}", name));
        }

        let mut skipped = Vec::new();
        let result = fetch_job(job, folders, fetcher, &mut skipped);

        match &result {
            Err(Error::Interrupted) => return Err(Error::Interrupted),
            Err(e) => log::error!("{}: {}", name, e),
            Ok(path) if skipped.is_empty() => {
                log::info!("{}: done, installed to {}", name, path.display())
            }
            Ok(path) => log::warn!(
                "{}: installed to {} with {} skipped files",
                name,
                path.display(),
                skipped.len()
            ),
        }

        let failed = result.is_err();
        report.entries.push(EntryOutcome {
            name,
            kind: job.kind(),
            result,
            skipped,
        });
        if failed && fail_fast {
            log::warn!("Stopping after first failure (--fail-fast)");
            break;
        }
    }
    Ok(())
}

fn fetch_job(
    job: &Job<'_>,
    folders: &Folders,
    fetcher: &Fetcher,
    skipped: &mut Vec<String>,
) -> Result<PathBuf> {
    let walk = |url: &str, destination: &Path, merge: bool, skipped: &mut Vec<String>| -> Result<PathBuf> {
        let options = WalkOptions {
            merge_into_root: merge,
        };
        let walked = fetcher.fetch_tree_recursive(url, destination, options)?;
        skipped.extend(
            walked
                .failures
                .into_iter()
                .map(|f| format!("{}: {}", f.location, f.reason)),
        );
        Ok(walked.target)
    };

    match job {
        Job::Mod(entry, name) => {
            fetcher.fetch_mod(&entry.url, &folders.mods, name, &folders.downloads)
        }
        Job::ModPack(entry, _) => walk(&entry.url, &folders.mods, true, skipped),
        Job::TileSet(entry, _) => walk(&entry.url, &folders.tiles, false, skipped),
        Job::SoundPack(entry, _) => match entry.asset.as_deref() {
            Some(asset) => fetcher.fetch_release_asset(&entry.url, &folders.sound, asset),
            None => walk(&entry.url, &folders.sound, false, skipped),
        },
    }
}

/// Removes leftover staging directories, then the download folder itself if
/// nothing else is in it. Anything not created by a fetch is left alone.
fn cleanup_downloads(folders: &Folders) {
    let downloads = &folders.downloads;
    let entries = match fs::read_dir(downloads) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            log::warn!("{}", io_error_with_path(e, downloads));
            return;
        }
    };

    for entry in entries.flatten() {
        let is_staging = entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX)
            && entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_staging {
            continue;
        }
        let path = entry.path();
        match fs::remove_dir_all(&path) {
            Ok(()) => log::debug!("Removed staging directory {}", path.display()),
            Err(e) => log::warn!("{}", io_error_with_path(e, &path)),
        }
    }

    match fs::remove_dir(downloads) {
        Ok(()) => log::debug!("Removed {}", downloads.display()),
        Err(e) => log::debug!("Keeping {}: {}", downloads.display(), e),
    }
}
