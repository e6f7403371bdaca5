// src/git/archive.rs
//! Branch/release zip archives: download into memory and extract a subtree.

use super::url::{parse_repo_url, RepoReference};
use crate::errors::{io_error_with_path, Error, Result};
use crate::fetcher::Fetcher;
use crate::path_resolve::checked_relative;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// A complete archive held in memory.
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    /// Where the archive was downloaded from.
    pub url: String,
    /// The raw archive bytes.
    pub bytes: Vec<u8>,
}

/// The archive-internal folder whose contents get re-rooted at the destination.
///
/// GitHub names an archive's top-level folder `<repo>-<branch>`, but the
/// branch actually served may differ from the one requested (e.g. `master`
/// redirected to `main`), so the root is confirmed against the archive
/// itself before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPrefix {
    root: String,
    subpath: String,
}

impl ExtractionPrefix {
    /// Builds a prefix from an explicit root folder and subpath.
    pub fn new(root: impl Into<String>, subpath: impl Into<String>) -> Self {
        Self {
            root: root.into().trim_matches('/').to_string(),
            subpath: subpath.into().trim_matches('/').to_string(),
        }
    }

    /// The prefix assumed for `reference`: `<repo>-<branch>/<subpath>/`.
    pub fn for_reference(reference: &RepoReference) -> Self {
        Self::new(
            format!("{}-{}", reference.repo, reference.archive_branch()),
            reference.subpath_str(),
        )
    }

    /// The archive root folder this prefix expects.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Replaces the root folder with the one the archive really uses.
    ///
    /// `first_entry` is the internal path of the archive's first member; its
    /// leading component is taken as the real root. Flat archives leave the
    /// prefix untouched.
    pub fn adjusted_to(&self, first_entry: &str) -> Self {
        match first_entry.split_once('/') {
            Some((actual_root, _)) if !actual_root.is_empty() && actual_root != self.root => {
                log::debug!(
                    "Archive root is '{}', not '{}'; adjusting prefix",
                    actual_root,
                    self.root
                );
                Self {
                    root: actual_root.to_string(),
                    subpath: self.subpath.clone(),
                }
            }
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ExtractionPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subpath.is_empty() {
            write!(f, "{}/", self.root)
        } else {
            write!(f, "{}/{}/", self.root, self.subpath)
        }
    }
}

/// Result of an archive extraction.
#[derive(Debug, Clone)]
pub struct ArchiveFetch {
    /// The prefix actually used, after root detection (empty for whole-archive extraction).
    pub prefix: String,
    /// The directory the entries were written under.
    pub destination: PathBuf,
    /// Every file written, in archive order.
    pub files: Vec<PathBuf>,
}

impl Fetcher {
    /// Downloads a complete archive into memory. No retry is attempted.
    ///
    /// # Errors
    /// Returns [`Error::NetworkFailure`] on a transport error or non-2xx status.
    pub fn download_archive(&self, url: &str) -> Result<DownloadedArchive> {
        self.check_cancelled()?;
        log::debug!("Downloading archive from: {}", url);
        let bytes = self.transport().get_bytes(url, &[])?;
        log::info!("Download complete ({} bytes).", bytes.len());
        Ok(DownloadedArchive {
            url: url.to_string(),
            bytes,
        })
    }

    /// Clones a repository folder by downloading the whole branch archive and
    /// extracting only the requested subtree, re-rooted at `destination`.
    ///
    /// Without a ref in the URL the `master` archive is requested; the real
    /// root folder is detected from the archive.
    pub fn fetch_archive_subtree(&self, url: &str, destination: &Path) -> Result<ArchiveFetch> {
        let reference = parse_repo_url(url)?;
        let archive_url = reference.archive_url(&self.config().web_base);
        log::info!("Downloading {} from {} ...", reference, archive_url);

        let archive = self.download_archive(&archive_url)?;
        let prefix = ExtractionPrefix::for_reference(&reference);
        extract_subtree(&archive, &prefix, destination)
    }
}

/// Writes the archive members below `prefix` into `destination`, stripping
/// the prefix from each path.
///
/// The prefix root is first adjusted to the archive's real root folder (see
/// [`ExtractionPrefix::adjusted_to`]). Members outside the prefix are skipped.
/// Directory members only create directories. Running twice overwrites the
/// same files with the same content.
///
/// # Errors
/// [`Error::ArchiveFormatError`] if the archive cannot be opened or is empty,
/// [`Error::UnsafePath`] if a member would escape `destination`.
pub fn extract_subtree(
    archive: &DownloadedArchive,
    prefix: &ExtractionPrefix,
    destination: &Path,
) -> Result<ArchiveFetch> {
    let mut zip = open_archive(archive)?;
    let first_entry = zip.name_for_index(0).unwrap_or_default().to_string();
    let effective = prefix.adjusted_to(&first_entry).to_string();

    log::info!("Unzipping '{}' into {}", effective, destination.display());
    let files = extract_matching(&mut zip, archive, &effective, destination)?;
    if files.is_empty() {
        log::warn!(
            "No files below '{}' in archive from {}",
            effective,
            archive.url
        );
    }
    Ok(ArchiveFetch {
        prefix: effective,
        destination: destination.to_path_buf(),
        files,
    })
}

/// Writes every archive member into `destination`, keeping its internal path.
pub fn extract_all(archive: &DownloadedArchive, destination: &Path) -> Result<ArchiveFetch> {
    let mut zip = open_archive(archive)?;
    log::info!("Unzipping {} into {}", archive.url, destination.display());
    let files = extract_matching(&mut zip, archive, "", destination)?;
    Ok(ArchiveFetch {
        prefix: String::new(),
        destination: destination.to_path_buf(),
        files,
    })
}

fn open_archive(archive: &DownloadedArchive) -> Result<ZipArchive<Cursor<&[u8]>>> {
    let zip = ZipArchive::new(Cursor::new(archive.bytes.as_slice())).map_err(|e| {
        Error::ArchiveFormatError {
            source_name: archive.url.clone(),
            reason: e.to_string(),
        }
    })?;
    if zip.is_empty() {
        return Err(Error::ArchiveFormatError {
            source_name: archive.url.clone(),
            reason: "archive contains no entries".to_string(),
        });
    }
    Ok(zip)
}

fn extract_matching(
    zip: &mut ZipArchive<Cursor<&[u8]>>,
    archive: &DownloadedArchive,
    prefix: &str,
    destination: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(destination).map_err(|e| io_error_with_path(e, destination))?;
    let mut files = Vec::new();

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::ArchiveFormatError {
                source_name: archive.url.clone(),
                reason: e.to_string(),
            })?;
        let name = entry.name().to_string();
        let Some(relative) = name.strip_prefix(prefix) else {
            continue;
        };
        let relative = checked_relative(relative, destination)?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let out_path = destination.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| io_error_with_path(e, &out_path))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error_with_path(e, parent))?;
        }

        let mut out_file = File::create(&out_path).map_err(|e| io_error_with_path(e, &out_path))?;
        io::copy(&mut entry, &mut out_file).map_err(|e| io_error_with_path(e, &out_path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Keep the owner write bit so a later run can overwrite the file.
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode((mode & 0o777) | 0o200))
                    .map_err(|e| io_error_with_path(e, &out_path))?;
            }
        }
        files.push(out_path);
    }
    Ok(files)
}
