// src/git/api.rs
//! Reconstructs a repository directory tree through the GitHub Contents API.

use super::url::{parse_repo_url, RepoReference};
use crate::errors::{Error, Result};
use crate::fetcher::Fetcher;
use crate::path_resolve::resolve_and_prepare;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Represents a file or directory item from the GitHub Contents API.
#[derive(Deserialize, Debug, Clone)]
struct ContentItem {
    path: String,
    #[serde(rename = "type")]
    item_type: String,
    download_url: Option<String>,
}

/// Layout options for [`Fetcher::fetch_tree_recursive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Write directly into the destination root instead of a subdirectory
    /// named after the fetched folder (mod-pack layout).
    pub merge_into_root: bool,
}

/// A file or subtree the walk had to give up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFailure {
    /// Remote path of the directory, or download URL of the file.
    pub location: String,
    /// Human-readable cause.
    pub reason: String,
}

/// Outcome of a tree walk: what was written and what was skipped.
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    /// The local root the tree was materialized under.
    pub target: PathBuf,
    /// Every file written, sorted.
    pub written: Vec<PathBuf>,
    /// Subtrees whose listing failed and files whose download failed.
    pub failures: Vec<WalkFailure>,
}

impl WalkReport {
    /// `true` when nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Fetcher {
    /// Clones a repository (or one of its folders) file by file via the Contents API.
    ///
    /// The top-level listing must succeed, otherwise the whole fetch fails with
    /// [`Error::NetworkFailure`]. Below that, a failed directory listing only
    /// drops that subtree and a failed download only drops that file; both are
    /// recorded in [`WalkReport::failures`] and the walk carries on. Files are
    /// downloaded in parallel on a pool of `concurrency` threads.
    ///
    /// # Errors
    /// [`Error::InvalidReference`] for a malformed URL (before any request),
    /// [`Error::NetworkFailure`] if the top-level listing fails and
    /// [`Error::Interrupted`] if the cancellation token fires.
    pub fn fetch_tree_recursive(
        &self,
        url: &str,
        destination_root: &Path,
        options: WalkOptions,
    ) -> Result<WalkReport> {
        let reference = parse_repo_url(url)?;
        let target = if options.merge_into_root {
            destination_root.to_path_buf()
        } else {
            destination_root.join(reference.local_name())
        };
        log::info!("Cloning {} into {} ...", reference, target.display());

        let mut report = WalkReport {
            target,
            ..WalkReport::default()
        };

        let root_items = self.list_directory(&reference, &reference.subpath_str())?;
        let mut files = Vec::new();
        self.collect_files(&reference, root_items, &mut files, &mut report.failures)?;
        log::debug!("Listing complete: {} files to download", files.len());

        self.download_files(&files, &mut report)?;

        log::info!(
            "Done cloning {}: {} files written, {} skipped.",
            reference,
            report.written.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Fetches one directory listing. A path pointing at a single file yields that file.
    fn list_directory(&self, reference: &RepoReference, path: &str) -> Result<Vec<ContentItem>> {
        self.check_cancelled()?;
        let base = reference.contents_url(&self.config().api_base);
        let api_url = if path.is_empty() {
            base
        } else {
            format!("{}/{}", base, path)
        };

        let query: Vec<(&str, &str)> = match &reference.git_ref {
            Some(git_ref) => vec![("ref", git_ref.as_str())],
            None => Vec::new(),
        };
        log::debug!("Fetching directory contents from: {}", api_url);
        let body = self.transport().get_bytes(&api_url, &query)?;

        // The API returns a single object if the path is a file, or an array for a directory.
        let json_value: Value = serde_json::from_slice(&body)
            .map_err(|e| Error::network(&api_url, format!("malformed listing: {}", e)))?;
        let items = if json_value.is_array() {
            serde_json::from_value(json_value)
        } else if json_value.is_object() {
            serde_json::from_value(json_value).map(|item| vec![item])
        } else {
            Ok(Vec::new())
        };
        items.map_err(|e| Error::network(&api_url, format!("malformed listing: {}", e)))
    }

    /// Depth-first walk over the listings, collecting downloadable files.
    fn collect_files(
        &self,
        reference: &RepoReference,
        items: Vec<ContentItem>,
        files: &mut Vec<ContentItem>,
        failures: &mut Vec<WalkFailure>,
    ) -> Result<()> {
        for item in items {
            if item.item_type == "dir" {
                match self.list_directory(reference, &item.path) {
                    Ok(children) => self.collect_files(reference, children, files, failures)?,
                    Err(Error::Interrupted) => return Err(Error::Interrupted),
                    Err(e) => {
                        log::warn!("Failed to fetch metadata for '{}': {}", item.path, e);
                        failures.push(WalkFailure {
                            location: item.path,
                            reason: e.to_string(),
                        });
                    }
                }
            } else if item.download_url.is_some() {
                files.push(item);
            } else {
                log::warn!(
                    "Skipping {} '{}' with no download_url",
                    item.item_type,
                    item.path
                );
                failures.push(WalkFailure {
                    reason: format!("{} has no download URL", item.item_type),
                    location: item.path,
                });
            }
        }
        Ok(())
    }

    fn download_files(&self, files: &[ContentItem], report: &mut WalkReport) -> Result<()> {
        if let Some(progress) = self.progress() {
            progress.set_length(files.len() as u64);
            progress.set_message(format!("Downloading into {}", report.target.display()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config().concurrency)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build download pool: {}", e)))?;
        let target = report.target.clone();
        let results: Vec<(&ContentItem, Result<PathBuf>)> = pool.install(|| {
            files
                .par_iter()
                .map(|item| (item, self.download_file(item, &target)))
                .collect()
        });

        for (item, result) in results {
            match result {
                Ok(path) => report.written.push(path),
                Err(Error::Interrupted) => return Err(Error::Interrupted),
                Err(e) => {
                    let location = item.download_url.clone().unwrap_or_else(|| item.path.clone());
                    log::warn!("Failed to clone '{}': {}", location, e);
                    report.failures.push(WalkFailure {
                        location,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report.written.sort();
        Ok(())
    }

    /// Downloads a single file to its resolved local path.
    #[instrument(level = "debug", skip(self, item, target), fields(remote_path = %item.path, target = %target.display()))]
    fn download_file(&self, item: &ContentItem, target: &Path) -> Result<PathBuf> {
        self.check_cancelled()?;
        let download_url = item
            .download_url
            .as_deref()
            .ok_or_else(|| Error::network(&item.path, "no download URL"))?;

        let local_path = resolve_and_prepare(&item.path, target)?;
        log::debug!("Downloading {} -> {}", download_url, local_path.display());
        self.transport().download_to(download_url, &local_path)?;

        if let Some(progress) = self.progress() {
            progress.inc(1);
        }
        Ok(local_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::git::client::testing::FakeTransport;
    use crate::git::ClientConfig;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    const CONTENTS: &str = "https://api.github.com/repos/owner/repo/contents";

    fn listing(entries: &[(&str, &str)]) -> Vec<u8> {
        let items: Vec<Value> = entries
            .iter()
            .map(|(path, kind)| {
                let download_url = if *kind == "file" {
                    Value::String(format!("https://raw.example/{}", path))
                } else {
                    Value::Null
                };
                json!({ "path": path, "type": kind, "download_url": download_url })
            })
            .collect();
        serde_json::to_vec(&items).unwrap()
    }

    fn fetcher(transport: FakeTransport) -> Fetcher {
        Fetcher::with_transport(ClientConfig::default(), Arc::new(transport))
    }

    #[test]
    fn test_walks_nested_directories() {
        let transport = FakeTransport::new()
            .route(
                CONTENTS,
                listing(&[("README.md", "file"), ("data", "dir")]),
            )
            .route(
                &format!("{}/data", CONTENTS),
                listing(&[("data/items.json", "file"), ("data/deep", "dir")]),
            )
            .route(
                &format!("{}/data/deep", CONTENTS),
                listing(&[("data/deep/x.txt", "file")]),
            )
            .route("https://raw.example/README.md", "readme")
            .route("https://raw.example/data/items.json", "[]")
            .route("https://raw.example/data/deep/x.txt", "x");
        let dir = tempdir().unwrap();

        let report = fetcher(transport)
            .fetch_tree_recursive("owner/repo", dir.path(), WalkOptions::default())
            .unwrap();

        let target = dir.path().join("repo");
        assert_eq!(report.target, target);
        assert!(report.is_complete(), "{:?}", report.failures);
        assert_eq!(report.written.len(), 3);
        assert_eq!(fs::read_to_string(target.join("README.md")).unwrap(), "readme");
        assert_eq!(fs::read_to_string(target.join("data/items.json")).unwrap(), "[]");
        assert_eq!(fs::read_to_string(target.join("data/deep/x.txt")).unwrap(), "x");
    }

    #[test]
    fn test_nested_listing_failure_keeps_siblings() {
        let transport = FakeTransport::new()
            .route(
                CONTENTS,
                listing(&[("good", "dir"), ("broken", "dir"), ("top.txt", "file")]),
            )
            .route(
                &format!("{}/good", CONTENTS),
                listing(&[("good/a.txt", "file")]),
            )
            .route("https://raw.example/good/a.txt", "a")
            .route("https://raw.example/top.txt", "top");
        let dir = tempdir().unwrap();

        let report = fetcher(transport)
            .fetch_tree_recursive("owner/repo", dir.path(), WalkOptions { merge_into_root: true })
            .unwrap();

        assert_eq!(report.target, dir.path());
        assert_eq!(fs::read_to_string(dir.path().join("good/a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dir.path().join("top.txt")).unwrap(), "top");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].location, "broken");
    }

    #[test]
    fn test_failed_file_download_is_skipped() {
        let transport = FakeTransport::new()
            .route(CONTENTS, listing(&[("ok.txt", "file"), ("gone.txt", "file")]))
            .route("https://raw.example/ok.txt", "ok");
        let dir = tempdir().unwrap();

        let report = fetcher(transport)
            .fetch_tree_recursive("owner/repo", dir.path(), WalkOptions::default())
            .unwrap();

        assert_eq!(report.written, vec![dir.path().join("repo/ok.txt")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].location, "https://raw.example/gone.txt");
        assert!(!dir.path().join("repo/gone.txt").exists());
    }

    #[test]
    fn test_top_level_listing_failure_aborts() {
        let dir = tempdir().unwrap();
        let err = fetcher(FakeTransport::new())
            .fetch_tree_recursive("owner/repo", dir.path(), WalkOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::NetworkFailure { .. }));
        assert!(!dir.path().join("repo").exists());
    }

    #[test]
    fn test_subfolder_with_ref_uses_query_and_folder_name() {
        let transport = FakeTransport::new()
            .route(
                &format!("{}/data/mods/Magic?ref=dev", CONTENTS),
                listing(&[("data/mods/Magic/modinfo.json", "file")]),
            )
            .route("https://raw.example/data/mods/Magic/modinfo.json", "{}");
        let dir = tempdir().unwrap();

        let report = fetcher(transport)
            .fetch_tree_recursive(
                "https://github.com/owner/repo/tree/dev/data/mods/Magic",
                dir.path(),
                WalkOptions::default(),
            )
            .unwrap();

        assert_eq!(report.target, dir.path().join("Magic"));
        assert!(report.is_complete());
        assert!(dir.path().join("Magic/modinfo.json").is_file());
        assert!(!dir.path().join("Magic/data").exists());
    }

    #[test]
    fn test_non_ascii_destination_names() {
        let transport = FakeTransport::new()
            .route(
                CONTENTS,
                listing(&[("моды_old/a.txt", "file"), ("моды/b.txt", "file")]),
            )
            .route("https://raw.example/моды_old/a.txt", "a")
            .route("https://raw.example/моды/b.txt", "b");
        let dir = tempdir().unwrap();
        let mods = dir.path().join("моды");

        let report = fetcher(transport)
            .fetch_tree_recursive("owner/repo", &mods, WalkOptions { merge_into_root: true })
            .unwrap();

        assert!(report.is_complete(), "{:?}", report.failures);
        assert_eq!(fs::read_to_string(mods.join("моды_old/a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(mods.join("b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_entries_without_download_url_are_reported() {
        let body = serde_json::to_vec(&json!([
            { "path": "vendor/lib", "type": "submodule", "download_url": null }
        ]))
        .unwrap();
        let transport = FakeTransport::new().route(CONTENTS, body);
        let dir = tempdir().unwrap();

        let report = fetcher(transport)
            .fetch_tree_recursive("owner/repo", dir.path(), WalkOptions::default())
            .unwrap();

        assert!(report.written.is_empty());
        assert_eq!(report.failures[0].location, "vendor/lib");
    }

    #[test]
    fn test_invalid_reference_makes_no_requests() {
        let transport = Arc::new(FakeTransport::new());
        let fetcher = Fetcher::with_transport(ClientConfig::default(), transport.clone());
        let dir = tempdir().unwrap();

        let err = fetcher
            .fetch_tree_recursive("not-a-reference", dir.path(), WalkOptions::default())
            .unwrap_err();

        assert!(matches!(err, Error::InvalidReference { .. }));
        assert!(transport.requested().is_empty());
    }

    #[test]
    fn test_cancelled_walk_is_interrupted() {
        let transport = FakeTransport::new().route(CONTENTS, listing(&[("a.txt", "file")]));
        let token = CancellationToken::new();
        token.cancel();
        let dir = tempdir().unwrap();

        let err = fetcher(transport)
            .with_cancellation(token)
            .fetch_tree_recursive("owner/repo", dir.path(), WalkOptions::default())
            .unwrap_err();

        assert!(matches!(err, Error::Interrupted));
    }
}
