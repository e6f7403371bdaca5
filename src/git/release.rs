// src/git/release.rs
//! Downloads a named asset of a repository's latest release.

use super::archive::extract_all;
use super::url::parse_repo_url;
use crate::errors::{Error, Result};
use crate::fetcher::Fetcher;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The parts of the latest-release metadata we need.
#[derive(Deserialize, Debug)]
struct Release {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Deserialize, Debug)]
struct ReleaseAsset {
    name: String,
    browser_download_url: String,
}

impl Fetcher {
    /// Downloads the asset called `asset_name` from the latest release of the
    /// repository at `url` and extracts it (as a zip archive) into `destination`.
    ///
    /// Returns `destination` on success.
    ///
    /// # Errors
    /// [`Error::AssetNotFound`] if the latest release carries no asset of that
    /// name, [`Error::NetworkFailure`] for failed metadata or asset requests and
    /// [`Error::ArchiveFormatError`] if the asset is not a usable zip.
    pub fn fetch_release_asset(
        &self,
        url: &str,
        destination: &Path,
        asset_name: &str,
    ) -> Result<PathBuf> {
        let reference = parse_repo_url(url)?;
        let release_url = reference.latest_release_url(&self.config().api_base);
        log::debug!("Fetching release metadata from: {}", release_url);

        let body = self.transport().get_bytes(&release_url, &[])?;
        let release: Release = serde_json::from_slice(&body).map_err(|e| {
            Error::network(&release_url, format!("malformed release metadata: {}", e))
        })?;

        let asset = release
            .assets
            .into_iter()
            .find(|asset| asset.name == asset_name)
            .ok_or_else(|| Error::AssetNotFound {
                owner: reference.owner.clone(),
                repo: reference.repo.clone(),
                asset: asset_name.to_string(),
            })?;

        log::info!(
            "Downloading {} ({}) into {} ...",
            asset.name,
            release.tag_name.as_deref().unwrap_or("latest"),
            destination.display()
        );
        let archive = self.download_archive(&asset.browser_download_url)?;
        let extracted = extract_all(&archive, destination)?;
        log::info!(
            "Done downloading {}: {} files.",
            asset.name,
            extracted.files.len()
        );
        Ok(extracted.destination)
    }
}
