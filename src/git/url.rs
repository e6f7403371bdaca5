//! Handles parsing of GitHub repository URLs into [`RepoReference`]s.

use crate::constants::DEFAULT_ARCHIVE_BRANCH;
use crate::errors::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// The decomposed identity of a repository fetch request.
///
/// Created once per fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReference {
    /// Repository owner (user or organization). Never empty.
    pub owner: String,
    /// Repository name, without any `.git` suffix. Never empty.
    pub repo: String,
    /// Branch, tag or commit named in the URL, if any.
    pub git_ref: Option<String>,
    /// Path segments below the ref. Empty when the URL points at the repository root.
    pub subpath: Vec<String>,
}

/// Everything up to and including the repository host marker.
static HOST_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*github\.com[/:]").unwrap());

/// A bare `owner/repo[/...]` reference with no scheme or host.
static BARE_REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*/[^/\s][^/]*(?:/.*)?$").unwrap());

/// Normalizes a user-supplied repository URL.
///
/// Accepted shapes:
/// - `owner/repo`
/// - `https://github.com/owner/repo` (with or without `.git`, trailing slash, query or fragment)
/// - `https://github.com/owner/repo/tree/<ref>/<sub/path>`
///
/// The host prefix and the `tree` segment are removed and `%20` is decoded to
/// a space. Returns the parsed reference together with the normalized string
/// (`owner/repo[/ref[/sub/path]]`).
///
/// # Errors
/// Returns [`Error::InvalidReference`] when no host prefix was found and the
/// input is not a bare `owner/repo`, or when fewer than two segments remain.
///
/// # Examples
/// ```
/// use modfetch::git::normalize_repo_url;
///
/// let (reference, normalized) =
///     normalize_repo_url("https://github.com/Noctifer-de-Mortem/nocts_cata_mod/tree/master/nocts_cata_mod_DDA").unwrap();
/// assert_eq!(reference.owner, "Noctifer-de-Mortem");
/// assert_eq!(reference.repo, "nocts_cata_mod");
/// assert_eq!(reference.git_ref.as_deref(), Some("master"));
/// assert_eq!(reference.subpath, vec!["nocts_cata_mod_DDA".to_string()]);
/// assert_eq!(normalized, "Noctifer-de-Mortem/nocts_cata_mod/master/nocts_cata_mod_DDA");
/// ```
pub fn normalize_repo_url(url: &str) -> Result<(RepoReference, String)> {
    let decoded = url.trim().replace("%20", " ");
    // Query strings and fragments never carry repository identity.
    let decoded = decoded
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_string();

    let stripped = HOST_PREFIX_RE.replace(&decoded, "").into_owned();
    if stripped == decoded && (decoded.contains("://") || !BARE_REFERENCE_RE.is_match(&decoded)) {
        return Err(Error::invalid_reference(
            url,
            "expected a github.com URL or an 'owner/repo' reference",
        ));
    }

    let mut segments: Vec<String> = stripped
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.len() >= 3 && segments[2] == "tree" {
        segments.remove(2);
    }
    if segments.len() < 2 {
        return Err(Error::invalid_reference(
            url,
            "a reference needs at least an owner and a repository name",
        ));
    }

    let owner = segments[0].clone();
    let repo = segments[1].trim_end_matches(".git").to_string();
    if repo.is_empty() {
        return Err(Error::invalid_reference(url, "repository name is empty"));
    }
    segments[1] = repo.clone();

    let reference = RepoReference {
        owner,
        repo,
        git_ref: segments.get(2).cloned(),
        subpath: segments.iter().skip(3).cloned().collect(),
    };
    log::debug!("Normalized '{}' to {:?}", url, reference);
    Ok((reference, segments.join("/")))
}

/// Parses a repository URL into a [`RepoReference`].
///
/// See [`normalize_repo_url`] for the accepted shapes.
pub fn parse_repo_url(url: &str) -> Result<RepoReference> {
    normalize_repo_url(url).map(|(reference, _)| reference)
}

impl RepoReference {
    /// The subpath joined with `/`, or an empty string for the repository root.
    pub fn subpath_str(&self) -> String {
        self.subpath.join("/")
    }

    /// The name a fetch of this reference is materialized under:
    /// the last subpath segment, or the repository name.
    pub fn local_name(&self) -> &str {
        self.subpath.last().map(String::as_str).unwrap_or(&self.repo)
    }

    /// The branch an archive download targets.
    pub fn archive_branch(&self) -> &str {
        self.git_ref.as_deref().unwrap_or(DEFAULT_ARCHIVE_BRANCH)
    }

    /// The contents listing endpoint for this repository.
    pub fn contents_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// The latest-release metadata endpoint for this repository.
    pub fn latest_release_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// The zip archive URL for this reference.
    ///
    /// Without an explicit ref this targets `refs/heads/master`, which GitHub
    /// redirects for repositories whose default branch was renamed.
    pub fn archive_url(&self, web_base: &str) -> String {
        let base = web_base.trim_end_matches('/');
        match &self.git_ref {
            Some(git_ref) => format!(
                "{}/{}/{}/archive/{}.zip",
                base, self.owner, self.repo, git_ref
            ),
            None => format!(
                "{}/{}/{}/archive/refs/heads/{}.zip",
                base, self.owner, self.repo, DEFAULT_ARCHIVE_BRANCH
            ),
        }
    }
}

impl fmt::Display for RepoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if let Some(git_ref) = &self.git_ref {
            write!(f, "@{}", git_ref)?;
        }
        if !self.subpath.is_empty() {
            write!(f, ":{}", self.subpath_str())?;
        }
        Ok(())
    }
}
