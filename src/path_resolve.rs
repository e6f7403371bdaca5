// src/path_resolve.rs
//! Maps remote repository paths onto the local filesystem.

use crate::errors::{io_error_with_path, Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Validates that `path` is a plain relative path (no root, drive prefix or `..`)
/// and returns it with `.` components dropped.
///
/// # Errors
/// Returns [`Error::UnsafePath`] if the path could climb out of `root`.
pub fn checked_relative(path: &str, root: &Path) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafePath {
                    path: path.to_string(),
                    root: root.display().to_string(),
                });
            }
        }
    }
    Ok(clean)
}

/// Makes `path` absolute against the current directory and removes `.`/`..` lexically.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| io_error_with_path(e, "."))?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Computes the local destination of a remote file.
///
/// If the target root occurs inside `remote_path`, the result is the root
/// followed by whatever comes after that occurrence; this keeps a remote path
/// that already carries the root component from nesting it twice. Otherwise
/// the result is `target_root/remote_path`.
///
/// The root is matched by its trailing components, longest first, so an
/// absolute root such as `/games/cdda/mods` matches a remote `mods/...` the
/// same way the relative root `mods` does. Matches must start and end on a
/// `/` boundary: root `mods` does not match inside `modsextra/`.
///
/// # Examples
/// ```
/// use modfetch::path_resolve::{absolutize, resolve_path};
/// use std::path::Path;
///
/// let root = Path::new("mods");
/// assert_eq!(
///     resolve_path("mods/src/a.txt", root).unwrap(),
///     absolutize(Path::new("mods/src/a.txt")).unwrap()
/// );
/// assert_eq!(
///     resolve_path("src/a.txt", root).unwrap(),
///     absolutize(Path::new("mods/src/a.txt")).unwrap()
/// );
/// ```
pub fn resolve_path(remote_path: &str, target_root: &Path) -> Result<PathBuf> {
    let relative = checked_relative(remote_path, target_root)?;
    let root_abs = absolutize(target_root)?;
    let remote = relative.to_string_lossy().replace('\\', "/");

    let root_parts: Vec<String> = target_root
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    for take in (1..=root_parts.len()).rev() {
        let needle = root_parts[root_parts.len() - take..].join("/");
        if let Some(rest) = remainder_after(&remote, &needle) {
            return Ok(root_abs.join(rest));
        }
    }

    if let Some(last) = root_parts.last() {
        if remote.contains(last.as_str()) {
            log::debug!(
                "Remote path '{}' contains '{}' only as part of a longer name; joining",
                remote_path,
                last
            );
        }
    }
    Ok(root_abs.join(relative))
}

/// Returns the part of `path` after the first `/`-aligned occurrence of `needle`.
///
/// Candidates only start at the beginning of `path` or right after a `/`, so
/// every slice boundary is a character boundary.
fn remainder_after<'a>(path: &'a str, needle: &str) -> Option<&'a str> {
    std::iter::once(0)
        .chain(path.match_indices('/').map(|(index, _)| index + 1))
        .find_map(|start| {
            let rest = path[start..].strip_prefix(needle)?;
            if rest.is_empty() || rest.starts_with('/') {
                Some(rest.trim_start_matches('/'))
            } else {
                None
            }
        })
}

/// Resolves `remote_path` like [`resolve_path`] and creates every missing
/// parent directory of the result.
pub fn resolve_and_prepare(remote_path: &str, target_root: &Path) -> Result<PathBuf> {
    let resolved = resolve_path(remote_path, target_root)?;
    if let Some(parent) = resolved.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error_with_path(e, parent))?;
    }
    Ok(resolved)
}
