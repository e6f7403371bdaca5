// src/install.rs
//! Moves fully materialized trees into their final, named location.

use crate::constants::{INSTALL_LOCK_DIR, STAGING_PREFIX};
use crate::errors::{io_error_with_path, Error, Result};
use crate::fetcher::Fetcher;
use crate::path_resolve::checked_relative;
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Exclusive lock on a destination directory, released on drop.
///
/// The lock file lives in the system temp dir, named after the hash of the
/// canonical destination path, so nothing is left behind in the destination.
struct InstallLock {
    file: File,
    path: PathBuf,
}

impl InstallLock {
    fn acquire(destination_dir: &Path) -> Result<Self> {
        let path = lock_path(destination_dir)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error_with_path(e, parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| io_error_with_path(e, &path))?;
        file.lock_exclusive()
            .map_err(|e| io_error_with_path(e, &path))?;
        log::debug!("Acquired install lock {}", path.display());
        Ok(Self { file, path })
    }
}

/// Location of the lock file serializing installs into `destination_dir`.
/// The directory must exist.
fn lock_path(destination_dir: &Path) -> Result<PathBuf> {
    let canonical = destination_dir
        .canonicalize()
        .map_err(|e| io_error_with_path(e, destination_dir))?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string_lossy().as_bytes());
    let hex_hash = hex::encode(hasher.finalize());
    Ok(std::env::temp_dir()
        .join(INSTALL_LOCK_DIR)
        .join(format!("{}.lock", hex_hash)))
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            log::warn!("Failed to release lock '{}': {}", self.path.display(), e);
        }
    }
}

/// Replaces `destination_dir/name` with the contents of `staging`.
///
/// **Destructive:** any existing file or directory called `name` inside
/// `destination_dir` is deleted recursively before the new tree is moved in.
/// Nothing is merged and no backup is kept. Installs into the same
/// `destination_dir` are serialized through an exclusive lock file, so
/// concurrent installs of one name cannot interleave their delete and move.
///
/// The move is a rename when possible and a copy followed by deleting
/// `staging` otherwise (e.g. across filesystems).
///
/// # Errors
/// [`Error::UnsafePath`] if `name` is not a single path component, and
/// [`Error::Io`] for any filesystem failure.
pub fn install_tree(staging: &Path, destination_dir: &Path, name: &str) -> Result<PathBuf> {
    let relative = checked_relative(name, destination_dir)?;
    let mut components = relative.components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(Error::UnsafePath {
            path: name.to_string(),
            root: destination_dir.display().to_string(),
        });
    }
    if !staging.is_dir() {
        return Err(io_error_with_path(
            io::Error::new(io::ErrorKind::NotFound, "staging directory does not exist"),
            staging,
        ));
    }

    fs::create_dir_all(destination_dir).map_err(|e| io_error_with_path(e, destination_dir))?;
    let _lock = InstallLock::acquire(destination_dir)?;

    let target = destination_dir.join(&relative);
    if let Ok(metadata) = fs::symlink_metadata(&target) {
        log::info!("Removing previous install at {}", target.display());
        if metadata.is_dir() {
            fs::remove_dir_all(&target)
        } else {
            fs::remove_file(&target)
        }
        .map_err(|e| io_error_with_path(e, &target))?;
    }

    move_tree(staging, &target)?;
    log::info!("Installed {}", target.display());
    Ok(target)
}

fn move_tree(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::debug!(
                "Rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                e
            );
            copy_tree(from, to)?;
            fs::remove_dir_all(from).map_err(|e| io_error_with_path(e, from))
        }
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| io_error_with_path(io::Error::from(e), from))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| Error::UnsafePath {
                path: entry.path().display().to_string(),
                root: from.display().to_string(),
            })?;
        let out_path = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| io_error_with_path(e, &out_path))?;
        } else {
            fs::copy(entry.path(), &out_path).map_err(|e| io_error_with_path(e, &out_path))?;
        }
    }
    Ok(())
}

impl Fetcher {
    /// Fetches a mod folder through the archive strategy and installs it as
    /// `mods_dir/name`, replacing any previous install of that name.
    ///
    /// The subtree is extracted into a fresh staging directory under
    /// `staging_root` first, so a failed download leaves the old install intact.
    ///
    /// # Errors
    /// Everything [`Fetcher::fetch_archive_subtree`] and [`install_tree`] can
    /// return, plus [`Error::ArchiveFormatError`] if the requested folder holds
    /// no files.
    pub fn fetch_mod(
        &self,
        url: &str,
        mods_dir: &Path,
        name: &str,
        staging_root: &Path,
    ) -> Result<PathBuf> {
        fs::create_dir_all(staging_root).map_err(|e| io_error_with_path(e, staging_root))?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(staging_root)
            .map_err(|e| io_error_with_path(e, staging_root))?;
        let tree = staging.path().join("tree");

        let fetched = self.fetch_archive_subtree(url, &tree)?;
        if fetched.files.is_empty() {
            return Err(Error::ArchiveFormatError {
                source_name: url.to_string(),
                reason: format!("no files below '{}'", fetched.prefix),
            });
        }

        log::info!("{}: moving to mod folder", name);
        install_tree(&tree, mods_dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::archive_testing::build_zip;
    use crate::git::client::testing::FakeTransport;
    use crate::git::ClientConfig;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::tempdir;

    fn staged(root: &Path, files: &[(&str, &str)]) -> PathBuf {
        let staging = root.join("staging");
        for (path, content) in files {
            let file = staging.join(path);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, content).unwrap();
        }
        staging
    }

    #[test]
    fn test_install_into_empty_destination() {
        let dir = tempdir().unwrap();
        let staging = staged(dir.path(), &[("modinfo.json", "{}")]);
        let mods = dir.path().join("mods");

        let installed = install_tree(&staging, &mods, "X").unwrap();

        assert_eq!(installed, mods.join("X"));
        assert_eq!(fs::read_to_string(mods.join("X/modinfo.json")).unwrap(), "{}");
        assert!(!staging.exists());
    }

    #[test]
    fn test_install_replaces_without_merging() {
        let dir = tempdir().unwrap();
        let mods = dir.path().join("mods");
        fs::create_dir_all(mods.join("X/old")).unwrap();
        fs::write(mods.join("X/old/stale.json"), "stale").unwrap();
        fs::write(mods.join("X/modinfo.json"), "v1").unwrap();
        fs::create_dir_all(mods.join("Y")).unwrap();
        fs::write(mods.join("Y/keep.json"), "keep").unwrap();
        let staging = staged(dir.path(), &[("modinfo.json", "v2")]);

        install_tree(&staging, &mods, "X").unwrap();

        assert_eq!(fs::read_to_string(mods.join("X/modinfo.json")).unwrap(), "v2");
        assert!(!mods.join("X/old").exists());
        // Siblings of the replaced install are untouched.
        assert_eq!(fs::read_to_string(mods.join("Y/keep.json")).unwrap(), "keep");
    }

    #[test]
    fn test_install_leaves_only_the_named_entry() {
        let dir = tempdir().unwrap();
        let mods = dir.path().join("mods");
        let staging = staged(dir.path(), &[("modinfo.json", "{}")]);

        install_tree(&staging, &mods, "X").unwrap();

        let entries: Vec<String> = fs::read_dir(&mods)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["X".to_string()]);
        assert!(lock_path(&mods)
            .unwrap()
            .starts_with(std::env::temp_dir().join(INSTALL_LOCK_DIR)));
    }

    #[test]
    fn test_lock_path_is_per_destination() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(a.join("sub")).unwrap();
        fs::create_dir_all(&b).unwrap();

        assert_ne!(lock_path(&a).unwrap(), lock_path(&b).unwrap());
        assert_eq!(lock_path(&a).unwrap(), lock_path(&a.join("sub/..")).unwrap());
    }

    #[test]
    fn test_install_replaces_plain_file() {
        let dir = tempdir().unwrap();
        let mods = dir.path().join("mods");
        fs::create_dir_all(&mods).unwrap();
        fs::write(mods.join("X"), "not a directory").unwrap();
        let staging = staged(dir.path(), &[("a.txt", "a")]);

        install_tree(&staging, &mods, "X").unwrap();

        assert!(mods.join("X").is_dir());
    }

    #[test]
    fn test_install_rejects_bad_names() {
        let dir = tempdir().unwrap();
        let staging = staged(dir.path(), &[("a.txt", "a")]);
        let mods = dir.path().join("mods");
        for name in ["", "..", "a/b", "/abs"] {
            assert!(
                matches!(
                    install_tree(&staging, &mods, name),
                    Err(Error::UnsafePath { .. })
                ),
                "name {:?} should be rejected",
                name
            );
        }
        assert!(staging.exists());
    }

    #[test]
    fn test_install_missing_staging() {
        let dir = tempdir().unwrap();
        let err = install_tree(&dir.path().join("nope"), &dir.path().join("mods"), "X").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_copy_tree_fallback() {
        let dir = tempdir().unwrap();
        let staging = staged(dir.path(), &[("a/b/c.txt", "c"), ("d.txt", "d")]);
        let target = dir.path().join("copy");

        copy_tree(&staging, &target).unwrap();

        assert_eq!(fs::read_to_string(target.join("a/b/c.txt")).unwrap(), "c");
        assert_eq!(fs::read_to_string(target.join("d.txt")).unwrap(), "d");
    }

    #[test]
    fn test_concurrent_installs_of_same_name_serialize() {
        let dir = tempdir().unwrap();
        let mods = dir.path().join("mods");
        let thread_count = 4;
        let barrier = Arc::new(Barrier::new(thread_count));

        let handles: Vec<_> = (0..thread_count)
            .map(|i| {
                let staging = dir.path().join(format!("staging-{}", i));
                fs::create_dir_all(&staging).unwrap();
                fs::write(staging.join("modinfo.json"), format!("v{}", i)).unwrap();
                fs::write(staging.join(format!("only-{}.txt", i)), "x").unwrap();
                let mods = mods.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    install_tree(&staging, &mods, "X")
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        // Exactly one install survives, complete and unmixed.
        let content = fs::read_to_string(mods.join("X/modinfo.json")).unwrap();
        let winner = content.trim_start_matches('v');
        let entries: Vec<String> = fs::read_dir(mods.join("X"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries.len(), 2, "{:?}", entries);
        assert!(entries.contains(&format!("only-{}.txt", winner)));
    }

    #[test]
    fn test_fetch_mod_installs_subtree() {
        let archive = build_zip(&[
            ("pack-main/", None),
            ("pack-main/Undead/modinfo.json", Some("undead")),
            ("pack-main/Other/modinfo.json", Some("other")),
        ]);
        let transport = FakeTransport::new().route(
            "https://github.com/owner/pack/archive/master.zip",
            archive,
        );
        let fetcher = Fetcher::with_transport(ClientConfig::default(), Arc::new(transport));
        let dir = tempdir().unwrap();
        let mods = dir.path().join("mods");
        let downloads = dir.path().join("temp_download");

        let installed = fetcher
            .fetch_mod(
                "https://github.com/owner/pack/tree/master/Undead",
                &mods,
                "Undead++",
                &downloads,
            )
            .unwrap();

        assert_eq!(installed, mods.join("Undead++"));
        assert_eq!(
            fs::read_to_string(mods.join("Undead++/modinfo.json")).unwrap(),
            "undead"
        );
        assert!(!mods.join("Other").exists());
        // The staging directory is cleaned up once the tree has moved.
        assert_eq!(fs::read_dir(&downloads).unwrap().count(), 0);
    }

    #[test]
    fn test_fetch_mod_with_empty_subtree_keeps_old_install() {
        let archive = build_zip(&[("pack-main/", None), ("pack-main/a.txt", Some("a"))]);
        let transport = FakeTransport::new().route(
            "https://github.com/owner/pack/archive/master.zip",
            archive,
        );
        let fetcher = Fetcher::with_transport(ClientConfig::default(), Arc::new(transport));
        let dir = tempdir().unwrap();
        let mods = dir.path().join("mods");
        fs::create_dir_all(mods.join("Gone")).unwrap();
        fs::write(mods.join("Gone/modinfo.json"), "old").unwrap();

        let err = fetcher
            .fetch_mod(
                "https://github.com/owner/pack/tree/master/Gone",
                &mods,
                "Gone",
                &dir.path().join("temp_download"),
            )
            .unwrap_err();

        assert!(matches!(err, Error::ArchiveFormatError { .. }));
        assert_eq!(fs::read_to_string(mods.join("Gone/modinfo.json")).unwrap(), "old");
    }
}
