// src/config/validation.rs

use super::{Config, Folders};
use crate::errors::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Validates combinations of settings that clap cannot easily express.
pub(super) fn validate_config(config: &Config) -> Result<()> {
    config.client.validate()?;

    let overrides = &config.folder_overrides;
    for (flag, value) in [
        ("--mods-folder", &overrides.mods),
        ("--sound-folder", &overrides.sound),
        ("--tiles-folder", &overrides.tiles),
        ("--download-folder", &overrides.downloads),
    ] {
        if let Some(name) = value {
            folder_name(flag, name)?;
        }
    }

    if !config.sections.mods && !config.sections.tiles && !config.sections.sounds {
        return Err(Error::Config(
            "All manifest sections are skipped; nothing to do.".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a folder name stays below the output root and returns it
/// without `.` components.
///
/// Empty names, `.`, `..` components and absolute paths are rejected.
pub(super) fn folder_name(label: &str, name: &str) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(name.trim()).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::Config(format!(
                    "{} '{}' must be a relative path below the output root",
                    label, name
                )));
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(Error::Config(format!("{} cannot be empty", label)));
    }
    Ok(clean)
}

/// Rejects a download folder that is, contains, or sits inside one of the
/// content folders. The download folder is deleted after a batch.
pub(super) fn validate_folders(folders: &Folders) -> Result<()> {
    for (label, folder) in [
        ("mods folder", &folders.mods),
        ("sound folder", &folders.sound),
        ("tiles folder", &folders.tiles),
    ] {
        if folders.downloads.starts_with(folder) || folder.starts_with(&folders.downloads) {
            return Err(Error::Config(format!(
                "download folder '{}' overlaps the {} '{}'",
                folders.downloads.display(),
                label,
                folder.display()
            )));
        }
    }
    Ok(())
}
