//! Theme file persistence
//!
//! The themes file is a JSON array of [`Theme`] records. Saves keep the
//! previous file as a `.bak` sibling and loads fall back to it.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::themes::errors::ThemeError;
use crate::themes::types::Theme;

/// Result of reading the themes file. Loading never fails; problems are
/// reported through `load_error`.
#[derive(Debug, Default)]
pub struct LoadedThemes {
    pub themes: Vec<Theme>,
    pub load_error: Option<String>,
    /// True when legacy records were upgraded and the file should be rewritten.
    pub migrated: bool,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("themes.json"));
    name.push(suffix);
    path.with_file_name(name)
}

pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, ".bak")
}

fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}

fn read_themes(path: &Path) -> Result<Vec<Theme>, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

fn finish(mut themes: Vec<Theme>, load_error: Option<String>) -> LoadedThemes {
    let mut migrated = false;
    for theme in &mut themes {
        migrated |= theme.migrate_legacy();
    }
    LoadedThemes {
        themes,
        load_error,
        migrated,
    }
}

/// Read themes from `path`, falling back to the backup and then to an empty list.
pub fn load_themes(path: &Path) -> LoadedThemes {
    let backup = backup_path(path);

    let primary_error = if path.exists() {
        match read_themes(path) {
            Ok(themes) => {
                debug!(
                    event = "core.themes.load_completed",
                    path = %path.display(),
                    count = themes.len()
                );
                return finish(themes, None);
            }
            Err(e) => {
                error!(
                    event = "core.themes.load_corrupt",
                    path = %path.display(),
                    error = %e,
                    message = "Themes file is unreadable, trying backup"
                );
                Some(e)
            }
        }
    } else {
        None
    };

    if backup.exists() {
        match read_themes(&backup) {
            Ok(themes) => {
                warn!(
                    event = "core.themes.loaded_from_backup",
                    path = %backup.display(),
                    count = themes.len()
                );
                let reason = primary_error
                    .unwrap_or_else(|| "themes file missing, recovered from backup".to_string());
                return finish(themes, Some(reason));
            }
            Err(e) => {
                error!(
                    event = "core.themes.backup_corrupt",
                    path = %backup.display(),
                    error = %e,
                    message = "Backup is unreadable, starting with no themes"
                );
                let reason = match primary_error {
                    Some(primary) => format!("{primary}; backup: {e}"),
                    None => format!("backup: {e}"),
                };
                return finish(Vec::new(), Some(reason));
            }
        }
    }

    finish(Vec::new(), primary_error)
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        warn!(
            event = "core.themes.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err
        );
    }
}

fn restore_backup(path: &Path, backup: &Path, had_backup: bool) {
    if !had_backup {
        return;
    }
    match fs::rename(backup, path) {
        Ok(()) => warn!(
            event = "core.themes.backup_restored",
            path = %path.display()
        ),
        Err(e) => error!(
            event = "core.themes.backup_restore_failed",
            path = %path.display(),
            error = %e
        ),
    }
}

/// Write themes atomically.
///
/// The current file is moved to `.bak`, the new content goes through a temp
/// file and a rename, and the result is read back. Any failure puts the
/// `.bak` back in place.
pub fn save_themes(path: &Path, themes: &[Theme]) -> Result<(), ThemeError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(themes).map_err(|e| ThemeError::SaveFailed {
        message: format!("serialization failed: {e}"),
    })?;

    let backup = backup_path(path);
    let temp_file = temp_path(path);

    let had_backup = path.exists();
    if had_backup {
        fs::rename(path, &backup).map_err(|e| ThemeError::SaveFailed {
            message: format!("could not move current file to backup: {e}"),
        })?;
    }

    if let Err(e) = fs::write(&temp_file, &json) {
        cleanup_temp_file(&temp_file, &e);
        restore_backup(path, &backup, had_backup);
        return Err(ThemeError::SaveFailed {
            message: format!("write failed: {e}"),
        });
    }

    if let Err(e) = fs::rename(&temp_file, path) {
        cleanup_temp_file(&temp_file, &e);
        restore_backup(path, &backup, had_backup);
        return Err(ThemeError::SaveFailed {
            message: format!("rename failed: {e}"),
        });
    }

    match read_themes(path) {
        Ok(written) if written.len() == themes.len() => {}
        Ok(written) => {
            restore_backup(path, &backup, had_backup);
            return Err(ThemeError::SaveFailed {
                message: format!(
                    "verification failed: wrote {} themes, read back {}",
                    themes.len(),
                    written.len()
                ),
            });
        }
        Err(e) => {
            restore_backup(path, &backup, had_backup);
            return Err(ThemeError::SaveFailed {
                message: format!("verification failed: {e}"),
            });
        }
    }

    info!(
        event = "core.themes.saved",
        path = %path.display(),
        count = themes.len()
    );
    Ok(())
}

/// Delete the themes file, its backup and any stray temp file.
pub fn clear_theme_files(path: &Path) -> Result<(), ThemeError> {
    for file in [path.to_path_buf(), backup_path(path), temp_path(path)] {
        match fs::remove_file(&file) {
            Ok(()) => debug!(event = "core.themes.file_removed", path = %file.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ThemeError::IoError { source: e }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimize::types::AppRef;
    use tempfile::TempDir;

    fn sample() -> Vec<Theme> {
        let mut work = Theme::new("1", "Work");
        work.applications = vec![AppRef::Window(200_001)];
        vec![work, Theme::new("2", "Play")]
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = load_themes(&dir.path().join("themes.json"));
        assert!(loaded.themes.is_empty());
        assert!(loaded.load_error.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("themes.json");
        save_themes(&path, &sample()).unwrap();

        let loaded = load_themes(&path);
        assert_eq!(loaded.themes, sample());
        assert!(!loaded.migrated);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_second_save_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("themes.json");
        save_themes(&path, &sample()).unwrap();
        save_themes(&path, &[]).unwrap();

        assert_eq!(read_themes(&backup_path(&path)).unwrap(), sample());
        assert!(read_themes(&path).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_primary_falls_back_to_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("themes.json");
        save_themes(&path, &sample()).unwrap();
        fs::copy(&path, backup_path(&path)).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let loaded = load_themes(&path);
        assert_eq!(loaded.themes, sample());
        assert!(loaded.load_error.is_some());
    }

    #[test]
    fn test_both_corrupt_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("themes.json");
        fs::write(&path, "garbage").unwrap();
        fs::write(backup_path(&path), "[{").unwrap();

        let loaded = load_themes(&path);
        assert!(loaded.themes.is_empty());
        assert!(loaded.load_error.is_some());
    }

    #[test]
    fn test_failed_write_restores_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("themes.json");
        save_themes(&path, &sample()).unwrap();

        // A directory where the temp file should go makes the write fail.
        fs::create_dir(temp_path(&path)).unwrap();
        let result = save_themes(&path, &[Theme::new("3", "Other")]);

        assert!(matches!(result, Err(ThemeError::SaveFailed { .. })));
        assert_eq!(read_themes(&path).unwrap(), sample());
    }

    #[test]
    fn test_legacy_file_is_migrated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("themes.json");
        fs::write(
            &path,
            r#"[{"id": 17, "name": "Old", "shortcut": "", "applications": [42, 262144]}]"#,
        )
        .unwrap();

        let loaded = load_themes(&path);
        assert!(loaded.migrated);
        let theme = &loaded.themes[0];
        assert_eq!(theme.id, "17");
        assert_eq!(theme.processes, vec![42]);
        assert_eq!(theme.applications, vec![AppRef::Window(262_144)]);
    }

    #[test]
    fn test_clear_theme_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("themes.json");
        save_themes(&path, &sample()).unwrap();
        save_themes(&path, &sample()).unwrap();
        assert!(backup_path(&path).exists());

        clear_theme_files(&path).unwrap();
        assert!(!path.exists());
        assert!(!backup_path(&path).exists());
        clear_theme_files(&path).unwrap();
    }
}
