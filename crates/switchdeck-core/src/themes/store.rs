use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::desktop::operations::normalize_process_name;
use crate::desktop::types::{ProcessInfo, WindowInfo};
use crate::identity::{create_identifier, unescape_title};
use crate::minimize::types::AppRef;
use crate::themes::errors::ThemeError;
use crate::themes::persistence::{LoadedThemes, clear_theme_files, load_themes, save_themes};
use crate::themes::types::Theme;

/// In-memory theme list backed by the themes file. Every mutation that
/// changes something is saved before returning.
#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    themes: Vec<Theme>,
    load_error: Option<String>,
}

/// Keep `existing` when the incoming list is empty.
fn keep_if_empty<T: Clone>(incoming: Vec<T>, existing: &[T]) -> Vec<T> {
    if incoming.is_empty() {
        existing.to_vec()
    } else {
        incoming
    }
}

fn merge_theme(incoming: Theme, existing: &Theme) -> Theme {
    Theme {
        applications: keep_if_empty(incoming.applications, &existing.applications),
        processes: keep_if_empty(incoming.processes, &existing.processes),
        windows: keep_if_empty(incoming.windows, &existing.windows),
        persistent_processes: keep_if_empty(
            incoming.persistent_processes,
            &existing.persistent_processes,
        ),
        ..incoming
    }
}

impl ThemeStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let LoadedThemes {
            themes,
            load_error,
            migrated,
        } = load_themes(&path);

        let store = Self {
            path,
            themes,
            load_error,
        };

        if migrated && let Err(e) = save_themes(&store.path, &store.themes) {
            warn!(
                event = "core.themes.migration_save_failed",
                error = %e
            );
        }

        info!(
            event = "core.themes.store_opened",
            path = %store.path.display(),
            count = store.themes.len(),
            recovered = store.load_error.is_some()
        );
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the last load fell back to the backup or an empty list, if it did.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get_theme(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    /// Copy of the theme list plus the index of `id`, for staging a change.
    fn staged(&self, id: &str) -> Result<(Vec<Theme>, usize), ThemeError> {
        let index = self
            .themes
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ThemeError::NotFound { id: id.to_string() })?;
        Ok((self.themes.clone(), index))
    }

    /// Save `themes` and only then make them the in-memory state, so a failed
    /// save leaves the store as it was.
    fn commit(&mut self, themes: Vec<Theme>) -> Result<(), ThemeError> {
        save_themes(&self.path, &themes)?;
        self.themes = themes;
        Ok(())
    }

    fn next_id(&self) -> String {
        let mut candidate = chrono::Utc::now().timestamp_millis();
        while self.get_theme(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    pub fn add_theme(
        &mut self,
        name: &str,
        shortcut: Option<&str>,
        color: Option<&str>,
    ) -> Result<Theme, ThemeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ThemeError::InvalidName);
        }

        let mut theme = Theme::new(self.next_id(), name);
        theme.shortcut = shortcut.unwrap_or_default().to_string();
        theme.color = color.filter(|c| !c.is_empty()).map(str::to_string);

        let mut themes = self.themes.clone();
        themes.push(theme.clone());
        self.commit(themes)?;

        info!(
            event = "core.themes.theme_added",
            theme_id = %theme.id,
            name = %theme.name
        );
        Ok(theme)
    }

    /// Client-facing update. Empty membership lists in `theme` keep the
    /// stored ones, the same way [`ThemeStore::set_themes`] merges.
    pub fn update_theme(&mut self, theme: Theme) -> Result<(), ThemeError> {
        let (mut themes, index) = self.staged(&theme.id)?;
        let id = theme.id.clone();
        let merged = merge_theme(theme, &themes[index]);
        themes[index] = merged;
        self.commit(themes)?;
        info!(event = "core.themes.theme_updated", theme_id = %id);
        Ok(())
    }

    /// Overwrite a theme as-is. Used for reconciler output, where an empty
    /// window list is meaningful.
    pub fn replace_theme(&mut self, theme: Theme) -> Result<(), ThemeError> {
        let (mut themes, index) = self.staged(&theme.id)?;
        if themes[index] == theme {
            return Ok(());
        }
        themes[index] = theme;
        self.commit(themes)
    }

    pub fn delete_theme(&mut self, id: &str) -> Result<Theme, ThemeError> {
        let (mut themes, index) = self.staged(id)?;
        let removed = themes.remove(index);
        self.commit(themes)?;
        info!(event = "core.themes.theme_deleted", theme_id = %id);
        Ok(removed)
    }

    /// Replace the theme list with `incoming`, merging each theme with its
    /// stored counterpart so empty membership lists never erase stored data.
    pub fn set_themes(&mut self, incoming: Vec<Theme>) -> Result<(), ThemeError> {
        let merged: Vec<Theme> = incoming
            .into_iter()
            .map(|theme| match self.get_theme(&theme.id) {
                Some(existing) => merge_theme(theme, existing),
                None => theme,
            })
            .collect();
        self.commit(merged)?;
        info!(event = "core.themes.themes_set", count = self.themes.len());
        Ok(())
    }

    /// Add windows to a theme, with an identifier for each window whose
    /// owning process is in `processes`. Windows already present are skipped.
    pub fn add_windows_to_theme(
        &mut self,
        id: &str,
        windows: &[WindowInfo],
        processes: &[ProcessInfo],
    ) -> Result<bool, ThemeError> {
        let (mut themes, index) = self.staged(id)?;
        let theme = &mut themes[index];
        let mut added = 0;

        for window in windows {
            if theme.windows.iter().any(|w| w.hwnd == window.hwnd) {
                debug!(
                    event = "core.themes.window_already_present",
                    theme_id = %id,
                    hwnd = window.hwnd
                );
                continue;
            }
            theme.windows.push(window.clone());
            let app = AppRef::Window(window.hwnd);
            if !theme.applications.contains(&app) {
                theme.applications.push(app);
            }
            if let Some(owner) = processes.iter().find(|p| p.id == window.process_id) {
                let identifier =
                    create_identifier(&owner.name, owner.path.as_deref(), Some(&window.title));
                theme.push_persistent(identifier);
            }
            added += 1;
        }
        let cleaned = theme.cleanup_conflicting_process_ids();

        let changed = added > 0 || cleaned;
        if changed {
            self.commit(themes)?;
            info!(
                event = "core.themes.windows_added",
                theme_id = %id,
                count = added
            );
        }
        Ok(changed)
    }

    /// Remove windows by handle, along with any identifier whose title
    /// pattern equals a removed window's title exactly.
    pub fn remove_windows_from_theme(&mut self, id: &str, hwnds: &[u64]) -> Result<bool, ThemeError> {
        let (mut themes, index) = self.staged(id)?;
        let theme = &mut themes[index];

        let removed_titles: Vec<String> = theme
            .windows
            .iter()
            .filter(|w| hwnds.contains(&w.hwnd))
            .map(|w| w.title.clone())
            .collect();

        theme.windows.retain(|w| !hwnds.contains(&w.hwnd));
        theme
            .applications
            .retain(|app| app.window().is_none_or(|hwnd| !hwnds.contains(&hwnd)));
        theme.persistent_processes.retain(|identifier| {
            identifier.title_pattern.as_deref().is_none_or(|pattern| {
                let pattern = unescape_title(pattern);
                !removed_titles.iter().any(|title| *title == pattern)
            })
        });

        let changed = themes[index] != self.themes[index];
        if changed {
            self.commit(themes)?;
            info!(
                event = "core.themes.windows_removed",
                theme_id = %id,
                count = removed_titles.len()
            );
        }
        Ok(changed)
    }

    /// Track a whole process. The identifier is deduplicated by executable name.
    pub fn add_process_to_theme(&mut self, id: &str, process: &ProcessInfo) -> Result<bool, ThemeError> {
        let (mut themes, index) = self.staged(id)?;
        let theme = &mut themes[index];
        let mut changed = false;

        if !theme.processes.contains(&process.id) {
            theme.processes.push(process.id);
            changed = true;
        }

        let identifier = create_identifier(&process.name, process.path.as_deref(), None);
        let name = identifier.executable_name.to_lowercase();
        if !theme
            .persistent_processes
            .iter()
            .any(|p| p.executable_name.to_lowercase() == name)
        {
            theme.persistent_processes.push(identifier);
            changed = true;
        }

        if changed {
            self.commit(themes)?;
            info!(
                event = "core.themes.process_added",
                theme_id = %id,
                pid = process.id,
                name = %process.name
            );
        }
        Ok(changed)
    }

    /// Stop tracking `pid`. When `name` is given every identifier for that
    /// executable goes too.
    pub fn remove_process_from_theme(
        &mut self,
        id: &str,
        pid: u32,
        name: Option<&str>,
    ) -> Result<bool, ThemeError> {
        let (mut themes, index) = self.staged(id)?;
        let theme = &mut themes[index];

        theme.processes.retain(|p| *p != pid);
        theme.applications.retain(|app| *app != AppRef::Process(pid));
        if let Some(name) = name {
            let name = normalize_process_name(name);
            theme
                .persistent_processes
                .retain(|p| p.executable_name.to_lowercase() != name);
        }

        let changed = themes[index] != self.themes[index];
        if changed {
            self.commit(themes)?;
            info!(event = "core.themes.process_removed", theme_id = %id, pid);
        }
        Ok(changed)
    }

    /// Forget every theme and delete the files backing them.
    pub fn clear_all_data(&mut self) -> Result<(), ThemeError> {
        clear_theme_files(&self.path)?;
        self.themes.clear();
        self.load_error = None;
        info!(event = "core.themes.data_cleared", path = %self.path.display());
        Ok(())
    }
}
