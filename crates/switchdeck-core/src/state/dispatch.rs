use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info, warn};

use crate::config::SwitchdeckConfig;
use crate::desktop::{self, DesktopBackend, ProcessInfo, WindowInfo, build_tree, default_backend};
use crate::identity::{assign_processes_to_themes, refresh_theme_processes, restore_window_handles};
use crate::minimize::{AppRef, MinimizeContext, MinimizeError, minimize_processes, show_desktop_except};
use crate::shortcuts::{ShortcutError, ShortcutRegistry, normalize_shortcut};
use crate::state::errors::DispatchError;
use crate::state::events::Event;
use crate::state::store::Store;
use crate::state::types::Command;
use crate::themes::{Theme, ThemeError, ThemeStore};

/// Host context: everything the core needs that would otherwise be global.
pub struct CoreStore {
    config: SwitchdeckConfig,
    themes: ThemeStore,
    backend: Box<dyn DesktopBackend>,
    minimize: MinimizeContext,
    shortcuts: ShortcutRegistry,
    compact_mode: bool,
}

/// Refresh pids, then re-resolve window handles, against one live snapshot.
fn reconcile(theme: &Theme, live: &[ProcessInfo]) -> Theme {
    let mut refreshed = theme.clone();
    refresh_theme_processes(&mut refreshed, live);
    restore_window_handles(&refreshed, live)
}

/// Pids for the per-process fallback: every live process that neither is
/// protected, owns a protected window, nor is the host.
fn fallback_targets(protected: &[AppRef], live: &[ProcessInfo], own_pid: u32) -> Vec<u32> {
    let hwnds: HashSet<u64> = protected.iter().filter_map(AppRef::window).collect();
    let mut keep: HashSet<u32> = protected.iter().filter_map(AppRef::process).collect();
    keep.insert(own_pid);
    for process in live {
        if process.windows.iter().any(|w| hwnds.contains(&w.hwnd)) {
            keep.insert(process.id);
        }
    }

    let mut seen = HashSet::new();
    live.iter()
        .map(|p| p.id)
        .filter(|pid| !keep.contains(pid) && seen.insert(*pid))
        .collect()
}

impl CoreStore {
    pub fn new(
        config: SwitchdeckConfig,
        themes: ThemeStore,
        backend: Box<dyn DesktopBackend>,
    ) -> Self {
        let minimize = MinimizeContext::from_config(&config.minimize);
        let mut shortcuts = ShortcutRegistry::new();
        shortcuts.sync_from_themes(themes.themes());
        Self {
            config,
            themes,
            backend,
            minimize,
            shortcuts,
            compact_mode: false,
        }
    }

    /// Open the configured themes file and pick the platform backend.
    pub fn open(config: SwitchdeckConfig) -> Self {
        let themes = ThemeStore::open(config.themes_file());
        let backend = default_backend(&config);
        Self::new(config, themes, backend)
    }

    pub fn with_minimize_context(mut self, minimize: MinimizeContext) -> Self {
        self.minimize = minimize;
        self
    }

    pub fn config(&self) -> &SwitchdeckConfig {
        &self.config
    }

    pub fn themes(&self) -> &[Theme] {
        self.themes.themes()
    }

    pub fn theme(&self, id: &str) -> Option<&Theme> {
        self.themes.get_theme(id)
    }

    pub fn theme_store(&self) -> &ThemeStore {
        &self.themes
    }

    pub fn backend(&self) -> &dyn DesktopBackend {
        self.backend.as_ref()
    }

    pub fn shortcuts(&self) -> &ShortcutRegistry {
        &self.shortcuts
    }

    pub fn compact_mode(&self) -> bool {
        self.compact_mode
    }

    pub fn minimize_context(&self) -> &MinimizeContext {
        &self.minimize
    }

    pub fn list_windows(&self) -> Vec<WindowInfo> {
        desktop::list_windows(self.backend(), &self.config.enumeration)
    }

    pub fn list_processes(&self) -> Vec<ProcessInfo> {
        desktop::list_processes(self.backend(), &self.config.enumeration)
    }

    pub fn processes_with_windows(&self) -> Vec<ProcessInfo> {
        desktop::processes_with_windows(self.backend(), &self.config.enumeration)
    }

    pub fn process_tree(&self) -> Vec<ProcessInfo> {
        build_tree(self.list_processes())
    }

    fn require_theme(&self, id: &str) -> Result<Theme, ThemeError> {
        self.themes
            .get_theme(id)
            .cloned()
            .ok_or_else(|| ThemeError::NotFound { id: id.to_string() })
    }

    fn check_shortcut(&self, shortcut: Option<&str>, theme_id: &str) -> Result<(), ShortcutError> {
        let Some(shortcut) = shortcut.filter(|s| !s.trim().is_empty()) else {
            return Ok(());
        };
        match self.shortcuts.theme_for(shortcut) {
            Some(owner) if owner != theme_id => Err(ShortcutError::Conflict {
                shortcut: normalize_shortcut(shortcut),
                theme_id: owner.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn sync_shortcuts(&mut self) {
        self.shortcuts.sync_from_themes(self.themes.themes());
    }

    /// Run the minimize engine, then the per-process fallback when it
    /// reports failure and the config allows it. Returns `(success, fallback_used)`.
    fn minimize_except(
        &self,
        protected: &[AppRef],
        live: Option<&[ProcessInfo]>,
    ) -> Result<(bool, bool), MinimizeError> {
        let success = show_desktop_except(self.backend(), &self.minimize, protected)?;
        if success || !self.config.minimize.fallback_to_process_minimize() {
            return Ok((success, false));
        }

        let snapshot;
        let live = match live {
            Some(live) => live,
            None => {
                snapshot = self.processes_with_windows();
                snapshot.as_slice()
            }
        };
        if live.is_empty() {
            warn!(
                event = "core.state.minimize_fallback_skipped",
                message = "No processes enumerated; nothing to fall back to"
            );
            return Ok((false, true));
        }

        let targets = fallback_targets(protected, live, self.minimize.own_pid);
        warn!(
            event = "core.state.minimize_fallback_started",
            targets = targets.len()
        );
        Ok((minimize_processes(self.backend(), &targets), true))
    }

    fn activate_theme(&mut self, id: &str) -> Result<Vec<Event>, DispatchError> {
        let stored = self.require_theme(id)?;
        let live = self.processes_with_windows();

        let theme = reconcile(&stored, &live);
        if theme != stored {
            self.themes.replace_theme(theme.clone())?;
        }

        let protected = theme.protected_refs();
        info!(
            event = "core.state.theme_activation_started",
            theme_id = %id,
            protected = protected.len(),
            windows = theme.windows.len()
        );

        let (success, fallback_used) = self.minimize_except(&protected, Some(&live))?;
        Ok(vec![Event::ThemeActivated {
            id: id.to_string(),
            protected: protected.len(),
            success,
            fallback_used,
        }])
    }

    fn restore_themes(&mut self) -> Result<Vec<Event>, DispatchError> {
        let live = self.processes_with_windows();
        let current = self.themes.themes().to_vec();

        let mut reconciled: Vec<Theme> = current.iter().map(|t| reconcile(t, &live)).collect();

        // A pid belongs to the single best-matching theme.
        let owner: HashMap<u32, String> = assign_processes_to_themes(&reconciled, &live)
            .into_iter()
            .map(|(theme_id, pid)| (pid, theme_id))
            .collect();
        for theme in &mut reconciled {
            let id = theme.id.clone();
            theme
                .processes
                .retain(|pid| owner.get(pid).is_none_or(|o| *o == id));
        }

        let mut events = Vec::new();
        for (before, after) in current.iter().zip(reconciled) {
            if *before == after {
                debug!(event = "core.state.theme_unchanged", theme_id = %before.id);
                continue;
            }
            let id = after.id.clone();
            self.themes.replace_theme(after)?;
            events.push(Event::ThemeRestored { id });
        }

        let updated = events.len();
        events.push(Event::ThemesRestored { updated });
        Ok(events)
    }
}

impl Store for CoreStore {
    type Error = DispatchError;

    fn dispatch(&mut self, cmd: Command) -> Result<Vec<Event>, DispatchError> {
        debug!(event = "core.state.dispatch_started", command = ?cmd);

        let result = match cmd {
            Command::AddTheme {
                name,
                shortcut,
                color,
            } => {
                self.check_shortcut(shortcut.as_deref(), "")?;
                let theme = self
                    .themes
                    .add_theme(&name, shortcut.as_deref(), color.as_deref())?;
                self.sync_shortcuts();
                Ok(vec![Event::ThemeAdded {
                    id: theme.id,
                    name: theme.name,
                }])
            }
            Command::UpdateTheme { theme } => {
                self.check_shortcut(Some(&theme.shortcut), &theme.id)?;
                let id = theme.id.clone();
                self.themes.update_theme(theme)?;
                self.sync_shortcuts();
                Ok(vec![Event::ThemeUpdated { id }])
            }
            Command::DeleteTheme { id } => {
                self.themes.delete_theme(&id)?;
                self.shortcuts.unregister_theme(&id);
                Ok(vec![Event::ThemeDeleted { id }])
            }
            Command::SetThemes { themes } => {
                self.themes.set_themes(themes)?;
                self.sync_shortcuts();
                Ok(vec![Event::ThemesReplaced {
                    count: self.themes.themes().len(),
                }])
            }
            Command::AddWindowsToTheme { id, windows } => {
                let live = self.list_processes();
                let changed = self.themes.add_windows_to_theme(&id, &windows, &live)?;
                Ok(vec![Event::WindowsAdded {
                    theme_id: id,
                    changed,
                }])
            }
            Command::RemoveWindowsFromTheme { id, hwnds } => {
                let changed = self.themes.remove_windows_from_theme(&id, &hwnds)?;
                Ok(vec![Event::WindowsRemoved {
                    theme_id: id,
                    changed,
                }])
            }
            Command::AddProcessToTheme { id, pid } => {
                self.require_theme(&id)?;
                let process = self
                    .list_processes()
                    .into_iter()
                    .find(|p| p.id == pid)
                    .ok_or(DispatchError::ProcessNotFound { pid })?;
                let changed = self.themes.add_process_to_theme(&id, &process)?;
                Ok(vec![Event::ProcessAdded {
                    theme_id: id,
                    pid,
                    changed,
                }])
            }
            Command::RemoveProcessFromTheme { id, pid, name } => {
                let changed = self
                    .themes
                    .remove_process_from_theme(&id, pid, name.as_deref())?;
                Ok(vec![Event::ProcessRemoved {
                    theme_id: id,
                    pid,
                    changed,
                }])
            }
            Command::ActivateTheme { id } => self.activate_theme(&id),
            Command::ActivateShortcut { shortcut } => {
                match self.shortcuts.theme_for(&shortcut).map(str::to_string) {
                    Some(id) => self.activate_theme(&id),
                    None => Err(ShortcutError::NotBound {
                        shortcut: normalize_shortcut(&shortcut),
                    }
                    .into()),
                }
            }
            Command::ShowDesktopExcept { apps } => {
                let (success, fallback_used) = self.minimize_except(&apps, None)?;
                Ok(vec![Event::DesktopShown {
                    protected: apps.len(),
                    success,
                    fallback_used,
                }])
            }
            Command::MinimizeProcesses { pids } => {
                let success = minimize_processes(self.backend(), &pids);
                Ok(vec![Event::ProcessesMinimized {
                    count: pids.len(),
                    success,
                }])
            }
            Command::RestoreThemes => self.restore_themes(),
            Command::ClearAllData => {
                self.themes.clear_all_data()?;
                self.shortcuts = ShortcutRegistry::new();
                Ok(vec![Event::DataCleared])
            }
            Command::SetCompactMode { enabled } => {
                self.compact_mode = enabled;
                Ok(vec![Event::CompactModeChanged { enabled }])
            }
        };

        match &result {
            Ok(events) => info!(
                event = "core.state.dispatch_completed",
                event_count = events.len()
            ),
            Err(e) => error!(event = "core.state.dispatch_failed", error = %e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::backend::fake::{Call, FakeBackend};
    use crate::identity::create_identifier;
    use std::sync::Arc;
    use tempfile::TempDir;

    const OWN_PID: u32 = 900;

    fn desktop() -> FakeBackend {
        FakeBackend::new()
            .with_process(10, None, "chrome.exe", None)
            .with_process(20, None, "notepad.exe", None)
            .with_window(200_001, 10, "GitHub - repo", "Chrome_WidgetWin_1")
            .with_window(200_002, 10, "Unrelated Tab", "Chrome_WidgetWin_1")
            .with_window(300_001, 20, "notes.txt - Notepad", "Notepad")
    }

    fn store_with(backend: Arc<FakeBackend>) -> (TempDir, CoreStore) {
        let dir = TempDir::new().unwrap();
        let themes = ThemeStore::open(dir.path().join("themes.json"));
        let store = CoreStore::new(SwitchdeckConfig::default(), themes, Box::new(backend))
            .with_minimize_context(MinimizeContext::new(OWN_PID));
        (dir, store)
    }

    fn add_theme(store: &mut CoreStore, name: &str, shortcut: Option<&str>) -> String {
        let events = store
            .dispatch(Command::AddTheme {
                name: name.to_string(),
                shortcut: shortcut.map(str::to_string),
                color: None,
            })
            .unwrap();
        match &events[0] {
            Event::ThemeAdded { id, .. } => id.clone(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    fn github_theme(id: &str) -> Theme {
        let mut theme = Theme::new(id, "Review");
        theme.shortcut = "Ctrl+1".to_string();
        theme.persistent_processes = vec![create_identifier("chrome", None, Some("GitHub"))];
        theme.applications = vec![AppRef::Window(123_456)];
        theme.windows = vec![WindowInfo {
            hwnd: 123_456,
            process_id: 9,
            title: "GitHub - repo".to_string(),
        }];
        theme
    }

    #[test]
    fn test_core_store_implements_store_trait() {
        fn assert_store<T: Store>(_s: &T) {}
        let (_dir, store) = store_with(Arc::new(FakeBackend::new()));
        assert_store(&store);
    }

    #[test]
    fn test_activate_theme_keeps_only_matching_window() {
        let backend = Arc::new(desktop());
        let (_dir, mut store) = store_with(backend.clone());
        store
            .dispatch(Command::SetThemes {
                themes: vec![github_theme("1")],
            })
            .unwrap();

        let events = store
            .dispatch(Command::ActivateTheme {
                id: "1".to_string(),
            })
            .unwrap();

        assert_eq!(
            events,
            vec![Event::ThemeActivated {
                id: "1".to_string(),
                protected: 1,
                success: true,
                fallback_used: false,
            }]
        );
        assert_eq!(backend.calls(), vec![Call::Minimize(vec![200_002, 300_001])]);

        let theme = store.theme("1").unwrap();
        assert_eq!(theme.applications, vec![AppRef::Window(200_001)]);
        assert_eq!(theme.windows[0].hwnd, 200_001);
        assert!(theme.processes.is_empty());
    }

    #[test]
    fn test_activate_empty_theme_is_rejected() {
        let backend = Arc::new(desktop());
        let (_dir, mut store) = store_with(backend.clone());
        let id = add_theme(&mut store, "Empty", None);

        let err = store.dispatch(Command::ActivateTheme { id }).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Minimize(MinimizeError::InvalidArgument { .. })
        ));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_activate_unknown_theme() {
        let (_dir, mut store) = store_with(Arc::new(desktop()));
        let err = store
            .dispatch(Command::ActivateTheme {
                id: "nope".to_string(),
            })
            .unwrap_err();
        assert_eq!(
            crate::errors::SwitchdeckError::error_code(&err),
            "THEME_NOT_FOUND"
        );
    }

    #[test]
    fn test_activation_falls_back_to_process_minimize() {
        let mut fake = desktop();
        fake.fail_minimize = true;
        let backend = Arc::new(fake);
        let (_dir, mut store) = store_with(backend.clone());
        store
            .dispatch(Command::SetThemes {
                themes: vec![github_theme("1")],
            })
            .unwrap();

        let events = store
            .dispatch(Command::ActivateTheme {
                id: "1".to_string(),
            })
            .unwrap();

        assert!(matches!(
            events[0],
            Event::ThemeActivated {
                success: false,
                fallback_used: true,
                ..
            }
        ));
        assert_eq!(
            backend.calls(),
            vec![
                Call::Minimize(vec![200_002, 300_001]),
                Call::MinimizeMain(20),
            ]
        );
    }

    #[test]
    fn test_activate_shortcut() {
        let backend = Arc::new(desktop());
        let (_dir, mut store) = store_with(backend.clone());
        store
            .dispatch(Command::SetThemes {
                themes: vec![github_theme("1")],
            })
            .unwrap();

        let events = store
            .dispatch(Command::ActivateShortcut {
                shortcut: "ctrl + 1".to_string(),
            })
            .unwrap();
        assert!(matches!(&events[0], Event::ThemeActivated { id, .. } if id == "1"));

        let err = store
            .dispatch(Command::ActivateShortcut {
                shortcut: "Ctrl+9".to_string(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Shortcut(ShortcutError::NotBound { .. })
        ));
    }

    #[test]
    fn test_add_theme_rejects_taken_shortcut() {
        let (_dir, mut store) = store_with(Arc::new(FakeBackend::new()));
        add_theme(&mut store, "Work", Some("Ctrl+1"));

        let err = store
            .dispatch(Command::AddTheme {
                name: "Play".to_string(),
                shortcut: Some("CTRL+1".to_string()),
                color: None,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Shortcut(ShortcutError::Conflict { .. })
        ));
        assert_eq!(store.themes().len(), 1);
    }

    #[test]
    fn test_delete_theme_frees_shortcut() {
        let (_dir, mut store) = store_with(Arc::new(FakeBackend::new()));
        let id = add_theme(&mut store, "Work", Some("Ctrl+1"));
        store.dispatch(Command::DeleteTheme { id }).unwrap();
        assert!(store.shortcuts().is_empty());
        add_theme(&mut store, "Play", Some("Ctrl+1"));
    }

    #[test]
    fn test_add_windows_uses_live_owner() {
        let fake = FakeBackend::new()
            .with_process(10, None, "chrome.exe", Some("C:\\Chrome\\chrome.exe"))
            .with_window(200_001, 10, "GitHub - repo", "Chrome_WidgetWin_1");
        let (_dir, mut store) = store_with(Arc::new(fake));
        let id = add_theme(&mut store, "Review", None);

        let window = WindowInfo {
            hwnd: 200_001,
            process_id: 10,
            title: "GitHub - repo".to_string(),
        };
        for expected in [true, false] {
            let events = store
                .dispatch(Command::AddWindowsToTheme {
                    id: id.clone(),
                    windows: vec![window.clone()],
                })
                .unwrap();
            assert_eq!(
                events,
                vec![Event::WindowsAdded {
                    theme_id: id.clone(),
                    changed: expected,
                }]
            );
        }

        let theme = store.theme(&id).unwrap();
        assert_eq!(theme.windows.len(), 1);
        assert_eq!(
            theme.persistent_processes[0].executable_path.as_deref(),
            Some("C:\\Chrome\\chrome.exe")
        );
    }

    #[test]
    fn test_add_process_requires_running_process() {
        let (_dir, mut store) = store_with(Arc::new(desktop()));
        let id = add_theme(&mut store, "Notes", None);

        let err = store
            .dispatch(Command::AddProcessToTheme {
                id: id.clone(),
                pid: 4242,
            })
            .unwrap_err();
        assert!(matches!(err, DispatchError::ProcessNotFound { pid: 4242 }));

        store
            .dispatch(Command::AddProcessToTheme { id: id.clone(), pid: 20 })
            .unwrap();
        assert_eq!(store.theme(&id).unwrap().processes, vec![20]);
    }

    #[test]
    fn test_show_desktop_except_empty_is_rejected() {
        let backend = Arc::new(desktop());
        let (_dir, mut store) = store_with(backend.clone());
        let err = store
            .dispatch(Command::ShowDesktopExcept { apps: vec![] })
            .unwrap_err();
        assert!(crate::errors::SwitchdeckError::is_user_error(&err));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_show_desktop_except_process() {
        let backend = Arc::new(desktop());
        let (_dir, mut store) = store_with(backend.clone());
        let events = store
            .dispatch(Command::ShowDesktopExcept {
                apps: vec![AppRef::Process(20)],
            })
            .unwrap();
        assert_eq!(
            events,
            vec![Event::DesktopShown {
                protected: 1,
                success: true,
                fallback_used: false,
            }]
        );
        assert_eq!(backend.calls(), vec![Call::Minimize(vec![200_001, 200_002])]);
    }

    #[test]
    fn test_restore_themes_gives_process_to_best_theme() {
        let (_dir, mut store) = store_with(Arc::new(desktop()));
        let mut browsing = Theme::new("a", "Browsing");
        browsing.persistent_processes = vec![create_identifier("chrome", None, None)];
        browsing.processes = vec![77];
        store
            .dispatch(Command::SetThemes {
                themes: vec![browsing, github_theme("b")],
            })
            .unwrap();

        let events = store.dispatch(Command::RestoreThemes).unwrap();
        assert_eq!(events.last(), Some(&Event::ThemesRestored { updated: 2 }));

        assert!(store.theme("a").unwrap().processes.is_empty());
        let review = store.theme("b").unwrap();
        assert_eq!(review.applications, vec![AppRef::Window(200_001)]);
    }

    #[test]
    fn test_clear_all_data_and_compact_mode() {
        let (_dir, mut store) = store_with(Arc::new(FakeBackend::new()));
        add_theme(&mut store, "Work", Some("Ctrl+1"));

        assert_eq!(
            store.dispatch(Command::ClearAllData).unwrap(),
            vec![Event::DataCleared]
        );
        assert!(store.themes().is_empty());
        assert!(store.shortcuts().is_empty());

        store
            .dispatch(Command::SetCompactMode { enabled: true })
            .unwrap();
        assert!(store.compact_mode());
    }

    #[test]
    fn test_minimize_processes_command() {
        let mut fake = desktop();
        fake.no_main_window = vec![20];
        let backend = Arc::new(fake);
        let (_dir, mut store) = store_with(backend.clone());

        let events = store
            .dispatch(Command::MinimizeProcesses { pids: vec![10, 20] })
            .unwrap();
        assert_eq!(
            events,
            vec![Event::ProcessesMinimized {
                count: 2,
                success: false,
            }]
        );
        assert_eq!(
            backend.calls(),
            vec![Call::MinimizeMain(10), Call::MinimizeMain(20)]
        );
    }

    #[test]
    fn test_fallback_targets_skip_protected_owners() {
        let live = vec![
            ProcessInfo::new(10, "chrome", "x").with_window(200_001, "GitHub"),
            ProcessInfo::new(20, "notepad", "y").with_window(300_001, "notes"),
            ProcessInfo::new(OWN_PID, "switchdeck", "z"),
            ProcessInfo::new(30, "code", "w"),
        ];
        let targets = fallback_targets(
            &[AppRef::Window(200_001), AppRef::Process(30)],
            &live,
            OWN_PID,
        );
        assert_eq!(targets, vec![20]);
    }
}
