use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::desktop::types::WindowInfo;
use crate::identity::types::PersistentProcessIdentifier;
use crate::minimize::types::AppRef;

/// A named group of applications activated together.
///
/// Every list is written to disk even when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    /// Normalized key combination. Empty means unassigned.
    #[serde(default)]
    pub shortcut: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub applications: Vec<AppRef>,
    /// Process ids resolved for this theme during the current session.
    #[serde(default)]
    pub processes: Vec<u32>,
    #[serde(default)]
    pub windows: Vec<WindowInfo>,
    #[serde(default)]
    pub persistent_processes: Vec<PersistentProcessIdentifier>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(n) => n.to_string(),
    })
}

impl Theme {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shortcut: String::new(),
            color: None,
            applications: Vec::new(),
            processes: Vec::new(),
            windows: Vec::new(),
            persistent_processes: Vec::new(),
        }
    }

    pub fn window_handles(&self) -> impl Iterator<Item = u64> + '_ {
        self.applications.iter().filter_map(AppRef::window)
    }

    pub fn has_persistent(&self, identifier: &PersistentProcessIdentifier) -> bool {
        let key = identifier.dedup_key();
        self.persistent_processes
            .iter()
            .any(|existing| existing.dedup_key() == key)
    }

    /// Append `identifier` unless one with the same name and title pattern exists.
    pub fn push_persistent(&mut self, identifier: PersistentProcessIdentifier) -> bool {
        if self.has_persistent(&identifier) {
            return false;
        }
        self.persistent_processes.push(identifier);
        true
    }

    /// Pids that own one of this theme's windows.
    pub fn window_owner_pids(&self) -> HashSet<u32> {
        self.windows.iter().map(|w| w.process_id).collect()
    }

    /// Drop tracked pids that already have a window assigned, so protecting
    /// one browser window does not protect every sibling window.
    pub fn cleanup_conflicting_process_ids(&mut self) -> bool {
        let owners = self.window_owner_pids();
        let before = (self.processes.len(), self.applications.len());
        self.processes.retain(|pid| !owners.contains(pid));
        self.applications.retain(|app| match app {
            AppRef::Process(pid) => !owners.contains(pid),
            AppRef::Window(_) => true,
        });
        before != (self.processes.len(), self.applications.len())
    }

    /// The set handed to the minimize engine when this theme is activated.
    ///
    /// Window refs come first. A pid that owns one of the theme's windows is
    /// not protected as a whole process.
    pub fn protected_refs(&self) -> Vec<AppRef> {
        let owners = self.window_owner_pids();
        let mut seen = HashSet::new();
        let mut refs = Vec::new();

        let windows = self
            .window_handles()
            .chain(self.windows.iter().map(|w| w.hwnd))
            .map(AppRef::Window);
        let processes = self
            .applications
            .iter()
            .filter_map(AppRef::process)
            .chain(self.processes.iter().copied())
            .filter(|pid| !owners.contains(pid))
            .map(AppRef::Process);

        for app in windows.chain(processes) {
            if seen.insert(app) {
                refs.push(app);
            }
        }
        refs
    }

    /// Upgrade data written by older versions. Returns whether anything changed.
    ///
    /// Process refs move from `applications` into `processes`; windows missing
    /// from `applications` are added back.
    pub fn migrate_legacy(&mut self) -> bool {
        let mut changed = false;

        let legacy_pids: Vec<u32> = self
            .applications
            .iter()
            .filter_map(AppRef::process)
            .collect();
        if !legacy_pids.is_empty() {
            self.applications.retain(|app| app.window().is_some());
            for pid in legacy_pids {
                if !self.processes.contains(&pid) {
                    self.processes.push(pid);
                }
            }
            changed = true;
        }

        for window in &self.windows {
            let app = AppRef::Window(window.hwnd);
            if !self.applications.contains(&app) {
                self.applications.push(app);
                changed = true;
            }
        }

        changed
    }
}
