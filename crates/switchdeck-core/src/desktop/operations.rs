use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::config::EnumerationConfig;
use crate::desktop::backend::DesktopBackend;
use crate::desktop::types::{ProcessInfo, RawWindow, WindowInfo};

/// Titles that belong to shell or system surfaces rather than applications.
const NOISE_TITLES: &[&str] = &[
    "Program Manager",
    "Windows Input Experience",
    "Microsoft Text Input Application",
    "Settings",
    "Windows Shell Experience Host",
];

/// Title fragments produced by helper processes of multi-process apps.
const NOISE_TITLE_FRAGMENTS: &[&str] = &[
    "--type=",
    "crashpad-handler",
    "gpu-process",
    "utility",
    "renderer",
];

/// Desktop applications listed even when they own no titled window.
const RELEVANT_PROCESSES: &[&str] = &[
    "brave",
    "chrome",
    "firefox",
    "msedge",
    "opera",
    "code",
    "cursor",
    "notepad",
    "wordpad",
    "explorer",
    "powershell",
    "windowsterminal",
    "teams",
    "slack",
    "discord",
    "onenote",
    "winword",
    "excel",
    "snippingtool",
    "applicationframehost",
    "taskmgr",
    "electron",
];

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("chrome", "Google Chrome"),
    ("msedge", "Microsoft Edge"),
    ("firefox", "Firefox"),
    ("brave", "Brave"),
    ("opera", "Opera"),
    ("code", "Visual Studio Code"),
    ("winword", "Microsoft Word"),
    ("excel", "Microsoft Excel"),
    ("onenote", "OneNote"),
    ("teams", "Microsoft Teams"),
    ("windowsterminal", "Windows Terminal"),
    ("explorer", "File Explorer"),
    ("taskmgr", "Task Manager"),
    ("snippingtool", "Snipping Tool"),
    ("applicationframehost", "Windows App"),
];

/// Lower-case an executable name and strip any directory and `.exe` suffix.
pub fn normalize_process_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let lower = base.to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Friendly label for a normalized process name.
pub fn display_name(name: &str) -> String {
    if let Some((_, label)) = DISPLAY_NAMES.iter().find(|(key, _)| *key == name) {
        return label.to_string();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn is_noise_title(title: &str, extra: &[String]) -> bool {
    title.ends_with(".exe")
        || NOISE_TITLES.contains(&title)
        || NOISE_TITLE_FRAGMENTS.iter().any(|f| title.contains(f))
        || extra.iter().any(|f| !f.is_empty() && title.contains(f.as_str()))
}

pub fn is_relevant_process(name: &str, owns_titled_window: bool, extra: &[String]) -> bool {
    owns_titled_window
        || RELEVANT_PROCESSES.contains(&name)
        || extra.iter().any(|e| normalize_process_name(e) == name)
}

/// Whether a raw window should be offered to the user.
pub fn is_listable_window(window: &RawWindow, extra_noise: &[String]) -> bool {
    window.visible
        && window.process_id != 0
        && !window.has_parent
        && !window.title.trim().is_empty()
        && !is_noise_title(&window.title, extra_noise)
}

/// Visible, titled, top-level application windows. Returns `[]` on any failure.
pub fn list_windows(backend: &dyn DesktopBackend, config: &EnumerationConfig) -> Vec<WindowInfo> {
    let raw = match backend.windows() {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                event = "core.desktop.list_windows_failed",
                backend = backend.name(),
                error = %e
            );
            return Vec::new();
        }
    };

    let total = raw.len();
    let mut seen = HashSet::new();
    let windows: Vec<WindowInfo> = raw
        .iter()
        .filter(|w| is_listable_window(w, &config.extra_noise_titles))
        .filter(|w| seen.insert(w.hwnd))
        .map(RawWindow::to_window_info)
        .collect();

    debug!(
        event = "core.desktop.list_windows_completed",
        total,
        listed = windows.len(),
        skipped = total - windows.len()
    );
    windows
}

/// Relevant running processes. Returns `[]` on any failure.
///
/// A process is relevant when it is a known desktop application or owns at
/// least one listable window; its title is that window's title.
pub fn list_processes(
    backend: &dyn DesktopBackend,
    config: &EnumerationConfig,
) -> Vec<ProcessInfo> {
    let windows = list_windows(backend, config);
    list_processes_with(backend, config, &windows)
}

fn list_processes_with(
    backend: &dyn DesktopBackend,
    config: &EnumerationConfig,
    windows: &[WindowInfo],
) -> Vec<ProcessInfo> {
    let raw = match backend.processes() {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                event = "core.desktop.list_processes_failed",
                backend = backend.name(),
                error = %e
            );
            return Vec::new();
        }
    };

    let mut first_title: HashMap<u32, &str> = HashMap::new();
    for window in windows {
        first_title.entry(window.process_id).or_insert(&window.title);
    }

    let mut seen = HashSet::new();
    let mut processes = Vec::new();
    for entry in raw {
        let name = normalize_process_name(&entry.name);
        // Exited between the id lookup and the detail lookup.
        if entry.id == 0 || name.is_empty() {
            debug!(event = "core.desktop.process_skipped", pid = entry.id);
            continue;
        }
        if !seen.insert(entry.id) {
            continue;
        }

        let window_title = first_title.get(&entry.id).copied();
        if !is_relevant_process(
            &name,
            window_title.is_some(),
            &config.extra_relevant_processes,
        ) {
            continue;
        }

        let title = match window_title {
            Some(title) => title.to_string(),
            None => display_name(&name),
        };
        processes.push(ProcessInfo {
            id: entry.id,
            title,
            path: entry.path.filter(|p| !p.is_empty()),
            parent_id: entry.parent_id.filter(|&p| p != 0),
            name,
            children: Vec::new(),
            windows: Vec::new(),
        });
    }

    processes
}

/// Relevant processes with their windows attached. Processes without a
/// listable window are dropped.
pub fn processes_with_windows(
    backend: &dyn DesktopBackend,
    config: &EnumerationConfig,
) -> Vec<ProcessInfo> {
    let windows = list_windows(backend, config);
    let processes = list_processes_with(backend, config, &windows);

    let mut by_pid: HashMap<u32, Vec<WindowInfo>> = HashMap::new();
    for window in windows {
        by_pid.entry(window.process_id).or_default().push(window);
    }

    let merged: Vec<ProcessInfo> = processes
        .into_iter()
        .filter_map(|mut process| {
            let windows = by_pid.remove(&process.id)?;
            if let Some(first) = windows.first() {
                process.title = first.title.clone();
            }
            process.windows = windows;
            Some(process)
        })
        .collect();

    info!(
        event = "core.desktop.processes_with_windows_completed",
        count = merged.len()
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::backend::fake::FakeBackend;

    fn config() -> EnumerationConfig {
        EnumerationConfig::default()
    }

    #[test]
    fn test_normalize_process_name() {
        assert_eq!(normalize_process_name("Code.exe"), "code");
        assert_eq!(normalize_process_name("C:\\Program Files\\Brave\\brave.EXE"), "brave");
        assert_eq!(normalize_process_name("WindowsTerminal"), "windowsterminal");
        assert_eq!(normalize_process_name(""), "");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("chrome"), "Google Chrome");
        assert_eq!(display_name("obsidian"), "Obsidian");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_noise_titles() {
        assert!(is_noise_title("Program Manager", &[]));
        assert!(is_noise_title("chrome.exe", &[]));
        assert!(is_noise_title("Chrome --type=renderer", &[]));
        assert!(is_noise_title("Overlay HUD", &["Overlay".to_string()]));
        assert!(!is_noise_title("Inbox - Outlook", &[]));
        assert!(!is_noise_title("Settings and more", &[]));
    }

    #[test]
    fn test_list_windows_filters() {
        let backend = FakeBackend::new()
            .with_window(100_001, 10, "Inbox", "Chrome_WidgetWin_1")
            .with_window(100_002, 10, "", "Chrome_WidgetWin_1")
            .with_window(100_003, 11, "Program Manager", "Progman")
            .with_window(100_004, 12, "gpu-process", "Chrome_WidgetWin_0")
            .with_raw_window(RawWindow {
                hwnd: 100_005,
                process_id: 10,
                title: "Hidden".to_string(),
                class_name: "X".to_string(),
                visible: false,
                minimized: false,
                has_parent: false,
            })
            .with_raw_window(RawWindow {
                hwnd: 100_006,
                process_id: 10,
                title: "Find".to_string(),
                class_name: "#32770".to_string(),
                visible: true,
                minimized: false,
                has_parent: true,
            })
            .with_window(100_001, 10, "Inbox", "Chrome_WidgetWin_1");

        let windows = list_windows(&backend, &config());
        assert_eq!(
            windows,
            vec![WindowInfo {
                hwnd: 100_001,
                process_id: 10,
                title: "Inbox".to_string()
            }]
        );
    }

    #[test]
    fn test_minimized_windows_are_listed() {
        let backend = FakeBackend::new().with_raw_window(RawWindow {
            hwnd: 7,
            process_id: 3,
            title: "Notes".to_string(),
            class_name: "Notepad".to_string(),
            visible: true,
            minimized: true,
            has_parent: false,
        });
        assert_eq!(list_windows(&backend, &config()).len(), 1);
    }

    #[test]
    fn test_enumeration_failure_yields_empty() {
        let mut backend = FakeBackend::new()
            .with_process(10, None, "chrome.exe", None)
            .with_window(1, 10, "Inbox", "C");
        backend.fail_enumeration = true;
        assert!(list_windows(&backend, &config()).is_empty());
        assert!(list_processes(&backend, &config()).is_empty());
        assert!(processes_with_windows(&backend, &config()).is_empty());
    }

    #[test]
    fn test_list_processes_relevance() {
        let backend = FakeBackend::new()
            .with_process(4, Some(0), "System", None)
            .with_process(10, Some(4), "chrome.exe", Some("C:\\chrome.exe"))
            .with_process(20, Some(4), "svchost.exe", None)
            .with_process(30, Some(4), "obsidian.exe", None)
            .with_process(0, None, "Idle", None)
            .with_process(40, Some(4), "", None)
            .with_window(500_000, 30, "Vault - Obsidian", "Chrome_WidgetWin_1");

        let processes = list_processes(&backend, &config());
        let ids: Vec<u32> = processes.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 30]);

        assert_eq!(processes[0].name, "chrome");
        assert_eq!(processes[0].title, "Google Chrome");
        assert_eq!(processes[0].parent_id, Some(4));
        assert_eq!(processes[0].path.as_deref(), Some("C:\\chrome.exe"));
        assert_eq!(processes[1].title, "Vault - Obsidian");
    }

    #[test]
    fn test_extra_relevant_processes() {
        let backend = FakeBackend::new().with_process(20, None, "Obsidian.exe", None);
        let mut config = config();
        assert!(list_processes(&backend, &config).is_empty());

        config.extra_relevant_processes = vec!["obsidian.exe".to_string()];
        assert_eq!(list_processes(&backend, &config).len(), 1);
    }

    #[test]
    fn test_processes_with_windows_merges_and_drops_windowless() {
        let backend = FakeBackend::new()
            .with_process(10, None, "chrome.exe", None)
            .with_process(11, None, "notepad.exe", None)
            .with_window(200_000, 10, "GitHub - repo", "Chrome_WidgetWin_1")
            .with_window(200_001, 10, "Unrelated Tab", "Chrome_WidgetWin_1");

        let merged = processes_with_windows(&backend, &config());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 10);
        assert_eq!(merged[0].title, "GitHub - repo");
        assert_eq!(merged[0].windows.len(), 2);
    }
}
