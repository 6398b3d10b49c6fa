use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::desktop::operations::normalize_process_name;
use crate::desktop::types::{ProcessInfo, WindowInfo};
use crate::identity::escape::{escape_title, unescape_title};
use crate::identity::types::PersistentProcessIdentifier;
use crate::minimize::types::AppRef;
use crate::themes::types::Theme;

/// Build the durable identifier for a process, optionally pinned to a window title.
pub fn create_identifier(
    name: &str,
    path: Option<&str>,
    title: Option<&str>,
) -> PersistentProcessIdentifier {
    PersistentProcessIdentifier {
        executable_name: normalize_process_name(name),
        executable_path: path.filter(|p| !p.is_empty()).map(str::to_string),
        title_pattern: title.filter(|t| !t.is_empty()).map(escape_title),
    }
}

fn name_matches(identifier: &PersistentProcessIdentifier, process: &ProcessInfo) -> bool {
    process.name.to_lowercase() == identifier.executable_name.to_lowercase()
}

/// Paths compare case-insensitively. A live process whose path could not be
/// read (access denied) is judged on its name alone.
fn path_matches(identifier: &PersistentProcessIdentifier, process: &ProcessInfo) -> bool {
    match (&identifier.executable_path, &process.path) {
        (Some(expected), Some(actual)) => expected.to_lowercase() == actual.to_lowercase(),
        _ => true,
    }
}

/// Whether the live `title` satisfies the identifier's title pattern (if any).
/// Only the stored pattern is escaped; the live title is compared as-is.
pub fn title_matches(identifier: &PersistentProcessIdentifier, title: &str) -> bool {
    match identifier.title_pattern.as_deref().filter(|p| !p.is_empty()) {
        Some(pattern) => title.contains(&unescape_title(pattern)),
        None => true,
    }
}

/// Name and path check against a live process.
pub fn identifier_matches_process(
    identifier: &PersistentProcessIdentifier,
    process: &ProcessInfo,
) -> bool {
    name_matches(identifier, process) && path_matches(identifier, process)
}

/// First live process matching the identifier's name and path.
pub fn match_process<'a>(
    identifier: &PersistentProcessIdentifier,
    live: &'a [ProcessInfo],
) -> Option<&'a ProcessInfo> {
    live.iter()
        .find(|process| identifier_matches_process(identifier, process))
}

/// First live window matching the identifier, including its title pattern.
pub fn match_window<'a>(
    identifier: &PersistentProcessIdentifier,
    live: &'a [ProcessInfo],
) -> Option<(&'a ProcessInfo, &'a WindowInfo)> {
    live.iter()
        .filter(|process| identifier_matches_process(identifier, process))
        .find_map(|process| {
            process
                .windows
                .iter()
                .find(|window| title_matches(identifier, &window.title))
                .map(|window| (process, window))
        })
}

/// Reattach a theme to the windows currently matching its title-pinned identifiers.
///
/// When the theme has at least one identifier with a title pattern, its
/// `windows` are replaced by every live window of a same-named process whose
/// title contains a pattern, and its window refs are rebuilt from exactly
/// those handles. Pids owning a matched window are removed from `processes`.
/// Themes without title patterns are returned unchanged.
pub fn restore_window_handles(theme: &Theme, live: &[ProcessInfo]) -> Theme {
    let patterned: Vec<&PersistentProcessIdentifier> = theme
        .persistent_processes
        .iter()
        .filter(|p| p.title_pattern.as_deref().is_some_and(|t| !t.is_empty()))
        .collect();

    if patterned.is_empty() {
        return theme.clone();
    }

    let mut seen = HashSet::new();
    let mut matched: Vec<WindowInfo> = Vec::new();
    for identifier in &patterned {
        for process in live.iter().filter(|p| name_matches(identifier, p)) {
            for window in &process.windows {
                if title_matches(identifier, &window.title) && seen.insert(window.hwnd) {
                    matched.push(window.clone());
                }
            }
        }
    }

    let mut restored = theme.clone();
    restored.applications = restored
        .applications
        .iter()
        .copied()
        .filter(|app| app.window().is_none())
        .chain(matched.iter().map(|w| AppRef::Window(w.hwnd)))
        .collect();
    restored.windows = matched;
    restored.cleanup_conflicting_process_ids();

    info!(
        event = "core.identity.window_handles_restored",
        theme_id = %theme.id,
        previous = theme.windows.len(),
        restored = restored.windows.len()
    );
    restored
}

/// Point `theme.processes` at the live pids matching its identifiers.
///
/// An identifier with a title pattern only matches a process that currently
/// shows a window with that title.
///
/// Unmatched identifiers survive only while their executable still exists on
/// disk (or when no path was recorded). Returns whether the theme changed, so
/// callers can skip a save.
pub fn refresh_theme_processes(theme: &mut Theme, live: &[ProcessInfo]) -> bool {
    let mut pids: Vec<u32> = Vec::new();
    let mut kept: Vec<PersistentProcessIdentifier> = Vec::new();

    for identifier in &theme.persistent_processes {
        let patterned = identifier
            .title_pattern
            .as_deref()
            .is_some_and(|p| !p.is_empty());
        let matched: Vec<u32> = live
            .iter()
            .filter(|p| identifier_matches_process(identifier, p))
            .filter(|p| !patterned || p.windows.iter().any(|w| title_matches(identifier, &w.title)))
            .map(|p| p.id)
            .collect();

        if matched.is_empty() {
            let launchable = identifier
                .executable_path
                .as_deref()
                .is_none_or(|path| Path::new(path).exists());
            if !launchable {
                debug!(
                    event = "core.identity.identifier_dropped",
                    theme_id = %theme.id,
                    executable = %identifier.executable_name
                );
                continue;
            }
        }

        for pid in matched {
            if !pids.contains(&pid) {
                pids.push(pid);
            }
        }
        kept.push(identifier.clone());
    }

    let owners = theme.window_owner_pids();
    pids.retain(|pid| !owners.contains(pid));

    let changed = pids != theme.processes || kept != theme.persistent_processes;
    if changed {
        theme.processes = pids;
        theme.persistent_processes = kept;
    }
    changed
}

/// Give each live process to the theme whose identifiers describe it best.
///
/// A name match scores 1 and a title-pattern hit on one of its windows adds
/// 10. Ties go to the earlier theme. Returns `(theme_id, pid)` pairs.
pub fn assign_processes_to_themes(themes: &[Theme], live: &[ProcessInfo]) -> Vec<(String, u32)> {
    let mut assignments = Vec::new();

    for process in live {
        let mut best: Option<(&str, u32)> = None;
        for theme in themes {
            let score = theme
                .persistent_processes
                .iter()
                .filter(|id| identifier_matches_process(id, process))
                .map(|id| {
                    let title_hit = id.title_pattern.as_deref().is_some_and(|p| !p.is_empty())
                        && process.windows.iter().any(|w| title_matches(id, &w.title));
                    if title_hit { 11 } else { 1 }
                })
                .max()
                .unwrap_or(0);

            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((&theme.id, score));
            }
        }
        if let Some((theme_id, _)) = best {
            assignments.push((theme_id.to_string(), process.id));
        }
    }

    assignments
}
