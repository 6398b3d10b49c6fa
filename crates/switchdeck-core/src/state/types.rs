use serde::{Deserialize, Serialize};

use crate::desktop::types::WindowInfo;
use crate::minimize::types::AppRef;
use crate::themes::types::Theme;

/// All operations a host can dispatch through the store.
///
/// Commands use owned types so they can be serialized and sent across a
/// process boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Create a theme. Its id is generated from the current time.
    AddTheme {
        name: String,
        shortcut: Option<String>,
        color: Option<String>,
    },
    /// Update a theme's metadata. Empty membership lists keep the stored ones.
    UpdateTheme { theme: Theme },
    DeleteTheme { id: String },
    /// Replace the whole theme list, merging with stored membership.
    SetThemes { themes: Vec<Theme> },
    /// Add windows to a theme; owners are looked up in a live snapshot.
    AddWindowsToTheme { id: String, windows: Vec<WindowInfo> },
    RemoveWindowsFromTheme { id: String, hwnds: Vec<u64> },
    /// Track a running process as a whole.
    AddProcessToTheme { id: String, pid: u32 },
    RemoveProcessFromTheme {
        id: String,
        pid: u32,
        /// Also forget every identifier for this executable.
        name: Option<String>,
    },
    /// Keep a theme's applications on screen and minimize everything else.
    ActivateTheme { id: String },
    /// Activate whichever theme the shortcut is bound to.
    ActivateShortcut { shortcut: String },
    ShowDesktopExcept { apps: Vec<AppRef> },
    MinimizeProcesses { pids: Vec<u32> },
    /// Re-resolve every theme against the running processes and windows.
    RestoreThemes,
    ClearAllData,
    SetCompactMode { enabled: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serde_roundtrip() {
        let cmd = Command::ShowDesktopExcept {
            apps: vec![AppRef::Window(200_001), AppRef::Process(42)],
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let deserialized: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, deserialized);
    }

    #[test]
    fn test_all_command_variants_serialize() {
        let commands = vec![
            Command::AddTheme {
                name: "Work".to_string(),
                shortcut: Some("Ctrl+1".to_string()),
                color: None,
            },
            Command::UpdateTheme {
                theme: Theme::new("1", "Work"),
            },
            Command::DeleteTheme {
                id: "1".to_string(),
            },
            Command::SetThemes { themes: vec![] },
            Command::AddWindowsToTheme {
                id: "1".to_string(),
                windows: vec![WindowInfo {
                    hwnd: 5,
                    process_id: 10,
                    title: "GitHub".to_string(),
                }],
            },
            Command::RemoveWindowsFromTheme {
                id: "1".to_string(),
                hwnds: vec![5],
            },
            Command::AddProcessToTheme {
                id: "1".to_string(),
                pid: 10,
            },
            Command::RemoveProcessFromTheme {
                id: "1".to_string(),
                pid: 10,
                name: Some("chrome".to_string()),
            },
            Command::ActivateTheme {
                id: "1".to_string(),
            },
            Command::ActivateShortcut {
                shortcut: "ctrl+1".to_string(),
            },
            Command::ShowDesktopExcept { apps: vec![] },
            Command::MinimizeProcesses { pids: vec![1, 2] },
            Command::RestoreThemes,
            Command::ClearAllData,
            Command::SetCompactMode { enabled: true },
        ];
        for cmd in commands {
            let json = serde_json::to_string(&cmd).unwrap();
            let deserialized: Command = serde_json::from_str(&json).unwrap();
            assert_eq!(cmd, deserialized);
        }
    }
}
