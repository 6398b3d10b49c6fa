use serde::{Deserialize, Serialize};

/// State changes produced by a dispatched command.
///
/// Each variant describes what happened. Failures go through the `Result`
/// error channel, never through events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ThemeAdded { id: String, name: String },
    ThemeUpdated { id: String },
    ThemeDeleted { id: String },
    ThemesReplaced { count: usize },
    /// `changed` is false when every window was already in the theme.
    WindowsAdded { theme_id: String, changed: bool },
    WindowsRemoved { theme_id: String, changed: bool },
    ProcessAdded { theme_id: String, pid: u32, changed: bool },
    ProcessRemoved { theme_id: String, pid: u32, changed: bool },
    /// A theme's window handles and pids were re-resolved and saved.
    ThemeRestored { id: String },
    ThemeActivated {
        id: String,
        protected: usize,
        success: bool,
        /// The per-process minimize fallback ran.
        fallback_used: bool,
    },
    DesktopShown {
        protected: usize,
        success: bool,
        fallback_used: bool,
    },
    ProcessesMinimized { count: usize, success: bool },
    ThemesRestored { updated: usize },
    DataCleared,
    CompactModeChanged { enabled: bool },
}
