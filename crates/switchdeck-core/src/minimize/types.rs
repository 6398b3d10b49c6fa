use serde::{Deserialize, Deserializer, Serialize};

use crate::config::MinimizeConfig;

/// Legacy data stored process ids and window handles in one numeric list;
/// values at or above this were window handles.
pub const LEGACY_WINDOW_HANDLE_THRESHOLD: u64 = 100_000;

/// A reference to something the user wants kept on screen.
///
/// Serialized as `{"kind":"window","id":N}`. Bare numbers and numeric
/// strings from older files are accepted and classified with
/// [`LEGACY_WINDOW_HANDLE_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum AppRef {
    Process(u32),
    Window(u64),
}

impl AppRef {
    pub fn from_legacy(id: u64) -> Self {
        if id >= LEGACY_WINDOW_HANDLE_THRESHOLD {
            AppRef::Window(id)
        } else {
            AppRef::Process(id as u32)
        }
    }

    pub fn window(&self) -> Option<u64> {
        match self {
            AppRef::Window(hwnd) => Some(*hwnd),
            AppRef::Process(_) => None,
        }
    }

    pub fn process(&self) -> Option<u32> {
        match self {
            AppRef::Process(pid) => Some(*pid),
            AppRef::Window(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
enum TaggedAppRef {
    Process(u32),
    Window(u64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AppRefRepr {
    Tagged(TaggedAppRef),
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for AppRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AppRefRepr::deserialize(deserializer)? {
            AppRefRepr::Tagged(TaggedAppRef::Process(pid)) => Ok(AppRef::Process(pid)),
            AppRefRepr::Tagged(TaggedAppRef::Window(hwnd)) => Ok(AppRef::Window(hwnd)),
            AppRefRepr::Number(id) => Ok(AppRef::from_legacy(id)),
            AppRefRepr::Text(text) => text
                .trim()
                .parse::<u64>()
                .map(AppRef::from_legacy)
                .map_err(|_| serde::de::Error::custom(format!("invalid application id '{text}'"))),
        }
    }
}

/// Window classes of the desktop and taskbar, never minimized.
pub const SHELL_WINDOW_CLASSES: &[&str] = &[
    "Progman",
    "WorkerW",
    "Shell_TrayWnd",
    "Shell_SecondaryTrayWnd",
    "DV2ControlHost",
    "SysListView32",
    "FolderView",
];

/// Host facts the minimize engine needs besides the protected set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimizeContext {
    /// Pid of the host application; its windows are always protected.
    pub own_pid: u32,
    pub skipped_classes: Vec<String>,
}

impl MinimizeContext {
    pub fn new(own_pid: u32) -> Self {
        Self {
            own_pid,
            skipped_classes: SHELL_WINDOW_CLASSES.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn from_config(config: &MinimizeConfig) -> Self {
        let mut ctx = Self::new(std::process::id());
        for class in &config.extra_skipped_classes {
            if !ctx.skipped_classes.contains(class) {
                ctx.skipped_classes.push(class.clone());
            }
        }
        ctx
    }

    pub fn is_skipped_class(&self, class_name: &str) -> bool {
        self.skipped_classes.iter().any(|c| c == class_name)
    }
}

/// What a single show-desktop pass will do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinimizePlan {
    pub minimize: Vec<u64>,
    pub restore: Vec<u64>,
    /// Windows left alone because of their class.
    pub skipped: usize,
}
