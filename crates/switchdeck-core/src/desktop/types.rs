use serde::{Deserialize, Serialize};

/// One running process as shown to the user.
///
/// `children` is filled only by [`crate::desktop::tree::build_tree`];
/// `windows` only by the merged processes-with-windows view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub id: u32,
    /// Lower-cased executable name without extension.
    pub name: String,
    /// Best-known window title, or a display name when the process has none.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ProcessInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<WindowInfo>,
}

impl ProcessInfo {
    pub fn new(id: u32, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            title: title.into(),
            path: None,
            parent_id: None,
            children: Vec::new(),
            windows: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_parent(mut self, parent_id: u32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_window(mut self, hwnd: u64, title: impl Into<String>) -> Self {
        self.windows.push(WindowInfo {
            hwnd,
            process_id: self.id,
            title: title.into(),
        });
        self
    }
}

/// One top-level window. `hwnd` is only meaningful until the window is recreated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub hwnd: u64,
    pub process_id: u32,
    pub title: String,
}

/// A process exactly as a backend reports it, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProcess {
    pub id: u32,
    #[serde(default)]
    pub parent_id: Option<u32>,
    /// Executable file name as reported, e.g. `Code.exe`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// A top-level window with the attributes needed for filtering and minimizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWindow {
    pub hwnd: u64,
    pub process_id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub class_name: String,
    pub visible: bool,
    #[serde(default)]
    pub minimized: bool,
    /// Window has a parent or owner window.
    #[serde(default)]
    pub has_parent: bool,
}

impl RawWindow {
    pub fn to_window_info(&self) -> WindowInfo {
        WindowInfo {
            hwnd: self.hwnd,
            process_id: self.process_id,
            title: self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_info_omits_empty_collections() {
        let process = ProcessInfo::new(42, "notepad", "Untitled - Notepad");
        let json = serde_json::to_value(&process).unwrap();
        assert!(json.get("children").is_none());
        assert!(json.get("windows").is_none());
        assert!(json.get("parentId").is_none());
        assert_eq!(json["name"], "notepad");
    }

    #[test]
    fn test_window_info_uses_camel_case() {
        let window = WindowInfo {
            hwnd: 131_072,
            process_id: 4,
            title: "GitHub".to_string(),
        };
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(json, r#"{"hwnd":131072,"processId":4,"title":"GitHub"}"#);
    }

    #[test]
    fn test_raw_window_from_script_line() {
        let line = r#"{"hwnd":197898,"processId":1200,"title":"Inbox","className":"Chrome_WidgetWin_1","visible":true,"minimized":false,"hasParent":false}"#;
        let window: RawWindow = serde_json::from_str(line).unwrap();
        assert_eq!(window.hwnd, 197_898);
        assert_eq!(window.class_name, "Chrome_WidgetWin_1");
        assert!(window.visible);
    }

    #[test]
    fn test_raw_process_tolerates_null_path() {
        let line = r#"{"id":4,"parentId":0,"name":"System","path":null}"#;
        let process: RawProcess = serde_json::from_str(line).unwrap();
        assert_eq!(process.path, None);
        assert_eq!(process.parent_id, Some(0));
    }
}
