use serde::{Deserialize, Serialize};

/// Restart-surviving reference to an application stored inside a theme.
///
/// `title_pattern` is kept in escaped form (see
/// [`crate::identity::escape_title`]) and unescaped before comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentProcessIdentifier {
    pub executable_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_pattern: Option<String>,
}

impl PersistentProcessIdentifier {
    /// Key under which identifiers must be unique within a theme.
    pub fn dedup_key(&self) -> (String, Option<String>) {
        (
            self.executable_name.to_lowercase(),
            self.title_pattern.clone().filter(|p| !p.is_empty()),
        )
    }
}
