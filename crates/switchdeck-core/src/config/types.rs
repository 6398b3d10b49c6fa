//! Configuration type definitions.
//!
//! These types are deserialized from TOML config files.
//!
//! # Example Configuration
//!
//! ```toml
//! [shell]
//! program = "pwsh.exe"
//!
//! [enumeration]
//! timeout_ms = 5000
//! extra_noise_titles = ["Overlay"]
//! extra_relevant_processes = ["obsidian"]
//!
//! [minimize]
//! extra_skipped_classes = ["RainmeterMeterWindow"]
//! fallback_to_process_minimize = true
//!
//! [storage]
//! themes_file = "D:/sync/themes.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration loaded from TOML config files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SwitchdeckConfig {
    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub enumeration: EnumerationConfig,

    #[serde(default)]
    pub minimize: MinimizeConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Script host used by the scripted desktop backend.
///
/// Unset fields fall back to the defaults through the accessor methods, so
/// a later config file only overrides the keys it actually sets.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ShellConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Arguments placed before the script path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Prefix script files with a UTF-8 byte-order mark. Windows PowerShell
    /// reads BOM-less files in the legacy code page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_order_mark: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EnumerationConfig {
    /// Budget for a single process or window enumeration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Additional title fragments treated as noise.
    #[serde(default)]
    pub extra_noise_titles: Vec<String>,

    /// Additional normalized process names always considered relevant.
    #[serde(default)]
    pub extra_relevant_processes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MinimizeConfig {
    /// Window classes never minimized, in addition to the shell classes.
    #[serde(default)]
    pub extra_skipped_classes: Vec<String>,

    /// Minimize unprotected processes one by one when the desktop pass fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_to_process_minimize: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorageConfig {
    /// Override for the themes file location.
    #[serde(default)]
    pub themes_file: Option<PathBuf>,
}
