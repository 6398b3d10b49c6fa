use crate::config::ShellConfig;

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// An external interpreter that runs script files.
///
/// The script path is appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHost {
    pub program: String,
    pub args: Vec<String>,
    /// Prefix script files with [`UTF8_BOM`].
    pub byte_order_mark: bool,
    /// Script file extension without the dot.
    pub extension: String,
}

impl ScriptHost {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            byte_order_mark: false,
            extension: "sh".to_string(),
        }
    }

    /// Windows PowerShell, run without profile and with script execution allowed.
    pub fn powershell() -> Self {
        Self::from_config(&ShellConfig::default())
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            program: config.program(),
            args: config.args(),
            byte_order_mark: config.byte_order_mark(),
            extension: "ps1".to_string(),
        }
    }
}
