//! Default values for configuration types.
//!
//! Config fields are optional so that layered files merge key by key; the
//! accessors here resolve an unset field to its default.

use crate::config::types::{EnumerationConfig, MinimizeConfig, ShellConfig};

pub fn default_shell_program() -> String {
    "powershell.exe".to_string()
}

pub fn default_shell_args() -> Vec<String> {
    ["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_byte_order_mark() -> bool {
    true
}

/// Returns the default enumeration timeout (10s).
///
/// Cold PowerShell startup alone can take a couple of seconds on a loaded
/// machine, so anything much lower produces spurious empty lists.
pub fn default_enumeration_timeout_ms() -> u64 {
    10_000
}

pub fn default_fallback_to_process_minimize() -> bool {
    true
}

impl ShellConfig {
    /// Returns the script host program, defaulting to `powershell.exe`.
    pub fn program(&self) -> String {
        self.program.clone().unwrap_or_else(default_shell_program)
    }

    pub fn args(&self) -> Vec<String> {
        self.args.clone().unwrap_or_else(default_shell_args)
    }

    pub fn byte_order_mark(&self) -> bool {
        self.byte_order_mark.unwrap_or_else(default_byte_order_mark)
    }
}

impl EnumerationConfig {
    /// Returns the enumeration timeout in milliseconds, defaulting to 10000.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or_else(default_enumeration_timeout_ms)
    }
}

impl MinimizeConfig {
    pub fn fallback_to_process_minimize(&self) -> bool {
        self.fallback_to_process_minimize
            .unwrap_or_else(default_fallback_to_process_minimize)
    }
}
