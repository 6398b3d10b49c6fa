//! Desktop access through PowerShell scripts.
//!
//! Each call runs one script through [`crate::shell::run_script`]. Scripts
//! print one compact JSON object per line; lines that fail to parse are
//! skipped, so a process vanishing mid-enumeration costs one entry, not the list.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::DesktopBackend;
use crate::config::SwitchdeckConfig;
use crate::desktop::errors::DesktopError;
use crate::desktop::types::{RawProcess, RawWindow};
use crate::shell::{ScriptHost, run_script};

const SW_MINIMIZE: i32 = 6;
const SW_RESTORE: i32 = 9;

const WIN32_TYPE: &str = r#"
Add-Type @"
using System;
using System.Text;
using System.Runtime.InteropServices;
public static class SwitchdeckUser32 {
    public delegate bool EnumWindowsProc(IntPtr hWnd, IntPtr lParam);
    [DllImport("user32.dll")] public static extern bool EnumWindows(EnumWindowsProc cb, IntPtr lParam);
    [DllImport("user32.dll", CharSet = CharSet.Unicode)] public static extern int GetWindowText(IntPtr hWnd, StringBuilder text, int count);
    [DllImport("user32.dll", CharSet = CharSet.Unicode)] public static extern int GetClassName(IntPtr hWnd, StringBuilder text, int count);
    [DllImport("user32.dll")] public static extern bool IsWindowVisible(IntPtr hWnd);
    [DllImport("user32.dll")] public static extern bool IsIconic(IntPtr hWnd);
    [DllImport("user32.dll")] public static extern IntPtr GetParent(IntPtr hWnd);
    [DllImport("user32.dll")] public static extern uint GetWindowThreadProcessId(IntPtr hWnd, out uint pid);
    [DllImport("user32.dll")] public static extern bool ShowWindow(IntPtr hWnd, int cmd);
}
"@
"#;

const LIST_WINDOWS: &str = r#"
$handles = New-Object System.Collections.Generic.List[IntPtr]
[SwitchdeckUser32]::EnumWindows({ param($h, $l) $handles.Add($h); $true }, [IntPtr]::Zero) | Out-Null
foreach ($h in $handles) {
    $title = New-Object System.Text.StringBuilder 512
    [SwitchdeckUser32]::GetWindowText($h, $title, 512) | Out-Null
    $class = New-Object System.Text.StringBuilder 256
    [SwitchdeckUser32]::GetClassName($h, $class, 256) | Out-Null
    $procId = [uint32]0
    [SwitchdeckUser32]::GetWindowThreadProcessId($h, [ref]$procId) | Out-Null
    [pscustomobject]@{
        hwnd = $h.ToInt64()
        processId = $procId
        title = $title.ToString()
        className = $class.ToString()
        visible = [SwitchdeckUser32]::IsWindowVisible($h)
        minimized = [SwitchdeckUser32]::IsIconic($h)
        hasParent = ([SwitchdeckUser32]::GetParent($h) -ne [IntPtr]::Zero)
    } | ConvertTo-Json -Compress
}
"#;

const LIST_PROCESSES: &str = r#"
Get-CimInstance Win32_Process | ForEach-Object {
    [pscustomobject]@{
        id = $_.ProcessId
        parentId = $_.ParentProcessId
        name = $_.Name
        path = $_.ExecutablePath
    } | ConvertTo-Json -Compress
}
"#;

/// Wrap a script body so any error terminates with a non-zero exit code.
pub fn wrap_script(body: &str) -> String {
    format!(
        "[Console]::OutputEncoding = [System.Text.Encoding]::UTF8\n\
         $ErrorActionPreference = \"Stop\"\n\
         try {{\n{body}\n}} catch {{\n    Write-Error $_\n    exit 1\n}}\n"
    )
}

/// Render a handle list as a PowerShell array literal.
fn handle_array(hwnds: &[u64]) -> String {
    let items: Vec<String> = hwnds.iter().map(|h| h.to_string()).collect();
    format!("@({})", items.join(", "))
}

pub fn show_window_script(hwnds: &[u64], command: i32) -> String {
    format!(
        "{WIN32_TYPE}\nforeach ($h in {}) {{\n    [SwitchdeckUser32]::ShowWindow([IntPtr][int64]$h, {command}) | Out-Null\n}}\n",
        handle_array(hwnds)
    )
}

pub fn minimize_main_window_script(pid: u32) -> String {
    format!(
        "{WIN32_TYPE}\n$p = Get-Process -Id {pid}\n\
         if ($p.MainWindowHandle -eq [IntPtr]::Zero) {{ 'false' }} else {{\n    \
         [SwitchdeckUser32]::ShowWindow($p.MainWindowHandle, {SW_MINIMIZE}) | Out-Null\n    'true'\n}}\n"
    )
}

/// Parse one JSON object per line, skipping anything that does not parse.
pub fn parse_json_lines<T: DeserializeOwned>(output: &str) -> Vec<T> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(
                    event = "core.desktop.output_line_skipped",
                    line = %line,
                    error = %e
                );
                None
            }
        })
        .collect()
}

pub struct ScriptedBackend {
    host: ScriptHost,
    enumeration_timeout: Duration,
}

impl ScriptedBackend {
    pub fn new(host: ScriptHost, enumeration_timeout: Duration) -> Self {
        Self {
            host,
            enumeration_timeout,
        }
    }

    pub fn from_config(config: &SwitchdeckConfig) -> Self {
        Self::new(
            ScriptHost::from_config(&config.shell),
            config.enumeration_timeout(),
        )
    }

    fn run(&self, body: &str, timeout: Option<Duration>) -> Result<String, DesktopError> {
        Ok(run_script(&self.host, &wrap_script(body), timeout)?)
    }
}

impl DesktopBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn processes(&self) -> Result<Vec<RawProcess>, DesktopError> {
        let output = self.run(LIST_PROCESSES, Some(self.enumeration_timeout))?;
        Ok(parse_json_lines(&output))
    }

    fn windows(&self) -> Result<Vec<RawWindow>, DesktopError> {
        let body = format!("{WIN32_TYPE}\n{LIST_WINDOWS}");
        let output = self.run(&body, Some(self.enumeration_timeout))?;
        Ok(parse_json_lines(&output))
    }

    fn minimize_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError> {
        if hwnds.is_empty() {
            return Ok(());
        }
        self.run(&show_window_script(hwnds, SW_MINIMIZE), None)?;
        Ok(())
    }

    fn restore_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError> {
        if hwnds.is_empty() {
            return Ok(());
        }
        self.run(&show_window_script(hwnds, SW_RESTORE), None)?;
        Ok(())
    }

    fn minimize_main_window(&self, pid: u32) -> Result<bool, DesktopError> {
        let output = self.run(&minimize_main_window_script(pid), None)?;
        match output.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(DesktopError::MalformedOutput {
                message: format!("unexpected minimize result '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_lines_skips_garbage() {
        let output = "\r\n{\"id\":10,\"parentId\":4,\"name\":\"chrome.exe\",\"path\":\"C:\\\\chrome.exe\"}\r\n\
                      WARNING: something odd\r\n\
                      {\"id\":11,\"parentId\":10,\"name\":\"chrome.exe\",\"path\":null}\r\n";
        let processes: Vec<RawProcess> = parse_json_lines(output);
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[0].path.as_deref(), Some("C:\\chrome.exe"));
        assert_eq!(processes[1].parent_id, Some(10));
    }

    #[test]
    fn test_wrap_script_stops_on_error() {
        let script = wrap_script("Get-Thing");
        assert!(script.contains("$ErrorActionPreference = \"Stop\""));
        assert!(script.contains("try {\nGet-Thing\n}"));
        assert!(script.contains("exit 1"));
    }

    #[test]
    fn test_show_window_script_lists_handles() {
        let script = show_window_script(&[131_072, 262_144], SW_RESTORE);
        assert!(script.contains("foreach ($h in @(131072, 262144))"));
        assert!(script.contains("[int64]$h, 9)"));
    }

    #[test]
    fn test_minimize_main_window_script_targets_pid() {
        let script = minimize_main_window_script(4242);
        assert!(script.contains("Get-Process -Id 4242"));
        assert!(script.contains(", 6)"));
    }

    #[test]
    fn test_empty_handle_lists_do_not_spawn() {
        let backend = ScriptedBackend::new(
            ScriptHost::new("switchdeck-missing-host", &[]),
            Duration::from_secs(1),
        );
        assert!(backend.minimize_windows(&[]).is_ok());
        assert!(backend.restore_windows(&[]).is_ok());
        assert!(backend.windows().is_err());
    }
}
