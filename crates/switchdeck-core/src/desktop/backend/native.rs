//! Direct Win32 bindings for window enumeration and ShowWindow calls.
//!
//! Process details come from `sysinfo`, which also reports parent pids and
//! executable paths.

use std::ffi::c_void;

use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GW_OWNER, GetClassNameW, GetParent, GetWindow, GetWindowTextW,
    GetWindowThreadProcessId, IsIconic, IsWindowVisible, SHOW_WINDOW_CMD, SW_MINIMIZE, SW_RESTORE,
    ShowWindow,
};

use super::DesktopBackend;
use crate::desktop::errors::DesktopError;
use crate::desktop::types::{RawProcess, RawWindow};

#[derive(Debug, Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }
}

fn to_hwnd(raw: u64) -> HWND {
    HWND(raw as usize as *mut c_void)
}

fn from_hwnd(hwnd: HWND) -> u64 {
    hwnd.0 as usize as u64
}

unsafe extern "system" fn collect_handle(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the &mut Vec<HWND> passed by `top_level_handles`,
    // alive for the whole EnumWindows call.
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<HWND>) };
    handles.push(hwnd);
    TRUE
}

fn top_level_handles() -> Result<Vec<HWND>, DesktopError> {
    let mut handles: Vec<HWND> = Vec::new();
    // SAFETY: the callback only pushes into `handles`, which outlives the call.
    unsafe {
        EnumWindows(
            Some(collect_handle),
            LPARAM(&mut handles as *mut Vec<HWND> as isize),
        )
    }
    .map_err(|e| DesktopError::OsCallFailed {
        operation: "EnumWindows".to_string(),
        message: e.to_string(),
    })?;
    Ok(handles)
}

fn window_text(hwnd: HWND) -> String {
    let mut buf = [0u16; 512];
    // SAFETY: buf is a valid writable buffer; the call truncates to its length.
    let len = unsafe { GetWindowTextW(hwnd, &mut buf) };
    String::from_utf16_lossy(&buf[..len.max(0) as usize])
}

fn class_name(hwnd: HWND) -> String {
    let mut buf = [0u16; 256];
    // SAFETY: as in `window_text`.
    let len = unsafe { GetClassNameW(hwnd, &mut buf) };
    String::from_utf16_lossy(&buf[..len.max(0) as usize])
}

fn owning_pid(hwnd: HWND) -> u32 {
    let mut pid = 0u32;
    // SAFETY: pid is a valid out pointer.
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
    pid
}

fn has_parent(hwnd: HWND) -> bool {
    // SAFETY: GetParent only reads window state; a stale handle yields an error.
    unsafe { GetParent(hwnd) }
        .map(|parent| !parent.is_invalid())
        .unwrap_or(false)
}

fn has_owner(hwnd: HWND) -> bool {
    // SAFETY: as in `has_parent`.
    unsafe { GetWindow(hwnd, GW_OWNER) }
        .map(|owner| !owner.is_invalid())
        .unwrap_or(false)
}

fn describe(hwnd: HWND) -> RawWindow {
    // SAFETY: both calls only query state of a handle EnumWindows just returned.
    let (visible, minimized) = unsafe { (IsWindowVisible(hwnd), IsIconic(hwnd)) };
    RawWindow {
        hwnd: from_hwnd(hwnd),
        process_id: owning_pid(hwnd),
        title: window_text(hwnd),
        class_name: class_name(hwnd),
        visible: visible.as_bool(),
        minimized: minimized.as_bool(),
        has_parent: has_parent(hwnd),
    }
}

fn show_all(hwnds: &[u64], command: SHOW_WINDOW_CMD) {
    for &raw in hwnds {
        // ShowWindow returns the previous visibility, not success.
        // SAFETY: ShowWindow tolerates handles that were destroyed since enumeration.
        let _ = unsafe { ShowWindow(to_hwnd(raw), command) };
    }
}

impl DesktopBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn processes(&self) -> Result<Vec<RawProcess>, DesktopError> {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let mut processes: Vec<RawProcess> = system
            .processes()
            .iter()
            .map(|(pid, process)| RawProcess {
                id: pid.as_u32(),
                parent_id: process.parent().map(|p| p.as_u32()),
                name: process.name().to_string_lossy().to_string(),
                path: process.exe().map(|p| p.display().to_string()),
            })
            .collect();
        processes.sort_by_key(|p| p.id);
        Ok(processes)
    }

    fn windows(&self) -> Result<Vec<RawWindow>, DesktopError> {
        let windows: Vec<RawWindow> = top_level_handles()?.into_iter().map(describe).collect();
        debug!(
            event = "core.desktop.native_windows_enumerated",
            count = windows.len()
        );
        Ok(windows)
    }

    fn minimize_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError> {
        show_all(hwnds, SW_MINIMIZE);
        Ok(())
    }

    fn restore_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError> {
        show_all(hwnds, SW_RESTORE);
        Ok(())
    }

    fn minimize_main_window(&self, pid: u32) -> Result<bool, DesktopError> {
        let main = top_level_handles()?.into_iter().find(|&hwnd| {
            // SAFETY: read-only query on a freshly enumerated handle.
            let visible = unsafe { IsWindowVisible(hwnd) }.as_bool();
            visible && owning_pid(hwnd) == pid && !has_owner(hwnd) && !window_text(hwnd).is_empty()
        });

        match main {
            Some(hwnd) => {
                show_all(&[from_hwnd(hwnd)], SW_MINIMIZE);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
