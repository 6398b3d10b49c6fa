//! In-memory backend that records every mutating call.

use std::sync::{Arc, Mutex};

use super::DesktopBackend;
use crate::desktop::errors::DesktopError;
use crate::desktop::types::{RawProcess, RawWindow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Minimize(Vec<u64>),
    Restore(Vec<u64>),
    MinimizeMain(u32),
}

#[derive(Default)]
pub struct FakeBackend {
    pub processes: Vec<RawProcess>,
    pub windows: Vec<RawWindow>,
    pub fail_enumeration: bool,
    pub fail_minimize: bool,
    /// Pids whose main-window minimize reports `false`.
    pub no_main_window: Vec<u32>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(mut self, id: u32, parent: Option<u32>, name: &str, path: Option<&str>) -> Self {
        self.processes.push(RawProcess {
            id,
            parent_id: parent,
            name: name.to_string(),
            path: path.map(str::to_string),
        });
        self
    }

    pub fn with_window(mut self, hwnd: u64, pid: u32, title: &str, class_name: &str) -> Self {
        self.windows.push(RawWindow {
            hwnd,
            process_id: pid,
            title: title.to_string(),
            class_name: class_name.to_string(),
            visible: true,
            minimized: false,
            has_parent: false,
        });
        self
    }

    pub fn with_raw_window(mut self, window: RawWindow) -> Self {
        self.windows.push(window);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn failure(operation: &str) -> DesktopError {
        DesktopError::OsCallFailed {
            operation: operation.to_string(),
            message: "simulated failure".to_string(),
        }
    }
}

impl DesktopBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn processes(&self) -> Result<Vec<RawProcess>, DesktopError> {
        if self.fail_enumeration {
            return Err(Self::failure("processes"));
        }
        Ok(self.processes.clone())
    }

    fn windows(&self) -> Result<Vec<RawWindow>, DesktopError> {
        if self.fail_enumeration {
            return Err(Self::failure("windows"));
        }
        Ok(self.windows.clone())
    }

    fn minimize_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError> {
        self.record(Call::Minimize(hwnds.to_vec()));
        if self.fail_minimize {
            return Err(Self::failure("minimize"));
        }
        Ok(())
    }

    fn restore_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError> {
        self.record(Call::Restore(hwnds.to_vec()));
        Ok(())
    }

    fn minimize_main_window(&self, pid: u32) -> Result<bool, DesktopError> {
        self.record(Call::MinimizeMain(pid));
        if self.fail_minimize {
            return Err(Self::failure("minimize_main_window"));
        }
        Ok(!self.no_main_window.contains(&pid))
    }
}

/// Lets a test keep a handle on the fake after boxing it into a store.
impl DesktopBackend for Arc<FakeBackend> {
    fn name(&self) -> &'static str {
        self.as_ref().name()
    }

    fn processes(&self) -> Result<Vec<RawProcess>, DesktopError> {
        self.as_ref().processes()
    }

    fn windows(&self) -> Result<Vec<RawWindow>, DesktopError> {
        self.as_ref().windows()
    }

    fn minimize_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError> {
        self.as_ref().minimize_windows(hwnds)
    }

    fn restore_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError> {
        self.as_ref().restore_windows(hwnds)
    }

    fn minimize_main_window(&self, pid: u32) -> Result<bool, DesktopError> {
        self.as_ref().minimize_main_window(pid)
    }
}
