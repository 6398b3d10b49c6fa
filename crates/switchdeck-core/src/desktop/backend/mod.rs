//! OS access behind a trait.
//!
//! Everything above this module works on [`RawProcess`] / [`RawWindow`]
//! snapshots and handle lists, so the enumerator and minimize engine are
//! testable without a desktop.

#[cfg(test)]
pub mod fake;
#[cfg(windows)]
pub mod native;
pub mod scripted;

use tracing::info;
#[cfg(not(windows))]
use tracing::warn;

use crate::config::SwitchdeckConfig;
use crate::desktop::errors::DesktopError;
use crate::desktop::types::{RawProcess, RawWindow};

pub use scripted::ScriptedBackend;

pub trait DesktopBackend: Send {
    /// Short identifier used in log events.
    fn name(&self) -> &'static str;

    /// Every process the OS reports, unfiltered.
    fn processes(&self) -> Result<Vec<RawProcess>, DesktopError>;

    /// Every top-level window, including invisible and owned ones.
    fn windows(&self) -> Result<Vec<RawWindow>, DesktopError>;

    fn minimize_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError>;

    /// Un-minimize the given windows. Focus is not changed.
    fn restore_windows(&self, hwnds: &[u64]) -> Result<(), DesktopError>;

    /// Minimize the main window of `pid`. `Ok(false)` when it has none.
    fn minimize_main_window(&self, pid: u32) -> Result<bool, DesktopError>;
}

/// Backend used when neither native bindings nor a script host exist.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> DesktopError {
        DesktopError::Unavailable {
            reason: self.reason.clone(),
        }
    }
}

impl DesktopBackend for UnavailableBackend {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn processes(&self) -> Result<Vec<RawProcess>, DesktopError> {
        Err(self.error())
    }

    fn windows(&self) -> Result<Vec<RawWindow>, DesktopError> {
        Err(self.error())
    }

    fn minimize_windows(&self, _hwnds: &[u64]) -> Result<(), DesktopError> {
        Err(self.error())
    }

    fn restore_windows(&self, _hwnds: &[u64]) -> Result<(), DesktopError> {
        Err(self.error())
    }

    fn minimize_main_window(&self, _pid: u32) -> Result<bool, DesktopError> {
        Err(self.error())
    }
}

/// Pick the best backend for this platform.
///
/// Native Win32 bindings on Windows; otherwise the scripted backend when the
/// configured script host is on `PATH`.
pub fn default_backend(config: &SwitchdeckConfig) -> Box<dyn DesktopBackend> {
    #[cfg(windows)]
    {
        let _ = config;
        info!(event = "core.desktop.backend_selected", backend = "native");
        Box::new(native::NativeBackend::new())
    }

    #[cfg(not(windows))]
    {
        let program = config.shell.program();
        match which::which(&program) {
            Ok(path) => {
                info!(
                    event = "core.desktop.backend_selected",
                    backend = "scripted",
                    host = %path.display()
                );
                Box::new(ScriptedBackend::from_config(config))
            }
            Err(e) => {
                warn!(
                    event = "core.desktop.backend_unavailable",
                    program = %program,
                    error = %e,
                    message = "No window management backend available on this platform"
                );
                Box::new(UnavailableBackend::new(format!(
                    "script host '{}' not found",
                    program
                )))
            }
        }
    }
}
