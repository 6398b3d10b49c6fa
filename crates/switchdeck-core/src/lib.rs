//! switchdeck-core: theme-based window focus management
//!
//! Groups of applications ("themes") are kept on screen while everything else
//! is minimized. Themes remember their applications by executable and window
//! title so they survive restarts.
//!
//! # Main Entry Points
//!
//! - [`state`] - `CoreStore`, the host context every command goes through
//! - [`desktop`] - Window and process enumeration, process tree
//! - [`minimize`] - Selective minimize engine
//! - [`identity`] - Persistent identifiers and reconciliation
//! - [`themes`] - Theme store and persistence
//! - [`config`] - Configuration management

pub mod config;
pub mod desktop;
pub mod errors;
pub mod events;
pub mod identity;
pub mod logging;
pub mod minimize;
pub mod shell;
pub mod shortcuts;
pub mod state;
pub mod themes;

// Re-export commonly used types at crate root for convenience
pub use config::SwitchdeckConfig;
pub use desktop::{DesktopBackend, ProcessInfo, WindowInfo};
pub use errors::{SwitchdeckError, SwitchdeckResult};
pub use identity::PersistentProcessIdentifier;
pub use minimize::{AppRef, MinimizeContext};
pub use shortcuts::ShortcutRegistry;
pub use state::{Command, CoreStore, DispatchError, Event, Store};
pub use themes::{Theme, ThemeStore};

// Re-export logging initialization
pub use logging::init_logging;
