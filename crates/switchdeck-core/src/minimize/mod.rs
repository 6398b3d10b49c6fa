//! Selective minimize: hide everything except a protected set of windows.

pub mod errors;
pub mod operations;
pub mod types;

pub use errors::MinimizeError;
pub use operations::{
    minimize_all_except, minimize_processes, plan_show_desktop, show_desktop_except,
    show_desktop_except_ids,
};
pub use types::{
    AppRef, LEGACY_WINDOW_HANDLE_THRESHOLD, MinimizeContext, MinimizePlan, SHELL_WINDOW_CLASSES,
};
