//! Window and process discovery.

pub mod backend;
pub mod errors;
pub mod operations;
pub mod tree;
pub mod types;

pub use backend::{DesktopBackend, ScriptedBackend, UnavailableBackend, default_backend};
pub use errors::DesktopError;
pub use operations::{
    display_name, is_noise_title, is_relevant_process, list_processes, list_windows,
    normalize_process_name, processes_with_windows,
};
pub use tree::build_tree;
pub use types::{ProcessInfo, RawProcess, RawWindow, WindowInfo};
