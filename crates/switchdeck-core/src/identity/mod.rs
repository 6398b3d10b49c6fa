//! Durable identities for applications whose pids and window handles change
//! across restarts.

pub mod escape;
pub mod operations;
pub mod types;

pub use escape::{escape_title, unescape_title};
pub use operations::{
    assign_processes_to_themes, create_identifier, identifier_matches_process, match_process,
    match_window, refresh_theme_processes, restore_window_handles, title_matches,
};
pub use types::PersistentProcessIdentifier;
