//! Theme store: named groups of applications and their durable file.

pub mod errors;
pub mod persistence;
pub mod store;
pub mod types;

pub use errors::ThemeError;
pub use persistence::{LoadedThemes, backup_path, clear_theme_files, load_themes, save_themes};
pub use store::ThemeStore;
pub use types::Theme;
