pub mod errors;
pub mod registry;

pub use errors::ShortcutError;
pub use registry::{ShortcutRegistry, normalize_shortcut};
