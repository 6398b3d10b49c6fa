//! Runs scripts through an external script host (PowerShell by default).

pub mod errors;
pub mod operations;
pub mod types;

pub use errors::ShellError;
pub use operations::{run_script, write_script_file};
pub use types::{ScriptHost, UTF8_BOM};
