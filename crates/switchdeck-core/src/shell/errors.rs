use crate::errors::SwitchdeckError;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Failed to write script file: {source}")]
    ScriptWriteFailed { source: std::io::Error },

    #[error("Failed to start script host '{program}': {source}")]
    SpawnFailed {
        program: String,
        source: std::io::Error,
    },

    #[error("Script exited with code {}: {stderr}", exit_code_label(.exit_code))]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Script did not finish within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("IO error while running script: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "<signal>".to_string(),
    }
}

impl SwitchdeckError for ShellError {
    fn error_code(&self) -> &'static str {
        match self {
            ShellError::ScriptWriteFailed { .. } => "SHELL_SCRIPT_WRITE_FAILED",
            ShellError::SpawnFailed { .. } => "SHELL_SPAWN_FAILED",
            ShellError::ExecutionFailed { .. } => "SHELL_EXECUTION_FAILED",
            ShellError::Timeout { .. } => "SHELL_TIMEOUT",
            ShellError::IoError { .. } => "SHELL_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ShellError::SpawnFailed { .. })
    }
}
