use crate::errors::SwitchdeckError;
use crate::shell::ShellError;

#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error("Window management is unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("{operation} failed: {message}")]
    OsCallFailed { operation: String, message: String },

    #[error("Malformed enumeration output: {message}")]
    MalformedOutput { message: String },
}

impl SwitchdeckError for DesktopError {
    fn error_code(&self) -> &'static str {
        match self {
            DesktopError::Shell(e) => e.error_code(),
            DesktopError::Unavailable { .. } => "DESKTOP_UNAVAILABLE",
            DesktopError::OsCallFailed { .. } => "DESKTOP_OS_CALL_FAILED",
            DesktopError::MalformedOutput { .. } => "DESKTOP_MALFORMED_OUTPUT",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            DesktopError::Shell(e) => e.is_user_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_error_delegates_code() {
        let err = DesktopError::from(ShellError::Timeout { timeout_ms: 50 });
        assert_eq!(err.error_code(), "SHELL_TIMEOUT");
        assert_eq!(err.to_string(), "Script did not finish within 50ms");
    }

    #[test]
    fn test_os_call_display() {
        let err = DesktopError::OsCallFailed {
            operation: "EnumWindows".to_string(),
            message: "access denied".to_string(),
        };
        assert_eq!(err.to_string(), "EnumWindows failed: access denied");
        assert_eq!(err.error_code(), "DESKTOP_OS_CALL_FAILED");
    }
}
