use crate::errors::{ConfigError, SwitchdeckError};
use crate::minimize::errors::MinimizeError;
use crate::shortcuts::errors::ShortcutError;
use crate::themes::errors::ThemeError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error(transparent)]
    Minimize(#[from] MinimizeError),
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Process '{pid}' is not running")]
    ProcessNotFound { pid: u32 },
}

impl SwitchdeckError for DispatchError {
    fn error_code(&self) -> &'static str {
        match self {
            DispatchError::Theme(e) => e.error_code(),
            DispatchError::Minimize(e) => e.error_code(),
            DispatchError::Shortcut(e) => e.error_code(),
            DispatchError::Config(e) => e.error_code(),
            DispatchError::ProcessNotFound { .. } => "PROCESS_NOT_FOUND",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            DispatchError::Theme(e) => e.is_user_error(),
            DispatchError::Minimize(e) => e.is_user_error(),
            DispatchError::Shortcut(e) => e.is_user_error(),
            DispatchError::Config(e) => e.is_user_error(),
            DispatchError::ProcessNotFound { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_from_theme_error() {
        let dispatch_err = DispatchError::from(ThemeError::NotFound {
            id: "7".to_string(),
        });
        assert_eq!(dispatch_err.error_code(), "THEME_NOT_FOUND");
        assert!(dispatch_err.is_user_error());
        assert_eq!(dispatch_err.to_string(), "Theme '7' not found");
    }

    #[test]
    fn test_dispatch_error_from_minimize_error() {
        let dispatch_err = DispatchError::from(MinimizeError::InvalidArgument {
            message: "empty".to_string(),
        });
        assert_eq!(dispatch_err.error_code(), "MINIMIZE_INVALID_ARGUMENT");
        assert!(dispatch_err.is_user_error());
    }

    #[test]
    fn test_dispatch_error_from_save_failure() {
        let dispatch_err = DispatchError::from(ThemeError::SaveFailed {
            message: "disk full".to_string(),
        });
        assert!(!dispatch_err.is_user_error());
    }
}
