use crate::errors::SwitchdeckError;

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Theme '{id}' not found")]
    NotFound { id: String },

    #[error("Invalid theme name: cannot be empty")]
    InvalidName,

    #[error("Failed to save themes: {message}")]
    SaveFailed { message: String },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl SwitchdeckError for ThemeError {
    fn error_code(&self) -> &'static str {
        match self {
            ThemeError::NotFound { .. } => "THEME_NOT_FOUND",
            ThemeError::InvalidName => "THEME_INVALID_NAME",
            ThemeError::SaveFailed { .. } => "THEME_SAVE_FAILED",
            ThemeError::IoError { .. } => "THEME_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ThemeError::NotFound { .. } | ThemeError::InvalidName)
    }
}
