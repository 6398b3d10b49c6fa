use crate::errors::SwitchdeckError;

#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error("Shortcut '{shortcut}' is already assigned to theme '{theme_id}'")]
    Conflict { shortcut: String, theme_id: String },

    #[error("Invalid shortcut: cannot be empty")]
    Empty,

    #[error("No theme is bound to shortcut '{shortcut}'")]
    NotBound { shortcut: String },
}

impl SwitchdeckError for ShortcutError {
    fn error_code(&self) -> &'static str {
        match self {
            ShortcutError::Conflict { .. } => "SHORTCUT_CONFLICT",
            ShortcutError::Empty => "SHORTCUT_EMPTY",
            ShortcutError::NotBound { .. } => "SHORTCUT_NOT_BOUND",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}
