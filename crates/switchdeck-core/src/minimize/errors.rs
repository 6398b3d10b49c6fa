use crate::errors::SwitchdeckError;

#[derive(Debug, thiserror::Error)]
pub enum MinimizeError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl SwitchdeckError for MinimizeError {
    fn error_code(&self) -> &'static str {
        match self {
            MinimizeError::InvalidArgument { .. } => "MINIMIZE_INVALID_ARGUMENT",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, MinimizeError::InvalidArgument { .. })
    }
}
