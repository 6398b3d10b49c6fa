use crate::config::types::SwitchdeckConfig;
use crate::errors::ConfigError;

/// Validate the merged configuration.
pub fn validate_config(config: &SwitchdeckConfig) -> Result<(), ConfigError> {
    if config.shell.program().trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "shell.program must not be empty".to_string(),
        });
    }

    if config.enumeration.timeout_ms() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "enumeration.timeout_ms must be greater than zero".to_string(),
        });
    }

    Ok(())
}
