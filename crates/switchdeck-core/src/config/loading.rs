//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.switchdeck/config.toml`
//! 3. **Explicit config** - the file named by `SWITCHDECK_CONFIG`, if set

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::types::{
    EnumerationConfig, MinimizeConfig, ShellConfig, StorageConfig, SwitchdeckConfig,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

/// Environment variable naming an extra config file.
pub const CONFIG_ENV_VAR: &str = "SWITCHDECK_CONFIG";

/// Environment variable overriding the themes file location.
pub const THEMES_FILE_ENV_VAR: &str = "SWITCHDECK_THEMES_FILE";

/// Directory under the user's home holding config and data.
pub fn switchdeck_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".switchdeck"),
        None => PathBuf::from(".switchdeck"),
    }
}

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed,
/// or if the merged configuration fails validation. Missing files are not errors.
pub fn load_hierarchy() -> Result<SwitchdeckConfig, ConfigError> {
    let mut paths = vec![switchdeck_dir().join("config.toml")];
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(explicit));
    }
    load_from_paths(&paths)
}

/// Load and merge the given config files in order, skipping missing ones.
pub fn load_from_paths(paths: &[PathBuf]) -> Result<SwitchdeckConfig, ConfigError> {
    let mut config = SwitchdeckConfig::default();

    for path in paths {
        match load_config_file(path) {
            Ok(file_config) => config = merge_configs(config, file_config),
            Err(ConfigError::ConfigNotFound { .. }) => {
                tracing::debug!(
                    event = "core.config.file_not_found",
                    path = %path.display()
                );
            }
            Err(e) => return Err(e),
        }
    }

    validate_config(&config)?;
    Ok(config)
}

/// Load a single configuration file.
pub fn load_config_file(path: &Path) -> Result<SwitchdeckConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(ConfigError::IoError { source: e }),
    };

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Scalars come from the override only when it sets them. List fields are
/// concatenated without duplicates so a later file can only add noise
/// titles or classes.
pub fn merge_configs(base: SwitchdeckConfig, override_config: SwitchdeckConfig) -> SwitchdeckConfig {
    SwitchdeckConfig {
        shell: ShellConfig {
            program: override_config.shell.program.or(base.shell.program),
            args: override_config.shell.args.or(base.shell.args),
            byte_order_mark: override_config
                .shell
                .byte_order_mark
                .or(base.shell.byte_order_mark),
        },
        enumeration: EnumerationConfig {
            timeout_ms: override_config
                .enumeration
                .timeout_ms
                .or(base.enumeration.timeout_ms),
            extra_noise_titles: merge_lists(
                base.enumeration.extra_noise_titles,
                override_config.enumeration.extra_noise_titles,
            ),
            extra_relevant_processes: merge_lists(
                base.enumeration.extra_relevant_processes,
                override_config.enumeration.extra_relevant_processes,
            ),
        },
        minimize: MinimizeConfig {
            extra_skipped_classes: merge_lists(
                base.minimize.extra_skipped_classes,
                override_config.minimize.extra_skipped_classes,
            ),
            fallback_to_process_minimize: override_config
                .minimize
                .fallback_to_process_minimize
                .or(base.minimize.fallback_to_process_minimize),
        },
        storage: StorageConfig {
            themes_file: override_config
                .storage
                .themes_file
                .or(base.storage.themes_file),
        },
    }
}

fn merge_lists(mut base: Vec<String>, extra: Vec<String>) -> Vec<String> {
    for item in extra {
        if !base.contains(&item) {
            base.push(item);
        }
    }
    base
}

/// Resolve the themes file path.
///
/// Resolution order: `SWITCHDECK_THEMES_FILE`, then `storage.themes_file`,
/// then `~/.switchdeck/themes.json`.
pub fn themes_file_path(config: &SwitchdeckConfig) -> PathBuf {
    if let Some(path) = std::env::var_os(THEMES_FILE_ENV_VAR) {
        return PathBuf::from(path);
    }
    config
        .storage
        .themes_file
        .clone()
        .unwrap_or_else(|| switchdeck_dir().join("themes.json"))
}
