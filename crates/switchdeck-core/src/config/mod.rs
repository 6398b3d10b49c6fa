//! # Configuration System
//!
//! Hierarchical TOML configuration.
//!
//! ```toml
//! # ~/.switchdeck/config.toml
//! [enumeration]
//! timeout_ms = 5000
//!
//! [minimize]
//! extra_skipped_classes = ["RainmeterMeterWindow"]
//! ```
//!
//! ```rust,no_run
//! use switchdeck_core::config::SwitchdeckConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SwitchdeckConfig::load_hierarchy()?;
//!     println!("{}", config.themes_file().display());
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

use std::path::PathBuf;

pub use loading::{CONFIG_ENV_VAR, THEMES_FILE_ENV_VAR, switchdeck_dir};
pub use types::{EnumerationConfig, MinimizeConfig, ShellConfig, StorageConfig, SwitchdeckConfig};
pub use validation::validate_config;

impl SwitchdeckConfig {
    /// See [`loading::load_hierarchy`].
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }

    /// See [`loading::themes_file_path`].
    pub fn themes_file(&self) -> PathBuf {
        loading::themes_file_path(self)
    }

    pub fn enumeration_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.enumeration.timeout_ms())
    }
}
