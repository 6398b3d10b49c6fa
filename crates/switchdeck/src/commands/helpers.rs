use tracing::{error, warn};

use switchdeck_core::{Command, CoreStore, Event, Store, SwitchdeckConfig, SwitchdeckError, events};

/// Load config, falling back to defaults with a warning on errors.
pub fn load_config_with_warning() -> SwitchdeckConfig {
    match SwitchdeckConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.switchdeck/config.toml and $SWITCHDECK_CONFIG for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            SwitchdeckConfig::default()
        }
    }
}

/// Open the themes file and desktop backend for this invocation.
pub fn open_store() -> CoreStore {
    let store = CoreStore::open(load_config_with_warning());
    if let Some(reason) = store.theme_store().load_error() {
        eprintln!(
            "Warning: themes file {} could not be read ({}). Using recovered data.",
            store.theme_store().path().display(),
            reason
        );
    }
    store
}

/// Dispatch a command, reporting failures on stderr.
pub fn dispatch_or_report(
    store: &mut CoreStore,
    cmd: Command,
    action: &str,
) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    match store.dispatch(cmd) {
        Ok(emitted) => Ok(emitted),
        Err(e) => {
            eprintln!("❌ Failed to {}: {}", action, e);
            error!(
                event = "cli.dispatch_failed",
                action = action,
                code = e.error_code(),
                error = %e
            );
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shorten a title for table output.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
