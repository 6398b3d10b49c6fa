use std::collections::HashMap;

use tracing::{debug, warn};

use crate::shortcuts::errors::ShortcutError;
use crate::themes::types::Theme;

/// Canonical form used as the registry key: parts trimmed and lower-cased,
/// joined with `+`.
pub fn normalize_shortcut(shortcut: &str) -> String {
    shortcut
        .split('+')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("+")
}

/// Normalized shortcut to theme id. Owned by the host context.
#[derive(Debug, Default, Clone)]
pub struct ShortcutRegistry {
    bindings: HashMap<String, String>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `shortcut` to `theme_id`. Rebinding to the same theme is a no-op.
    pub fn register(&mut self, shortcut: &str, theme_id: &str) -> Result<(), ShortcutError> {
        let key = normalize_shortcut(shortcut);
        if key.is_empty() {
            return Err(ShortcutError::Empty);
        }
        if let Some(existing) = self.bindings.get(&key)
            && existing != theme_id
        {
            return Err(ShortcutError::Conflict {
                shortcut: key,
                theme_id: existing.clone(),
            });
        }
        debug!(event = "core.shortcuts.registered", shortcut = %key, theme_id);
        self.bindings.insert(key, theme_id.to_string());
        Ok(())
    }

    pub fn unregister(&mut self, shortcut: &str) -> Option<String> {
        self.bindings.remove(&normalize_shortcut(shortcut))
    }

    /// Drop every binding that points at `theme_id`.
    pub fn unregister_theme(&mut self, theme_id: &str) {
        self.bindings.retain(|_, id| id != theme_id);
    }

    pub fn theme_for(&self, shortcut: &str) -> Option<&str> {
        self.bindings
            .get(&normalize_shortcut(shortcut))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Rebuild from the themes' shortcuts. The first theme wins a contested
    /// shortcut; later ones are logged and left unbound.
    pub fn sync_from_themes(&mut self, themes: &[Theme]) {
        self.bindings.clear();
        for theme in themes.iter().filter(|t| !t.shortcut.trim().is_empty()) {
            if let Err(e) = self.register(&theme.shortcut, &theme.id) {
                warn!(
                    event = "core.shortcuts.sync_conflict",
                    theme_id = %theme.id,
                    error = %e
                );
            }
        }
    }
}
