//! Configuration surface of the theme package manager.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime options recognized by the manager.
///
/// Every field is optional; the accessor methods apply the documented
/// defaults, so a struct full of `None` behaves exactly like the default
/// configuration. Hosts can deserialize a partial options object from their
/// own config files and patch single options at runtime via
/// [`merge_from`](Self::merge_from).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeOptions {
    pub auto_load: Option<bool>,
    pub validate_on_load: Option<bool>,
    pub cache_enabled: Option<bool>,
    #[serde(rename = "cacheTimeout")]
    pub cache_timeout_ms: Option<u64>,
    pub fallback_package: Option<String>,
    pub strict_mode: Option<bool>,
}

impl ThemeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run auto-discovery and a full load at init (default: true).
    pub fn auto_load(&self) -> bool {
        self.auto_load.unwrap_or(true)
    }

    /// Re-run validation on every load (default: true).
    pub fn validate_on_load(&self) -> bool {
        self.validate_on_load.unwrap_or(true)
    }

    /// Memoize loaded packages (default: true).
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled.unwrap_or(true)
    }

    /// Default cache TTL (default: 5 minutes).
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms.unwrap_or(300_000))
    }

    /// Package id served when a requested id is absent (default: `light`).
    pub fn fallback_package(&self) -> &str {
        self.fallback_package.as_deref().unwrap_or("light")
    }

    /// Promote validation warnings to errors and disable the fallback
    /// package (default: false).
    pub fn strict_mode(&self) -> bool {
        self.strict_mode.unwrap_or(false)
    }

    /// Applies every `Some` field of `patch` on top of `self`; `None`
    /// fields leave the current value untouched.
    pub fn merge_from(&mut self, patch: ThemeOptions) {
        if patch.auto_load.is_some() {
            self.auto_load = patch.auto_load;
        }
        if patch.validate_on_load.is_some() {
            self.validate_on_load = patch.validate_on_load;
        }
        if patch.cache_enabled.is_some() {
            self.cache_enabled = patch.cache_enabled;
        }
        if patch.cache_timeout_ms.is_some() {
            self.cache_timeout_ms = patch.cache_timeout_ms;
        }
        if patch.fallback_package.is_some() {
            self.fallback_package = patch.fallback_package;
        }
        if patch.strict_mode.is_some() {
            self.strict_mode = patch.strict_mode;
        }
    }
}
