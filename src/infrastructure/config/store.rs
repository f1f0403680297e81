//! Task and settings store configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// `[store]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Task list location. Defaults to `~/.keygrab/tasks.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Operator settings saved from the console. Defaults to
    /// `~/.keygrab/settings.json`.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
}
