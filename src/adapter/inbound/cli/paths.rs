//! Path utilities for keygrab.
//!
//! All data lives under `~/.keygrab/`:
//! - `~/.keygrab/config.toml` - main configuration
//! - `~/.keygrab/tasks.json` - tracked tasks
//! - `~/.keygrab/settings.json` - interval and default percentage from the console
//! - `~/.keygrab/token` - access token saved from the console

use std::path::{Path, PathBuf};

use crate::infrastructure::config::settings::{expand_home, Config};

/// Returns the keygrab home directory (`~/.keygrab/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".keygrab")
}

/// Returns the default config file path (`~/.keygrab/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default task file path (`~/.keygrab/tasks.json`).
pub fn default_store() -> PathBuf {
    home_dir().join("tasks.json")
}

/// Task file to use: the CLI override, else `[store] path`, else the default.
pub fn store_path(config: &Config, cli_override: Option<&Path>) -> PathBuf {
    cli_override
        .or(config.store.path.as_deref())
        .map_or_else(default_store, expand_home)
}

/// Returns the default settings file path (`~/.keygrab/settings.json`).
pub fn default_settings() -> PathBuf {
    home_dir().join("settings.json")
}

/// Settings file to use: `[store] settings_path`, else the default.
pub fn settings_path(config: &Config) -> PathBuf {
    config
        .store
        .settings_path
        .as_deref()
        .map_or_else(default_settings, expand_home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_keygrab_home() {
        assert!(home_dir().to_string_lossy().contains(".keygrab"));
        assert!(default_config().ends_with(".keygrab/config.toml"));
        assert!(default_store().ends_with(".keygrab/tasks.json"));
        assert!(default_settings().ends_with(".keygrab/settings.json"));
    }

    #[test]
    fn settings_path_follows_config() {
        let mut config = Config::default();
        assert_eq!(settings_path(&config), default_settings());

        config.store.settings_path = Some(PathBuf::from("/data/settings.json"));
        assert_eq!(settings_path(&config), PathBuf::from("/data/settings.json"));
    }

    #[test]
    fn store_path_prefers_cli_then_config() {
        let mut config = Config::default();
        assert_eq!(store_path(&config, None), default_store());

        config.store.path = Some(PathBuf::from("/data/tasks.json"));
        assert_eq!(store_path(&config, None), PathBuf::from("/data/tasks.json"));
        assert_eq!(
            store_path(&config, Some(Path::new("/tmp/other.json"))),
            PathBuf::from("/tmp/other.json")
        );
    }
}
