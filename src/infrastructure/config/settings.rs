//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; the marketplace access token is
//! never read from it and comes from `KEYGRAB_ACCESS_TOKEN` or a token file
//! (`marketplace.token_file`, else `~/.keygrab/token` when present).
//!
//! # Example
//!
//! ```no_run
//! use keygrab::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use super::grab::GrabConfig;
use super::logging::LoggingConfig;
use super::store::StoreConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::notifier::email::settings::EmailConfig;
use crate::adapter::outbound::steampy::SteampyConfig;
use crate::application::settings::{MAX_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS};
use crate::domain::task::Percentage;
use crate::error::{ConfigError, Result};

/// Environment variable holding the marketplace access token.
pub const ACCESS_TOKEN_ENV: &str = "KEYGRAB_ACCESS_TOKEN";

/// Token file used when `marketplace.token_file` is not set.
pub const DEFAULT_TOKEN_FILE: &str = "~/.keygrab/token";

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Marketplace endpoint and HTTP settings.
    #[serde(default)]
    pub marketplace: SteampyConfig,

    /// Polling and worker timing.
    #[serde(default)]
    pub grab: GrabConfig,

    /// Where the task list is kept.
    #[serde(default)]
    pub store: StoreConfig,

    /// Telegram notification configuration.
    #[serde(default)]
    pub telegram: TelegramAppConfig,

    /// Purchase emails over SMTP.
    #[serde(default)]
    pub email: EmailConfig,

    /// Marketplace access token, loaded from the environment or token file.
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, the token file cannot be
    /// read, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.access_token = read_access_token(
            config.marketplace.token_file.as_deref(),
            &expand_home(Path::new(DEFAULT_TOKEN_FILE)),
        )?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for an existing file.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// File the console `token` command writes to.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        expand_home(
            self.marketplace
                .token_file
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_TOKEN_FILE)),
        )
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        let grab = &self.grab;
        if !(MIN_POLL_INTERVAL_SECS..=MAX_POLL_INTERVAL_SECS).contains(&grab.poll_interval_secs) {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                reason: format!(
                    "must be between {MIN_POLL_INTERVAL_SECS} and {MAX_POLL_INTERVAL_SECS}"
                ),
            }
            .into());
        }
        let percentage_range = i64::from(Percentage::MIN)..=i64::from(Percentage::MAX);
        if !percentage_range.contains(&grab.default_percentage) {
            return Err(ConfigError::InvalidValue {
                field: "default_percentage",
                reason: format!(
                    "must be between {} and {}",
                    Percentage::MIN,
                    Percentage::MAX
                ),
            }
            .into());
        }
        for (field, value) in [
            ("suspended_tick_ms", grab.suspended_tick_ms),
            ("stop_grace_ms", grab.stop_grace_ms),
            ("request_timeout_ms", grab.request_timeout_ms),
            ("timeout_ms", self.marketplace.timeout_ms),
            ("connect_timeout_ms", self.marketplace.connect_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        if self.marketplace.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if let Err(e) = Url::parse(&self.marketplace.base_url) {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: e.to_string(),
            }
            .into());
        }
        if self.marketplace.pay_type.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "pay_type" }.into());
        }
        if self.email.enabled {
            self.email.endpoint()?;
            if self.email.timeout_secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "email.timeout_secs",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Token from `KEYGRAB_ACCESS_TOKEN`, else the trimmed token file contents.
///
/// A configured `token_file` must exist; `fallback` is read only if present.
fn read_access_token(token_file: Option<&Path>, fallback: &Path) -> Result<Option<String>> {
    if let Some(token) = std::env::var(ACCESS_TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
    {
        return Ok(Some(token));
    }
    let path = match token_file {
        Some(path) => expand_home(path),
        None if fallback.is_file() => fallback.to_path_buf(),
        None => return Ok(None),
    };
    let contents = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
    let token = contents.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

/// Expand a leading `~/` to the user's home directory.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.grab.poll_interval_secs, 3);
        assert_eq!(config.grab.default_percentage, 70);
        assert_eq!(config.marketplace.base_url, "https://steampy.com");
        assert_eq!(config.marketplace.page_size, 20);
        assert_eq!(config.logging.level, "info");
        assert!(!config.telegram.enabled);
        assert!(!config.email.enabled);
        assert!(config.store.path.is_none());
        assert!(config.store.settings_path.is_none());
    }

    #[test]
    fn enabled_email_must_resolve() {
        let config = Config::parse_toml("[email]\nenabled = true\nto = \"me@qq.com\"").unwrap();
        assert_eq!(config.email.endpoint().unwrap().host, "smtp.qq.com");

        let err = Config::parse_toml("[email]\nenabled = true\nto = \"me@corp.org\"");
        assert!(err.is_err());

        let disabled = Config::parse_toml("[email]\nto = \"me@corp.org\"").unwrap();
        assert!(!disabled.email.enabled);
    }

    #[test]
    fn token_path_prefers_configured_file() {
        let mut config = Config::default();
        assert!(config.token_path().ends_with(".keygrab/token"));

        config.marketplace.token_file = Some(PathBuf::from("/etc/keygrab/token"));
        assert_eq!(config.token_path(), PathBuf::from("/etc/keygrab/token"));
    }

    #[test]
    fn fallback_token_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("token");
        if std::env::var(ACCESS_TOKEN_ENV).is_ok() {
            return;
        }
        assert_eq!(read_access_token(None, &fallback).unwrap(), None);

        fs::write(&fallback, "  saved-token\n").unwrap();
        assert_eq!(
            read_access_token(None, &fallback).unwrap().as_deref(),
            Some("saved-token")
        );

        let missing = dir.path().join("configured");
        assert!(read_access_token(Some(&missing), &fallback).is_err());
    }

    #[test]
    fn expand_home_only_touches_tilde_prefix() {
        assert_eq!(
            expand_home(Path::new("/tmp/tasks.json")),
            PathBuf::from("/tmp/tasks.json")
        );
        let expanded = expand_home(Path::new("~/x/tasks.json"));
        if dirs::home_dir().is_some() {
            assert!(!expanded.starts_with("~"));
            assert!(expanded.ends_with("x/tasks.json"));
        }
    }
}
