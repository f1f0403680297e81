//! File-backed operator settings and access token.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::port::outbound::store::{OperatorSettings, SettingsStore};

use super::atomic::{read_optional, write_atomic};

const SETTINGS_VERSION: &str = "1";

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: &'static str,
    saved_at: DateTime<Utc>,
    settings: &'a OperatorSettings,
}

#[derive(Deserialize)]
struct Document {
    version: String,
    settings: OperatorSettings,
}

/// Settings as a small JSON document, the token as a plain text file.
///
/// Both files are replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
    token_path: PathBuf,
}

impl JsonSettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            token_path: token_path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load_settings(&self) -> Result<Option<OperatorSettings>> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(None);
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        let document: Document = serde_json::from_str(&content)?;
        if document.version != SETTINGS_VERSION {
            return Err(Error::Store(format!(
                "unsupported settings version {} in {}",
                document.version,
                self.path.display()
            )));
        }
        Ok(Some(document.settings))
    }

    fn save_settings(&self, settings: &OperatorSettings) -> Result<()> {
        let json = serde_json::to_string_pretty(&DocumentRef {
            version: SETTINGS_VERSION,
            saved_at: Utc::now(),
            settings,
        })?;
        write_atomic(&self.path, json.as_bytes())?;
        debug!(
            path = %self.path.display(),
            poll_interval_secs = settings.poll_interval_secs,
            default_percentage = settings.default_percentage.get(),
            "Wrote operator settings"
        );
        Ok(())
    }

    fn save_token(&self, token: &str) -> Result<()> {
        let mut content = token.trim().to_string();
        content.push('\n');
        write_atomic(&self.token_path, content.as_bytes())?;
        info!(path = %self.token_path.display(), "Access token saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Percentage;
    use std::fs;
    use tempfile::tempdir;

    fn store(dir: &Path) -> JsonSettingsStore {
        JsonSettingsStore::new(dir.join("settings.json"), dir.join("token"))
    }

    #[test]
    fn nothing_saved_loads_none() {
        let dir = tempdir().unwrap();
        assert_eq!(store(dir.path()).load_settings().unwrap(), None);
    }

    #[test]
    fn settings_survive_a_new_store_instance() {
        let dir = tempdir().unwrap();
        let saved = OperatorSettings {
            poll_interval_secs: 9,
            default_percentage: Percentage::clamped(45),
        };
        store(dir.path()).save_settings(&saved).unwrap();

        assert_eq!(store(dir.path()).load_settings().unwrap(), Some(saved));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("settings.json")).unwrap())
                .unwrap();
        assert_eq!(value["version"], "1");
        assert_eq!(value["settings"]["pollIntervalSecs"], 9);
        assert_eq!(value["settings"]["defaultPercentage"], 45);
    }

    #[test]
    fn out_of_range_percentage_is_clamped_on_load() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{"version":"1","settings":{"pollIntervalSecs":3,"defaultPercentage":500}}"#,
        )
        .unwrap();
        let loaded = store(dir.path()).load_settings().unwrap().unwrap();
        assert_eq!(loaded.default_percentage.get(), 100);
    }

    #[test]
    fn token_is_written_trimmed_into_nested_dir() {
        let dir = tempdir().unwrap();
        let store = JsonSettingsStore::new(
            dir.path().join("settings.json"),
            dir.path().join("keys").join("token"),
        );
        store.save_token("  abc123 ").unwrap();
        store.save_token("def456").unwrap();

        let written = fs::read_to_string(dir.path().join("keys").join("token")).unwrap();
        assert_eq!(written.trim(), "def456");
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{"version":"7","settings":{"pollIntervalSecs":3,"defaultPercentage":70}}"#,
        )
        .unwrap();
        assert!(matches!(
            store(dir.path()).load_settings(),
            Err(Error::Store(_))
        ));
    }
}
