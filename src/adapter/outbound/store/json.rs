//! JSON file task store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::task::GrabTask;
use crate::error::{Error, Result};
use crate::port::outbound::store::TaskStore;

use super::atomic::{read_optional, write_atomic};

/// Current document format version.
const STORE_VERSION: &str = "1";

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: &'static str,
    saved_at: DateTime<Utc>,
    tasks: &'a [GrabTask],
}

/// On-disk layouts accepted by [`JsonTaskStore::load`].
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Versioned {
        version: String,
        #[serde(default)]
        tasks: Vec<GrabTask>,
    },
    /// Bare array written by older builds.
    Bare(Vec<GrabTask>),
}

/// Stores the task list as one pretty-printed JSON document.
///
/// Every save replaces the whole file: the document is written to
/// `<path>.tmp`, synced, then renamed over `<path>`.
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    path: PathBuf,
}

impl JsonTaskStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonTaskStore {
    fn save(&self, tasks: &[GrabTask]) -> Result<()> {
        let json = serde_json::to_string_pretty(&DocumentRef {
            version: STORE_VERSION,
            saved_at: Utc::now(),
            tasks,
        })?;

        write_atomic(&self.path, json.as_bytes())?;
        debug!(path = %self.path.display(), count = tasks.len(), "Wrote task store");
        Ok(())
    }

    fn load(&self) -> Result<Vec<GrabTask>> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&content)? {
            Document::Versioned { version, tasks } if version == STORE_VERSION => Ok(tasks),
            Document::Versioned { version, .. } => Err(Error::Store(format!(
                "unsupported task store version {version} in {}",
                self.path.display()
            ))),
            Document::Bare(tasks) => Ok(tasks),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
