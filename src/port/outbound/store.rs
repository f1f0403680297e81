//! Persistence ports for the tracked task list and operator settings.

use serde::{Deserialize, Serialize};

use crate::domain::task::{GrabTask, Percentage};
use crate::error::Result;

/// Durable snapshot of every tracked task.
///
/// `save` replaces the whole document in one step: a concurrent reader sees
/// either the previous list or the new one, never a mix. `load` on a store
/// that was never written returns an empty list.
pub trait TaskStore: Send + Sync {
    /// Replace the stored list with `tasks`.
    fn save(&self, tasks: &[GrabTask]) -> Result<()>;

    /// Read the stored list.
    fn load(&self) -> Result<Vec<GrabTask>>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Operator-tunable values that survive a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSettings {
    pub poll_interval_secs: u64,
    pub default_percentage: Percentage,
}

/// Durable home for [`OperatorSettings`] and the marketplace access token.
pub trait SettingsStore: Send + Sync {
    /// `None` when nothing was saved yet.
    fn load_settings(&self) -> Result<Option<OperatorSettings>>;

    /// Replace the stored settings.
    fn save_settings(&self, settings: &OperatorSettings) -> Result<()>;

    /// Replace the stored access token.
    fn save_token(&self, token: &str) -> Result<()>;

    /// Short label for logs.
    fn describe(&self) -> String;
}
