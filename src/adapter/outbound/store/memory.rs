//! In-memory stores for tests and ephemeral runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::domain::task::GrabTask;
use crate::error::{Error, Result};
use crate::port::outbound::store::{OperatorSettings, SettingsStore, TaskStore};

/// Holds the last saved task list in memory.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<GrabTask>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<GrabTask>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
            ..Self::default()
        }
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Last saved list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<GrabTask> {
        self.tasks.read().clone()
    }

    /// Make every following save fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl TaskStore for MemoryTaskStore {
    fn save(&self, tasks: &[GrabTask]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Store("memory store is read-only".into()));
        }
        *self.tasks.write() = tasks.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> Result<Vec<GrabTask>> {
        Ok(self.tasks.read().clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Settings store that keeps everything in process.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<Option<OperatorSettings>>,
    token: RwLock<Option<String>>,
    fail_saves: AtomicBool,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn settings(&self) -> Option<OperatorSettings> {
        *self.settings.read()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Make every following save fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Store("memory store is read-only".into()));
        }
        Ok(())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load_settings(&self) -> Result<Option<OperatorSettings>> {
        Ok(*self.settings.read())
    }

    fn save_settings(&self, settings: &OperatorSettings) -> Result<()> {
        self.check_writable()?;
        *self.settings.write() = Some(*settings);
        Ok(())
    }

    fn save_token(&self, token: &str) -> Result<()> {
        self.check_writable()?;
        *self.token.write() = Some(token.trim().to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
