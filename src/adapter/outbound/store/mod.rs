//! Task and settings store adapters.

mod atomic;
mod json;
mod memory;
mod settings;

pub use json::JsonTaskStore;
pub use memory::{MemorySettingsStore, MemoryTaskStore};
pub use settings::JsonSettingsStore;
