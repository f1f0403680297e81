//! Infrastructure configuration modules.

pub mod grab;
pub mod logging;
pub mod settings;
pub mod store;
pub mod telegram;
