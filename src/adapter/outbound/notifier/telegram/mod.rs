//! Telegram notifications.
//!
//! Sends a chat message for every completed purchase and, unless disabled,
//! for every task a worker paused on its own.

mod format;

pub mod notifier;
