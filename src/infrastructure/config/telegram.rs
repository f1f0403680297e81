//! Telegram notification configuration.

use serde::Deserialize;

const fn default_true() -> bool {
    true
}

/// Telegram notification configuration.
///
/// Credentials come from `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable telegram notifications.
    #[serde(default)]
    pub enabled: bool,
    /// Send a message when a worker pauses its task.
    #[serde(default = "default_true")]
    pub notify_pauses: bool,
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            notify_pauses: default_true(),
        }
    }
}
