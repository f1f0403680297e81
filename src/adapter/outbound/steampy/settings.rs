//! Steampy marketplace configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// `[marketplace]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SteampyConfig {
    /// Site root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Listings fetched per poll.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Payment method sent with purchases.
    #[serde(default = "default_pay_type")]
    pub pay_type: String,
    /// File holding the access token. `KEYGRAB_ACCESS_TOKEN` takes precedence.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://steampy.com".into()
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

const fn default_page_size() -> u32 {
    20
}

fn default_pay_type() -> String {
    "AL".into()
}

impl Default for SteampyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            page_size: default_page_size(),
            pay_type: default_pay_type(),
            token_file: None,
        }
    }
}
