//! Handler for `keygrab check config`.

use std::path::Path;

use crate::adapter::inbound::cli::{output, paths};
use crate::adapter::outbound::notifier::email::settings::SMTP_PASSWORD_ENV;
use crate::error::Result;
use crate::infrastructure::config::settings::{Config, ACCESS_TOKEN_ENV};

/// Validate a configuration file without starting any workers.
///
/// # Errors
///
/// Returns the load or validation error for a missing, malformed or
/// out-of-range configuration.
pub fn execute_config(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Marketplace", &config.marketplace.base_url);
    output::field("Poll interval", format!("{}s", config.grab.poll_interval_secs));
    output::field("Default pct", format!("{}%", config.grab.default_percentage));
    output::field("Task file", paths::store_path(&config, None).display());
    output::field("Settings file", paths::settings_path(&config).display());
    output::field("Token file", config.token_path().display());

    if config.access_token.is_some() {
        output::success("Access token found");
    } else {
        output::warning(&format!(
            "No access token (set {ACCESS_TOKEN_ENV} or marketplace.token_file)"
        ));
    }

    if config.telegram.enabled {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").is_ok();
        let chat = std::env::var("TELEGRAM_CHAT_ID").is_ok();
        if token && chat {
            output::success("Telegram integration configured");
        } else {
            output::warning("Telegram enabled but environment variables are missing");
            if !token {
                output::field("Missing", "TELEGRAM_BOT_TOKEN");
            }
            if !chat {
                output::field("Missing", "TELEGRAM_CHAT_ID");
            }
        }
    } else {
        output::field("Telegram", "disabled");
    }

    if config.email.enabled {
        // Already validated by `Config::load`.
        let endpoint = config.email.endpoint()?;
        output::field(
            "SMTP server",
            format!("{}:{} ({})", endpoint.host, endpoint.port, endpoint.security),
        );
        output::field("Email to", &endpoint.to);
        if !cfg!(feature = "email") {
            output::warning("Email enabled but this build has no email support");
        } else if std::env::var(SMTP_PASSWORD_ENV).is_ok() {
            output::success("Email integration configured");
        } else {
            output::warning("Email enabled but the SMTP password is missing");
            output::field("Missing", SMTP_PASSWORD_ENV);
        }
    } else {
        output::field("Email", "disabled");
    }

    Ok(())
}
