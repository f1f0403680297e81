//! Infrastructure bootstrap helpers for runtime wiring.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::adapter::outbound::notifier::email::settings::{EmailConfig, SMTP_PASSWORD_ENV};
use crate::adapter::outbound::steampy::SteampyClient;
use crate::adapter::outbound::store::{
    JsonSettingsStore, JsonTaskStore, MemorySettingsStore, MemoryTaskStore,
};
use crate::application::grab::{GrabContext, WorkerSupervisor};
use crate::application::session::SessionStore;
use crate::error::Result;
use crate::infrastructure::config::settings::{Config, ACCESS_TOKEN_ENV};
use crate::port::outbound::marketplace::CatalogSearch;
use crate::port::outbound::notifier::{Event, LogNotifier, NotifierRegistry};
use crate::port::outbound::store::{SettingsStore, TaskStore};

#[cfg(feature = "email")]
use crate::adapter::outbound::notifier::email::notifier::EmailNotifier;
#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::notifier::{TelegramConfig, TelegramNotifier};

/// Everything `run` needs once wiring is done.
pub struct Services {
    pub supervisor: WorkerSupervisor,
    pub events: mpsc::UnboundedReceiver<Event>,
    pub session: Arc<SessionStore>,
    pub catalog: Arc<dyn CatalogSearch>,
    pub settings_store: Arc<dyn SettingsStore>,
}

/// Build notifier registry from configuration.
///
/// The log notifier is always present. Telegram and email join it when
/// enabled and their credentials are in the environment.
pub fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    register_telegram(&mut registry, config);
    if config.email.enabled {
        let password = std::env::var(SMTP_PASSWORD_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty());
        register_email(&mut registry, &config.email, password);
    }
    registry
}

#[cfg(feature = "telegram")]
fn register_telegram(registry: &mut NotifierRegistry, config: &Config) {
    if !config.telegram.enabled {
        return;
    }
    if let Some(tg_config) = TelegramConfig::from_env() {
        let tg_config = tg_config.with_notify_pauses(config.telegram.notify_pauses);
        registry.register(Box::new(TelegramNotifier::new(tg_config)));
        info!("Telegram notifier enabled");
    } else {
        warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
    }
}

#[cfg(not(feature = "telegram"))]
fn register_telegram(_registry: &mut NotifierRegistry, config: &Config) {
    if config.telegram.enabled {
        warn!("Telegram enabled in config but this build has no telegram support");
    }
}

#[cfg(feature = "email")]
fn register_email(registry: &mut NotifierRegistry, email: &EmailConfig, password: Option<String>) {
    let Some(password) = password else {
        warn!(env = SMTP_PASSWORD_ENV, "Email enabled but no SMTP password set");
        return;
    };
    match EmailNotifier::new(email, password) {
        Ok(notifier) => {
            registry.register(Box::new(notifier));
            info!(to = %email.to, "Email notifier enabled");
        }
        Err(e) => error!(error = %e, "Email notifier not started"),
    }
}

#[cfg(not(feature = "email"))]
fn register_email(_registry: &mut NotifierRegistry, _email: &EmailConfig, _password: Option<String>) {
    warn!("Email enabled in config but this build has no email support");
}

/// JSON file store at `path`, or an in-memory one for throwaway runs.
#[must_use]
pub fn build_store(path: &Path, ephemeral: bool) -> Arc<dyn TaskStore> {
    if ephemeral {
        info!("Ephemeral run, tasks will not be saved");
        Arc::new(MemoryTaskStore::new())
    } else {
        Arc::new(JsonTaskStore::new(path))
    }
}

/// Settings and token files, or an in-memory store for throwaway runs.
#[must_use]
pub fn build_settings_store(
    settings_path: &Path,
    token_path: &Path,
    ephemeral: bool,
) -> Arc<dyn SettingsStore> {
    if ephemeral {
        Arc::new(MemorySettingsStore::new())
    } else {
        Arc::new(JsonSettingsStore::new(settings_path, token_path))
    }
}

/// Wire the marketplace client, session and supervisor.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_services(
    config: &Config,
    store: Arc<dyn TaskStore>,
    settings_store: Arc<dyn SettingsStore>,
) -> Result<Services> {
    let session = Arc::new(SessionStore::new(config.access_token.clone()));
    if !session.current().is_authenticated() {
        warn!(
            env = ACCESS_TOKEN_ENV,
            "No access token configured, marketplace calls will be rejected until one is set"
        );
    }

    let client = Arc::new(SteampyClient::from_config(
        &config.marketplace,
        Arc::clone(&session),
    )?);
    let settings = Arc::new(config.grab.runtime_settings());
    let ctx = GrabContext::new(Arc::clone(&client) as _, store, settings)
        .with_timings(config.grab.timings());
    let (supervisor, events) = WorkerSupervisor::new(ctx);

    Ok(Services {
        supervisor,
        events,
        session,
        catalog: client,
        settings_store,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn services_start_with_configured_settings() {
        let mut config = Config::parse_toml("[grab]\npoll_interval_secs = 7\ndefault_percentage = 55")
            .unwrap();
        config.access_token = Some("tok".into());
        let services = build_services(
            &config,
            Arc::new(MemoryTaskStore::new()),
            Arc::new(MemorySettingsStore::new()),
        )
        .unwrap();

        let settings = services.supervisor.settings();
        assert_eq!(settings.poll_interval().as_secs(), 7);
        assert_eq!(settings.default_percentage().get(), 55);
        assert_eq!(services.session.current().access_token(), Some("tok"));
        assert!(services.supervisor.tasks().is_empty());
    }

    #[test]
    fn ephemeral_store_is_in_memory() {
        let store = build_store(Path::new("/nonexistent/tasks.json"), true);
        assert_eq!(store.describe(), "memory");
        let store = build_store(Path::new("/tmp/tasks.json"), false);
        assert_eq!(store.describe(), "/tmp/tasks.json");

        let settings = build_settings_store(
            Path::new("/tmp/settings.json"),
            Path::new("/tmp/token"),
            true,
        );
        assert_eq!(settings.describe(), "memory");
        let settings = build_settings_store(
            Path::new("/tmp/settings.json"),
            Path::new("/tmp/token"),
            false,
        );
        assert_eq!(settings.describe(), "/tmp/settings.json");
    }

    #[tokio::test]
    async fn log_notifier_is_always_registered() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(build_notifier_registry(&config).len(), 1);
    }

    #[cfg(feature = "email")]
    #[tokio::test]
    async fn email_needs_a_password() {
        let config = Config::parse_toml("[email]\nenabled = true\nto = \"me@163.com\"").unwrap();

        let mut registry = NotifierRegistry::new();
        register_email(&mut registry, &config.email, None);
        assert!(registry.is_empty());

        register_email(&mut registry, &config.email, Some("app-code".into()));
        assert_eq!(registry.len(), 1);
    }
}
