//! Handler for the `run` command.

use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{output, paths};
use crate::error::Result;
use crate::infrastructure::bootstrap::{
    build_notifier_registry, build_services, build_settings_store, build_store,
};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::runtime::run_with_shutdown;
use crate::port::outbound::store::OperatorSettings;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load_or_default(&args.config)?;
    let settings_path = paths::settings_path(&config);
    let settings_store =
        build_settings_store(&settings_path, &config.token_path(), args.ephemeral);
    let saved = settings_store.load_settings();
    if let Ok(Some(saved)) = &saved {
        apply_saved(&mut config, saved);
    }
    apply_overrides(&mut config, args);
    config.init_logging();
    if let Err(e) = &saved {
        warn!(error = %e, path = %settings_path.display(), "Ignoring unreadable settings file");
    }

    let store_path = paths::store_path(&config, args.store.as_deref());
    let store = build_store(&store_path, args.ephemeral);
    let services = build_services(&config, store, settings_store)?;
    let restored = services.supervisor.restore()?;

    if !output::is_quiet() {
        let settings = services.supervisor.settings();
        output::header(env!("CARGO_PKG_VERSION"));
        output::field("Marketplace", &config.marketplace.base_url);
        if args.ephemeral {
            output::field("Task file", "memory (not saved)");
        } else {
            output::field("Task file", store_path.display());
            output::field("Settings file", settings_path.display());
        }
        output::field("Tasks", format!("{restored} restored, all paused"));
        output::field("Poll interval", format!("{}s", settings.poll_interval().as_secs()));
        output::field("Default pct", settings.default_percentage());
        if !services.session.current().is_authenticated() {
            output::warning("No access token, use `token <value>` before searching");
        }
        output::note("Type `help` for commands, `quit` to exit");
    }

    info!(restored, "keygrab starting");

    let notifiers = build_notifier_registry(&config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received (Ctrl+C)");
            let _ = shutdown_tx.send(true);
        }
    });

    let input = BufReader::new(tokio::io::stdin());
    run_with_shutdown(services, notifiers, input, tokio::io::stdout(), shutdown_rx).await
}

/// Settings saved from an earlier console session beat the config file.
fn apply_saved(config: &mut Config, saved: &OperatorSettings) {
    config.grab.poll_interval_secs = saved.poll_interval_secs;
    config.grab.default_percentage = i64::from(saved.default_percentage.get());
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || output::is_json() {
        config.logging.format = "json".to_string();
    }
    if let Some(interval) = args.interval {
        config.grab.poll_interval_secs = interval;
    }
    if let Some(percentage) = args.percentage {
        config.grab.default_percentage = percentage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::adapter::inbound::cli::command::{Cli, Commands};
    use crate::domain::task::Percentage;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["keygrab", "run"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        let args = run_args(&[
            "--log-level",
            "debug",
            "--json-logs",
            "--interval",
            "9",
            "--percentage",
            "45",
        ]);
        apply_overrides(&mut config, &args);

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.is_json());
        assert_eq!(config.grab.poll_interval_secs, 9);
        assert_eq!(config.grab.default_percentage, 45);
    }

    #[test]
    fn absent_overrides_keep_config() {
        let mut config = Config::default();
        let before = config.grab.poll_interval_secs;
        apply_overrides(&mut config, &run_args(&[]));
        assert_eq!(config.grab.poll_interval_secs, before);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn saved_settings_sit_between_config_and_flags() {
        let mut config = Config::parse_toml("[grab]\npoll_interval_secs = 5").unwrap();
        let saved = OperatorSettings {
            poll_interval_secs: 20,
            default_percentage: Percentage::clamped(50),
        };
        apply_saved(&mut config, &saved);
        assert_eq!(config.grab.poll_interval_secs, 20);
        assert_eq!(config.grab.default_percentage, 50);

        apply_overrides(&mut config, &run_args(&["--interval", "4"]));
        assert_eq!(config.grab.poll_interval_secs, 4);
        assert_eq!(config.grab.default_percentage, 50);
    }
}
