use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use keygrab::error::{ConfigError, Error};
use keygrab::infrastructure::config::settings::Config;

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn write_temp_config(contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let suffix = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!("keygrab-config-test-{nanos}-{suffix}.toml"));
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn config_rejects_out_of_range_interval() {
    let path = write_temp_config("[grab]\npoll_interval_secs = 0\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "poll_interval_secs",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid interval error, got {err}"),
        Ok(config) => panic!(
            "Expected interval to be rejected, got {}",
            config.grab.poll_interval_secs
        ),
    }
}

#[test]
fn config_rejects_bad_base_url() {
    let path = write_temp_config("[marketplace]\nbase_url = \"not a url\"\n");
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "base_url",
            ..
        }))
    ));
}

#[test]
fn config_loads_full_example() {
    let toml = r#"
[logging]
level = "debug"
format = "json"

[marketplace]
base_url = "https://example.test"
timeout_ms = 5000
connect_timeout_ms = 2000
page_size = 10
pay_type = "WX"

[grab]
poll_interval_secs = 5
default_percentage = 60
suspended_tick_ms = 500
stop_grace_ms = 1500
request_timeout_ms = 4000

[store]
path = "/var/lib/keygrab/tasks.json"

[telegram]
enabled = true
notify_pauses = false
"#;
    let path = write_temp_config(toml);
    let config = Config::load(&path).expect("valid config");
    let _ = fs::remove_file(&path);

    assert!(config.logging.is_json());
    assert_eq!(config.marketplace.page_size, 10);
    assert_eq!(config.marketplace.pay_type, "WX");
    assert_eq!(config.grab.poll_interval_secs, 5);
    assert_eq!(config.grab.timings().stop_grace.as_millis(), 1500);
    assert_eq!(
        config.store.path.as_deref(),
        Some(std::path::Path::new("/var/lib/keygrab/tasks.json"))
    );
    assert!(config.telegram.enabled);
    assert!(!config.telegram.notify_pauses);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let path = std::env::temp_dir().join("keygrab-config-test-does-not-exist.toml");
    let config = Config::load_or_default(&path).expect("defaults");
    assert_eq!(config.grab.poll_interval_secs, 3);
    assert_eq!(config.grab.default_percentage, 70);
    assert_eq!(config.marketplace.base_url, "https://steampy.com");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}
