use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn keygrab() -> Command {
    let mut cmd = Command::cargo_bin("keygrab").expect("binary built");
    cmd.env_remove("KEYGRAB_ACCESS_TOKEN").env_remove("RUST_LOG");
    cmd
}

#[test]
fn check_config_fails_on_invalid_value() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[grab]\ndefault_percentage = 5\n").unwrap();

    keygrab()
        .args(["check", "config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("default_percentage"));
}

#[test]
fn check_config_accepts_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "").unwrap();

    keygrab()
        .args(["check", "config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"));
}

#[test]
fn tasks_json_lists_saved_tasks() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("tasks.json");
    fs::write(
        &store,
        r#"{"version":"1","saved_at":"2024-05-01T10:00:00Z","tasks":[{
            "id":"g-1","name":"Hades","joinPrice":"100","targetPercentage":70,
            "status":"paused","createdAt":"2024-05-01T10:00:00Z"}]}"#,
    )
    .unwrap();

    keygrab()
        .args(["tasks", "--json", "--config"])
        .arg(dir.path().join("missing.toml"))
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\":\"g-1\""))
        .stdout(predicate::str::contains("\"status\":\"paused\""));
}

#[test]
fn tasks_with_no_file_prints_empty_table() {
    let dir = TempDir::new().unwrap();

    keygrab()
        .args(["tasks", "--config"])
        .arg(dir.path().join("missing.toml"))
        .arg("--store")
        .arg(dir.path().join("tasks.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("no tasks"));
}

#[test]
fn run_quits_from_stdin_without_touching_disk() {
    let dir = TempDir::new().unwrap();

    keygrab()
        .args(["run", "--ephemeral", "--config"])
        .arg(dir.path().join("missing.toml"))
        .write_stdin("help\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("track the n-th result"));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn check_config_resolves_email_provider() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[email]\nenabled = true\nto = \"me@qq.com\"\n").unwrap();

    keygrab()
        .env_remove("KEYGRAB_SMTP_PASSWORD")
        .args(["check", "config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("smtp.qq.com:465 (ssl)"));
}

#[test]
fn check_config_rejects_unknown_email_provider() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[email]\nenabled = true\nto = \"me@corp.org\"\nsmtp_host = \"smtp.example.com\"\n",
    )
    .unwrap();

    keygrab()
        .args(["check", "config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("email.smtp_host"));
}

#[test]
fn console_settings_and_token_persist_across_runs() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.json");
    let token = dir.path().join("token");
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[store]\npath = '{}'\nsettings_path = '{}'\n\n[marketplace]\ntoken_file = '{}'\n",
            dir.path().join("tasks.json").display(),
            settings.display(),
            token.display(),
        ),
    )
    .unwrap();
    fs::write(&token, "old-token\n").unwrap();

    keygrab()
        .args(["run", "--config"])
        .arg(&config)
        .write_stdin("interval 9\ndefault 40\ntoken new-token\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("poll interval 9s"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&settings).unwrap()).unwrap();
    assert_eq!(saved["settings"]["pollIntervalSecs"], 9);
    assert_eq!(saved["settings"]["defaultPercentage"], 40);
    assert_eq!(fs::read_to_string(&token).unwrap().trim(), "new-token");

    keygrab()
        .args(["run", "--config"])
        .arg(&config)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("9s"))
        .stdout(predicate::str::contains("No access token").not());
}
