use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn wikins(config_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wikins").unwrap();
    cmd.arg("--config").arg(config_path).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_host_command() {
    let temp = TempDir::new().unwrap();
    wikins(&temp.path().join("config.toml"))
        .args(["host", "enwiki", "commonswiki", "dewiktionary", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("en.wikipedia.org"))
        .stdout(predicate::str::contains("commons.wikimedia.org"))
        .stdout(predicate::str::contains("de.wiktionary.org"))
        .stdout(predicate::str::contains("unresolvable"));
}

#[test]
fn test_host_command_requires_a_wiki() {
    let temp = TempDir::new().unwrap();
    wikins(&temp.path().join("config.toml")).arg("host").assert().failure();
}

#[test]
fn test_host_command_uses_configured_hosts() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.toml");
    std::fs::write(&config_path, "[hosts]\nlocalwiki = \"wiki.local\"\n").unwrap();

    wikins(&config_path)
        .args(["host", "localwiki"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wiki.local"));
}

#[test]
fn test_config_init_show_path() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("nested").join("config.toml");

    wikins(&config_path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(config_path.exists());

    wikins(&config_path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    wikins(&config_path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("testwiki"))
        .stdout(predicate::str::contains("cache_ttl_secs = 86400"));

    wikins(&config_path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.toml");
    std::fs::write(&config_path, "fetch_timeout_secs = 0\n").unwrap();

    wikins(&config_path)
        .args(["host", "enwiki"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetch_timeout_secs"))
        .stderr(predicate::str::contains("config init --force"));
}

#[test]
fn test_label_without_wiki_needs_no_fetch() {
    let temp = TempDir::new().unwrap();
    wikins(&temp.path().join("config.toml"))
        .args(["label", "--type", "Location"])
        .assert()
        .success()
        .stdout("location\n");
}

#[test]
fn test_label_rejects_unknown_type() {
    let temp = TempDir::new().unwrap();
    wikins(&temp.path().join("config.toml"))
        .args(["label", "--type", "Table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown column type"));
}

#[test]
fn test_title_for_unresolvable_wiki_is_bare() {
    let temp = TempDir::new().unwrap();
    wikins(&temp.path().join("config.toml"))
        .args(["title", "foo", "6", "Bar.png"])
        .assert()
        .success()
        .stdout("Bar.png\n");
}

#[test]
fn test_title_main_namespace_is_bare() {
    let temp = TempDir::new().unwrap();
    wikins(&temp.path().join("config.toml"))
        .args(["title", "foo", "0", "Main Page"])
        .assert()
        .success()
        .stdout("Main Page\n");
}
