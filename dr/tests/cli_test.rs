//! CLI tests for the `dr` binary
//!
//! Each test runs in a scratch HOME so no user config or credential leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dr(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dr").expect("dr binary should build");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_genres_lists_catalog() {
    let home = TempDir::new().unwrap();
    dr(&home)
        .arg("genres")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sci-Fi"))
        .stdout(predicate::str::contains("Romance"));
}

#[test]
fn test_styles_lists_presets() {
    let home = TempDir::new().unwrap();
    dr(&home)
        .arg("styles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aaron Sorkin"))
        .stdout(predicate::str::contains("Walk-and-talk"));
}

#[test]
fn test_generate_without_key_explains_itself() {
    let home = TempDir::new().unwrap();
    dr(&home)
        .args(["generate", "--hero", "A retired hitman", "--plot", "one last job"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Error: API key is missing. Please set the GEMINI_API_KEY environment variable.",
        ));
}

#[test]
fn test_generate_requires_hero_text() {
    let home = TempDir::new().unwrap();
    dr(&home)
        .args(["generate", "--hero", "  ", "--plot", "one last job"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--hero"));
}

#[test]
fn test_generate_uses_configured_key_env() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.yml");
    std::fs::write(&config, "llm:\n  provider: anthropic\n  api-key-env: DRAFTROOM_TEST_KEY\n").unwrap();

    dr(&home)
        .env_remove("DRAFTROOM_TEST_KEY")
        .args(["--config", config.to_str().unwrap(), "generate", "--hero", "h", "--plot", "p"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("DRAFTROOM_TEST_KEY"));
}

#[test]
fn test_log_file_written() {
    let home = TempDir::new().unwrap();
    dr(&home).arg("genres").assert().success();
    assert!(home.path().join("data/draftroom/logs/draftroom.log").exists());
}

#[test]
fn test_help_shows_log_location() {
    let home = TempDir::new().unwrap();
    dr(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logs are written to"));
}
