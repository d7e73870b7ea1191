use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("smartcity")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("weather"))
        .stdout(predicate::str::contains("events"));
}

#[test]
fn test_events_help_shows_mode_filter() {
    cargo_bin_cmd!("smartcity")
        .args(["events", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--mode"));
}

#[test]
fn test_map_requires_terminal() {
    let dir = tempfile::tempdir().unwrap();

    // stderr is a pipe under assert_cmd
    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}
