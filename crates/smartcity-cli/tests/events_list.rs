//! Integration tests for `smartcity events list`.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;

fn write_events(home: &Path, lines: &[serde_json::Value]) {
    let body: Vec<String> = lines.iter().map(ToString::to_string).collect();
    fs::write(home.join("events.jsonl"), body.join("\n") + "\n").unwrap();
}

fn event(id: &str, kind: &str, description: &str, collection: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": kind,
        "description": description,
        "latitude": 41.01,
        "longitude": 28.97,
        "radius": 500,
        "isEmergency": kind == "emergency",
        "collection": collection,
    })
}

#[test]
fn test_events_list_empty() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", dir.path())
        .args(["events", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No events found."));
}

#[test]
fn test_events_list_shows_saved_events() {
    let dir = tempdir().unwrap();
    write_events(
        dir.path(),
        &[
            event("ev-1", "flood", "Underpass flooded", "events"),
            event("ev-2", "roadwork", "Lane closed", "events"),
        ],
    );

    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", dir.path())
        .args(["events", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ev-1"))
        .stdout(predicate::str::contains("Underpass flooded"))
        .stdout(predicate::str::contains("ev-2"));
}

#[test]
fn test_events_list_filters_by_mode() {
    let dir = tempdir().unwrap();
    write_events(
        dir.path(),
        &[
            event("ev-1", "flood", "Underpass flooded", "events"),
            event("ev-2", "roadwork", "Lane closed", "events"),
        ],
    );

    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", dir.path())
        .args(["events", "list", "--mode", "roadwork"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ev-2"))
        .stdout(predicate::str::contains("ev-1").not());
}

#[test]
fn test_events_list_skips_other_collections() {
    let dir = tempdir().unwrap();
    write_events(
        dir.path(),
        &[
            event("ev-1", "flood", "Underpass flooded", "events"),
            event("ev-9", "flood", "Old test data", "staging"),
        ],
    );

    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", dir.path())
        .args(["events", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ev-1"))
        .stdout(predicate::str::contains("ev-9").not());
}
