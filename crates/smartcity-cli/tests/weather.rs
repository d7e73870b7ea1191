//! Integration tests for `smartcity weather`.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[tokio::test]
async fn test_weather_prints_rounded_temperature() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/find"))
        .and(query_param("q", "Istanbul"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"list":[{"main":{"temp":18.6}}]}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", home.path())
        .env("SMARTCITY_WEATHER_BASE_URL", mock_server.uri())
        .env_remove("OPENWEATHER_API_KEY")
        .env_remove("SMARTCITY_CITY")
        .arg("weather")
        .assert()
        .success()
        .stdout(predicate::str::contains("Istanbul: 19°C"));
}

#[tokio::test]
async fn test_weather_city_flag_overrides_config() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/find"))
        .and(query_param("q", "Ankara"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"list":[{"main":{"temp":4.2}}]}"#),
        )
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", home.path())
        .env("SMARTCITY_WEATHER_BASE_URL", mock_server.uri())
        .env_remove("OPENWEATHER_API_KEY")
        .args(["--city", "Ankara", "weather"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ankara: 4°C"));
}

#[tokio::test]
async fn test_weather_server_error_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/find"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", home.path())
        .env("SMARTCITY_WEATHER_BASE_URL", mock_server.uri())
        .env_remove("OPENWEATHER_API_KEY")
        .env_remove("SMARTCITY_CITY")
        .arg("weather")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Weather data could not be loaded"));
}

#[tokio::test]
async fn test_weather_imperial_units_use_fahrenheit() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        "[weather]\nunits = \"imperial\"\n",
    )
    .unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/find"))
        .and(query_param("units", "imperial"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"list":[{"main":{"temp":71.6}}]}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("smartcity")
        .env("SMARTCITY_HOME", home.path())
        .env("SMARTCITY_WEATHER_BASE_URL", mock_server.uri())
        .env_remove("OPENWEATHER_API_KEY")
        .env_remove("SMARTCITY_CITY")
        .arg("weather")
        .assert()
        .success()
        .stdout(predicate::str::contains("Istanbul: 72°F"));
}
