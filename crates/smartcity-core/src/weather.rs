//! Current-temperature lookup for the weather badge.
//!
//! One GET against an OpenWeatherMap compatible `find` endpoint, one numeric
//! field extracted (`list[0].main.temp`). Failures map to fixed user-facing
//! messages; the badge never retries within a mount.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;

const FIND_PATH: &str = "/data/2.5/find";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather data could not be loaded")]
    Request(#[source] reqwest::Error),
    #[error("Weather data could not be loaded")]
    Status(u16),
    /// Body was not the expected shape.
    #[error("Failed to parse temperature")]
    Malformed(#[source] serde_json::Error),
    /// Well-formed body without a temperature.
    #[error("Temperature not found")]
    MissingTemperature,
    #[error("Weather fetch cancelled")]
    Cancelled,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    list: Vec<FindItem>,
}

#[derive(Debug, Deserialize)]
struct FindItem {
    main: Option<MainBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
}

/// Extracts the temperature from a `find` response body, rounded to the
/// nearest integer with halves going up (`-2.5` -> `-2`, `2.5` -> `3`).
///
/// # Errors
/// `Malformed` when the body is not JSON of the expected shape,
/// `MissingTemperature` when the field path is absent.
pub fn parse_temperature(body: &str) -> Result<i64, WeatherError> {
    let response: FindResponse = serde_json::from_str(body).map_err(WeatherError::Malformed)?;
    let temp = response
        .list
        .into_iter()
        .next()
        .and_then(|item| item.main)
        .and_then(|main| main.temp)
        .filter(|t| t.is_finite())
        .ok_or(WeatherError::MissingTemperature)?;
    Ok((temp + 0.5).floor() as i64)
}

/// Unit system of the `units` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Maps OpenWeatherMap's `units` value. Unknown values fall back to metric.
    pub fn from_units(units: &str) -> Self {
        match units.trim().to_ascii_lowercase().as_str() {
            "imperial" => TemperatureUnit::Fahrenheit,
            "standard" => TemperatureUnit::Kelvin,
            _ => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => " K",
        }
    }

    pub fn format(self, temp: i64) -> String {
        format!("{temp}{}", self.symbol())
    }
}

/// Weather endpoint client.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    city: String,
    units: String,
    unit: TemperatureUnit,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(base_url: &str, city: &str, units: &str, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            city: city.to_string(),
            units: units.to_string(),
            unit: TemperatureUnit::from_units(units),
            api_key,
        }
    }

    /// Builds a client from config, applying env overrides.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.weather.effective_base_url(),
            config.weather_city(),
            &config.weather.units,
            config.weather.effective_api_key(),
        )
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Fetches the current temperature.
    ///
    /// # Errors
    /// See [`WeatherError`]; `Cancelled` when `cancel` fires first.
    pub async fn fetch_temperature(&self, cancel: &CancellationToken) -> Result<i64, WeatherError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Weather fetch cancelled");
                Err(WeatherError::Cancelled)
            }
            result = self.fetch_once() => {
                if let Err(err) = &result {
                    warn!(error = ?err, city = %self.city, "Weather fetch failed");
                }
                result
            }
        }
    }

    async fn fetch_once(&self) -> Result<i64, WeatherError> {
        let url = format!("{}{}", self.base_url, FIND_PATH);
        let mut query: Vec<(&str, &str)> = vec![
            ("q", self.city.as_str()),
            ("units", self.units.as_str()),
            ("type", "accurate"),
            ("mode", "json"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("APPID", key.as_str()));
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(WeatherError::Request)?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(WeatherError::Request)?;
        parse_temperature(&body)
    }
}

/// Badge display state for one main-screen mount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WeatherBadge {
    #[default]
    Loading,
    Ready(i64),
    Failed(String),
}

impl WeatherBadge {
    /// Applies a fetch result. Only the first result of a mount is kept.
    pub fn resolve(&mut self, result: Result<i64, String>) {
        if *self != WeatherBadge::Loading {
            return;
        }
        *self = match result {
            Ok(temp) => WeatherBadge::Ready(temp),
            Err(message) => WeatherBadge::Failed(message),
        };
    }

    pub fn text(&self, unit: TemperatureUnit) -> String {
        match self {
            WeatherBadge::Loading => "Loading...".to_string(),
            WeatherBadge::Ready(temp) => unit.format(*temp),
            WeatherBadge::Failed(message) => message.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, WeatherBadge::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_parse_temperature_rounds() {
        let body = r#"{"list":[{"main":{"temp":24.6}}]}"#;
        assert_eq!(parse_temperature(body).unwrap(), 25);
        let body = r#"{"list":[{"main":{"temp":-3.2}}]}"#;
        assert_eq!(parse_temperature(body).unwrap(), -3);
    }

    #[test]
    fn test_parse_temperature_rounds_half_up() {
        let body = r#"{"list":[{"main":{"temp":-2.5}}]}"#;
        assert_eq!(parse_temperature(body).unwrap(), -2);
        let body = r#"{"list":[{"main":{"temp":2.5}}]}"#;
        assert_eq!(parse_temperature(body).unwrap(), 3);
        let body = r#"{"list":[{"main":{"temp":-0.5}}]}"#;
        assert_eq!(parse_temperature(body).unwrap(), 0);
    }

    #[test]
    fn test_parse_temperature_errors() {
        let err = parse_temperature("<cities/>").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse temperature");

        let err = parse_temperature(r#"{"list":[]}"#).unwrap_err();
        assert_eq!(err.to_string(), "Temperature not found");

        let err = parse_temperature(r#"{"list":[{"main":{}}]}"#).unwrap_err();
        assert_eq!(err.to_string(), "Temperature not found");
    }

    #[test]
    fn test_badge_is_sticky() {
        let mut badge = WeatherBadge::default();
        assert_eq!(badge.text(TemperatureUnit::Celsius), "Loading...");

        badge.resolve(Err("Weather data could not be loaded".to_string()));
        badge.resolve(Ok(25));

        assert!(badge.is_error());
        assert_eq!(
            badge.text(TemperatureUnit::Celsius),
            "Weather data could not be loaded"
        );
    }

    #[test]
    fn test_badge_uses_configured_unit() {
        let mut badge = WeatherBadge::default();
        badge.resolve(Ok(25));
        assert_eq!(badge.text(TemperatureUnit::Celsius), "25°C");
        assert_eq!(badge.text(TemperatureUnit::from_units("imperial")), "25°F");
        assert_eq!(badge.text(TemperatureUnit::from_units("standard")), "25 K");
        assert_eq!(TemperatureUnit::from_units("bogus"), TemperatureUnit::Celsius);
    }

    #[tokio::test]
    async fn test_fetch_temperature_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/find"))
            .and(query_param("q", "Istanbul"))
            .and(query_param("mode", "json"))
            .and(query_param("APPID", "k"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"list":[{"main":{"temp":25.4}}]}"#),
            )
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "Istanbul", "metric", Some("k".into()));
        let temp = client
            .fetch_temperature(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(temp, 25);
    }

    #[tokio::test]
    async fn test_fetch_temperature_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/find"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "Istanbul", "metric", None);
        let err = client
            .fetch_temperature(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Weather data could not be loaded");
    }

    #[tokio::test]
    async fn test_fetch_temperature_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(10))
                    .set_body_string(r#"{"list":[{"main":{"temp":1}}]}"#),
            )
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "Istanbul", "metric", None);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client.fetch_temperature(&cancel).await.unwrap_err();
        assert!(matches!(err, WeatherError::Cancelled));
    }
}
