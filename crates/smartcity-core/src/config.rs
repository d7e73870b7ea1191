//! Configuration management for SmartCity.
//!
//! Loads configuration from ${SMARTCITY_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::event::GeoPoint;
use crate::store::Mode;

/// Env var overriding `weather.base_url`.
pub const WEATHER_BASE_URL_ENV: &str = "SMARTCITY_WEATHER_BASE_URL";
/// Env var overriding `weather.api_key`.
pub const WEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments/sections from the template are always present while the
/// user's customized values win.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for SmartCity configuration and data files.
    //!
    //! SMARTCITY_HOME resolution order:
    //! 1. SMARTCITY_HOME environment variable (if set)
    //! 2. ~/.config/smartcity (default)
    //! 3. ./.smartcity when no home directory can be determined

    use std::path::PathBuf;

    pub fn smartcity_home() -> PathBuf {
        if let Ok(home) = std::env::var("SMARTCITY_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".smartcity"),
            |h| h.join(".config").join("smartcity"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        smartcity_home().join("config.toml")
    }

    /// Default JSON-lines event file.
    pub fn events_path() -> PathBuf {
        smartcity_home().join("events.jsonl")
    }

    pub fn logs_dir() -> PathBuf {
        smartcity_home().join("logs")
    }
}

/// Initial map viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Web-map style zoom level.
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            latitude: GeoPoint::ISTANBUL.latitude,
            longitude: GeoPoint::ISTANBUL.longitude,
            zoom: MapConfig::DEFAULT_ZOOM,
        }
    }
}

impl MapConfig {
    pub const DEFAULT_ZOOM: u8 = 12;

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Weather badge data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    /// City queried for the badge. Empty falls back to the top-level city.
    pub city: String,
    pub units: String,
    pub api_key: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: WeatherConfig::DEFAULT_BASE_URL.to_string(),
            city: String::new(),
            units: "metric".to_string(),
            api_key: None,
        }
    }
}

impl WeatherConfig {
    pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

    /// Base URL with the env override applied.
    pub fn effective_base_url(&self) -> String {
        non_empty_env(WEATHER_BASE_URL_ENV).unwrap_or_else(|| {
            let trimmed = self.base_url.trim();
            if trimmed.is_empty() {
                Self::DEFAULT_BASE_URL.to_string()
            } else {
                trimmed.to_string()
            }
        })
    }

    /// API key with the env override applied, if any.
    pub fn effective_api_key(&self) -> Option<String> {
        non_empty_env(WEATHER_API_KEY_ENV).or_else(|| {
            self.api_key
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Persistence backend for submitted events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory only.
    #[default]
    Local,
    Jsonl,
    Firestore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firestore.googleapis.com".to_string(),
            project_id: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: Backend,
    pub collection: String,
    pub jsonl_path: Option<PathBuf>,
    pub firestore: FirestoreConfig,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            collection: "events".to_string(),
            jsonl_path: None,
            firestore: FirestoreConfig::default(),
        }
    }
}

impl PersistenceConfig {
    pub fn effective_jsonl_path(&self) -> PathBuf {
        self.jsonl_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(paths::events_path)
    }
}

/// A username/password pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// The two accounts accepted by the login screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub user: Credentials,
    pub admin: Credentials,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            user: Credentials::new("deneme", "deneme"),
            admin: Credentials::new("denemeadmin", "denemeadmin"),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// City shown on the main screen.
    pub city: String,

    /// Map filter applied at startup.
    pub default_mode: String,

    pub map: MapConfig,
    pub weather: WeatherConfig,
    pub persistence: PersistenceConfig,
    pub accounts: AccountsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            city: Config::DEFAULT_CITY.to_string(),
            default_mode: Mode::All.to_string(),
            map: MapConfig::default(),
            weather: WeatherConfig::default(),
            persistence: PersistenceConfig::default(),
            accounts: AccountsConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_CITY: &str = "Istanbul";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Mode to start with.
    pub fn initial_mode(&self) -> Mode {
        Mode::parse(&self.default_mode)
    }

    /// City queried by the weather badge.
    pub fn weather_city(&self) -> &str {
        let city = self.weather.city.trim();
        if city.is_empty() {
            self.city.trim()
        } else {
            city
        }
    }

    /// Saves only the default_mode field to the config file.
    pub fn save_mode(mode: &Mode) -> Result<()> {
        Self::save_mode_to(&paths::config_path(), mode)
    }

    /// Saves only the default_mode field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    pub fn save_mode_to(path: &Path, mode: &Mode) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["default_mode"] = value(mode.to_string());

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::event::Category;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nonexistent.toml")).unwrap();

        assert_eq!(config.city, "Istanbul");
        assert_eq!(config.initial_mode(), Mode::All);
        assert_eq!(config.persistence.backend, Backend::Local);
        assert_eq!(config.persistence.collection, "events");
        assert_eq!(config.map.center(), GeoPoint::ISTANBUL);
        assert!(config.accounts.user.matches("deneme", "deneme"));
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.city, defaults.city);
        assert_eq!(config.default_mode, defaults.default_mode);
        assert_eq!(config.map.zoom, defaults.map.zoom);
        assert_eq!(config.weather.base_url, defaults.weather.base_url);
        assert_eq!(config.accounts.admin, defaults.accounts.admin);
        assert_eq!(config.persistence.backend, defaults.persistence.backend);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "city = \"Ankara\"\n[persistence]\nbackend = \"jsonl\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.city, "Ankara");
        assert_eq!(config.weather_city(), "Ankara");
        assert_eq!(config.persistence.backend, Backend::Jsonl);
        assert_eq!(config.persistence.collection, "events");
    }

    #[test]
    fn test_save_mode_preserves_user_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# mine\ncity = \"Izmir\"\n").unwrap();

        Config::save_mode_to(&path, &Mode::Only(Category::Flood)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("default_mode = \"flood\""));
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.city, "Izmir");
        assert_eq!(config.initial_mode(), Mode::Only(Category::Flood));
    }

    #[test]
    fn test_save_mode_creates_file_from_template() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::save_mode_to(&path, &Mode::Only(Category::Custom("Gas leak".into()))).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.initial_mode(),
            Mode::Only(Category::Custom("Gas leak".into()))
        );
        assert_eq!(config.persistence.collection, "events");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        Config::init(&path).unwrap();
        let err = Config::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_weather_city_prefers_weather_section() {
        let mut config = Config::default();
        config.weather.city = "Bursa".to_string();
        assert_eq!(config.weather_city(), "Bursa");
    }
}
