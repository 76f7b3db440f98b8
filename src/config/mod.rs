//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/geopin/config.toml

pub mod defaults;

use crate::constants;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geocoding service settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Search box settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Device position settings
    #[serde(default)]
    pub gps: GpsConfig,

    /// Map viewport settings
    #[serde(default)]
    pub map: MapConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Backend: "nominatim" or "http" (storefront endpoints)
    #[serde(default = "default_geocoder")]
    pub provider: String,

    /// Base URL used by the "nominatim" provider
    #[serde(default = "default_nominatim_url", alias = "base_url")]
    pub nominatim_url: String,

    /// Base URL used by the "http" provider
    #[serde(default = "default_http_geocoder_url")]
    pub http_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,

    /// Maximum place matches per search
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Search box settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a query is sent, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Minimum trimmed query length
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
}

/// Device position settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsConfig {
    /// Provider: "ip", "fixed" or "none"
    #[serde(default = "default_gps_provider")]
    pub provider: String,

    /// Position request timeout in seconds
    #[serde(default = "default_gps_timeout")]
    pub timeout_secs: u64,

    /// Request a high-accuracy fix
    #[serde(default = "default_true")]
    pub high_accuracy: bool,

    /// Latitude for the "fixed" provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_lat: Option<f64>,

    /// Longitude for the "fixed" provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_lng: Option<f64>,
}

/// Map viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_lat")]
    pub default_lat: f64,

    #[serde(default = "default_map_lng")]
    pub default_lng: f64,

    #[serde(default = "default_map_zoom")]
    pub default_zoom: u8,

    #[serde(default = "default_selected_zoom")]
    pub selected_zoom: u8,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions for serde
fn default_geocoder() -> String {
    DEFAULT_GEOCODER.to_string()
}
fn default_nominatim_url() -> String {
    DEFAULT_NOMINATIM_URL.to_string()
}
fn default_http_geocoder_url() -> String {
    DEFAULT_HTTP_GEOCODER_URL.to_string()
}
fn default_geocoder_timeout() -> u64 {
    DEFAULT_GEOCODER_TIMEOUT_SECS
}
fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_debounce_ms() -> u64 {
    constants::search::DEBOUNCE_MS
}
fn default_min_query_chars() -> usize {
    constants::search::MIN_QUERY_CHARS
}
fn default_gps_provider() -> String {
    DEFAULT_GPS_PROVIDER.to_string()
}
fn default_gps_timeout() -> u64 {
    constants::gps::TIMEOUT_SECS
}
fn default_true() -> bool {
    true
}
fn default_map_lat() -> f64 {
    DEFAULT_MAP_LAT
}
fn default_map_lng() -> f64 {
    DEFAULT_MAP_LNG
}
fn default_map_zoom() -> u8 {
    DEFAULT_MAP_ZOOM
}
fn default_selected_zoom() -> u8 {
    DEFAULT_SELECTED_ZOOM
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            provider: default_geocoder(),
            nominatim_url: default_nominatim_url(),
            http_url: default_http_geocoder_url(),
            timeout_secs: default_geocoder_timeout(),
            max_results: default_max_results(),
        }
    }
}

impl GeocoderConfig {
    /// Base URL of the selected provider
    pub fn base_url(&self) -> &str {
        match self.provider.as_str() {
            "http" => &self.http_url,
            _ => &self.nominatim_url,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_chars: default_min_query_chars(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            provider: default_gps_provider(),
            timeout_secs: default_gps_timeout(),
            high_accuracy: true,
            fixed_lat: None,
            fixed_lng: None,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_lat: default_map_lat(),
            default_lng: default_map_lng(),
            default_zoom: default_map_zoom(),
            selected_zoom: default_selected_zoom(),
        }
    }
}

impl MapConfig {
    /// Initial viewport center
    pub fn default_center(&self) -> Result<Coordinate> {
        Coordinate::new(self.default_lat, self.default_lng)
            .map_err(|e| Error::Config(format!("Invalid map center: {}", e)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

fn parse_optional(key: &str, value: &str) -> Result<Option<f64>> {
    if value.is_empty() || value == "none" {
        Ok(None)
    } else {
        parse_value(key, value).map(Some)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "provider"] => Some(self.geocoder.provider.clone()),
            ["geocoder", "nominatim_url"] => Some(self.geocoder.nominatim_url.clone()),
            ["geocoder", "http_url"] => Some(self.geocoder.http_url.clone()),
            ["geocoder", "timeout_secs"] => Some(self.geocoder.timeout_secs.to_string()),
            ["geocoder", "max_results"] => Some(self.geocoder.max_results.to_string()),

            ["search", "debounce_ms"] => Some(self.search.debounce_ms.to_string()),
            ["search", "min_query_chars"] => Some(self.search.min_query_chars.to_string()),

            ["gps", "provider"] => Some(self.gps.provider.clone()),
            ["gps", "timeout_secs"] => Some(self.gps.timeout_secs.to_string()),
            ["gps", "high_accuracy"] => Some(self.gps.high_accuracy.to_string()),
            ["gps", "fixed_lat"] => Some(self.gps.fixed_lat.map(|v| v.to_string()).unwrap_or_default()),
            ["gps", "fixed_lng"] => Some(self.gps.fixed_lng.map(|v| v.to_string()).unwrap_or_default()),

            ["map", "default_lat"] => Some(self.map.default_lat.to_string()),
            ["map", "default_lng"] => Some(self.map.default_lng.to_string()),
            ["map", "default_zoom"] => Some(self.map.default_zoom.to_string()),
            ["map", "selected_zoom"] => Some(self.map.selected_zoom.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "provider"] => match value {
                "nominatim" | "http" => self.geocoder.provider = value.to_string(),
                _ => {
                    return Err(Error::Config(format!(
                        "Unknown geocoder provider: {}",
                        value
                    )))
                }
            },
            ["geocoder", "nominatim_url"] => self.geocoder.nominatim_url = value.to_string(),
            ["geocoder", "http_url"] => self.geocoder.http_url = value.to_string(),
            ["geocoder", "timeout_secs"] => self.geocoder.timeout_secs = parse_value(key, value)?,
            ["geocoder", "max_results"] => self.geocoder.max_results = parse_value(key, value)?,

            ["search", "debounce_ms"] => self.search.debounce_ms = parse_value(key, value)?,
            ["search", "min_query_chars"] => {
                self.search.min_query_chars = parse_value(key, value)?
            }

            ["gps", "provider"] => match value {
                "ip" | "fixed" | "none" => self.gps.provider = value.to_string(),
                _ => return Err(Error::Config(format!("Unknown GPS provider: {}", value))),
            },
            ["gps", "timeout_secs"] => self.gps.timeout_secs = parse_value(key, value)?,
            ["gps", "high_accuracy"] => self.gps.high_accuracy = parse_value(key, value)?,
            ["gps", "fixed_lat"] => self.gps.fixed_lat = parse_optional(key, value)?,
            ["gps", "fixed_lng"] => self.gps.fixed_lng = parse_optional(key, value)?,

            ["map", "default_lat"] => self.map.default_lat = parse_value(key, value)?,
            ["map", "default_lng"] => self.map.default_lng = parse_value(key, value)?,
            ["map", "default_zoom"] => self.map.default_zoom = parse_value(key, value)?,
            ["map", "selected_zoom"] => self.map.selected_zoom = parse_value(key, value)?,

            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "port"] => self.server.port = parse_value(key, value)?,

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoder.provider",
            "geocoder.nominatim_url",
            "geocoder.http_url",
            "geocoder.timeout_secs",
            "geocoder.max_results",
            "search.debounce_ms",
            "search.min_query_chars",
            "gps.provider",
            "gps.timeout_secs",
            "gps.high_accuracy",
            "gps.fixed_lat",
            "gps.fixed_lng",
            "map.default_lat",
            "map.default_lng",
            "map.default_zoom",
            "map.selected_zoom",
            "server.host",
            "server.port",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
