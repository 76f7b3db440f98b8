//! IP-based position source
//!
//! Uses ip-api.com as a coarse stand-in for device GPS on hosts without a
//! positioning chip, with file-based caching.

use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::coord::Coordinate;
use crate::error::GpsError;
use crate::gps::{PositionOptions, PositionSource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// IP position source with caching
#[derive(Debug)]
pub struct IpPositionSource {
    client: reqwest::Client,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

/// Cached position
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedPosition {
    coordinate: Coordinate,
    timestamp: u64,
}

impl IpPositionSource {
    /// Create a new IP position source with the default cache path
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir().map(|p| p.join("geopin").join(IP_LOCATION_CACHE_FILE));

        Self {
            client: reqwest::Client::new(),
            cache_path,
        }
    }

    /// Create an IP position source with a specific cache path
    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: Some(cache_path),
        }
    }

    /// Create an IP position source without caching
    pub fn without_cache() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: None,
        }
    }

    /// Fetch position from ip-api.com
    async fn fetch_position(&self) -> Result<Coordinate, GpsError> {
        let response = self
            .client
            .get(IP_API_URL)
            .send()
            .await
            .map_err(|e| GpsError::Unavailable(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GpsError::Unavailable(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            GpsError::Unavailable(format!("Failed to parse IP location response: {}", e))
        })?;

        Self::coordinate_from(data)
    }

    fn coordinate_from(data: IpApiResponse) -> Result<Coordinate, GpsError> {
        if data.status != "success" {
            return Err(GpsError::Unavailable(
                data.message
                    .unwrap_or_else(|| "IP location lookup failed".to_string()),
            ));
        }

        match (data.lat, data.lon) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
                .map_err(|e| GpsError::Unavailable(e.to_string())),
            _ => Err(GpsError::Unavailable(
                "No coordinates in IP location response".to_string(),
            )),
        }
    }

    /// Load cached position if valid
    fn load_cache(&self) -> Option<Coordinate> {
        let cache_path = self.cache_path.as_ref()?;

        if !cache_path.exists() {
            return None;
        }

        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedPosition = serde_json::from_str(&content).ok()?;

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()?
            .as_secs();

        if now.saturating_sub(cached.timestamp) < IP_LOCATION_TTL_SECS {
            Some(cached.coordinate)
        } else {
            None
        }
    }

    /// Save position to cache
    fn save_cache(&self, coordinate: Coordinate) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let cached = CachedPosition {
            coordinate,
            timestamp,
        };

        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            let _ = fs::write(cache_path, content);
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }

    /// Get cache duration
    pub fn cache_duration() -> Duration {
        Duration::from_secs(IP_LOCATION_TTL_SECS)
    }
}

impl Default for IpPositionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSource for IpPositionSource {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinate, GpsError> {
        if options.high_accuracy {
            debug!("High accuracy requested; IP lookup is city-level at best");
        }

        if let Some(cached) = self.load_cache() {
            return Ok(cached);
        }

        let coordinate = self.fetch_position().await?;
        self.save_cache(coordinate);

        Ok(coordinate)
    }
}
