//! Location data model
//!
//! Value types shared by the geocoder, the marker controller and the
//! location session.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
///
/// Always within range: construct through [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Create a validated coordinate
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(Error::InvalidCoordinates(format!(
                "Coordinates must be numeric, got ({}, {})",
                lat, lng
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                lat
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                lng
            )));
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            lat: f64,
            lng: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.lat, raw.lng).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Structured address produced by reverse geocoding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

/// A place match from free-text search
///
/// `coordinate` may be absent: the search service returns descriptive
/// matches and the exact position is resolved by a second geocode step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    pub title: String,
    pub description: String,
}

impl SearchResult {
    /// Text handed to the forward geocoder when this result is chosen
    pub fn geocode_text(&self) -> &str {
        if self.description.trim().is_empty() {
            self.title.trim()
        } else {
            self.description.trim()
        }
    }
}

/// The session's current answer
///
/// Coordinate and address always change together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub coordinate: Coordinate,
    pub resolved: ResolvedAddress,
}

impl SelectedLocation {
    pub fn new(coordinate: Coordinate, resolved: ResolvedAddress) -> Self {
        Self {
            coordinate,
            resolved,
        }
    }
}
