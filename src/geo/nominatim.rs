//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for geocoding.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::coord::{Coordinate, ResolvedAddress, SearchResult};
use crate::error::{Error, Result};
use crate::geo::{build_client, GeocodeClient};
use serde::Deserialize;
use tracing::debug;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    name: Option<String>,
}

/// Nominatim reverse response
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
    #[serde(default)]
    error: Option<String>,
}

/// `addressdetails=1` breakdown; only the fields we map
#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    postcode: Option<String>,
}

impl NominatimGeocoder {
    /// Create a new Nominatim backend
    pub fn new(base_url: &str, timeout_secs: u64, max_results: usize) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_results: max_results.max(1),
        })
    }

    /// Parse lat/lng strings to a coordinate
    fn parse_coords(lat: &str, lng: &str) -> Result<Coordinate> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Service(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Service(format!("Invalid longitude: {}", lng)))?;
        Coordinate::new(lat, lng)
    }

    /// Flatten Nominatim's address breakdown into the storefront shape
    fn to_resolved(reverse: NominatimReverse) -> ResolvedAddress {
        let details = reverse.address.unwrap_or_default();

        let street = [details.house_number, details.road]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let locality = details.neighbourhood.or(details.suburb);

        let address = match (street.is_empty(), locality) {
            (false, Some(locality)) => format!("{}, {}", street, locality),
            (false, None) => street,
            (true, Some(locality)) => locality,
            (true, None) => reverse.display_name.unwrap_or_default(),
        };

        let city = details
            .city
            .or(details.town)
            .or(details.village)
            .or(details.county)
            .unwrap_or_default();

        ResolvedAddress {
            address,
            city,
            postal_code: details.postcode.unwrap_or_default(),
        }
    }

    fn to_search_result(place: NominatimPlace) -> SearchResult {
        let title = place
            .name
            .filter(|n| !n.is_empty())
            .or_else(|| place.display_name.split(',').next().map(|s| s.trim().to_string()))
            .unwrap_or_default();

        SearchResult {
            coordinate: Self::parse_coords(&place.lat, &place.lon).ok(),
            title,
            description: place.display_name,
        }
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<NominatimPlace>> {
        let url = format!(
            "{}/search?q={}&format=json&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Service(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Service(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Service(format!("Failed to parse Nominatim response: {}", e)))
    }
}

impl GeocodeClient for NominatimGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<ResolvedAddress> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url,
            coordinate.lat(),
            coordinate.lng()
        );
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Service(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Service(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let reverse: NominatimReverse = response
            .json()
            .await
            .map_err(|e| Error::Service(format!("Failed to parse Nominatim response: {}", e)))?;

        if let Some(message) = reverse.error {
            return Err(Error::Service(format!("Nominatim: {}", message)));
        }

        Ok(Self::to_resolved(reverse))
    }

    async fn forward_geocode(&self, address: &str) -> Result<Coordinate> {
        let place = self
            .search(address, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(address.to_string()))?;

        Self::parse_coords(&place.lat, &place.lon)
            .map_err(|_| Error::NotFound(address.to_string()))
    }

    async fn search_places(&self, query: &str) -> Result<Vec<SearchResult>> {
        let places = self.search(query, self.max_results).await?;
        Ok(places.into_iter().map(Self::to_search_result).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coords() {
        let c = NominatimGeocoder::parse_coords("12.9716", "77.5946").unwrap();
        assert!((c.lat() - 12.9716).abs() < 0.0001);
        assert!((c.lng() - 77.5946).abs() < 0.0001);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(NominatimGeocoder::parse_coords("invalid", "0").is_err());
        assert!(NominatimGeocoder::parse_coords("0", "invalid").is_err());
        assert!(NominatimGeocoder::parse_coords("95", "0").is_err());
    }

    #[test]
    fn test_reverse_maps_address_details() {
        let reverse: NominatimReverse = serde_json::from_str(
            r#"{
                "display_name": "MG Road, Shanthala Nagar, Bengaluru, Karnataka, 560001, India",
                "address": {
                    "road": "MG Road",
                    "suburb": "Shanthala Nagar",
                    "city": "Bengaluru",
                    "postcode": "560001"
                }
            }"#,
        )
        .unwrap();

        let resolved = NominatimGeocoder::to_resolved(reverse);
        assert_eq!(resolved.address, "MG Road, Shanthala Nagar");
        assert_eq!(resolved.city, "Bengaluru");
        assert_eq!(resolved.postal_code, "560001");
    }

    #[test]
    fn test_reverse_falls_back_to_town_and_display_name() {
        let reverse: NominatimReverse = serde_json::from_str(
            r#"{"display_name": "Somewhere rural", "address": {"town": "Hosur"}}"#,
        )
        .unwrap();

        let resolved = NominatimGeocoder::to_resolved(reverse);
        assert_eq!(resolved.address, "Somewhere rural");
        assert_eq!(resolved.city, "Hosur");
        assert_eq!(resolved.postal_code, "");
    }

    #[test]
    fn test_search_result_title() {
        let place = NominatimPlace {
            lat: "12.97".to_string(),
            lon: "77.59".to_string(),
            display_name: "Cubbon Park, Bengaluru, India".to_string(),
            name: None,
        };

        let result = NominatimGeocoder::to_search_result(place);
        assert_eq!(result.title, "Cubbon Park");
        assert_eq!(result.description, "Cubbon Park, Bengaluru, India");
        assert!(result.coordinate.is_some());
    }

    #[test]
    fn test_backend_creation() {
        let backend = NominatimGeocoder::new("https://example.org/", 5, 0).unwrap();
        assert_eq!(backend.base_url, "https://example.org");
        assert_eq!(backend.max_results, 1);
    }
}
