//! Storefront geocoding backend
//!
//! Talks to the storefront's own address endpoints:
//! - `GET {base}/reverse-geocode?lat&lng` -> `{address, city, postalCode}`
//! - `GET {base}/search-location?q` -> `[{lat?, lng?, title, description}]`
//! - `GET {base}/geocode-address?address` -> `{lat, lng}`

use crate::constants::api::{GEOCODE_ADDRESS_PATH, REVERSE_GEOCODE_PATH, SEARCH_LOCATION_PATH};
use crate::coord::{Coordinate, ResolvedAddress, SearchResult};
use crate::error::{Error, Result};
use crate::geo::{build_client, GeocodeClient};
use serde::Deserialize;
use tracing::debug;

/// HTTP client for the storefront address endpoints
#[derive(Debug, Clone)]
pub struct HttpGeocodeClient {
    client: reqwest::Client,
    base_url: String,
}

/// Search endpoint item; coordinates are optional
#[derive(Debug, Deserialize)]
struct PlaceItem {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

/// Forward geocode body; the service sometimes answers with nulls
#[derive(Debug, Deserialize)]
struct GeocodeBody {
    lat: Option<f64>,
    lng: Option<f64>,
}

impl HttpGeocodeClient {
    /// Create a client rooted at `base_url`
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: &str) -> String {
        format!("{}/{}?{}", self.base_url, path, query)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Service(format!("Request failed: {}", e)))
    }

    fn place_to_result(item: PlaceItem) -> SearchResult {
        let coordinate = match (item.lat, item.lng) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        };
        SearchResult {
            coordinate,
            title: item.title,
            description: item.description,
        }
    }
}

impl GeocodeClient for HttpGeocodeClient {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<ResolvedAddress> {
        let url = self.endpoint(
            REVERSE_GEOCODE_PATH,
            &format!("lat={}&lng={}", coordinate.lat(), coordinate.lng()),
        );

        let response = self.get(&url).await?;
        if !response.status().is_success() {
            return Err(Error::Service(format!(
                "Reverse geocode returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Service(format!("Failed to parse reverse geocode response: {}", e)))
    }

    async fn forward_geocode(&self, address: &str) -> Result<Coordinate> {
        let url = self.endpoint(
            GEOCODE_ADDRESS_PATH,
            &format!("address={}", urlencoding::encode(address)),
        );

        let response = self.get(&url).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(address.to_string()));
        }
        if !response.status().is_success() {
            return Err(Error::Service(format!(
                "Geocode returned status: {}",
                response.status()
            )));
        }

        let body: GeocodeBody = response
            .json()
            .await
            .map_err(|e| Error::Service(format!("Failed to parse geocode response: {}", e)))?;

        match (body.lat, body.lng) {
            (Some(lat), Some(lng)) => {
                Coordinate::new(lat, lng).map_err(|_| Error::NotFound(address.to_string()))
            }
            _ => Err(Error::NotFound(address.to_string())),
        }
    }

    async fn search_places(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = self.endpoint(
            SEARCH_LOCATION_PATH,
            &format!("q={}", urlencoding::encode(query)),
        );

        let response = self.get(&url).await?;
        if !response.status().is_success() {
            return Err(Error::Service(format!(
                "Place search returned status: {}",
                response.status()
            )));
        }

        let items: Vec<PlaceItem> = response
            .json()
            .await
            .map_err(|e| Error::Service(format!("Failed to parse search response: {}", e)))?;

        Ok(items.into_iter().map(Self::place_to_result).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = HttpGeocodeClient::new("http://shop.local/api/", 5).unwrap();
        assert_eq!(
            client.endpoint(REVERSE_GEOCODE_PATH, "lat=1&lng=2"),
            "http://shop.local/api/reverse-geocode?lat=1&lng=2"
        );
    }

    #[test]
    fn test_place_without_coordinates() {
        let items: Vec<PlaceItem> = serde_json::from_str(
            r#"[
                {"title": "MG Road", "description": "MG Road, Bangalore"},
                {"lat": 12.97, "lng": 77.59, "title": "Brigade Road", "description": "Brigade Road, Bangalore"}
            ]"#,
        )
        .unwrap();

        let results: Vec<SearchResult> = items
            .into_iter()
            .map(HttpGeocodeClient::place_to_result)
            .collect();

        assert!(results[0].coordinate.is_none());
        assert_eq!(results[1].coordinate.map(|c| c.lat()), Some(12.97));
    }

    #[test]
    fn test_out_of_range_place_drops_coordinate() {
        let item = PlaceItem {
            lat: Some(200.0),
            lng: Some(0.0),
            title: "Nowhere".to_string(),
            description: String::new(),
        };
        assert!(HttpGeocodeClient::place_to_result(item).coordinate.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_service_error() {
        let client = HttpGeocodeClient::new("http://127.0.0.1:9", 1).unwrap();
        let coordinate = Coordinate::new(12.97, 77.59).unwrap();
        let result = client.reverse_geocode(coordinate).await;
        assert!(matches!(result, Err(Error::Service(_))));
    }
}
