//! Geocoding module
//!
//! Provides forward geocoding (address text to coordinate), reverse
//! geocoding (coordinate to structured address) and free-text place search
//! against an external service. No retries happen here; fallback policy
//! belongs to the location session.

pub mod http;
pub mod nominatim;
pub mod simplify;

use crate::config::GeocoderConfig;
use crate::coord::{Coordinate, ResolvedAddress, SearchResult};
use crate::error::{Error, Result};
use std::future::Future;

/// Trait for geocoding backends
pub trait GeocodeClient: Send + Sync + 'static {
    /// Resolve a coordinate to a structured address
    ///
    /// Fails with [`Error::Service`]; there is no local fallback.
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<ResolvedAddress>> + Send;

    /// Resolve address text to a coordinate
    ///
    /// Fails with [`Error::NotFound`] when the service cannot place the text.
    fn forward_geocode(&self, address: &str) -> impl Future<Output = Result<Coordinate>> + Send;

    /// Search places matching free text
    ///
    /// No matches is an empty list, not an error.
    fn search_places(&self, query: &str) -> impl Future<Output = Result<Vec<SearchResult>>> + Send;
}

/// Geocoder selected from configuration
#[derive(Debug, Clone)]
pub enum Geocoder {
    Http(http::HttpGeocodeClient),
    Nominatim(nominatim::NominatimGeocoder),
}

impl Geocoder {
    /// Build the configured backend
    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        match config.provider.as_str() {
            "http" => Ok(Self::Http(http::HttpGeocodeClient::new(
                &config.http_url,
                config.timeout_secs,
            )?)),
            "nominatim" => Ok(Self::Nominatim(nominatim::NominatimGeocoder::new(
                &config.nominatim_url,
                config.timeout_secs,
                config.max_results,
            )?)),
            other => Err(Error::Config(format!("Unknown geocoder provider: {}", other))),
        }
    }

    /// Backend name as used in config
    pub fn name(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Nominatim(_) => "nominatim",
        }
    }
}

impl GeocodeClient for Geocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<ResolvedAddress> {
        match self {
            Self::Http(client) => client.reverse_geocode(coordinate).await,
            Self::Nominatim(client) => client.reverse_geocode(coordinate).await,
        }
    }

    async fn forward_geocode(&self, address: &str) -> Result<Coordinate> {
        match self {
            Self::Http(client) => client.forward_geocode(address).await,
            Self::Nominatim(client) => client.forward_geocode(address).await,
        }
    }

    async fn search_places(&self, query: &str) -> Result<Vec<SearchResult>> {
        match self {
            Self::Http(client) => client.search_places(query).await,
            Self::Nominatim(client) => client.search_places(query).await,
        }
    }
}

/// Build a reqwest client with the shared user agent and timeout
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(crate::constants::api::USER_AGENT)
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
}
