//! In-memory collaborators for unit tests

use crate::coord::{Coordinate, ResolvedAddress, SearchResult};
use crate::error::{Error, GpsError, Result};
use crate::geo::GeocodeClient;
use crate::gps::{PositionOptions, PositionSource};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Scriptable geocoder that records every call
#[derive(Debug)]
pub struct FakeGeocoder {
    address: ResolvedAddress,
    known: HashMap<String, Coordinate>,
    reverse_fails: bool,
    search_fails: bool,
    reverse_delay: Duration,
    search_delay: Duration,
    reverse_calls: Mutex<Vec<Coordinate>>,
    forward_calls: Mutex<Vec<String>>,
    search_calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self {
            address: ResolvedAddress {
                address: "MG Road".to_string(),
                city: "Bangalore".to_string(),
                postal_code: "560001".to_string(),
            },
            known: HashMap::new(),
            reverse_fails: false,
            search_fails: false,
            reverse_delay: Duration::ZERO,
            search_delay: Duration::ZERO,
            reverse_calls: Mutex::new(Vec::new()),
            forward_calls: Mutex::new(Vec::new()),
            search_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_address(mut self, address: ResolvedAddress) -> Self {
        self.address = address;
        self
    }

    /// Make `text` forward-geocode to `coordinate`
    pub fn knows(mut self, text: &str, coordinate: Coordinate) -> Self {
        self.known.insert(text.to_string(), coordinate);
        self
    }

    pub fn failing_reverse(mut self) -> Self {
        self.reverse_fails = true;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.search_fails = true;
        self
    }

    pub fn with_reverse_delay(mut self, delay: Duration) -> Self {
        self.reverse_delay = delay;
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn reverse_calls(&self) -> Vec<Coordinate> {
        self.reverse_calls.lock().unwrap().clone()
    }

    pub fn forward_calls(&self) -> Vec<String> {
        self.forward_calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.reverse_calls().len() + self.forward_calls().len() + self.search_calls().len()
    }
}

impl Default for FakeGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeClient for FakeGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<ResolvedAddress> {
        self.reverse_calls.lock().unwrap().push(coordinate);
        if !self.reverse_delay.is_zero() {
            tokio::time::sleep(self.reverse_delay).await;
        }
        if self.reverse_fails {
            return Err(Error::Service("reverse geocode unavailable".to_string()));
        }
        Ok(self.address.clone())
    }

    async fn forward_geocode(&self, address: &str) -> Result<Coordinate> {
        self.forward_calls.lock().unwrap().push(address.to_string());
        self.known
            .get(address)
            .copied()
            .ok_or_else(|| Error::NotFound(address.to_string()))
    }

    async fn search_places(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search_calls.lock().unwrap().push(query.to_string());
        if !self.search_delay.is_zero() {
            tokio::time::sleep(self.search_delay).await;
        }
        if self.search_fails {
            return Err(Error::Service("search unavailable".to_string()));
        }
        Ok(vec![SearchResult {
            coordinate: None,
            title: query.to_string(),
            description: format!("{}, Bangalore", query),
        }])
    }
}

/// Position source returning a fixed answer
#[derive(Debug, Clone)]
pub struct FakePosition(pub std::result::Result<Coordinate, GpsError>);

impl PositionSource for FakePosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> std::result::Result<Coordinate, GpsError> {
        self.0.clone()
    }
}
