//! geopin: interactive location resolution for address pickers
//!
//! Turns map clicks, free-text search and device position into a single
//! selected location with a human-readable address, keeping exactly one
//! marker on the map.
//!
//! ## Features
//!
//! - Reverse geocoding, forward geocoding and place search (HTTP or Nominatim)
//! - Debounced search with cancellation of stale queries
//! - Address simplification fallback for hard-to-geocode text
//! - Single-marker map control with an interaction lock
//! - One-shot device position with timeout
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use geopin::config::Config;
//! use geopin::geo::Geocoder;
//! use geopin::gps::locator_from_config;
//! use geopin::map::HeadlessMap;
//! use geopin::session::{LocationSession, TracingListener};
//! use geopin::Coordinate;
//!
//! # async fn demo() -> geopin::Result<()> {
//! let config = Config::default();
//! let geocoder = Arc::new(Geocoder::from_config(&config.geocoder)?);
//! let locator = locator_from_config(&config.gps)?;
//! let map = HeadlessMap::new(config.map.default_center()?, config.map.default_zoom);
//!
//! let session = LocationSession::new(geocoder, locator, map, TracingListener);
//! let selected = session.click(Coordinate::new(12.9716, 77.5946)?).await?;
//! println!("{}, {}", selected.resolved.address, selected.resolved.city);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod geo;
pub mod gps;
pub mod map;
pub mod search;
pub mod server;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use coord::{Coordinate, ResolvedAddress, SearchResult, SelectedLocation};
pub use error::{Error, GpsError, Result};
pub use geo::{GeocodeClient, Geocoder};
pub use session::{LocationListener, LocationSession, SessionState};
