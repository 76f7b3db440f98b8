//! Centralized constants for the geopin crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Storefront backend serving the address endpoints
    pub const STOREFRONT_API_URL: &str = "http://127.0.0.1:8080/api";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Storefront backend path for reverse geocoding
    pub const REVERSE_GEOCODE_PATH: &str = "reverse-geocode";

    /// Storefront backend path for free-text place search
    pub const SEARCH_LOCATION_PATH: &str = "search-location";

    /// Storefront backend path for forward geocoding
    pub const GEOCODE_ADDRESS_PATH: &str = "geocode-address";

    /// User agent sent to every geocoding service
    pub const USER_AGENT: &str = concat!("geopin/", env!("CARGO_PKG_VERSION"));
}

/// Search box behaviour
pub mod search {
    /// Quiet period before a typed query is sent
    pub const DEBOUNCE_MS: u64 = 400;

    /// Queries shorter than this (after trimming) never hit the network
    pub const MIN_QUERY_CHARS: usize = 3;
}

/// Device position settings
pub mod gps {
    /// One-shot position request timeout
    pub const TIMEOUT_SECS: u64 = 10;
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}
