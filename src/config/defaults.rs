//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default geocoding backend
pub const DEFAULT_GEOCODER: &str = "nominatim";

/// Default Nominatim base URL
pub const DEFAULT_NOMINATIM_URL: &str = crate::constants::api::NOMINATIM_URL;

/// Default storefront address API base URL
pub const DEFAULT_HTTP_GEOCODER_URL: &str = crate::constants::api::STOREFRONT_API_URL;

/// Default geocoding request timeout in seconds
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Default number of place matches to show
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Default GPS provider
pub const DEFAULT_GPS_PROVIDER: &str = "ip";

/// Default map center (Bangalore)
pub const DEFAULT_MAP_LAT: f64 = 12.9716;
pub const DEFAULT_MAP_LNG: f64 = 77.5946;

/// Zoom before anything is selected
pub const DEFAULT_MAP_ZOOM: u8 = 12;

/// Zoom after a location is selected
pub const DEFAULT_SELECTED_ZOOM: u8 = 16;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "geopin";
