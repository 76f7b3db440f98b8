//! Error types for geopin

use thiserror::Error;

/// Failure modes of a device position request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GpsError {
    #[error("location permission denied")]
    Denied,

    #[error("location request timed out")]
    Timeout,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Main error type for geopin operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Geocoding service error: {0}")]
    Service(String),

    #[error("No match found for '{0}'")]
    NotFound(String),

    #[error("GPS error: {0}")]
    Gps(#[from] GpsError),

    #[error("Location selection is locked")]
    Locked,

    #[error("A placement is already in progress")]
    Busy,

    #[error("Placement superseded by a newer location")]
    Superseded,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Whether the session can keep going after this error
    ///
    /// Everything a placement pipeline can produce is recoverable; only
    /// process-level failures (config, IO, server) are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Io(_) | Self::Server(_))
    }

    /// Message suitable for showing next to the map
    pub fn user_message(&self) -> String {
        match self {
            Self::Service(_) => {
                "Could not reach the address service. Please try again.".to_string()
            }
            Self::NotFound(query) => format!("We couldn't find \"{}\" on the map.", query),
            Self::Gps(GpsError::Denied) => {
                "Location access was denied. Pick your address on the map instead.".to_string()
            }
            Self::Gps(GpsError::Timeout) => {
                "Detecting your location took too long. Please try again.".to_string()
            }
            Self::Gps(GpsError::Unavailable(_)) => {
                "Your location is unavailable right now.".to_string()
            }
            Self::Locked => "The delivery location can't be changed right now.".to_string(),
            Self::Busy => "Still looking up the previous location.".to_string(),
            Self::Superseded => "The location was updated elsewhere.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for geopin operations
pub type Result<T> = std::result::Result<T, Error>;
