//! Device position
//!
//! Wraps a platform position query as a single-shot async request that
//! yields a [`Coordinate`] or fails with a [`GpsError`]. No retries.

pub mod ip_location;

use crate::config::GpsConfig;
use crate::coord::Coordinate;
use crate::error::{Error, GpsError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Options for a one-shot position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(crate::constants::gps::TIMEOUT_SECS),
        }
    }
}

/// Platform position provider
pub trait PositionSource: Send + Sync + 'static {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = std::result::Result<Coordinate, GpsError>> + Send;
}

/// Single-shot locator enforcing the configured timeout
#[derive(Debug)]
pub struct GpsLocator<P: PositionSource> {
    source: P,
    options: PositionOptions,
}

impl<P: PositionSource> GpsLocator<P> {
    pub fn new(source: P, options: PositionOptions) -> Self {
        Self { source, options }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Ask for the current position once
    pub async fn locate(&self) -> std::result::Result<Coordinate, GpsError> {
        debug!(
            "Requesting device position (high_accuracy={}, timeout={:?})",
            self.options.high_accuracy, self.options.timeout
        );

        match tokio::time::timeout(self.options.timeout, self.source.current_position(&self.options))
            .await
        {
            Ok(Ok(coordinate)) => Ok(coordinate),
            Ok(Err(e)) => {
                warn!("Device position failed: {}", e);
                Err(e)
            }
            Err(_) => {
                warn!("Device position timed out after {:?}", self.options.timeout);
                Err(GpsError::Timeout)
            }
        }
    }
}

/// Position source selected from configuration
#[derive(Debug)]
pub enum DevicePosition {
    /// Approximate position from the host's public IP
    Ip(ip_location::IpPositionSource),
    /// Fixed coordinate, e.g. a kiosk with a known address
    Fixed(Coordinate),
    /// No position capability
    Disabled,
}

impl DevicePosition {
    pub fn from_config(config: &GpsConfig) -> Result<Self> {
        match config.provider.as_str() {
            "ip" => Ok(Self::Ip(ip_location::IpPositionSource::new())),
            "fixed" => match (config.fixed_lat, config.fixed_lng) {
                (Some(lat), Some(lng)) => Ok(Self::Fixed(Coordinate::new(lat, lng)?)),
                _ => Err(Error::Config(
                    "gps.provider = \"fixed\" requires gps.fixed_lat and gps.fixed_lng".to_string(),
                )),
            },
            "none" => Ok(Self::Disabled),
            other => Err(Error::Config(format!("Unknown GPS provider: {}", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ip(_) => "ip",
            Self::Fixed(_) => "fixed",
            Self::Disabled => "none",
        }
    }
}

impl PositionSource for DevicePosition {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> std::result::Result<Coordinate, GpsError> {
        match self {
            Self::Ip(source) => source.current_position(options).await,
            Self::Fixed(coordinate) => Ok(*coordinate),
            Self::Disabled => Err(GpsError::Unavailable(
                "no position provider configured".to_string(),
            )),
        }
    }
}

/// Build a locator from the `[gps]` config section
pub fn locator_from_config(config: &GpsConfig) -> Result<GpsLocator<DevicePosition>> {
    let options = PositionOptions {
        high_accuracy: config.high_accuracy,
        timeout: Duration::from_secs(config.timeout_secs),
    };
    Ok(GpsLocator::new(DevicePosition::from_config(config)?, options))
}
