//! Server shared state
//!
//! Holds configuration, the geocoder and the hosted location session.

use crate::config::Config;
use crate::error::Result;
use crate::geo::Geocoder;
use crate::gps::{locator_from_config, DevicePosition};
use crate::map::HeadlessMap;
use crate::session::{LocationSession, TracingListener};
use std::sync::Arc;

/// The session type hosted by the server
pub type HostedSession = LocationSession<Geocoder, DevicePosition, HeadlessMap>;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Geocoder shared by the session and the passthrough endpoints
    pub geocoder: Arc<Geocoder>,

    /// The address picker session
    pub session: HostedSession,

    gps_provider: &'static str,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Result<Self> {
        let geocoder = Arc::new(Geocoder::from_config(&config.geocoder)?);
        let locator = locator_from_config(&config.gps)?;
        let gps_provider = locator.source().name();
        let map = HeadlessMap::new(config.map.default_center()?, config.map.default_zoom);

        let session = LocationSession::new(Arc::clone(&geocoder), locator, map, TracingListener)
            .with_search(&config.search)
            .with_selected_zoom(config.map.selected_zoom);

        Ok(Self {
            config,
            geocoder,
            session,
            gps_provider,
        })
    }

    /// Name of the active geocoder
    pub fn geocoder_name(&self) -> &'static str {
        self.geocoder.name()
    }

    /// Name of the active GPS provider
    pub fn gps_provider(&self) -> &'static str {
        self.gps_provider
    }
}
