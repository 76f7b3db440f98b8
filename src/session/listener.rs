//! Consumer callbacks

use crate::coord::SelectedLocation;
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// User-visible message about a failed action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn from_error(error: &Error) -> Self {
        Self {
            message: error.user_message(),
            at: Utc::now(),
        }
    }
}

/// Receives the outcome of placement pipelines
///
/// `on_select_location` fires exactly once per successful pipeline.
pub trait LocationListener: Send + Sync {
    fn on_select_location(&self, location: &SelectedLocation);

    fn on_notice(&self, _notice: &Notice) {}
}

impl<F> LocationListener for F
where
    F: Fn(&SelectedLocation) + Send + Sync,
{
    fn on_select_location(&self, location: &SelectedLocation) {
        self(location)
    }
}

/// Listener that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl LocationListener for TracingListener {
    fn on_select_location(&self, location: &SelectedLocation) {
        info!(
            lat = location.coordinate.lat(),
            lng = location.coordinate.lng(),
            address = %location.resolved.address,
            city = %location.resolved.city,
            postal_code = %location.resolved.postal_code,
            "Location selected"
        );
    }

    fn on_notice(&self, notice: &Notice) {
        info!("Notice: {}", notice.message);
    }
}
