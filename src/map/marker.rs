//! Selected-location marker
//!
//! Owns the single marker bound to the session's selection. At most one
//! marker exists on the surface at any time.

use crate::coord::Coordinate;
use crate::map::{MapSurface, MarkerId};
use serde::Serialize;
use tracing::debug;

/// Handle to the marker currently on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub id: MarkerId,
    pub coordinate: Coordinate,
}

/// Places, replaces and removes the selection marker
#[derive(Debug)]
pub struct MarkerController<S: MapSurface> {
    surface: S,
    active: Option<Marker>,
}

impl<S: MapSurface> MarkerController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            active: None,
        }
    }

    /// Put the marker at `coordinate`, removing any previous one first
    pub fn place(&mut self, coordinate: Coordinate) -> Marker {
        self.clear();

        let marker = Marker {
            id: MarkerId::new(),
            coordinate,
        };
        self.surface.add_marker(marker.id, coordinate);
        self.active = Some(marker);
        debug!("Placed marker {} at {}", marker.id, coordinate);

        marker
    }

    /// Remove the active marker; no-op when there is none
    pub fn clear(&mut self) {
        if let Some(old) = self.active.take() {
            self.surface.remove_marker(old.id);
            debug!("Removed marker {}", old.id);
        }
    }

    pub fn active(&self) -> Option<Marker> {
        self.active
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: MapSurface> Drop for MarkerController<S> {
    fn drop(&mut self) {
        self.clear();
    }
}
