//! Map surface abstraction
//!
//! The map itself (tiles, pan/zoom, marker drawing) is external. This module
//! defines the capability the location engine needs from it and an
//! in-memory surface used by the HTTP host and tests.

pub mod marker;

use crate::coord::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub use marker::{Marker, MarkerController};

/// Identity of a marker drawn on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(Uuid);

impl MarkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What the engine can ask of the map
///
/// All calls are local and assumed infallible.
pub trait MapSurface: Send + 'static {
    /// Draw a marker at a coordinate
    fn add_marker(&mut self, id: MarkerId, at: Coordinate);

    /// Remove a marker; unknown ids are ignored
    fn remove_marker(&mut self, id: MarkerId);

    /// Enable or disable pan, zoom and drag
    fn set_interactive(&mut self, enabled: bool);

    /// Move the viewport
    fn center_on(&mut self, at: Coordinate, zoom: u8);
}

/// In-memory map surface
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessMap {
    markers: BTreeMap<MarkerId, Coordinate>,
    center: Coordinate,
    zoom: u8,
    interactive: bool,
}

impl HeadlessMap {
    pub fn new(center: Coordinate, zoom: u8) -> Self {
        Self {
            markers: BTreeMap::new(),
            center,
            zoom,
            interactive: true,
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerId, &Coordinate)> {
        self.markers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl MapSurface for HeadlessMap {
    fn add_marker(&mut self, id: MarkerId, at: Coordinate) {
        self.markers.insert(id, at);
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn set_interactive(&mut self, enabled: bool) {
        self.interactive = enabled;
    }

    fn center_on(&mut self, at: Coordinate, zoom: u8) {
        self.center = at;
        self.zoom = zoom;
    }
}
