//! Location session
//!
//! Orchestrates map clicks, search-result selection and GPS detection into
//! a single selected location. Every placement runs the same pipeline:
//! obtain a coordinate, reverse geocode it, then commit marker and
//! selection together and notify the listener.
//!
//! Only one placement pipeline runs at a time; a second request while one
//! is in flight is rejected with [`Error::Busy`]. Before committing, a
//! pipeline re-checks the interaction lock and whether it is still the
//! current pipeline, so late results never overwrite a locked or newer
//! selection.

mod listener;

pub use listener::{LocationListener, Notice, TracingListener};

use crate::config::SearchConfig;
use crate::coord::{Coordinate, ResolvedAddress, SearchResult, SelectedLocation};
use crate::error::{Error, Result};
use crate::geo::simplify::simplify;
use crate::geo::GeocodeClient;
use crate::gps::{GpsLocator, PositionSource};
use crate::map::{MapSurface, Marker, MarkerController};
use crate::search::{SearchDebouncer, SearchState};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Externally visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing selected yet
    Idle,
    /// A placement pipeline is in flight
    Resolving,
    /// A selection exists and the marker reflects it
    Resolved,
    /// Interaction disabled; any selection is frozen
    Locked,
}

/// Pipeline phase, independent of the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Resolving { epoch: u64 },
    Resolved,
}

/// Read-only view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub locked: bool,
    pub selection: Option<SelectedLocation>,
    pub marker: Option<Marker>,
    pub search: SearchState,
    pub detecting: bool,
    pub notice: Option<Notice>,
}

struct SessionInner<S: MapSurface> {
    phase: Phase,
    locked: bool,
    next_epoch: u64,
    selection: Option<SelectedLocation>,
    markers: MarkerController<S>,
    detecting: bool,
    notice: Option<Notice>,
}

impl<S: MapSurface> SessionInner<S> {
    fn settled_phase(&self) -> Phase {
        if self.selection.is_some() {
            Phase::Resolved
        } else {
            Phase::Idle
        }
    }

    fn state(&self) -> SessionState {
        if self.locked {
            return SessionState::Locked;
        }
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Resolving { .. } => SessionState::Resolving,
            Phase::Resolved => SessionState::Resolved,
        }
    }

    fn show(&mut self, selection: &SelectedLocation, zoom: u8) -> Marker {
        let marker = self.markers.place(selection.coordinate);
        self.markers
            .surface_mut()
            .center_on(selection.coordinate, zoom);
        marker
    }
}

/// Interactive location resolution for one address picker
pub struct LocationSession<G, P, S>
where
    G: GeocodeClient,
    P: PositionSource,
    S: MapSurface,
{
    geocoder: Arc<G>,
    locator: GpsLocator<P>,
    search: SearchDebouncer<G>,
    inner: Mutex<SessionInner<S>>,
    listener: Box<dyn LocationListener>,
    selected_zoom: u8,
}

impl<G, P, S> LocationSession<G, P, S>
where
    G: GeocodeClient,
    P: PositionSource,
    S: MapSurface,
{
    pub fn new(
        geocoder: Arc<G>,
        locator: GpsLocator<P>,
        surface: S,
        listener: impl LocationListener + 'static,
    ) -> Self {
        let defaults = SearchConfig::default();
        Self {
            search: SearchDebouncer::new(
                Arc::clone(&geocoder),
                defaults.debounce(),
                defaults.min_query_chars,
            ),
            geocoder,
            locator,
            inner: Mutex::new(SessionInner {
                phase: Phase::Idle,
                locked: false,
                next_epoch: 0,
                selection: None,
                markers: MarkerController::new(surface),
                detecting: false,
                notice: None,
            }),
            listener: Box::new(listener),
            selected_zoom: crate::config::defaults::DEFAULT_SELECTED_ZOOM,
        }
    }

    /// Use search debounce settings from config
    pub fn with_search(mut self, config: &SearchConfig) -> Self {
        self.search = SearchDebouncer::new(
            Arc::clone(&self.geocoder),
            config.debounce(),
            config.min_query_chars,
        );
        self
    }

    /// Zoom level applied when a location is committed
    pub fn with_selected_zoom(mut self, zoom: u8) -> Self {
        self.selected_zoom = zoom;
        self
    }

    /// Place the selection where the user clicked
    pub async fn click(&self, coordinate: Coordinate) -> Result<SelectedLocation> {
        let epoch = self.begin("click").await?;
        self.place_at(epoch, coordinate).await
    }

    /// Place the selection at a chosen search result
    ///
    /// The result's text is forward geocoded, falling back once to a
    /// simplified form. On success the search box is cleared.
    pub async fn select_result(&self, result: &SearchResult) -> Result<SelectedLocation> {
        let epoch = self.begin("search selection").await?;

        let text = result.geocode_text();
        let coordinate = match geocode_with_fallback(self.geocoder.as_ref(), text).await {
            Ok(coordinate) => coordinate,
            Err(e) => return self.finish(epoch, Err(e)).await,
        };

        let selection = self.place_at(epoch, coordinate).await?;
        self.search.clear();
        Ok(selection)
    }

    /// Place the selection at the device's current position
    pub async fn locate_device(&self) -> Result<SelectedLocation> {
        let epoch = self.begin("GPS").await?;
        self.inner.lock().await.detecting = true;

        let position = self.locator.locate().await;
        self.inner.lock().await.detecting = false;

        match position {
            Ok(coordinate) => self.place_at(epoch, coordinate).await,
            Err(e) => self.finish(epoch, Err(e.into())).await,
        }
    }

    /// Engage or release the interaction lock
    ///
    /// Never clears the current selection.
    pub async fn set_locked(&self, locked: bool) {
        let mut inner = self.inner.lock().await;
        if inner.locked == locked {
            return;
        }
        inner.locked = locked;
        inner.markers.surface_mut().set_interactive(!locked);
        info!("Interaction lock {}", if locked { "engaged" } else { "released" });
    }

    /// Apply a location decided outside the picker, e.g. an order already placed
    ///
    /// Accepted even while locked. Supersedes any in-flight pipeline and does
    /// not notify the listener.
    pub async fn push_location(&self, selection: SelectedLocation) {
        let mut inner = self.inner.lock().await;
        if let Phase::Resolving { epoch } = inner.phase {
            debug!("External location supersedes pipeline #{}", epoch);
        }
        inner.show(&selection, self.selected_zoom);
        info!("External location set to {}", selection.coordinate);
        inner.selection = Some(selection);
        inner.phase = Phase::Resolved;
    }

    /// Handle a search-box edit
    pub fn update_query(&self, text: &str) {
        self.search.input(text);
    }

    /// Tear down: cancel search, remove the marker, forget the selection
    pub async fn end(&self) {
        self.search.clear();
        let mut inner = self.inner.lock().await;
        inner.markers.clear();
        inner.selection = None;
        inner.phase = Phase::Idle;
        inner.detecting = false;
        inner.notice = None;
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state()
    }

    pub async fn is_locked(&self) -> bool {
        self.inner.lock().await.locked
    }

    pub async fn selection(&self) -> Option<SelectedLocation> {
        self.inner.lock().await.selection.clone()
    }

    pub async fn marker(&self) -> Option<Marker> {
        self.inner.lock().await.markers.active()
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub fn subscribe_search(&self) -> watch::Receiver<SearchState> {
        self.search.subscribe()
    }

    /// Inspect the map surface
    pub async fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(self.inner.lock().await.markers.surface())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let search = self.search.state();
        let inner = self.inner.lock().await;
        SessionSnapshot {
            state: inner.state(),
            locked: inner.locked,
            selection: inner.selection.clone(),
            marker: inner.markers.active(),
            search,
            detecting: inner.detecting,
            notice: inner.notice.clone(),
        }
    }

    /// Claim the pipeline slot
    async fn begin(&self, action: &str) -> Result<u64> {
        let mut inner = self.inner.lock().await;

        if inner.locked {
            debug!("Rejected {}: session locked", action);
            return Err(Error::Locked);
        }
        if let Phase::Resolving { epoch } = inner.phase {
            debug!("Rejected {}: pipeline #{} in flight", action, epoch);
            return Err(Error::Busy);
        }

        inner.next_epoch += 1;
        let epoch = inner.next_epoch;
        inner.phase = Phase::Resolving { epoch };
        debug!("Started {} pipeline #{}", action, epoch);

        Ok(epoch)
    }

    async fn place_at(&self, epoch: u64, coordinate: Coordinate) -> Result<SelectedLocation> {
        let outcome = self
            .geocoder
            .reverse_geocode(coordinate)
            .await
            .map(|resolved| (coordinate, resolved));
        self.finish(epoch, outcome).await
    }

    /// Commit or abandon pipeline `epoch`
    async fn finish(
        &self,
        epoch: u64,
        outcome: Result<(Coordinate, ResolvedAddress)>,
    ) -> Result<SelectedLocation> {
        let mut inner = self.inner.lock().await;

        if inner.phase != (Phase::Resolving { epoch }) {
            info!("Discarding result of superseded pipeline #{}", epoch);
            return Err(Error::Superseded);
        }
        inner.phase = inner.settled_phase();

        let (coordinate, resolved) = match outcome {
            Ok(found) => found,
            Err(e) => {
                warn!("Pipeline #{} failed: {}", epoch, e);
                let notice = Notice::from_error(&e);
                inner.notice = Some(notice.clone());
                drop(inner);

                self.listener.on_notice(&notice);
                return Err(e);
            }
        };

        if inner.locked {
            warn!("Discarding result of pipeline #{}: session locked", epoch);
            return Err(Error::Locked);
        }

        let selection = SelectedLocation::new(coordinate, resolved);
        inner.show(&selection, self.selected_zoom);
        inner.selection = Some(selection.clone());
        inner.phase = Phase::Resolved;
        inner.notice = None;
        drop(inner);

        info!(
            "Selected {} ({}, {})",
            coordinate, selection.resolved.address, selection.resolved.city
        );
        self.listener.on_select_location(&selection);
        Ok(selection)
    }
}

/// Forward geocode `text`, retrying once with its simplified form
pub async fn geocode_with_fallback<G: GeocodeClient>(
    client: &G,
    text: &str,
) -> Result<Coordinate> {
    if text.is_empty() {
        return Err(Error::NotFound(String::new()));
    }

    let first = match client.forward_geocode(text).await {
        Ok(coordinate) => return Ok(coordinate),
        Err(e) => e,
    };

    let simplified = simplify(text);
    if simplified.is_empty() || simplified == text {
        return Err(first);
    }

    debug!("Geocode of '{}' failed ({}); retrying as '{}'", text, first, simplified);
    client.forward_geocode(&simplified).await
}

#[cfg(test)]
mod tests;
