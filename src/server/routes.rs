//! HTTP API routes
//!
//! Session endpoints drive the hosted location session; the geocoding
//! endpoints answer the storefront address API directly.

use crate::coord::{Coordinate, ResolvedAddress, SearchResult, SelectedLocation};
use crate::error::Error;
use crate::geo::GeocodeClient;
use crate::map::HeadlessMap;
use crate::server::state::AppState;
use crate::session::SessionSnapshot;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/session", get(session_handler).delete(end_session_handler))
        .route("/api/session/click", post(click_handler))
        .route("/api/session/query", put(query_handler))
        .route("/api/session/select", post(select_handler))
        .route("/api/session/gps", post(gps_handler))
        .route("/api/session/lock", put(lock_handler))
        .route("/api/session/location", post(push_location_handler))
        .route("/api/map", get(map_handler))
        .route("/api/reverse-geocode", get(reverse_geocode_handler))
        .route("/api/search-location", get(search_location_handler))
        .route("/api/geocode-address", get(geocode_address_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "INVALID_COORDINATES" => StatusCode::BAD_REQUEST,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "LOCKED" | "BUSY" | "SUPERSEDED" => StatusCode::CONFLICT,
            "SERVICE_ERROR" => StatusCode::BAD_GATEWAY,
            "GPS_ERROR" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Locked => "LOCKED",
            Error::Busy => "BUSY",
            Error::Superseded => "SUPERSEDED",
            Error::Service(_) => "SERVICE_ERROR",
            Error::Gps(_) => "GPS_ERROR",
            _ => "INTERNAL_ERROR",
        };
        let error = if err.is_recoverable() {
            err.user_message()
        } else {
            err.to_string()
        };
        ApiError {
            error,
            code: code.to_string(),
        }
    }
}

/// Raw coordinate pair, validated on use
#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    fn coordinate(&self) -> Result<Coordinate, ApiError> {
        Coordinate::new(self.lat, self.lng).map_err(ApiError::from)
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub geocoder: String,
    pub gps: String,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        geocoder: state.geocoder_name().to_string(),
        gps: state.gps_provider().to_string(),
    })
}

/// Current session snapshot
///
/// GET /api/session
async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

/// End the session: clears marker, selection and search
///
/// DELETE /api/session
async fn end_session_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.end().await;
    StatusCode::NO_CONTENT
}

/// Map click
///
/// POST /api/session/click
async fn click_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LatLng>,
) -> Result<Json<SelectedLocation>, ApiError> {
    let coordinate = req.coordinate()?;
    let selection = state.session.click(coordinate).await?;
    Ok(Json(selection))
}

/// Search box edit request
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub text: String,
}

/// Search box edit; results arrive in the session snapshot
///
/// PUT /api/session/query
async fn query_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> StatusCode {
    state.session.update_query(&req.text);
    StatusCode::ACCEPTED
}

/// Search result selection request
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl SelectRequest {
    fn into_result(self) -> SearchResult {
        let coordinate = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        };
        SearchResult {
            coordinate,
            title: self.title,
            description: self.description,
        }
    }
}

/// Pick a search result
///
/// POST /api/session/select
async fn select_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SelectedLocation>, ApiError> {
    let selection = state.session.select_result(&req.into_result()).await?;
    Ok(Json(selection))
}

/// Use the device position
///
/// POST /api/session/gps
async fn gps_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SelectedLocation>, ApiError> {
    let selection = state.session.locate_device().await?;
    Ok(Json(selection))
}

/// Lock toggle request
#[derive(Debug, Deserialize)]
pub struct LockRequest {
    pub locked: bool,
}

/// Engage or release the interaction lock
///
/// PUT /api/session/lock
async fn lock_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LockRequest>,
) -> Json<SessionSnapshot> {
    state.session.set_locked(req.locked).await;
    Json(state.session.snapshot().await)
}

/// External location push request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushLocationRequest {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Apply a location decided elsewhere (accepted while locked)
///
/// POST /api/session/location
async fn push_location_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PushLocationRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let coordinate = Coordinate::new(req.lat, req.lng)?;
    let selection = SelectedLocation::new(
        coordinate,
        ResolvedAddress {
            address: req.address,
            city: req.city,
            postal_code: req.postal_code,
        },
    );
    state.session.push_location(selection).await;
    Ok(Json(state.session.snapshot().await))
}

/// Headless map state
///
/// GET /api/map
async fn map_handler(State(state): State<Arc<AppState>>) -> Json<HeadlessMap> {
    Json(state.session.with_surface(HeadlessMap::clone).await)
}

/// Reverse geocode endpoint
///
/// GET /api/reverse-geocode?lat&lng
async fn reverse_geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LatLng>,
) -> Result<Json<ResolvedAddress>, ApiError> {
    let coordinate = params.coordinate()?;
    let resolved = state.geocoder.reverse_geocode(coordinate).await?;
    Ok(Json(resolved))
}

/// Place search query
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// Search item in the storefront wire format
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub title: String,
    pub description: String,
}

impl From<SearchResult> for PlaceResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            lat: result.coordinate.map(|c| c.lat()),
            lng: result.coordinate.map(|c| c.lng()),
            title: result.title,
            description: result.description,
        }
    }
}

/// Free-text place search endpoint
///
/// GET /api/search-location?q
async fn search_location_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PlaceResponse>>, ApiError> {
    let query = params.q.trim();
    if query.chars().count() < state.config.search.min_query_chars {
        return Ok(Json(Vec::new()));
    }

    let results = state.geocoder.search_places(query).await?;
    Ok(Json(results.into_iter().map(PlaceResponse::from).collect()))
}

/// Forward geocode query
#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub address: String,
}

/// Forward geocode endpoint
///
/// GET /api/geocode-address?address
async fn geocode_address_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeParams>,
) -> Result<Json<Coordinate>, ApiError> {
    let coordinate = state.geocoder.forward_geocode(params.address.trim()).await?;
    Ok(Json(coordinate))
}
