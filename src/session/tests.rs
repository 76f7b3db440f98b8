use super::*;
use crate::error::GpsError;
use crate::gps::PositionOptions;
use crate::map::HeadlessMap;
use crate::testing::{FakeGeocoder, FakePosition};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

type TestSession = LocationSession<FakeGeocoder, FakePosition, HeadlessMap>;

#[derive(Clone, Default)]
struct Recorder {
    selections: Arc<StdMutex<Vec<SelectedLocation>>>,
    notices: Arc<StdMutex<Vec<Notice>>>,
}

impl Recorder {
    fn selections(&self) -> Vec<SelectedLocation> {
        self.selections.lock().unwrap().clone()
    }

    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl LocationListener for Recorder {
    fn on_select_location(&self, location: &SelectedLocation) {
        self.selections.lock().unwrap().push(location.clone());
    }

    fn on_notice(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn session_with(
    geocoder: &Arc<FakeGeocoder>,
    position: FakePosition,
) -> (TestSession, Recorder) {
    let recorder = Recorder::default();
    let session = LocationSession::new(
        Arc::clone(geocoder),
        GpsLocator::new(position, PositionOptions::default()),
        HeadlessMap::new(coord(0.0, 0.0), 12),
        recorder.clone(),
    );
    (session, recorder)
}

fn session(geocoder: &Arc<FakeGeocoder>) -> (TestSession, Recorder) {
    session_with(geocoder, FakePosition(Err(GpsError::Denied)))
}

fn search_result(description: &str) -> SearchResult {
    SearchResult {
        coordinate: None,
        title: "MG Road".to_string(),
        description: description.to_string(),
    }
}

async fn marker_count(session: &TestSession) -> usize {
    session.with_surface(|map| map.marker_count()).await
}

#[tokio::test]
async fn test_click_resolves_and_notifies() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, recorder) = session(&geocoder);

    let selection = session.click(coord(12.97, 77.59)).await.unwrap();

    let emitted = recorder.selections();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0], selection);
    assert_eq!(emitted[0].coordinate.lat(), 12.97);
    assert_eq!(emitted[0].coordinate.lng(), 77.59);
    assert_eq!(emitted[0].resolved.address, "MG Road");
    assert_eq!(emitted[0].resolved.city, "Bangalore");
    assert_eq!(emitted[0].resolved.postal_code, "560001");

    assert_eq!(marker_count(&session).await, 1);
    assert_eq!(session.marker().await.unwrap().coordinate, coord(12.97, 77.59));
    assert_eq!(session.state().await, SessionState::Resolved);
}

#[tokio::test]
async fn test_commit_centers_map() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, _) = session(&geocoder);
    let session = session.with_selected_zoom(17);

    session.click(coord(12.97, 77.59)).await.unwrap();

    let (center, zoom) = session.with_surface(|m| (m.center(), m.zoom())).await;
    assert_eq!(center, coord(12.97, 77.59));
    assert_eq!(zoom, 17);
}

#[tokio::test]
async fn test_repeated_clicks_keep_one_marker() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, recorder) = session(&geocoder);

    for (lat, lng) in [(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)] {
        session.click(coord(lat, lng)).await.unwrap();
    }

    assert_eq!(marker_count(&session).await, 1);
    assert_eq!(session.marker().await.unwrap().coordinate, coord(3.0, 3.0));
    assert_eq!(recorder.selections().len(), 3);
}

#[tokio::test]
async fn test_failed_reverse_geocode_drops_click() {
    let geocoder = Arc::new(FakeGeocoder::new().failing_reverse());
    let (session, recorder) = session(&geocoder);

    let result = session.click(coord(12.97, 77.59)).await;

    assert!(matches!(result, Err(Error::Service(_))));
    assert_eq!(marker_count(&session).await, 0);
    assert_eq!(session.state().await, SessionState::Idle);
    assert!(recorder.selections().is_empty());
    assert_eq!(recorder.notices().len(), 1);
    assert!(session.snapshot().await.notice.is_some());
}

#[tokio::test]
async fn test_failure_keeps_prior_selection() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, _) = session(&geocoder);
    let prior = session.click(coord(12.97, 77.59)).await.unwrap();

    let result = session.select_result(&search_result("Atlantis")).await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(session.selection().await, Some(prior));
    assert_eq!(session.state().await, SessionState::Resolved);
    assert_eq!(session.marker().await.unwrap().coordinate, coord(12.97, 77.59));
}

#[tokio::test]
async fn test_select_falls_back_to_simplified_address() {
    let description = "No. 42, MG Road, Flat 3B";
    let geocoder = Arc::new(FakeGeocoder::new().knows("MG Road, Flat", coord(13.0, 77.6)));
    let (session, recorder) = session(&geocoder);

    session.update_query("MG Road");
    let selection = session.select_result(&search_result(description)).await.unwrap();

    assert_eq!(
        geocoder.forward_calls(),
        vec![description.to_string(), "MG Road, Flat".to_string()]
    );
    assert_eq!(geocoder.reverse_calls(), vec![coord(13.0, 77.6)]);
    assert_eq!(selection.coordinate, coord(13.0, 77.6));
    assert_eq!(session.marker().await.unwrap().coordinate, coord(13.0, 77.6));
    assert_eq!(recorder.selections().len(), 1);
    assert_eq!(session.search_state(), SearchState::default());
}

#[tokio::test]
async fn test_select_direct_hit_skips_fallback() {
    let geocoder = Arc::new(FakeGeocoder::new().knows("Cubbon Park, Bangalore", coord(12.97, 77.59)));
    let (session, _) = session(&geocoder);

    session
        .select_result(&search_result("Cubbon Park, Bangalore"))
        .await
        .unwrap();

    assert_eq!(geocoder.forward_calls().len(), 1);
}

#[tokio::test]
async fn test_both_geocode_attempts_fail() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, recorder) = session(&geocoder);

    let result = session
        .select_result(&search_result("No. 42, MG Road, Flat 3B"))
        .await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(geocoder.forward_calls().len(), 2);
    assert!(geocoder.reverse_calls().is_empty());
    assert_eq!(marker_count(&session).await, 0);
    assert!(recorder.selections().is_empty());
    assert_eq!(session.state().await, SessionState::Idle);
}

#[tokio::test]
async fn test_locked_session_rejects_everything() {
    let geocoder = Arc::new(FakeGeocoder::new().knows("MG Road", coord(13.0, 77.6)));
    let (session, recorder) = session_with(&geocoder, FakePosition(Ok(coord(1.0, 1.0))));
    let prior = session.click(coord(12.97, 77.59)).await.unwrap();
    let calls_before = geocoder.total_calls();

    session.set_locked(true).await;

    assert!(matches!(session.click(coord(2.0, 2.0)).await, Err(Error::Locked)));
    assert!(matches!(
        session.select_result(&search_result("MG Road")).await,
        Err(Error::Locked)
    ));
    assert!(matches!(session.locate_device().await, Err(Error::Locked)));

    assert_eq!(geocoder.total_calls(), calls_before);
    assert_eq!(session.selection().await, Some(prior));
    assert_eq!(session.marker().await.unwrap().coordinate, coord(12.97, 77.59));
    assert_eq!(recorder.selections().len(), 1);
    assert_eq!(session.state().await, SessionState::Locked);
    assert!(!session.with_surface(|m| m.is_interactive()).await);
}

#[tokio::test]
async fn test_unlock_restores_interaction() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, _) = session(&geocoder);
    session.click(coord(12.97, 77.59)).await.unwrap();

    session.set_locked(true).await;
    session.set_locked(false).await;

    assert_eq!(session.state().await, SessionState::Resolved);
    assert!(session.with_surface(|m| m.is_interactive()).await);
    session.click(coord(13.0, 77.6)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_second_placement_while_resolving_is_busy() {
    let geocoder = Arc::new(FakeGeocoder::new().with_reverse_delay(Duration::from_secs(1)));
    let (session, recorder) = session(&geocoder);
    let session = Arc::new(session);

    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.click(coord(1.0, 1.0)).await }
    });
    while geocoder.reverse_calls().is_empty() {
        tokio::task::yield_now().await;
    }

    assert_eq!(session.state().await, SessionState::Resolving);
    assert!(matches!(session.click(coord(2.0, 2.0)).await, Err(Error::Busy)));
    assert!(matches!(
        session.select_result(&search_result("MG Road")).await,
        Err(Error::Busy)
    ));

    first.await.unwrap().unwrap();
    assert_eq!(geocoder.reverse_calls(), vec![coord(1.0, 1.0)]);
    assert_eq!(recorder.selections().len(), 1);
    assert_eq!(session.marker().await.unwrap().coordinate, coord(1.0, 1.0));
}

#[tokio::test(start_paused = true)]
async fn test_lock_during_flight_discards_result() {
    let geocoder = Arc::new(FakeGeocoder::new().with_reverse_delay(Duration::from_secs(1)));
    let (session, recorder) = session(&geocoder);
    let session = Arc::new(session);

    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.click(coord(1.0, 1.0)).await }
    });
    while geocoder.reverse_calls().is_empty() {
        tokio::task::yield_now().await;
    }
    session.set_locked(true).await;

    assert!(matches!(pending.await.unwrap(), Err(Error::Locked)));
    assert!(recorder.selections().is_empty());
    assert_eq!(marker_count(&session).await, 0);

    session.set_locked(false).await;
    assert_eq!(session.state().await, SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_external_push_supersedes_pipeline() {
    let geocoder = Arc::new(FakeGeocoder::new().with_reverse_delay(Duration::from_secs(1)));
    let (session, recorder) = session(&geocoder);
    let session = Arc::new(session);

    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.click(coord(1.0, 1.0)).await }
    });
    while geocoder.reverse_calls().is_empty() {
        tokio::task::yield_now().await;
    }

    let order = SelectedLocation::new(
        coord(12.97, 77.59),
        ResolvedAddress {
            address: "Order address".to_string(),
            city: "Bangalore".to_string(),
            postal_code: "560001".to_string(),
        },
    );
    session.push_location(order.clone()).await;

    assert!(matches!(pending.await.unwrap(), Err(Error::Superseded)));
    assert_eq!(session.selection().await, Some(order));
    assert_eq!(marker_count(&session).await, 1);
    assert!(recorder.selections().is_empty());
}

#[tokio::test]
async fn test_push_accepted_while_locked() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, recorder) = session(&geocoder);
    session.set_locked(true).await;

    let order = SelectedLocation::new(coord(12.97, 77.59), ResolvedAddress::default());
    session.push_location(order.clone()).await;

    assert_eq!(session.selection().await, Some(order));
    assert_eq!(session.marker().await.unwrap().coordinate, coord(12.97, 77.59));
    assert_eq!(session.state().await, SessionState::Locked);
    assert!(recorder.selections().is_empty());
    assert_eq!(geocoder.total_calls(), 0);
}

#[tokio::test]
async fn test_gps_places_at_device_position() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, recorder) = session_with(&geocoder, FakePosition(Ok(coord(12.93, 77.62))));

    let selection = session.locate_device().await.unwrap();

    assert_eq!(selection.coordinate, coord(12.93, 77.62));
    assert_eq!(recorder.selections().len(), 1);
    assert!(!session.snapshot().await.detecting);
}

#[tokio::test]
async fn test_gps_denial_surfaces_notice() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, recorder) = session(&geocoder);

    let result = session.locate_device().await;

    assert!(matches!(result, Err(Error::Gps(GpsError::Denied))));
    let snapshot = session.snapshot().await;
    assert!(!snapshot.detecting);
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(snapshot.notice.unwrap().message.contains("denied"));
    assert_eq!(recorder.notices().len(), 1);
    assert!(geocoder.reverse_calls().is_empty());
}

#[tokio::test]
async fn test_end_removes_marker() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, _) = session(&geocoder);
    session.click(coord(12.97, 77.59)).await.unwrap();

    session.end().await;

    assert_eq!(marker_count(&session).await, 0);
    assert_eq!(session.selection().await, None);
    assert_eq!(session.state().await, SessionState::Idle);
}

#[tokio::test]
async fn test_closure_listener() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let session: TestSession = LocationSession::new(
        Arc::clone(&geocoder),
        GpsLocator::new(FakePosition(Err(GpsError::Timeout)), PositionOptions::default()),
        HeadlessMap::new(coord(0.0, 0.0), 12),
        move |location: &SelectedLocation| {
            sink.lock().unwrap().push(location.resolved.postal_code.clone())
        },
    );

    session.click(coord(12.97, 77.59)).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["560001".to_string()]);
}

#[tokio::test]
async fn test_fallback_skipped_when_simplification_is_noop() {
    let geocoder = FakeGeocoder::new();

    let result = geocode_with_fallback(&geocoder, "Atlantis").await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(geocoder.forward_calls(), vec!["Atlantis".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_during_lock_still_reported() {
    let geocoder = Arc::new(
        FakeGeocoder::new()
            .failing_reverse()
            .with_reverse_delay(Duration::from_secs(1)),
    );
    let (session, recorder) = session(&geocoder);
    let session = Arc::new(session);

    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.click(coord(1.0, 1.0)).await }
    });
    while geocoder.reverse_calls().is_empty() {
        tokio::task::yield_now().await;
    }
    session.set_locked(true).await;

    assert!(matches!(pending.await.unwrap(), Err(Error::Service(_))));
    assert_eq!(recorder.notices().len(), 1);
    assert!(session.snapshot().await.notice.is_some());
    assert_eq!(session.state().await, SessionState::Locked);
    assert_eq!(marker_count(&session).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_search_updates_reach_subscribers() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let (session, _) = session(&geocoder);
    let mut updates = session.subscribe_search();

    session.update_query("Indiranagar");
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(updates.has_changed().unwrap());
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.query, "Indiranagar");
    assert_eq!(state.results[0].title, "Indiranagar");
    assert!(!state.loading);
    assert_eq!(session.snapshot().await.search, state);
}

#[tokio::test]
async fn test_listener_receives_service_address() {
    let geocoder = Arc::new(FakeGeocoder::default().with_address(ResolvedAddress {
        address: "100 Feet Road".to_string(),
        city: "Bengaluru".to_string(),
        postal_code: "560038".to_string(),
    }));
    let (session, recorder) = session(&geocoder);

    session.click(coord(12.97, 77.64)).await.unwrap();

    let emitted = recorder.selections();
    assert_eq!(emitted[0].resolved.address, "100 Feet Road");
    assert_eq!(emitted[0].resolved.city, "Bengaluru");
    assert_eq!(emitted[0].resolved.postal_code, "560038");
}
