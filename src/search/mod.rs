//! Debounced place search
//!
//! Turns a stream of search-box edits into at most one `search_places`
//! request. Every edit supersedes the pending search: its timer task is
//! aborted and its ticket invalidated, so a result that still arrives is
//! discarded. Only the newest query is ever trusted.

use crate::coord::SearchResult;
use crate::geo::GeocodeClient;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// What the result list should show
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Validity token for one scheduled search
///
/// A ticket is current until a newer edit (or a clear) bumps the shared
/// generation counter.
#[derive(Debug, Clone)]
struct SearchTicket {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl SearchTicket {
    fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }
}

/// The single scheduled or in-flight search
#[derive(Debug)]
struct PendingSearch {
    ticket: SearchTicket,
    handle: JoinHandle<()>,
}

impl PendingSearch {
    fn cancel(self) {
        debug!("Cancelling search #{}", self.ticket.id);
        self.handle.abort();
    }
}

/// Debouncer for the search box
pub struct SearchDebouncer<G: GeocodeClient> {
    client: Arc<G>,
    delay: Duration,
    min_chars: usize,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<PendingSearch>>,
    state: Arc<watch::Sender<SearchState>>,
}

impl<G: GeocodeClient> SearchDebouncer<G> {
    pub fn new(client: Arc<G>, delay: Duration, min_chars: usize) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            client,
            delay,
            min_chars,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    /// Handle a search-box edit
    ///
    /// Must be called from within a tokio runtime.
    pub fn input(&self, text: &str) {
        let mut pending = self.lock_pending();
        let ticket = self.supersede(&mut pending);
        let query = text.trim().to_string();

        if query.chars().count() < self.min_chars {
            self.state.send_replace(SearchState {
                query: text.to_string(),
                ..SearchState::default()
            });
            return;
        }

        self.state.send_modify(|s| {
            s.query = text.to_string();
            s.loading = false;
            s.error = None;
        });

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let delay = self.delay;
        let task_ticket = ticket.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !task_ticket.is_current() {
                return;
            }

            debug!("Searching places for '{}' (#{})", query, task_ticket.id);
            state.send_modify(|s| s.loading = true);

            let outcome = client.search_places(&query).await;

            if !task_ticket.is_current() {
                debug!("Discarding superseded results for '{}'", query);
                return;
            }

            state.send_modify(|s| {
                s.loading = false;
                match outcome {
                    Ok(results) => {
                        s.results = results;
                        s.error = None;
                    }
                    Err(e) => {
                        warn!("Place search for '{}' failed: {}", query, e);
                        s.results.clear();
                        s.error = Some(e.user_message());
                    }
                }
            });
        });

        *pending = Some(PendingSearch { ticket, handle });
    }

    /// Drop the query and results, cancelling any pending search
    pub fn clear(&self) {
        let mut pending = self.lock_pending();
        self.supersede(&mut pending);
        self.state.send_replace(SearchState::default());
    }

    /// Cancel any pending search but keep what is shown
    pub fn cancel(&self) {
        let mut pending = self.lock_pending();
        self.supersede(&mut pending);
        self.state.send_modify(|s| s.loading = false);
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Invalidate the current ticket and abort its task
    ///
    /// Callers hold the `pending` guard until the replacement is stored.
    fn supersede(&self, pending: &mut Option<PendingSearch>) -> SearchTicket {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
        SearchTicket {
            id,
            generation: Arc::clone(&self.generation),
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<PendingSearch>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<G: GeocodeClient> Drop for SearchDebouncer<G> {
    fn drop(&mut self) {
        if let Some(previous) = self.lock_pending().take() {
            previous.cancel();
        }
    }
}
