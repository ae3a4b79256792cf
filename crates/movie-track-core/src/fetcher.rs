use movie_track_models::{QueryState, SearchResult};
use movie_track_sources::{MovieSource, SourceError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Search fetcher with latest-wins race avoidance.
///
/// Each query transition bumps a generation token and cancels the prior
/// in-flight request. A response is applied only if its token still equals
/// the fetcher's current token at completion time, so a slow response to an
/// old query can never overwrite state belonging to a newer one. Query
/// recency decides, not arrival order.
pub struct QueryFetcher {
    source: Arc<dyn MovieSource>,
    min_query_len: usize,
    state: Arc<Mutex<QueryState>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
}

impl QueryFetcher {
    pub fn new(source: Arc<dyn MovieSource>, min_query_len: usize) -> Self {
        Self {
            source,
            min_query_len,
            state: Arc::new(Mutex::new(QueryState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    /// Point the fetcher at a new query.
    ///
    /// Queries below the minimum length clear results and error
    /// synchronously without a network call. Otherwise a request is
    /// started and any in-flight request for an earlier query is
    /// cancelled; its outcome is suppressed even if it lands after the
    /// cancellation signal.
    pub fn set_query(&mut self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = self.in_flight.take() {
            trace!(generation, "cancelling superseded search");
            handle.abort();
        }

        if query.chars().count() < self.min_query_len {
            lock_state(&self.state).clear();
            return;
        }

        {
            let mut state = lock_state(&self.state);
            state.is_loading = true;
            state.error = None;
        }

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let query = query.to_string();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = source.search(&query).await;
            apply_search_outcome(&shared, &current, generation, &query, outcome);
        }));
    }

    /// Snapshot of the current result/loading/error state.
    pub fn state(&self) -> QueryState {
        lock_state(&self.state).clone()
    }

    /// Wait for the in-flight request, if any, to finish. Cancelled
    /// requests resolve without touching state.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            // JoinError covers both abort and panic; neither reaches state.
            let _ = handle.await;
        }
    }

    /// Drop interest in any in-flight request without issuing a new
    /// query. Used on teardown; suppression is silent.
    pub fn shutdown(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for QueryFetcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Apply a completed search outcome iff `generation` is still current.
/// This check, not cancellation delivery timing, is what enforces
/// latest-wins: abort() may land after the request already resolved.
fn apply_search_outcome(
    state: &Mutex<QueryState>,
    current: &AtomicU64,
    generation: u64,
    query: &str,
    outcome: Result<Vec<SearchResult>, SourceError>,
) {
    let mut state = lock_state(state);
    if current.load(Ordering::SeqCst) != generation {
        trace!(generation, "discarding outcome for superseded query");
        return;
    }

    state.is_loading = false;
    match outcome {
        Ok(results) => {
            debug!(query, count = results.len(), "search completed");
            state.results = results;
            state.error = None;
        }
        Err(err) => {
            debug!(query, error = %err, "search failed");
            state.results.clear();
            state.error = Some(err.to_string());
        }
    }
}

fn lock_state<'a>(state: &'a Mutex<QueryState>) -> MutexGuard<'a, QueryState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use movie_track_sources::TransportError;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Clone)]
    enum Scripted {
        Results(Vec<SearchResult>),
        NoMatches,
        Transport,
    }

    impl Scripted {
        fn outcome(&self) -> Result<Vec<SearchResult>, SourceError> {
            match self {
                Scripted::Results(results) => Ok(results.clone()),
                Scripted::NoMatches => Err(SourceError::NoMatches),
                Scripted::Transport => Err(SourceError::Search(TransportError::Payload(
                    "connection reset".to_string(),
                ))),
            }
        }
    }

    /// Scripted source: per-query canned outcomes, optional per-query
    /// gates so tests control completion order, and a call counter.
    #[derive(Default)]
    struct ScriptedSource {
        calls: AtomicUsize,
        outcomes: Mutex<HashMap<String, Scripted>>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
    }

    impl ScriptedSource {
        fn script(&self, query: &str, outcome: Scripted) {
            self.outcomes
                .lock()
                .unwrap()
                .insert(query.to_string(), outcome);
        }

        fn gate(&self, query: &str) -> Arc<Notify> {
            let notify = Arc::new(Notify::new());
            self.gates
                .lock()
                .unwrap()
                .insert(query.to_string(), Arc::clone(&notify));
            notify
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MovieSource for ScriptedSource {
        fn source_name(&self) -> &str {
            "scripted"
        }

        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().get(query).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let scripted = self
                .outcomes
                .lock()
                .unwrap()
                .get(query)
                .cloned()
                .unwrap_or(Scripted::NoMatches);
            scripted.outcome()
        }

        async fn lookup(
            &self,
            _imdb_id: &str,
        ) -> Result<movie_track_models::MovieDetail, SourceError> {
            unimplemented!("not used by fetcher tests")
        }
    }

    fn result(imdb_id: &str, title: &str) -> SearchResult {
        SearchResult {
            imdb_id: imdb_id.to_string(),
            title: title.to_string(),
            year: "2005".to_string(),
            poster_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_below_threshold_clears_without_network_call() {
        let source = Arc::new(ScriptedSource::default());
        let mut fetcher = QueryFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>, 3);

        fetcher.set_query("ba");
        fetcher.settle().await;

        let state = fetcher.state();
        assert!(state.results.is_empty());
        assert!(state.error.is_none());
        assert!(!state.is_loading);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_search_populates_results() {
        let source = Arc::new(ScriptedSource::default());
        source.script(
            "batman",
            Scripted::Results(vec![result("tt0372784", "Batman Begins")]),
        );
        let mut fetcher = QueryFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>, 3);

        fetcher.set_query("batman");
        assert!(fetcher.state().is_loading);
        fetcher.settle().await;

        let state = fetcher.state();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].imdb_id, "tt0372784");
        assert!(state.error.is_none());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_no_matches_surfaces_domain_error() {
        let source = Arc::new(ScriptedSource::default());
        source.script("zzzzz", Scripted::NoMatches);
        let mut fetcher = QueryFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>, 3);

        fetcher.set_query("zzzzz");
        fetcher.settle().await;

        let state = fetcher.state();
        assert_eq!(state.error.as_deref(), Some("No movies found"));
        assert!(state.results.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_fetch_error() {
        let source = Arc::new(ScriptedSource::default());
        source.script("batman", Scripted::Transport);
        let mut fetcher = QueryFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>, 3);

        fetcher.set_query("batman");
        fetcher.settle().await;

        let state = fetcher.state();
        assert_eq!(state.error.as_deref(), Some("Error while fetching movies"));
        assert!(state.results.is_empty());
    }

    #[tokio::test]
    async fn test_rapid_queries_last_one_wins() {
        let source = Arc::new(ScriptedSource::default());
        let slow_gate = source.gate("inception");
        source.script(
            "inception",
            Scripted::Results(vec![result("tt1375666", "Inception")]),
        );
        source.script(
            "interstellar",
            Scripted::Results(vec![result("tt0816692", "Interstellar")]),
        );
        let mut fetcher = QueryFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>, 3);

        fetcher.set_query("inception");
        fetcher.set_query("interstellar");
        fetcher.settle().await;

        // Let the superseded request finish late; it must change nothing.
        slow_gate.notify_one();
        tokio::task::yield_now().await;

        let state = fetcher.state();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].imdb_id, "tt0816692");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_cancellation_is_silent() {
        let source = Arc::new(ScriptedSource::default());
        let gate = source.gate("batman");
        source.script("batman", Scripted::Transport);
        let mut fetcher = QueryFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>, 3);

        fetcher.set_query("batman");
        // Supersede with a below-threshold query, then let the cancelled
        // request resolve to an error that must never surface.
        fetcher.set_query("");
        gate.notify_one();
        tokio::task::yield_now().await;
        fetcher.settle().await;

        let state = fetcher.state();
        assert!(state.results.is_empty());
        assert!(state.error.is_none());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_stale_outcome_is_discarded_even_on_success() {
        // Out-of-order arrival, reduced to the validity check itself: a
        // completed outcome carrying an old token must not be applied.
        let state = Mutex::new(QueryState::default());
        let current = AtomicU64::new(2);

        apply_search_outcome(
            &state,
            &current,
            1,
            "inception",
            Ok(vec![result("tt1375666", "Inception")]),
        );
        let snapshot = state.lock().unwrap().clone();
        assert!(snapshot.results.is_empty());
        assert!(snapshot.error.is_none());

        apply_search_outcome(
            &state,
            &current,
            2,
            "interstellar",
            Ok(vec![result("tt0816692", "Interstellar")]),
        );
        let snapshot = state.lock().unwrap().clone();
        assert_eq!(snapshot.results[0].imdb_id, "tt0816692");
    }

    #[test]
    fn test_stale_error_is_discarded() {
        let state = Mutex::new(QueryState::default());
        let current = AtomicU64::new(5);

        apply_search_outcome(&state, &current, 4, "batman", Err(SourceError::NoMatches));
        let snapshot = state.lock().unwrap().clone();
        assert!(snapshot.error.is_none());
    }
}
