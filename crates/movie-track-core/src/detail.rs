use movie_track_models::MovieDetail;
use movie_track_sources::{MovieSource, SourceError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Detail/loading/error state for the currently selected title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub detail: Option<MovieDetail>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl DetailState {
    pub fn clear(&mut self) {
        self.detail = None;
        self.is_loading = false;
        self.error = None;
    }
}

/// By-id fetcher with the same supersession discipline as the query
/// fetcher: changing the selection cancels the prior in-flight lookup and
/// suppresses its outcome. There is no minimum-length short-circuit; a
/// `None` selection clears state synchronously.
///
/// A failed lookup becomes a piece of state; it never unwinds past the
/// fetch boundary.
pub struct DetailFetcher {
    source: Arc<dyn MovieSource>,
    state: Arc<Mutex<DetailState>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
}

impl DetailFetcher {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(DetailState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    /// Change the selection. `None` deselects and clears state.
    pub fn select(&mut self, imdb_id: Option<&str>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = self.in_flight.take() {
            trace!(generation, "cancelling superseded lookup");
            handle.abort();
        }

        let imdb_id = match imdb_id {
            Some(imdb_id) => imdb_id.to_string(),
            None => {
                lock_state(&self.state).clear();
                return;
            }
        };

        {
            let mut state = lock_state(&self.state);
            state.is_loading = true;
            state.error = None;
        }

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = source.lookup(&imdb_id).await;
            apply_lookup_outcome(&shared, &current, generation, &imdb_id, outcome);
        }));
    }

    pub fn state(&self) -> DetailState {
        lock_state(&self.state).clone()
    }

    /// Wait for the in-flight lookup, if any, to finish.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            let _ = handle.await;
        }
    }

    pub fn shutdown(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for DetailFetcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn apply_lookup_outcome(
    state: &Mutex<DetailState>,
    current: &AtomicU64,
    generation: u64,
    imdb_id: &str,
    outcome: Result<MovieDetail, SourceError>,
) {
    let mut state = lock_state(state);
    if current.load(Ordering::SeqCst) != generation {
        trace!(generation, "discarding outcome for superseded selection");
        return;
    }

    state.is_loading = false;
    match outcome {
        Ok(detail) => {
            debug!(imdb_id, title = %detail.title, "lookup completed");
            state.detail = Some(detail);
            state.error = None;
        }
        Err(err) => {
            debug!(imdb_id, error = %err, "lookup failed");
            state.detail = None;
            state.error = Some(err.to_string());
        }
    }
}

fn lock_state<'a>(state: &'a Mutex<DetailState>) -> MutexGuard<'a, DetailState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use movie_track_models::SearchResult;
    use movie_track_sources::TransportError;
    use std::collections::HashMap;

    #[derive(Default)]
    struct ScriptedSource {
        details: Mutex<HashMap<String, MovieDetail>>,
    }

    impl ScriptedSource {
        fn script(&self, detail: MovieDetail) {
            self.details
                .lock()
                .unwrap()
                .insert(detail.imdb_id.clone(), detail);
        }
    }

    #[async_trait]
    impl MovieSource for ScriptedSource {
        fn source_name(&self) -> &str {
            "scripted"
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, SourceError> {
            unimplemented!("not used by detail tests")
        }

        async fn lookup(&self, imdb_id: &str) -> Result<MovieDetail, SourceError> {
            self.details
                .lock()
                .unwrap()
                .get(imdb_id)
                .cloned()
                .ok_or(SourceError::Detail(TransportError::Payload(
                    "Incorrect IMDb ID.".to_string(),
                )))
        }
    }

    fn detail(imdb_id: &str, title: &str) -> MovieDetail {
        MovieDetail {
            imdb_id: imdb_id.to_string(),
            title: title.to_string(),
            year: "2005".to_string(),
            poster_url: String::new(),
            runtime_minutes: 140,
            imdb_rating: 8.2,
            plot: String::new(),
            released: String::new(),
            actors: String::new(),
            director: String::new(),
            genre: String::new(),
        }
    }

    #[tokio::test]
    async fn test_select_loads_detail() {
        let source = Arc::new(ScriptedSource::default());
        source.script(detail("tt0372784", "Batman Begins"));
        let mut fetcher = DetailFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>);

        fetcher.select(Some("tt0372784"));
        assert!(fetcher.state().is_loading);
        fetcher.settle().await;

        let state = fetcher.state();
        assert_eq!(state.detail.as_ref().unwrap().title, "Batman Begins");
        assert!(state.error.is_none());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_failed_lookup_becomes_state_not_panic() {
        let source = Arc::new(ScriptedSource::default());
        let mut fetcher = DetailFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>);

        fetcher.select(Some("tt9999999"));
        fetcher.settle().await;

        let state = fetcher.state();
        assert!(state.detail.is_none());
        assert_eq!(state.error.as_deref(), Some("Failed to fetch movie details"));
    }

    #[tokio::test]
    async fn test_deselect_clears_state() {
        let source = Arc::new(ScriptedSource::default());
        source.script(detail("tt0372784", "Batman Begins"));
        let mut fetcher = DetailFetcher::new(Arc::clone(&source) as Arc<dyn MovieSource>);

        fetcher.select(Some("tt0372784"));
        fetcher.settle().await;
        fetcher.select(None);

        assert_eq!(fetcher.state(), DetailState::default());
    }

    #[test]
    fn test_stale_lookup_outcome_is_discarded() {
        let state = Mutex::new(DetailState::default());
        let current = AtomicU64::new(3);

        apply_lookup_outcome(
            &state,
            &current,
            2,
            "tt0372784",
            Ok(detail("tt0372784", "Batman Begins")),
        );

        assert_eq!(*state.lock().unwrap(), DetailState::default());
    }
}
