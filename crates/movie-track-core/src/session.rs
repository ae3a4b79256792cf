use crate::detail::{DetailFetcher, DetailState};
use crate::fetcher::QueryFetcher;
use crate::rating::{RatingError, RatingPicker};
use crate::store::{FileStore, KeyValueStore};
use crate::watched::WatchedList;
use movie_track_config::{Config, PathManager};
use movie_track_models::{QueryState, WatchedEntry};
use movie_track_sources::{MovieSource, OmdbClient};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub min_query_len: usize,
    pub max_rating: u8,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            min_query_len: 3,
            max_rating: 10,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no title is selected")]
    NothingSelected,

    #[error("title details are not loaded yet")]
    DetailNotLoaded,

    #[error("this title is already on the watched list")]
    AlreadyWatched,

    #[error("a rating is required before adding to the watched list")]
    RatingMissing,

    #[error(transparent)]
    Rating(#[from] RatingError),
}

/// One user session: a live search, an optional selected title, and the
/// durable watched list.
///
/// All mutations run on the owning thread; the fetchers are the only
/// asynchronous collaborators and publish their outcomes through state
/// snapshots.
pub struct Session {
    search: QueryFetcher,
    detail: DetailFetcher,
    watched: WatchedList,
    rating: RatingPicker,
    selected: Option<String>,
}

impl Session {
    pub fn new(
        source: Arc<dyn MovieSource>,
        store: Box<dyn KeyValueStore>,
        options: SessionOptions,
    ) -> Self {
        let watched = WatchedList::open(store);
        info!(watched = watched.len(), "session started");
        Self {
            search: QueryFetcher::new(Arc::clone(&source), options.min_query_len),
            detail: DetailFetcher::new(source),
            watched,
            rating: RatingPicker::new(options.max_rating),
            selected: None,
        }
    }

    /// Wire a session from configuration: OMDb client plus a file store
    /// under the data directory.
    pub fn from_config(config: &Config, paths: &PathManager) -> anyhow::Result<Self> {
        let source = Arc::new(OmdbClient::with_base_url(
            &config.api.api_key,
            &config.api.base_url,
        ));
        let store = FileStore::new(paths.data_dir())?;
        Ok(Self::new(
            source,
            Box::new(store),
            SessionOptions {
                min_query_len: config.search.min_query_length,
                max_rating: config.search.max_rating,
            },
        ))
    }

    /// Change the search query. A new query always closes any open
    /// detail pane before the fetch starts.
    pub fn set_query(&mut self, query: &str) {
        self.close_detail();
        self.search.set_query(query);
    }

    pub fn search_state(&self) -> QueryState {
        self.search.state()
    }

    pub fn detail_state(&self) -> DetailState {
        self.detail.state()
    }

    pub fn watched(&self) -> &WatchedList {
        &self.watched
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a title to load its details. Selecting the already-selected
    /// title toggles the pane closed instead.
    pub fn select(&mut self, imdb_id: &str) {
        if self.selected.as_deref() == Some(imdb_id) {
            self.close_detail();
            return;
        }
        self.selected = Some(imdb_id.to_string());
        self.rating.reset();
        self.detail.select(Some(imdb_id));
    }

    pub fn close_detail(&mut self) {
        if self.selected.take().is_none() {
            return;
        }
        self.rating.reset();
        self.detail.select(None);
    }

    /// The stored rating when the selected title is already watched.
    pub fn watched_rating(&self) -> Option<u8> {
        let selected = self.selected.as_deref()?;
        self.watched.find(selected).map(|entry| entry.user_rating)
    }

    pub fn max_rating(&self) -> u8 {
        self.rating.max()
    }

    pub fn candidate_rating(&self) -> Option<u8> {
        self.rating.value()
    }

    /// Record a candidate rating for the selected title. Repeated calls
    /// before submission count as revisions. Already-watched titles
    /// cannot be re-rated.
    pub fn rate(&mut self, value: u8) -> Result<(), SessionError> {
        let selected = self.selected.as_deref().ok_or(SessionError::NothingSelected)?;
        if self.watched.contains(selected) {
            return Err(SessionError::AlreadyWatched);
        }
        self.rating.set(value)?;
        Ok(())
    }

    /// Commit the candidate rating: build a [`WatchedEntry`] from the
    /// loaded detail, append it, and close the pane.
    pub fn add_to_watched(&mut self) -> Result<WatchedEntry, SessionError> {
        let imdb_id = self
            .selected
            .clone()
            .ok_or(SessionError::NothingSelected)?;
        if self.watched.contains(&imdb_id) {
            return Err(SessionError::AlreadyWatched);
        }
        let detail = self
            .detail
            .state()
            .detail
            .ok_or(SessionError::DetailNotLoaded)?;
        let user_rating = self.rating.value().ok_or(SessionError::RatingMissing)?;

        let entry = WatchedEntry {
            imdb_id,
            title: detail.title,
            year: detail.year,
            poster_url: detail.poster_url,
            runtime_minutes: detail.runtime_minutes,
            imdb_rating: detail.imdb_rating,
            user_rating,
            rating_revision_count: self.rating.revisions(),
        };
        info!(imdb_id = %entry.imdb_id, rating = entry.user_rating, "added to watched list");
        self.watched.add(entry.clone());
        self.close_detail();
        Ok(entry)
    }

    pub fn remove_watched(&mut self, imdb_id: &str) {
        self.watched.remove(imdb_id);
    }

    /// Wait for any in-flight search/detail requests to settle.
    pub async fn settle(&mut self) {
        futures::join!(self.search.settle(), self.detail.settle());
    }

    pub fn shutdown(&mut self) {
        self.search.shutdown();
        self.detail.shutdown();
    }
}
