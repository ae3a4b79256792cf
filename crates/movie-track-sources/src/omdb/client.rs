use crate::error::{SourceError, TransportError};
use crate::omdb::{api, parser};
use crate::traits::MovieSource;
use async_trait::async_trait;
use movie_track_models::{MovieDetail, SearchResult};
use reqwest::Client;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// HTTP client for the OMDb API. The key and base URL are injected so
/// tests can point the client at a local stub server.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    async fn get_search(&self, query: &str) -> Result<api::SearchResponse, TransportError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("s", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        Ok(response.json().await?)
    }

    async fn get_title(&self, imdb_id: &str) -> Result<api::TitleResponse, TransportError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("i", imdb_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MovieSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError> {
        debug!(query, "searching OMDb");
        let payload = self.get_search(query).await.map_err(SourceError::Search)?;
        parser::search_results(payload)
    }

    async fn lookup(&self, imdb_id: &str) -> Result<MovieDetail, SourceError> {
        debug!(imdb_id, "fetching OMDb title");
        let payload = self.get_title(imdb_id).await.map_err(SourceError::Detail)?;
        parser::movie_detail(imdb_id, payload)
    }
}
