use crate::error::SourceError;
use async_trait::async_trait;
use movie_track_models::{MovieDetail, SearchResult};

/// A movie database that can be searched by free text and queried for a
/// single title by identifier.
#[async_trait]
pub trait MovieSource: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    /// Search for titles matching `query`. Result ordering is determined
    /// by the backing service and must be preserved.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError>;

    /// Fetch the full record for one title.
    async fn lookup(&self, imdb_id: &str) -> Result<MovieDetail, SourceError>;
}
