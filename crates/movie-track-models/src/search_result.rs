use serde::{Deserialize, Serialize};

/// One row of a search response. Ordering is determined by the backing
/// service and preserved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
}
