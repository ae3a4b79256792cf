use serde::{Deserialize, Serialize};

/// A title the user has rated and added to their personal list. At most
/// one entry per id; immutable once created except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub runtime_minutes: u32,
    pub imdb_rating: f64,
    /// 1..=max_rating, validated before the entry is built.
    pub user_rating: u8,
    /// How many times the rating was revised before submission.
    pub rating_revision_count: u32,
}
