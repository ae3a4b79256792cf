use serde::{Deserialize, Serialize};

/// Full record for a single title. Numeric fields are parsed from
/// string-encoded payload values at the source boundary; missing or
/// malformed values arrive here as 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub runtime_minutes: u32,
    pub imdb_rating: f64,
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}
