use serde::Deserialize;

/// Body of a search response. On success `search` is populated; when the
/// service has no matches it answers 200 with `Response: "False"` and an
/// `Error` string instead.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<SearchItem>,
    #[serde(rename = "totalResults")]
    pub total_results: Option<String>,
    #[serde(rename = "Response")]
    pub response: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
}

/// Body of a by-id lookup. Every field is optional: the service omits or
/// fills "N/A" for data it does not have, and numeric values arrive as
/// strings ("136 min", "8.4").
#[derive(Debug, Deserialize)]
pub struct TitleResponse {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Released")]
    pub released: Option<String>,
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Response")]
    pub response: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}
