use crate::error::{SourceError, TransportError};
use crate::omdb::api::{SearchResponse, TitleResponse};
use movie_track_models::{MovieDetail, SearchResult};
use tracing::debug;

/// Convert a search payload into internal records, surfacing the
/// in-payload "no matches" indicator as a domain error rather than an
/// empty list.
pub fn search_results(payload: SearchResponse) -> Result<Vec<SearchResult>, SourceError> {
    if payload.response.as_deref() == Some("False") {
        debug!(error = ?payload.error, "search reported no matches");
        return Err(SourceError::NoMatches);
    }

    Ok(payload
        .search
        .into_iter()
        .map(|item| SearchResult {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: item.poster,
        })
        .collect())
}

/// Convert a by-id payload into a [`MovieDetail`]. An in-payload error
/// (unknown id) becomes a detail error; missing or malformed numeric
/// fields parse to 0.
pub fn movie_detail(imdb_id: &str, payload: TitleResponse) -> Result<MovieDetail, SourceError> {
    if payload.response.as_deref() == Some("False") {
        let message = payload
            .error
            .unwrap_or_else(|| format!("unknown title {imdb_id}"));
        debug!(imdb_id, %message, "lookup reported an error payload");
        return Err(SourceError::Detail(TransportError::Payload(message)));
    }

    Ok(MovieDetail {
        imdb_id: imdb_id.to_string(),
        title: payload.title.unwrap_or_default(),
        year: payload.year.unwrap_or_default(),
        poster_url: payload.poster.unwrap_or_default(),
        runtime_minutes: runtime_minutes(payload.runtime.as_deref()),
        imdb_rating: imdb_rating(payload.imdb_rating.as_deref()),
        plot: payload.plot.unwrap_or_default(),
        released: payload.released.unwrap_or_default(),
        actors: payload.actors.unwrap_or_default(),
        director: payload.director.unwrap_or_default(),
        genre: payload.genre.unwrap_or_default(),
    })
}

/// Runtime arrives as e.g. "136 min". Missing, "N/A" or otherwise
/// malformed values parse to 0.
pub fn runtime_minutes(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.split_whitespace().next())
        .and_then(|minutes| minutes.parse().ok())
        .unwrap_or(0)
}

/// Rating arrives as e.g. "8.4". Missing or "N/A" parses to 0.0.
pub fn imdb_rating(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0.0)
}
