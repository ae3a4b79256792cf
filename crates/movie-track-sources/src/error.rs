use thiserror::Error;

/// Errors surfaced by a movie source. The Display strings are shown to
/// the user verbatim, so they stay short and free of transport detail;
/// the underlying cause is preserved as the error source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The service answered but reported no matches in the payload.
    #[error("No movies found")]
    NoMatches,

    #[error("Error while fetching movies")]
    Search(#[source] TransportError),

    #[error("Failed to fetch movie details")]
    Detail(#[source] TransportError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("{0}")]
    Payload(String),
}
