pub mod movie_detail;
pub mod query_state;
pub mod search_result;
pub mod watched_entry;

pub use movie_detail::MovieDetail;
pub use query_state::QueryState;
pub use search_result::SearchResult;
pub use watched_entry::WatchedEntry;
