use crate::search_result::SearchResult;

/// Result/loading/error state for one live search. Rebuilt per query,
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub results: Vec<SearchResult>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl QueryState {
    pub fn clear(&mut self) {
        self.results.clear();
        self.is_loading = false;
        self.error = None;
    }
}
