//! Search history rules.

use serde::{Deserialize, Serialize};

/// Maximum number of queries kept in the history.
pub const SEARCH_HISTORY_LIMIT: usize = 10;

/// Recent search queries, most recent first.
///
/// Queries are stored as typed (after trimming). Duplicates are detected
/// case-insensitively and the list never grows past [`SEARCH_HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory(Vec<String>);

impl SearchHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a query at the front of the list.
    ///
    /// An existing entry that matches ignoring case is moved rather than
    /// duplicated. Blank queries are ignored. Returns `true` if the list changed.
    pub fn record(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        if self.0.first().is_some_and(|q| q == query) {
            return false;
        }

        let lowered = query.to_lowercase();
        self.0.retain(|q| q.to_lowercase() != lowered);
        self.0.insert(0, query.to_owned());
        self.0.truncate(SEARCH_HISTORY_LIMIT);
        true
    }

    /// Remove a query, ignoring case. Returns `true` if it was present.
    pub fn remove(&mut self, query: &str) -> bool {
        let lowered = query.trim().to_lowercase();
        let before = self.0.len();
        self.0.retain(|q| q.to_lowercase() != lowered);
        self.0.len() != before
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_at_ten_most_recent() {
        let mut history = SearchHistory::new();
        for i in 0..11 {
            history.record(&format!("query {i}"));
        }

        assert_eq!(history.len(), SEARCH_HISTORY_LIMIT);
        assert_eq!(history.entries().first().map(String::as_str), Some("query 10"));
        assert_eq!(history.entries().last().map(String::as_str), Some("query 1"));
        assert!(!history.entries().iter().any(|q| q == "query 0"));
    }

    #[test]
    fn test_existing_query_moves_to_front() {
        let mut history = SearchHistory::new();
        history.record("lamp");
        history.record("chair");
        history.record("table");

        assert!(history.record("LAMP"));
        assert_eq!(history.entries(), ["LAMP", "table", "chair"]);
    }

    #[test]
    fn test_repeat_of_front_is_noop() {
        let mut history = SearchHistory::new();
        history.record("lamp");
        assert!(!history.record("  lamp "));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_blank_query_ignored() {
        let mut history = SearchHistory::new();
        assert!(!history.record("   "));
        assert!(history.is_empty());
    }

    #[test]
    fn test_remove_ignores_case() {
        let mut history = SearchHistory::new();
        history.record("Vintage Lamp");
        assert!(history.remove("vintage lamp"));
        assert!(history.is_empty());
    }
}
