use tracing::debug;

use crate::data::row::{BookColumn, TableRow};
use crate::data::row_registry::RowRegistry;

/// Substring search over the searchable book columns
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    query: String,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed, lowercased form of a raw query
    pub fn normalize_query(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// The concatenated lowercase text a query is matched against
    pub fn searchable_text(row: &TableRow) -> String {
        BookColumn::SEARCHABLE
            .iter()
            .map(|&column| row.column(column))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    pub fn matches(row: &TableRow, normalized_query: &str) -> bool {
        normalized_query.is_empty() || Self::searchable_text(row).contains(normalized_query)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Store the query and mark every row visible or hidden.
    /// Returns the number of rows left visible.
    pub fn apply(&mut self, raw: &str, registry: &mut RowRegistry) -> usize {
        self.query = Self::normalize_query(raw);

        let mut visible = 0;
        for row in registry.rows_mut() {
            let matched = Self::matches(row, &self.query);
            row.set_hidden(!matched);
            if matched {
                visible += 1;
            }
        }

        debug!(target: "search", "Query {:?} matched {} rows", self.query, visible);
        visible
    }

    /// Empty the query and unhide every row
    pub fn clear(&mut self, registry: &mut RowRegistry) {
        self.query.clear();
        registry.show_all();
        debug!(target: "search", "Search cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, authors: &str, description: &str) -> Vec<String> {
        vec![
            title.to_string(),
            String::new(),
            authors.to_string(),
            "Fiction".to_string(),
            "Allen & Unwin".to_string(),
            "1954".to_string(),
            description.to_string(),
            "423".to_string(),
            "4.5".to_string(),
        ]
    }

    #[test]
    fn test_query_is_trimmed_and_lowercased() {
        assert_eq!(SearchFilter::normalize_query("  ToLKien "), "tolkien");
    }

    #[test]
    fn test_search_skips_date_and_numeric_cells() {
        let mut registry = RowRegistry::from_cells(vec![book("The Hobbit", "J.R.R. Tolkien", "")]);
        let mut filter = SearchFilter::new();

        assert_eq!(filter.apply("1954", &mut registry), 0);
        assert_eq!(filter.apply("423", &mut registry), 0);
        assert_eq!(filter.apply("unwin", &mut registry), 1);
    }

    #[test]
    fn test_search_matches_description() {
        let mut registry = RowRegistry::from_cells(vec![
            book("Dune", "Frank Herbert", "Desert planet politics"),
            book("Emma", "Jane Austen", "Matchmaking in Highbury"),
        ]);
        let mut filter = SearchFilter::new();

        assert_eq!(filter.apply("DESERT", &mut registry), 1);
        assert!(!registry.row(0).unwrap().is_hidden());
        assert!(registry.row(1).unwrap().is_hidden());

        filter.clear(&mut registry);
        assert_eq!(filter.query(), "");
        assert_eq!(registry.visible_count(), 2);
    }

    #[test]
    fn test_short_rows_do_not_panic() {
        let mut registry = RowRegistry::from_cells(vec![vec!["Solo".to_string()]]);
        let mut filter = SearchFilter::new();
        assert_eq!(filter.apply("solo", &mut registry), 1);
    }
}
