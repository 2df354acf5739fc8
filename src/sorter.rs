use tracing::debug;

use crate::data::cell_compare::compare_cells;
use crate::data::row::BookColumn;
use crate::data::row_registry::RowRegistry;

/// The marker a sortable header carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    /// Next state in the header click cycle
    pub fn next(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
        }
    }

    pub fn indicator(self, use_glyphs: bool) -> &'static str {
        match (self, use_glyphs) {
            (SortDirection::None, _) => "",
            (SortDirection::Ascending, true) => " ▲",
            (SortDirection::Descending, true) => " ▼",
            (SortDirection::Ascending, false) => " ^",
            (SortDirection::Descending, false) => " v",
        }
    }
}

/// At most one column is sorted at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<BookColumn>,
    pub direction: SortDirection,
}

/// Three-state column sorting over the row registry
#[derive(Debug, Clone)]
pub struct Sorter {
    sortable: Vec<BookColumn>,
    state: SortState,
}

impl Sorter {
    pub fn new(sortable: Vec<BookColumn>) -> Self {
        Self {
            sortable,
            state: SortState::default(),
        }
    }

    pub fn state(&self) -> SortState {
        self.state
    }

    pub fn sortable_columns(&self) -> &[BookColumn] {
        &self.sortable
    }

    pub fn is_sortable(&self, column: BookColumn) -> bool {
        self.sortable.contains(&column)
    }

    /// Marker currently shown on a header
    pub fn header_state(&self, column: BookColumn) -> SortDirection {
        if self.state.column == Some(column) {
            self.state.direction
        } else {
            SortDirection::None
        }
    }

    /// Handle a click on a header. Returns false when the column has no
    /// sortable header and nothing changed.
    pub fn request(&mut self, column: BookColumn, registry: &mut RowRegistry) -> bool {
        if !self.is_sortable(column) {
            debug!(target: "sort", "Ignoring sort on non-sortable column {:?}", column);
            return false;
        }

        // A different header always starts fresh at ascending
        let direction = self.header_state(column).next();
        self.state = match direction {
            SortDirection::None => SortState::default(),
            _ => SortState {
                column: Some(column),
                direction,
            },
        };

        self.apply(registry);
        true
    }

    /// Reorder the registry to match the current state
    pub fn apply(&self, registry: &mut RowRegistry) {
        match (self.state.column, self.state.direction) {
            (Some(column), SortDirection::Ascending) | (Some(column), SortDirection::Descending) => {
                let ascending = self.state.direction == SortDirection::Ascending;
                let kind = column.kind();
                let index = column.index();
                registry.sort_by(|a, b| compare_cells(kind, a.cell(index), b.cell(index), ascending));
                debug!(target: "sort", "Sorted by {:?} {:?}", column, self.state.direction);
            }
            _ => {
                registry.restore_original_order();
                debug!(target: "sort", "Restored original order");
            }
        }
    }
}

impl Default for Sorter {
    fn default() -> Self {
        Self::new(BookColumn::default_sortable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RowRegistry {
        let mut rows = Vec::new();
        for (title, date, rating) in [("b", "2001", "3"), ("a", "bad", ""), ("c", "1999-05", "4.5")] {
            let mut cells = vec![String::new(); 9];
            cells[BookColumn::Title.index()] = title.to_string();
            cells[BookColumn::PublishedDate.index()] = date.to_string();
            cells[BookColumn::Rating.index()] = rating.to_string();
            rows.push(cells);
        }
        RowRegistry::from_cells(rows)
    }

    #[test]
    fn test_header_cycle() {
        let mut reg = registry();
        let mut sorter = Sorter::default();

        sorter.request(BookColumn::Title, &mut reg);
        assert_eq!(sorter.header_state(BookColumn::Title), SortDirection::Ascending);
        assert_eq!(reg.order(), &[1, 0, 2]);

        sorter.request(BookColumn::Title, &mut reg);
        assert_eq!(sorter.header_state(BookColumn::Title), SortDirection::Descending);
        assert_eq!(reg.order(), &[2, 0, 1]);

        sorter.request(BookColumn::Title, &mut reg);
        assert_eq!(sorter.state(), SortState::default());
        assert_eq!(reg.order(), &[0, 1, 2]);
    }

    #[test]
    fn test_switching_header_starts_ascending() {
        let mut reg = registry();
        let mut sorter = Sorter::default();

        sorter.request(BookColumn::Title, &mut reg);
        sorter.request(BookColumn::Title, &mut reg);
        sorter.request(BookColumn::Rating, &mut reg);

        assert_eq!(sorter.header_state(BookColumn::Title), SortDirection::None);
        assert_eq!(sorter.header_state(BookColumn::Rating), SortDirection::Ascending);
        // blank rating parses as 0 and comes first
        assert_eq!(reg.order(), &[1, 0, 2]);
    }

    #[test]
    fn test_bad_dates_last_in_both_directions() {
        let mut reg = registry();
        let mut sorter = Sorter::default();

        sorter.request(BookColumn::PublishedDate, &mut reg);
        assert_eq!(reg.order(), &[2, 0, 1]);

        sorter.request(BookColumn::PublishedDate, &mut reg);
        assert_eq!(reg.order(), &[0, 2, 1]);
    }

    #[test]
    fn test_description_header_is_ignored() {
        let mut reg = registry();
        let mut sorter = Sorter::default();
        assert!(!sorter.request(BookColumn::Description, &mut reg));
        assert_eq!(reg.order(), &[0, 1, 2]);
    }
}
