use std::cmp::Ordering;

use crate::data::row::TableRow;

/// The rows of the page, their search visibility and their current order.
///
/// Rows are addressed by their index in document order; `order` holds those
/// indices in the current sort order and `original_order` keeps the order
/// captured at load time so an unsorted header can restore it exactly.
#[derive(Debug, Clone)]
pub struct RowRegistry {
    rows: Vec<TableRow>,
    original_order: Vec<usize>,
    order: Vec<usize>,
}

impl RowRegistry {
    pub fn new(rows: Vec<TableRow>) -> Self {
        let order: Vec<usize> = (0..rows.len()).collect();
        Self {
            rows,
            original_order: order.clone(),
            order,
        }
    }

    pub fn from_cells(cells: Vec<Vec<String>>) -> Self {
        Self::new(cells.into_iter().map(TableRow::new).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut TableRow> {
        self.rows.iter_mut()
    }

    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter()
    }

    /// Row indices in current sort order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn original_order(&self) -> &[usize] {
        &self.original_order
    }

    /// Reorder rows with a stable sort that always starts from document order,
    /// so rows comparing equal keep their original relative position.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&TableRow, &TableRow) -> Ordering,
    {
        let rows = &self.rows;
        let mut order = self.original_order.clone();
        order.sort_by(|&a, &b| compare(&rows[a], &rows[b]));
        self.order = order;
    }

    pub fn restore_original_order(&mut self) {
        self.order = self.original_order.clone();
    }

    /// Rows not excluded by search, in current sort order
    pub fn visible_rows(&self) -> Vec<usize> {
        self.order
            .iter()
            .copied()
            .filter(|&idx| !self.rows[idx].is_hidden())
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_hidden()).count()
    }

    /// Rows currently inside the page window, in current sort order
    pub fn displayed_rows(&self) -> Vec<usize> {
        self.order
            .iter()
            .copied()
            .filter(|&idx| self.rows[idx].is_displayed())
            .collect()
    }

    pub fn show_all(&mut self) {
        for row in &mut self.rows {
            row.set_hidden(false);
        }
    }

    pub fn set_displayed(&mut self, index: usize, displayed: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.set_displayed(displayed);
        }
    }

    pub fn hide_all_displayed(&mut self) {
        for row in &mut self.rows {
            row.set_displayed(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(titles: &[&str]) -> RowRegistry {
        RowRegistry::from_cells(titles.iter().map(|t| vec![t.to_string()]).collect())
    }

    #[test]
    fn test_sort_then_restore_is_exact() {
        let mut reg = registry(&["c", "a", "b"]);
        reg.sort_by(|a, b| a.cell(0).cmp(b.cell(0)));
        assert_eq!(reg.order(), &[1, 2, 0]);

        reg.restore_original_order();
        assert_eq!(reg.order(), &[0, 1, 2]);
    }

    #[test]
    fn test_sort_is_stable_from_document_order() {
        let mut reg = RowRegistry::from_cells(vec![
            vec!["x".into(), "1".into()],
            vec!["y".into(), "0".into()],
            vec!["z".into(), "1".into()],
        ]);
        // Scramble the current order first; the sort must not depend on it
        reg.sort_by(|a, b| b.cell(0).cmp(a.cell(0)));
        reg.sort_by(|a, b| a.cell(1).cmp(b.cell(1)));
        assert_eq!(reg.order(), &[1, 0, 2]);
    }

    #[test]
    fn test_visible_rows_follow_sort_order() {
        let mut reg = registry(&["b", "a", "c"]);
        reg.sort_by(|a, b| a.cell(0).cmp(b.cell(0)));
        reg.rows_mut().nth(2).unwrap().set_hidden(true);
        assert_eq!(reg.visible_rows(), vec![1, 0]);
        assert_eq!(reg.visible_count(), 2);
    }
}
