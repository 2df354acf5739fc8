use tracing::trace;

use crate::data::row_registry::RowRegistry;

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// One generated control in the pagination container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationControl {
    Previous { disabled: bool },
    Page { number: usize, active: bool },
    Next { disabled: bool },
}

impl PaginationControl {
    pub fn label(&self) -> String {
        match self {
            PaginationControl::Previous { .. } => "Previous".to_string(),
            PaginationControl::Page { number, .. } => number.to_string(),
            PaginationControl::Next { .. } => "Next".to_string(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            PaginationControl::Previous { disabled } | PaginationControl::Next { disabled } => {
                *disabled
            }
            PaginationControl::Page { .. } => false,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PaginationControl::Page { active: true, .. })
    }
}

/// A click on a pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Previous,
    Next,
    Number(usize),
}

/// Slices the visible rows into fixed-size pages
#[derive(Debug, Clone)]
pub struct Paginator {
    rows_per_page: usize,
    current_page: usize,
    page_count: usize,
    controls: Vec<PaginationControl>,
}

impl Paginator {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            rows_per_page: rows_per_page.max(1),
            current_page: 1,
            page_count: 0,
            controls: Vec::new(),
        }
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Generated controls; empty when the container is hidden
    pub fn controls(&self) -> &[PaginationControl] {
        &self.controls
    }

    pub fn is_visible(&self) -> bool {
        !self.controls.is_empty()
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Recompute the page count and rebuild the controls
    pub fn setup(&mut self, registry: &RowRegistry) {
        self.page_count = registry.visible_count().div_ceil(self.rows_per_page);
        self.controls.clear();

        if self.page_count <= 1 {
            return;
        }

        self.controls.push(PaginationControl::Previous {
            disabled: self.current_page == 1,
        });
        for number in 1..=self.page_count {
            self.controls.push(PaginationControl::Page {
                number,
                active: number == self.current_page,
            });
        }
        self.controls.push(PaginationControl::Next {
            disabled: self.current_page == self.page_count,
        });
    }

    /// Show exactly the rows of page `page` and refresh the controls
    pub fn display_page(&mut self, page: usize, registry: &mut RowRegistry) {
        self.current_page = page.max(1);
        let visible = registry.visible_rows();
        let start = (self.current_page - 1) * self.rows_per_page;
        let end = (start + self.rows_per_page).min(visible.len());

        registry.hide_all_displayed();
        if start < end {
            for &idx in &visible[start..end] {
                registry.set_displayed(idx, true);
            }
        }

        trace!(
            target: "pagination",
            "Page {} shows rows {}..{} of {}",
            self.current_page,
            start,
            end.max(start),
            visible.len()
        );
        self.setup(registry);
    }

    /// Apply a control click. Returns false when the page did not change.
    pub fn request(&mut self, request: PageRequest, registry: &mut RowRegistry) -> bool {
        let page_count = registry.visible_count().div_ceil(self.rows_per_page);
        let target = match request {
            PageRequest::Previous if self.current_page > 1 => self.current_page - 1,
            PageRequest::Next if self.current_page < page_count => self.current_page + 1,
            PageRequest::Number(n) if page_count > 0 => n.clamp(1, page_count),
            _ => return false,
        };

        if target == self.current_page {
            return false;
        }
        self.display_page(target, registry);
        true
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(count: usize) -> RowRegistry {
        RowRegistry::from_cells((0..count).map(|i| vec![format!("Book {i}")]).collect())
    }

    #[test]
    fn test_single_page_has_no_controls() {
        let mut reg = registry(10);
        let mut pager = Paginator::default();
        pager.display_page(1, &mut reg);
        assert_eq!(pager.page_count(), 1);
        assert!(!pager.is_visible());
        assert_eq!(reg.displayed_rows().len(), 10);
    }

    #[test]
    fn test_controls_on_first_page() {
        let mut reg = registry(11);
        let mut pager = Paginator::default();
        pager.display_page(1, &mut reg);

        let labels: Vec<String> = pager.controls().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["Previous", "1", "2", "Next"]);
        assert!(pager.controls()[0].is_disabled());
        assert!(pager.controls()[1].is_active());
        assert!(!pager.controls()[3].is_disabled());
    }

    #[test]
    fn test_previous_and_next_stop_at_edges() {
        let mut reg = registry(15);
        let mut pager = Paginator::default();
        pager.display_page(1, &mut reg);

        assert!(!pager.request(PageRequest::Previous, &mut reg));
        assert!(pager.request(PageRequest::Next, &mut reg));
        assert_eq!(pager.current_page(), 2);
        assert_eq!(reg.displayed_rows(), (10..15).collect::<Vec<_>>());
        assert!(!pager.request(PageRequest::Next, &mut reg));
        assert!(pager.controls().last().unwrap().is_disabled());
    }

    #[test]
    fn test_page_number_is_clamped() {
        let mut reg = registry(25);
        let mut pager = Paginator::default();
        pager.display_page(1, &mut reg);
        assert!(pager.request(PageRequest::Number(9), &mut reg));
        assert_eq!(pager.current_page(), 3);
    }

    #[test]
    fn test_no_visible_rows() {
        let mut reg = registry(3);
        for row in reg.rows_mut() {
            row.set_hidden(true);
        }
        let mut pager = Paginator::default();
        pager.display_page(1, &mut reg);
        assert_eq!(pager.page_count(), 0);
        assert!(!pager.is_visible());
        assert!(reg.displayed_rows().is_empty());
        assert!(!pager.request(PageRequest::Number(1), &mut reg));
    }
}
