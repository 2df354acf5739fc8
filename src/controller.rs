use anyhow::Result;
use tracing::{debug, info};

use crate::data::row::{BookColumn, TableRow};
use crate::data::row_registry::RowRegistry;
use crate::description_toggle::DescriptionToggle;
use crate::page::Page;
use crate::paginator::{PageRequest, PaginationControl, Paginator, DEFAULT_ROWS_PER_PAGE};
use crate::search_filter::SearchFilter;
use crate::sorter::{SortDirection, SortState, Sorter};
use crate::tracking_form::{FormField, FormSubmitter, LogSubmitter, SubmitMode, TrackingForm};

/// A user action the host forwards to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    SearchChanged(String),
    ClearRequested,
    SortRequested(BookColumn),
    PageRequested(PageRequest),
    DescriptionToggled(usize),
    FieldChanged {
        form: usize,
        field: FormField,
        value: String,
    },
    SubmitRequested {
        form: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub rows_per_page: usize,
    pub submit_mode: SubmitMode,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            submit_mode: SubmitMode::OnChange,
        }
    }
}

/// Owns all interaction state for one loaded page
pub struct TableController<S: FormSubmitter = LogSubmitter> {
    registry: Option<RowRegistry>,
    search: Option<SearchFilter>,
    sorter: Sorter,
    paginator: Option<Paginator>,
    descriptions: Vec<DescriptionToggle>,
    forms: Vec<TrackingForm>,
    extra_headers: Vec<String>,
    submit_mode: SubmitMode,
    submitter: S,
}

impl TableController<LogSubmitter> {
    pub fn new(page: Page) -> Self {
        Self::with_submitter(page, ControllerOptions::default(), LogSubmitter::new())
    }
}

impl<S: FormSubmitter> TableController<S> {
    pub fn with_submitter(page: Page, options: ControllerOptions, submitter: S) -> Self {
        let registry = page.rows.map(RowRegistry::from_cells);
        let has_table = registry.is_some();
        let row_count = registry.as_ref().map_or(0, RowRegistry::len);

        let mut forms = page.forms;
        for form in &mut forms {
            form.apply_visibility();
        }

        let mut controller = Self {
            registry,
            search: (has_table && page.has_search_box).then(SearchFilter::new),
            sorter: Sorter::new(if has_table { page.sortable_columns } else { Vec::new() }),
            paginator: (has_table && page.has_pagination)
                .then(|| Paginator::new(options.rows_per_page)),
            descriptions: vec![DescriptionToggle::new(); row_count],
            forms,
            extra_headers: page.extra_headers,
            submit_mode: options.submit_mode,
            submitter,
        };

        info!(
            target: "controller",
            "Page ready: {} rows, {} forms, search={}, pagination={}",
            row_count,
            controller.forms.len(),
            controller.search.is_some(),
            controller.paginator.is_some()
        );
        controller.refresh();
        controller
    }

    /// Dispatch one event. Only form submission can fail.
    pub fn handle(&mut self, event: TableEvent) -> Result<()> {
        debug!(target: "controller", "Event: {:?}", event);
        match event {
            TableEvent::SearchChanged(query) => {
                if let (Some(search), Some(registry)) = (&mut self.search, &mut self.registry) {
                    search.apply(&query, registry);
                    self.refresh();
                }
            }
            TableEvent::ClearRequested => {
                if let (Some(search), Some(registry)) = (&mut self.search, &mut self.registry) {
                    search.clear(registry);
                    self.refresh();
                }
            }
            TableEvent::SortRequested(column) => {
                if let Some(registry) = &mut self.registry {
                    if self.sorter.request(column, registry) {
                        self.refresh();
                    }
                }
            }
            TableEvent::PageRequested(request) => {
                if let (Some(paginator), Some(registry)) = (&mut self.paginator, &mut self.registry)
                {
                    paginator.request(request, registry);
                }
            }
            TableEvent::DescriptionToggled(row) => {
                if let Some(toggle) = self.descriptions.get_mut(row) {
                    let label = toggle.toggle();
                    debug!(target: "controller", "Row {} description: {}", row, label);
                }
            }
            TableEvent::FieldChanged { form, field, value } => {
                if let Some(tracking) = self.forms.get_mut(form) {
                    tracking.change(field, value, self.submit_mode, &mut self.submitter)?;
                }
            }
            TableEvent::SubmitRequested { form } => {
                if let Some(tracking) = self.forms.get_mut(form) {
                    tracking.submit(&mut self.submitter)?;
                }
            }
        }
        Ok(())
    }

    /// The fixed post-mutation pipeline: recompute the visible set, go back to
    /// page 1, show that page and rebuild the pagination controls.
    pub fn refresh(&mut self) {
        let Some(registry) = &mut self.registry else {
            return;
        };

        match &mut self.paginator {
            Some(paginator) => {
                paginator.reset();
                paginator.display_page(1, registry);
            }
            None => {
                for row in registry.rows_mut() {
                    let shown = !row.is_hidden();
                    row.set_displayed(shown);
                }
            }
        }
    }

    pub fn has_table(&self) -> bool {
        self.registry.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    pub fn registry(&self) -> Option<&RowRegistry> {
        self.registry.as_ref()
    }

    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.registry.as_ref()?.row(index)
    }

    /// Rows on screen right now, in sort order
    pub fn displayed_rows(&self) -> Vec<usize> {
        self.registry
            .as_ref()
            .map(RowRegistry::displayed_rows)
            .unwrap_or_default()
    }

    pub fn visible_count(&self) -> usize {
        self.registry.as_ref().map_or(0, RowRegistry::visible_count)
    }

    pub fn search_query(&self) -> &str {
        self.search.as_ref().map_or("", SearchFilter::query)
    }

    pub fn sort_state(&self) -> SortState {
        self.sorter.state()
    }

    pub fn header_state(&self, column: BookColumn) -> SortDirection {
        self.sorter.header_state(column)
    }

    pub fn sortable_columns(&self) -> &[BookColumn] {
        self.sorter.sortable_columns()
    }

    pub fn current_page(&self) -> usize {
        self.paginator.as_ref().map_or(1, Paginator::current_page)
    }

    pub fn page_count(&self) -> usize {
        self.paginator.as_ref().map_or(0, Paginator::page_count)
    }

    /// Generated pagination controls; empty when the container is hidden
    pub fn pagination_controls(&self) -> &[PaginationControl] {
        match &self.paginator {
            Some(paginator) => paginator.controls(),
            None => &[],
        }
    }

    pub fn description(&self, row: usize) -> Option<&DescriptionToggle> {
        self.descriptions.get(row)
    }

    pub fn forms(&self) -> &[TrackingForm] {
        &self.forms
    }

    /// Index and form bound to a table row
    pub fn form_for_row(&self, row: usize) -> Option<(usize, &TrackingForm)> {
        self.forms.iter().enumerate().find(|(_, f)| f.row() == row)
    }

    pub fn submit_mode(&self) -> SubmitMode {
        self.submit_mode
    }

    pub fn extra_headers(&self) -> &[String] {
        &self.extra_headers
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(count: usize) -> Vec<Vec<String>> {
        (0..count).map(|i| vec![format!("Book {i:02}")]).collect()
    }

    #[test]
    fn test_missing_table_is_a_no_op() {
        let mut controller = TableController::new(Page::empty());
        controller
            .handle(TableEvent::SearchChanged("x".into()))
            .unwrap();
        controller
            .handle(TableEvent::SortRequested(BookColumn::Title))
            .unwrap();
        controller
            .handle(TableEvent::PageRequested(PageRequest::Next))
            .unwrap();
        assert!(!controller.has_table());
        assert!(controller.displayed_rows().is_empty());
        assert!(controller.pagination_controls().is_empty());
    }

    #[test]
    fn test_without_search_box_queries_are_ignored() {
        let mut controller = TableController::new(Page::new(rows(3)).without_search());
        controller
            .handle(TableEvent::SearchChanged("Book 01".into()))
            .unwrap();
        assert_eq!(controller.visible_count(), 3);
        assert_eq!(controller.search_query(), "");
    }

    #[test]
    fn test_without_pagination_every_visible_row_is_displayed() {
        let mut controller = TableController::new(Page::new(rows(30)).without_pagination());
        assert_eq!(controller.displayed_rows().len(), 30);

        controller
            .handle(TableEvent::SearchChanged("book 1".into()))
            .unwrap();
        assert_eq!(controller.displayed_rows().len(), 10);
        assert_eq!(controller.page_count(), 0);
    }

    #[test]
    fn test_description_toggle_for_unknown_row_is_ignored() {
        let mut controller = TableController::new(Page::new(rows(2)));
        controller.handle(TableEvent::DescriptionToggled(7)).unwrap();
        controller.handle(TableEvent::DescriptionToggled(1)).unwrap();
        assert!(controller.description(1).unwrap().is_expanded());
        assert!(!controller.description(0).unwrap().is_expanded());
    }
}
