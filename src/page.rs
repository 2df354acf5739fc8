use anyhow::{Context, Result};
use std::path::Path;

use crate::data::loaders::{load_csv, load_json, load_volume_dir};
use crate::data::row::BookColumn;
use crate::tracking_form::TrackingForm;

/// What the host document offers the controller.
///
/// Anything missing here switches the matching feature off instead of
/// failing the whole page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Table body cells in [`BookColumn`] order; `None` when there is no table
    pub rows: Option<Vec<Vec<String>>>,

    /// Headers of columns past the book layout, carried through for display
    pub extra_headers: Vec<String>,

    pub has_search_box: bool,
    pub has_pagination: bool,
    pub sortable_columns: Vec<BookColumn>,
    pub forms: Vec<TrackingForm>,
}

impl Page {
    /// A page with a table and every control present
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Some(rows),
            extra_headers: Vec::new(),
            has_search_box: true,
            has_pagination: true,
            sortable_columns: BookColumn::default_sortable(),
            forms: Vec::new(),
        }
    }

    /// A page without a table
    pub fn empty() -> Self {
        Self {
            rows: None,
            extra_headers: Vec::new(),
            has_search_box: false,
            has_pagination: false,
            sortable_columns: Vec::new(),
            forms: Vec::new(),
        }
    }

    pub fn without_search(mut self) -> Self {
        self.has_search_box = false;
        self
    }

    pub fn without_pagination(mut self) -> Self {
        self.has_pagination = false;
        self
    }

    pub fn with_forms(mut self, forms: Vec<TrackingForm>) -> Self {
        self.forms = forms;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    /// Load a CSV or JSON export, or a directory of saved volume lookups
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            load_volume_dir(path)
                .with_context(|| format!("Failed to load volumes from {}", path.display()))
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            load_json(path).with_context(|| format!("Failed to load JSON {}", path.display()))
        } else {
            load_csv(path).with_context(|| format!("Failed to load CSV {}", path.display()))
        }
    }
}
