use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

use crate::data::row::BookColumn;
use crate::page::Page;
use crate::tracking_form::{FormField, TrackingForm};

/// Where each input column lands in a loaded row
enum ColumnTarget {
    Book(BookColumn),
    Form(FormField),
    Extra(usize),
}

fn plan_columns(headers: &[String]) -> (Vec<ColumnTarget>, Vec<String>) {
    let mut extra_headers = Vec::new();
    let targets = headers
        .iter()
        .map(|header| {
            if let Some(field) = FormField::from_column_name(header) {
                ColumnTarget::Form(field)
            } else if let Some(column) = BookColumn::from_name(header) {
                ColumnTarget::Book(column)
            } else {
                extra_headers.push(header.clone());
                ColumnTarget::Extra(extra_headers.len() - 1)
            }
        })
        .collect();
    (targets, extra_headers)
}

/// Build one table row and, when the input has tracking columns, its form
fn build_row(
    values: &[String],
    targets: &[ColumnTarget],
    extra_count: usize,
    row_index: usize,
    with_form: bool,
) -> (Vec<String>, Option<TrackingForm>) {
    let mut cells = vec![String::new(); BookColumn::ALL.len() + extra_count];
    let mut form = with_form.then(|| TrackingForm::new(row_index));

    for (value, target) in values.iter().zip(targets) {
        match target {
            ColumnTarget::Book(column) => cells[column.index()] = value.clone(),
            ColumnTarget::Extra(i) => cells[BookColumn::ALL.len() + i] = value.clone(),
            ColumnTarget::Form(field) => {
                if let Some(f) = form.take() {
                    form = Some(f.with_value(*field, value.clone()));
                }
            }
        }
    }

    (cells, form)
}

/// Load a CSV export of the library. Column names map case-insensitively onto
/// the book layout; a `status` column adds a tracking form per row.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Page> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let (targets, extra_headers) = plan_columns(&headers);
    let with_form = targets
        .iter()
        .any(|t| matches!(t, ColumnTarget::Form(FormField::Status)));

    let mut rows = Vec::new();
    let mut forms = Vec::new();
    for result in reader.records() {
        let record = result?;
        let values: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        let (cells, form) = build_row(&values, &targets, extra_headers.len(), rows.len(), with_form);
        rows.push(cells);
        forms.extend(form);
    }

    info!(target: "loader", "Loaded {} rows from {:?}", rows.len(), path.as_ref());

    let mut page = Page::new(rows).with_forms(forms);
    page.extra_headers = extra_headers;
    Ok(page)
}

/// Union of the keys of every object, in first-seen order
fn json_headers(json_data: &[JsonValue]) -> Result<Vec<String>> {
    let mut headers: Vec<String> = Vec::new();
    for (idx, json_obj) in json_data.iter().enumerate() {
        let obj = json_obj
            .as_object()
            .with_context(|| format!("JSON element {} is not an object", idx))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    Ok(headers)
}

/// Load a JSON array of book objects keyed like the CSV columns
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Page> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
    let json_data: Vec<JsonValue> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| "Failed to parse JSON file")?;

    if json_data.is_empty() {
        return Ok(Page::new(Vec::new()));
    }
    let headers = json_headers(&json_data)?;

    let (targets, extra_headers) = plan_columns(&headers);
    let with_form = targets
        .iter()
        .any(|t| matches!(t, ColumnTarget::Form(FormField::Status)));

    let mut rows = Vec::new();
    let mut forms = Vec::new();
    for obj in json_data.iter().filter_map(JsonValue::as_object) {
        let values: Vec<String> = headers
            .iter()
            .map(|name| match obj.get(name) {
                Some(JsonValue::String(s)) => s.clone(),
                Some(JsonValue::Null) | None => String::new(),
                Some(JsonValue::Array(items)) => items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join(", "),
                Some(v) => v.to_string(),
            })
            .collect();
        let (cells, form) = build_row(&values, &targets, extra_headers.len(), rows.len(), with_form);
        rows.push(cells);
        forms.extend(form);
    }

    info!(target: "loader", "Loaded {} rows from {:?}", rows.len(), path.as_ref());

    let mut page = Page::new(rows).with_forms(forms);
    page.extra_headers = extra_headers;
    Ok(page)
}

/// The `volumeInfo` object of a Google Books lookup
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub page_count: Option<u64>,
    pub average_rating: Option<f64>,
}

impl VolumeInfo {
    /// Accepts a bare `volumeInfo`, a single item, or a full lookup response
    pub fn from_json(value: JsonValue) -> Result<Self> {
        let info = if let Some(item) = value.get("items").and_then(|items| items.get(0)) {
            item.get("volumeInfo").cloned().unwrap_or(JsonValue::Null)
        } else if let Some(info) = value.get("volumeInfo") {
            info.clone()
        } else {
            value
        };
        if !info.is_object() {
            anyhow::bail!("No volumeInfo object found");
        }
        Ok(serde_json::from_value(info)?)
    }

    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.title.unwrap_or_default(),
            self.subtitle.unwrap_or_default(),
            self.authors.join(", "),
            self.categories.into_iter().next().unwrap_or_default(),
            self.publisher.unwrap_or_default(),
            self.published_date.unwrap_or_default(),
            self.description.unwrap_or_default(),
            self.page_count.map(|p| p.to_string()).unwrap_or_default(),
            self.average_rating.map(|r| r.to_string()).unwrap_or_default(),
        ]
    }
}

/// Load a directory of saved lookups (`<isbn>.txt` or `.json`), one book per
/// file in file-name order. Files that cannot be read are skipped.
pub fn load_volume_dir<P: AsRef<Path>>(dir: P) -> Result<Page> {
    let mut paths: Vec<_> = fs::read_dir(&dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir.as_ref()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("txt") | Some("json")
                )
        })
        .collect();
    paths.sort();

    let mut rows = Vec::new();
    for path in paths {
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|text| Ok(serde_json::from_str::<JsonValue>(&text)?))
            .and_then(VolumeInfo::from_json);

        match parsed {
            Ok(info) => rows.push(info.into_cells()),
            Err(e) => warn!(target: "loader", "Skipping {:?}: {}", path, e),
        }
    }

    info!(target: "loader", "Loaded {} volumes from {:?}", rows.len(), dir.as_ref());
    Ok(Page::new(rows))
}
