use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info};

/// Status values offered by the status selector, in cycling order
pub const STATUS_OPTIONS: [&str; 3] = ["to_read", "reading", "read"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Status,
    Progress,
    StartDate,
    FinishDate,
    Rating,
    Notes,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Status,
        FormField::Progress,
        FormField::StartDate,
        FormField::FinishDate,
        FormField::Rating,
        FormField::Notes,
    ];

    /// Column name used for this field in CSV input
    pub fn column_name(self) -> &'static str {
        match self {
            FormField::Status => "status",
            FormField::Progress => "progress",
            FormField::StartDate => "start_date",
            FormField::FinishDate => "finish_date",
            FormField::Rating => "my_rating",
            FormField::Notes => "notes",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|f| f.column_name() == name)
    }

    /// The conditionally visible section holding this field, if any
    pub fn section(self) -> Option<FormSection> {
        match self {
            FormField::Status => None,
            FormField::Progress => Some(FormSection::Progress),
            FormField::StartDate | FormField::FinishDate => Some(FormSection::Dates),
            FormField::Rating => Some(FormSection::Rating),
            FormField::Notes => Some(FormSection::Notes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormSection {
    Progress,
    Dates,
    Rating,
    Notes,
}

/// Sections shown for a status value
pub fn sections_for_status(status: &str) -> &'static [FormSection] {
    match status.trim() {
        "reading" => &[
            FormSection::Progress,
            FormSection::Dates,
            FormSection::Rating,
            FormSection::Notes,
        ],
        "read" => &[FormSection::Dates, FormSection::Rating, FormSection::Notes],
        _ => &[],
    }
}

/// When a tracking form is sent to its submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// Every field change is submitted on its own
    #[default]
    OnChange,
    /// Changes accumulate until an explicit submit
    Explicit,
}

/// Snapshot of a form handed to a submitter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSubmission {
    pub row: usize,
    pub fields: BTreeMap<FormField, String>,
}

impl FormSubmission {
    pub fn value(&self, field: FormField) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }
}

/// Receives form submissions from the controller
pub trait FormSubmitter {
    fn submit(&mut self, submission: &FormSubmission) -> Result<()>;
}

/// Number of submissions a `LogSubmitter` keeps
pub const SUBMISSION_HISTORY: usize = 50;

/// Submitter that logs each submission as JSON and keeps the most recent ones
#[derive(Debug, Default)]
pub struct LogSubmitter {
    submissions: VecDeque<FormSubmission>,
}

impl LogSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> &VecDeque<FormSubmission> {
        &self.submissions
    }

    pub fn last(&self) -> Option<&FormSubmission> {
        self.submissions.back()
    }
}

impl FormSubmitter for LogSubmitter {
    fn submit(&mut self, submission: &FormSubmission) -> Result<()> {
        let payload =
            serde_json::to_string(submission).context("Failed to encode tracking form")?;
        info!(target: "form", "Submitted row {}: {}", submission.row, payload);
        if self.submissions.len() == SUBMISSION_HISTORY {
            self.submissions.pop_front();
        }
        self.submissions.push_back(submission.clone());
        Ok(())
    }
}

/// Reading-progress form attached to one table row
#[derive(Debug, Clone)]
pub struct TrackingForm {
    row: usize,
    values: BTreeMap<FormField, String>,
    visible_sections: Vec<FormSection>,
    dirty: bool,
}

impl TrackingForm {
    pub fn new(row: usize) -> Self {
        let mut form = Self {
            row,
            values: BTreeMap::new(),
            visible_sections: Vec::new(),
            dirty: false,
        };
        form.apply_visibility();
        form
    }

    pub fn with_value(mut self, field: FormField, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self.apply_visibility();
        self
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn value(&self, field: FormField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn status(&self) -> &str {
        self.value(FormField::Status)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn visible_sections(&self) -> &[FormSection] {
        &self.visible_sections
    }

    pub fn is_section_visible(&self, section: FormSection) -> bool {
        self.visible_sections.contains(&section)
    }

    /// Whether a field is currently shown (status is always shown)
    pub fn is_field_visible(&self, field: FormField) -> bool {
        field
            .section()
            .map_or(true, |section| self.is_section_visible(section))
    }

    /// Recompute which sections are shown from the current status
    pub fn apply_visibility(&mut self) {
        self.visible_sections = sections_for_status(self.status()).to_vec();
    }

    /// The status following the current one in `STATUS_OPTIONS`
    pub fn next_status(&self) -> &'static str {
        let pos = STATUS_OPTIONS.iter().position(|s| *s == self.status());
        match pos {
            Some(i) => STATUS_OPTIONS[(i + 1) % STATUS_OPTIONS.len()],
            None => STATUS_OPTIONS[0],
        }
    }

    pub fn snapshot(&self) -> FormSubmission {
        FormSubmission {
            row: self.row,
            fields: self.values.clone(),
        }
    }

    /// Store a changed field value, re-run the visibility rule on status
    /// changes and submit according to `mode`.
    pub fn change(
        &mut self,
        field: FormField,
        value: impl Into<String>,
        mode: SubmitMode,
        submitter: &mut dyn FormSubmitter,
    ) -> Result<()> {
        let value = value.into();
        debug!(target: "form", "Row {} field {:?} = {:?}", self.row, field, value);
        self.values.insert(field, value);
        self.dirty = true;

        if field == FormField::Status {
            self.apply_visibility();
        }

        match mode {
            SubmitMode::OnChange => self.submit(submitter),
            SubmitMode::Explicit => Ok(()),
        }
    }

    pub fn submit(&mut self, submitter: &mut dyn FormSubmitter) -> Result<()> {
        submitter.submit(&self.snapshot())?;
        self.dirty = false;
        Ok(())
    }
}
