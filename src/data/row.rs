use serde::{Deserialize, Serialize};

/// The fixed column layout of the book table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookColumn {
    Title,
    Subtitle,
    Authors,
    Category,
    Publisher,
    PublishedDate,
    Description,
    PageCount,
    Rating,
}

/// How cells of a column compare when sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Date,
    Numeric,
}

impl BookColumn {
    pub const ALL: [BookColumn; 9] = [
        BookColumn::Title,
        BookColumn::Subtitle,
        BookColumn::Authors,
        BookColumn::Category,
        BookColumn::Publisher,
        BookColumn::PublishedDate,
        BookColumn::Description,
        BookColumn::PageCount,
        BookColumn::Rating,
    ];

    /// Columns whose text participates in search, in concatenation order
    pub const SEARCHABLE: [BookColumn; 6] = [
        BookColumn::Title,
        BookColumn::Subtitle,
        BookColumn::Authors,
        BookColumn::Category,
        BookColumn::Publisher,
        BookColumn::Description,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Match a header name such as `published_date`, `Page Count` or `pageCount`
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "title" => Some(BookColumn::Title),
            "subtitle" => Some(BookColumn::Subtitle),
            "authors" | "author" => Some(BookColumn::Authors),
            "category" | "categories" => Some(BookColumn::Category),
            "publisher" => Some(BookColumn::Publisher),
            "publisheddate" | "date" | "published" => Some(BookColumn::PublishedDate),
            "description" => Some(BookColumn::Description),
            "pagecount" | "pages" => Some(BookColumn::PageCount),
            "rating" | "averagerating" => Some(BookColumn::Rating),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BookColumn::Title => "Title",
            BookColumn::Subtitle => "Subtitle",
            BookColumn::Authors => "Authors",
            BookColumn::Category => "Category",
            BookColumn::Publisher => "Publisher",
            BookColumn::PublishedDate => "Published",
            BookColumn::Description => "Description",
            BookColumn::PageCount => "Pages",
            BookColumn::Rating => "Rating",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            BookColumn::PublishedDate => ColumnKind::Date,
            BookColumn::PageCount | BookColumn::Rating => ColumnKind::Numeric,
            _ => ColumnKind::Text,
        }
    }

    /// Every column except the description has a sortable header
    pub fn default_sortable() -> Vec<BookColumn> {
        Self::ALL
            .iter()
            .copied()
            .filter(|c| *c != BookColumn::Description)
            .collect()
    }
}

/// One pre-existing table row. The controller only reorders and shows/hides it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    cells: Vec<String>,

    /// Excluded by the current search query
    hidden: bool,

    /// Inside the current page window
    displayed: bool,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            hidden: false,
            displayed: true,
        }
    }

    /// Cell text, or "" when the row is shorter than the column layout
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn column(&self, column: BookColumn) -> &str {
        self.cell(column.index())
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    pub fn set_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_map_onto_layout() {
        assert_eq!(BookColumn::from_name("published_date"), Some(BookColumn::PublishedDate));
        assert_eq!(BookColumn::from_name("Page Count"), Some(BookColumn::PageCount));
        assert_eq!(BookColumn::from_name("averageRating"), Some(BookColumn::Rating));
        assert_eq!(BookColumn::from_name("isbn_13"), None);
    }

    #[test]
    fn test_missing_cells_read_as_empty() {
        let row = TableRow::new(vec!["Dune".to_string()]);
        assert_eq!(row.column(BookColumn::Title), "Dune");
        assert_eq!(row.column(BookColumn::Rating), "");
    }

    #[test]
    fn test_description_is_not_sortable() {
        let sortable = BookColumn::default_sortable();
        assert_eq!(sortable.len(), 8);
        assert!(!sortable.contains(&BookColumn::Description));
    }
}
