use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::config::config::Config;
use crate::controller::TableController;
use crate::data::row::BookColumn;
use crate::paginator::PaginationControl;
use crate::tracking_form::FormSubmitter;

/// Header label with its sort marker
pub fn header_label<S: FormSubmitter>(
    controller: &TableController<S>,
    column: BookColumn,
    use_glyphs: bool,
) -> String {
    format!(
        "{}{}",
        column.label(),
        controller.header_state(column).indicator(use_glyphs)
    )
}

/// One-line rendering of the pagination controls, e.g. `‹Previous› [1] 2 3 Next`
pub fn pagination_line(controls: &[PaginationControl]) -> String {
    controls
        .iter()
        .map(|control| {
            let label = control.label();
            if control.is_active() {
                format!("[{label}]")
            } else if control.is_disabled() {
                format!("‹{label}›")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the rows currently displayed by the controller as a table
pub fn render_page<S: FormSubmitter>(controller: &TableController<S>, config: &Config) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = Vec::new();
    if config.display.show_row_numbers {
        headers.push(Cell::new("#").add_attribute(Attribute::Bold));
    }
    for column in BookColumn::ALL {
        headers.push(
            Cell::new(header_label(controller, column, config.display.use_glyphs))
                .add_attribute(Attribute::Bold),
        );
    }
    for extra in controller.extra_headers() {
        headers.push(Cell::new(extra).add_attribute(Attribute::Bold));
    }
    table.set_header(headers);

    let limit = config.table.description_preview_chars;
    for idx in controller.displayed_rows() {
        let Some(row) = controller.row(idx) else {
            continue;
        };
        let mut cells: Vec<String> = Vec::new();
        if config.display.show_row_numbers {
            cells.push((idx + 1).to_string());
        }
        for (i, text) in row.cells().iter().enumerate() {
            if i == BookColumn::Description.index() {
                let preview = controller
                    .description(idx)
                    .map(|toggle| toggle.preview(text, limit).into_owned())
                    .unwrap_or_else(|| text.clone());
                cells.push(preview);
            } else {
                cells.push(text.clone());
            }
        }
        table.add_row(cells);
    }

    let mut out = table.to_string();
    out.push('\n');
    out.push_str(&format!(
        "{} of {} books shown",
        controller.displayed_rows().len(),
        controller.visible_count()
    ));
    if !controller.pagination_controls().is_empty() {
        out.push('\n');
        out.push_str(&pagination_line(controller.pagination_controls()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::TableEvent;
    use crate::page::Page;

    #[test]
    fn test_pagination_line_marks_state() {
        let controls = vec![
            PaginationControl::Previous { disabled: true },
            PaginationControl::Page { number: 1, active: true },
            PaginationControl::Page { number: 2, active: false },
            PaginationControl::Next { disabled: false },
        ];
        assert_eq!(pagination_line(&controls), "‹Previous› [1] 2 Next");
    }

    #[test]
    fn test_render_page_shows_sort_marker_and_counts() {
        let rows = (0..12).map(|i| vec![format!("Book {i}")]).collect();
        let mut controller = TableController::new(Page::new(rows));
        controller
            .handle(TableEvent::SortRequested(BookColumn::Title))
            .unwrap();

        let out = render_page(&controller, &Config::default());
        assert!(out.contains("Title ▲"));
        assert!(out.contains("10 of 12 books shown"));
        assert!(out.contains("[1] 2 Next"));
    }
}
