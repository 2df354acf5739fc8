use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use tracing::warn;
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::config::config::Config;
use crate::controller::{TableController, TableEvent};
use crate::data::row::BookColumn;
use crate::logging::LogRingBuffer;
use crate::page::Page;
use crate::paginator::PageRequest;
use crate::table_display::{header_label, pagination_line};
use crate::tracking_form::{FormField, FormSection, SubmitMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browse,
    Search,
    Logs,
}

pub struct TuiApp {
    controller: TableController,
    config: Config,
    input: Input,
    mode: AppMode,
    selected_header: usize,
    table_state: TableState,
    status_message: String,
    log_buffer: Option<LogRingBuffer>,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(page: Page, config: Config, log_buffer: Option<LogRingBuffer>) -> Self {
        let controller: TableController = TableController::with_submitter(
            page,
            config.controller_options(),
            Default::default(),
        );
        let mut table_state = TableState::default();
        if !controller.displayed_rows().is_empty() {
            table_state.select(Some(0));
        }

        Self {
            controller,
            config,
            input: Input::default(),
            mode: AppMode::Browse,
            selected_header: 0,
            table_state,
            status_message: "Ready - / search, s sort, n/p page, Enter description, q quit"
                .to_string(),
            log_buffer,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &TableController {
        &self.controller
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.ui(f))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Row index under the cursor, in document order
    fn selected_row(&self) -> Option<usize> {
        let displayed = self.controller.displayed_rows();
        self.table_state
            .selected()
            .and_then(|i| displayed.get(i).copied())
    }

    fn selected_column(&self) -> Option<BookColumn> {
        self.controller
            .sortable_columns()
            .get(self.selected_header)
            .copied()
    }

    /// Translate a key press into a controller event, handling purely
    /// local keys (selection, mode switches) on the way.
    pub fn event_for_key(&mut self, key: KeyEvent) -> Option<TableEvent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => {
                    self.should_quit = true;
                    None
                }
                KeyCode::Char('l') => {
                    self.input.reset();
                    Some(TableEvent::ClearRequested)
                }
                _ => None,
            };
        }

        match self.mode {
            AppMode::Search => self.search_key(key),
            AppMode::Logs => {
                if matches!(key.code, KeyCode::Esc | KeyCode::F(12) | KeyCode::Char('q')) {
                    self.mode = AppMode::Browse;
                }
                None
            }
            AppMode::Browse => self.browse_key(key),
        }
    }

    fn search_key(&mut self, key: KeyEvent) -> Option<TableEvent> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.mode = AppMode::Browse;
                None
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                (self.input.value() != before)
                    .then(|| TableEvent::SearchChanged(self.input.value().to_string()))
            }
        }
    }

    fn browse_key(&mut self, key: KeyEvent) -> Option<TableEvent> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('/') if self.controller.has_search() => {
                self.mode = AppMode::Search;
                None
            }
            KeyCode::Char('c') => {
                self.input.reset();
                Some(TableEvent::ClearRequested)
            }
            KeyCode::F(12) => {
                self.mode = AppMode::Logs;
                None
            }
            KeyCode::Left => {
                self.selected_header = self.selected_header.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                let last = self.controller.sortable_columns().len().saturating_sub(1);
                self.selected_header = (self.selected_header + 1).min(last);
                None
            }
            KeyCode::Char('s') => self.selected_column().map(TableEvent::SortRequested),
            KeyCode::Char('n') | KeyCode::PageDown => {
                Some(TableEvent::PageRequested(PageRequest::Next))
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                Some(TableEvent::PageRequested(PageRequest::Previous))
            }
            KeyCode::Char(d @ '1'..='9') => {
                let number = d.to_digit(10).map(|n| n as usize)?;
                Some(TableEvent::PageRequested(PageRequest::Number(number)))
            }
            KeyCode::Up => {
                let current = self.table_state.selected().unwrap_or(0);
                self.table_state.select(Some(current.saturating_sub(1)));
                None
            }
            KeyCode::Down => {
                let count = self.controller.displayed_rows().len();
                let current = self.table_state.selected().unwrap_or(0);
                self.table_state
                    .select(Some((current + 1).min(count.saturating_sub(1))));
                None
            }
            KeyCode::Enter => self.selected_row().map(TableEvent::DescriptionToggled),
            KeyCode::Char('t') => {
                let row = self.selected_row()?;
                let (form, tracking) = self.controller.form_for_row(row)?;
                Some(TableEvent::FieldChanged {
                    form,
                    field: FormField::Status,
                    value: tracking.next_status().to_string(),
                })
            }
            KeyCode::Char('w') => {
                let row = self.selected_row()?;
                let (form, _) = self.controller.form_for_row(row)?;
                Some(TableEvent::SubmitRequested { form })
            }
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let Some(event) = self.event_for_key(key) else {
            return;
        };
        let resets_selection = matches!(
            event,
            TableEvent::SearchChanged(_)
                | TableEvent::ClearRequested
                | TableEvent::SortRequested(_)
                | TableEvent::PageRequested(_)
        );

        match self.controller.handle(event) {
            Ok(()) => self.update_status(),
            Err(e) => {
                warn!(target: "form", "Submission failed: {}", e);
                self.status_message = format!("Submission failed: {e}");
            }
        }

        if resets_selection {
            let any = !self.controller.displayed_rows().is_empty();
            self.table_state.select(any.then_some(0));
        }
    }

    fn update_status(&mut self) {
        let shown = self.controller.visible_count();
        let mut status = format!(
            "{} books match | page {}/{}",
            shown,
            self.controller.current_page(),
            self.controller.page_count().max(1)
        );
        if let Some(last) = self.controller.submitter().last() {
            status.push_str(&format!(" | last saved: row {}", last.row + 1));
        }
        self.status_message = status;
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search box
                Constraint::Min(6),    // Table
                Constraint::Length(7), // Description and tracking form
                Constraint::Length(1), // Pagination controls
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_search(f, chunks[0]);
        self.render_table(f, chunks[1]);
        self.render_details(f, chunks[2]);

        let pager = Paragraph::new(pagination_line(self.controller.pagination_controls()))
            .style(Style::default().fg(Color::Cyan));
        f.render_widget(pager, chunks[3]);

        let mode = match self.mode {
            AppMode::Browse => "BROWSE",
            AppMode::Search => "SEARCH",
            AppMode::Logs => "LOGS",
        };
        let status = Paragraph::new(Line::from(vec![
            Span::styled(
                mode,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::raw(self.status_message.as_str()),
        ]))
        .style(Style::default().bg(Color::DarkGray));
        f.render_widget(status, chunks[4]);

        if self.mode == AppMode::Logs {
            self.render_logs(f);
        }
    }

    fn render_search(&self, f: &mut Frame, area: Rect) {
        let title = if self.controller.has_search() {
            "Search (/ to type, c to clear)"
        } else {
            "Search unavailable"
        };
        let style = if self.mode == AppMode::Search {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let search = Paragraph::new(self.input.value())
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(style);
        f.render_widget(search, area);

        if self.mode == AppMode::Search {
            f.set_cursor_position((area.x + self.input.visual_cursor() as u16 + 1, area.y + 1));
        }
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let use_glyphs = self.config.display.use_glyphs;
        let selected_column = self.selected_column();
        let columns: Vec<BookColumn> = BookColumn::ALL
            .into_iter()
            .filter(|c| *c != BookColumn::Description)
            .collect();

        let mut header_cells = Vec::new();
        if self.config.display.show_row_numbers {
            header_cells.push(Cell::from("#"));
        }
        for &column in &columns {
            let mut style = Style::default().fg(Color::Yellow);
            if Some(column) == selected_column {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            header_cells.push(Cell::from(header_label(&self.controller, column, use_glyphs)).style(style));
        }
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows: Vec<Row> = self
            .controller
            .displayed_rows()
            .into_iter()
            .filter_map(|idx| {
                let row = self.controller.row(idx)?;
                let mut cells = Vec::new();
                if self.config.display.show_row_numbers {
                    cells.push(Cell::from((idx + 1).to_string()));
                }
                for &column in &columns {
                    cells.push(Cell::from(row.column(column).to_string()));
                }
                Some(Row::new(cells))
            })
            .collect();

        let mut widths = Vec::new();
        if self.config.display.show_row_numbers {
            widths.push(Constraint::Length(4));
        }
        widths.extend(columns.iter().map(|c| match c {
            BookColumn::Title | BookColumn::Authors => Constraint::Percentage(18),
            BookColumn::PageCount | BookColumn::Rating => Constraint::Length(8),
            BookColumn::PublishedDate => Constraint::Length(11),
            _ => Constraint::Percentage(12),
        }));

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Books ({} of {})",
                self.controller.displayed_rows().len(),
                self.controller.visible_count()
            )))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_details(&self, f: &mut Frame, area: Rect) {
        let Some(idx) = self.selected_row() else {
            f.render_widget(Block::default().borders(Borders::ALL), area);
            return;
        };

        let mut lines = Vec::new();
        let mut title = String::from("Description");
        if let (Some(row), Some(toggle)) = (self.controller.row(idx), self.controller.description(idx)) {
            let text = row.column(BookColumn::Description);
            lines.push(Line::from(
                toggle
                    .preview(text, self.config.table.description_preview_chars)
                    .into_owned(),
            ));
            title = format!("Description [Enter: {}]", toggle.label());
        }

        if let Some((_, form)) = self.controller.form_for_row(idx) {
            let mut spans = vec![Span::styled(
                format!("Status: {}", form.status()),
                Style::default().fg(Color::Green),
            )];
            for (section, fields) in [
                (FormSection::Progress, &[FormField::Progress][..]),
                (FormSection::Dates, &[FormField::StartDate, FormField::FinishDate][..]),
                (FormSection::Rating, &[FormField::Rating][..]),
                (FormSection::Notes, &[FormField::Notes][..]),
            ] {
                if form.is_section_visible(section) {
                    let values: Vec<&str> = fields.iter().map(|f| form.value(*f)).collect();
                    spans.push(Span::raw(format!("  {:?}: {}", section, values.join(" → "))));
                }
            }
            if self.controller.submit_mode() == SubmitMode::Explicit && form.is_dirty() {
                spans.push(Span::styled("  (unsaved, w to submit)", Style::default().fg(Color::Red)));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(spans));
        }

        let details = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        f.render_widget(details, area);
    }

    fn render_logs(&self, f: &mut Frame) {
        let area = centered_rect(90, 70, f.area());
        f.render_widget(Clear, area);

        let height = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = self
            .log_buffer
            .as_ref()
            .map(|buffer| buffer.get_recent(height))
            .unwrap_or_default()
            .into_iter()
            .map(|entry| Line::from(entry.format_for_display()))
            .collect();

        let logs = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Log (Esc to close)"));
        f.render_widget(logs, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn run_tui_app(page: Page, config: Config, log_buffer: Option<LogRingBuffer>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(page, config, log_buffer);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking_form::TrackingForm;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(count: usize) -> TuiApp {
        let rows = (0..count)
            .map(|i| vec![format!("Book {i:02}"), String::new(), format!("Author {}", i % 3)])
            .collect();
        let page = Page::new(rows).with_forms(vec![TrackingForm::new(0)]);
        TuiApp::new(page, Config::default(), None)
    }

    #[test]
    fn test_typing_in_search_filters_per_keystroke() {
        let mut app = app(25);
        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.mode(), AppMode::Search);

        for c in "book 1".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.controller().search_query(), "book 1");
        assert_eq!(app.controller().visible_count(), 10);

        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.controller().visible_count(), 25);
        assert_eq!(app.controller().page_count(), 3);
    }

    #[test]
    fn test_page_keys() {
        let mut app = app(25);
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.controller().current_page(), 2);
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.controller().current_page(), 3);
        app.handle_key(key(KeyCode::Char('p')));
        assert_eq!(app.controller().current_page(), 2);
    }

    #[test]
    fn test_sort_key_uses_selected_header() {
        let mut app = app(5);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.controller().sort_state().column, Some(BookColumn::Authors));
    }

    #[test]
    fn test_status_key_cycles_and_submits() {
        let mut app = app(3);
        app.handle_key(key(KeyCode::Char('t')));
        app.handle_key(key(KeyCode::Char('t')));

        let form = &app.controller().forms()[0];
        assert_eq!(form.status(), "reading");
        assert!(form.is_section_visible(FormSection::Progress));
        assert_eq!(app.controller().submitter().submissions().len(), 2);
        assert!(app.status_message().contains("last saved: row 1"));
    }

    #[test]
    fn test_enter_toggles_selected_description() {
        let mut app = app(3);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.controller().description(1).unwrap().is_expanded());
    }

    #[test]
    fn test_quit() {
        let mut app = app(1);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }
}
