//! Terminal front end
//!
//! Maps key presses onto controller events and renders the table, the
//! pagination controls and the selected book's details with ratatui.

pub mod tui_app;
