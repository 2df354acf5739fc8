pub mod config;
pub mod controller;
pub mod data;
pub mod description_toggle;
pub mod logging;
pub mod page;
pub mod paginator;
pub mod search_filter;
pub mod sorter;
pub mod table_display;
pub mod tracking_form;
pub mod ui;

pub use controller::{ControllerOptions, TableController, TableEvent};
pub use page::Page;
