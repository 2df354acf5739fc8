//! Configuration module
//!
//! Settings for table paging, form submission and display, loaded from
//! `config.toml` in the platform config directory.

pub mod config;
