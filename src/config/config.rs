use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::controller::ControllerOptions;
use crate::paginator::DEFAULT_ROWS_PER_PAGE;
use crate::tracking_form::SubmitMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub table: TableConfig,
    pub behavior: BehaviorConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows shown per page
    pub rows_per_page: usize,

    /// Characters of a collapsed description to show
    pub description_preview_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// "on_change" submits tracking forms on every field change,
    /// "explicit" waits for a submit
    pub submit_mode: SubmitMode,

    /// Fallback log filter when RUST_LOG is unset
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for sort indicators
    pub use_glyphs: bool,

    /// Show row numbers next to each book
    pub show_row_numbers: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            description_preview_chars: 80,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            submit_mode: SubmitMode::OnChange,
            log_level: "info".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            info!(target: "config", "Wrote default config to {:?}", config_path);
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&config_path)?;
        let config = Self::from_toml(&contents)?;
        debug!(target: "config", "Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        if config.table.rows_per_page == 0 {
            config.table.rows_per_page = DEFAULT_ROWS_PER_PAGE;
        }
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("shelf-view").join("config.toml"))
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            rows_per_page: self.table.rows_per_page,
            submit_mode: self.behavior.submit_mode,
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# shelf-view Configuration File
# Location: ~/.config/shelf-view/config.toml (Linux)
#           ~/Library/Application Support/shelf-view/config.toml (macOS)
#           %APPDATA%\shelf-view\config.toml (Windows)

[table]
# Books shown per page
rows_per_page = 10

# Characters of a collapsed description shown before "Show more"
description_preview_chars = 80

[behavior]
# "on_change": every tracking field change is submitted immediately
# "explicit":  changes are kept until you submit the form (w)
submit_mode = "on_change"

# Log filter used when RUST_LOG is not set (trace, debug, info, warn, error)
log_level = "info"

[display]
# Use Unicode glyphs for sort indicators; false falls back to ^ and v
use_glyphs = true

# Show row numbers next to each book
show_row_numbers = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.table.rows_per_page, 10);
        assert_eq!(config.behavior.submit_mode, SubmitMode::OnChange);
        assert!(config.display.use_glyphs);
    }

    #[test]
    fn test_commented_default_parses_to_defaults() {
        let config = Config::from_toml(&Config::create_default_with_comments()).unwrap();
        assert_eq!(config.table.rows_per_page, 10);
        assert_eq!(config.table.description_preview_chars, 80);
        assert_eq!(config.behavior.log_level, "info");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml("[behavior]\nsubmit_mode = \"explicit\"\n").unwrap();
        assert_eq!(config.behavior.submit_mode, SubmitMode::Explicit);
        assert_eq!(config.table.rows_per_page, 10);

        let options = config.controller_options();
        assert_eq!(options.submit_mode, SubmitMode::Explicit);
    }

    #[test]
    fn test_zero_rows_per_page_falls_back() {
        let config = Config::from_toml("[table]\nrows_per_page = 0\n").unwrap();
        assert_eq!(config.table.rows_per_page, 10);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.display.use_glyphs, parsed.display.use_glyphs);
    }
}
