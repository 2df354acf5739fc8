use anyhow::{bail, Context, Result};
use crossterm::style::Stylize;

use shelf_view::config::config::Config;
use shelf_view::data::row::BookColumn;
use shelf_view::paginator::PageRequest;
use shelf_view::table_display::render_page;
use shelf_view::{logging, Page, TableController, TableEvent};

fn print_help() {
    println!("{}", "shelf-view - browse your book library".bold());
    println!();
    println!("Usage:");
    println!("  shelf-view <books.csv | books.json | results-dir> [options]");
    println!();
    println!("Options:");
    println!("  {}        - Print one page instead of starting the TUI", "--print".green());
    println!("  {} Q     - Filter books before printing", "--search".green());
    println!("  {} COL     - Sort by column (append :desc for descending)", "--sort".green());
    println!("  {} N       - Page to print", "--page".green());
    println!("  {}  - Write a commented default config", "--init-config".green());
    println!("  {}         - Show this help", "--help".green());
    println!();
    println!("TUI keys:");
    println!("  /  search   c  clear   ←/→ pick header   s  sort");
    println!("  n/p next/previous page   1-9 jump to page");
    println!("  ↑/↓ select   Enter description   t  cycle status   w  submit");
    println!("  F12 log   q  quit");
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .map(String::as_str)
}

/// Parse `title`, `rating:desc` and the like into sort requests
fn sort_requests(sort_arg: &str) -> Result<Vec<TableEvent>> {
    let (name, direction) = sort_arg.split_once(':').unwrap_or((sort_arg, "asc"));
    let Some(column) = BookColumn::from_name(name) else {
        bail!("Unknown sort column: {}", name);
    };
    let clicks = match direction.to_lowercase().as_str() {
        "asc" => 1,
        "desc" => 2,
        other => bail!("Unknown sort direction: {}", other),
    };
    Ok(vec![TableEvent::SortRequested(column); clicks])
}

fn write_default_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {:?}", parent))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {:?}", path))?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

fn print_page(page: Page, config: &Config, args: &[String]) -> Result<()> {
    let mut controller: TableController =
        TableController::with_submitter(page, config.controller_options(), Default::default());

    let mut events = Vec::new();
    if let Some(query) = flag_value(args, "--search") {
        events.push(TableEvent::SearchChanged(query.to_string()));
    }
    if let Some(sort_arg) = flag_value(args, "--sort") {
        events.extend(sort_requests(sort_arg)?);
    }
    if let Some(number) = flag_value(args, "--page") {
        let number: usize = number
            .parse()
            .with_context(|| format!("Invalid page number: {}", number))?;
        events.push(TableEvent::PageRequested(PageRequest::Number(number)));
    }

    for event in events {
        controller.handle(event)?;
    }

    println!("{}", render_page(&controller, config));
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--init-config") {
        if let Err(e) = write_default_config() {
            eprintln!("{}", format!("Error: {:#}", e).red());
            std::process::exit(1);
        }
        return Ok(());
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Warning: using default config ({:#})", e).yellow());
            Config::default()
        }
    };

    let log_buffer = match logging::init_tracing(&config.behavior.log_level) {
        Ok(buffer) => Some(buffer),
        Err(e) => {
            eprintln!("{}", format!("Warning: logging disabled ({:#})", e).yellow());
            None
        }
    };

    // Values of flags that take an argument are not data paths
    let valued_flags = ["--search", "--sort", "--page"];
    let data_path = args
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(i, arg)| {
            !arg.starts_with("--") && !valued_flags.contains(&args[i - 1].as_str())
        })
        .map(|(_, arg)| arg.clone())
        .next();

    let Some(data_path) = data_path else {
        print_help();
        std::process::exit(1);
    };

    let page = match Page::from_path(&data_path) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            std::process::exit(1);
        }
    };

    let result = if args.iter().any(|a| a == "--print") {
        print_page(page, &config, &args)
    } else {
        shelf_view::ui::tui_app::run_tui_app(page, config, log_buffer)
    };

    if let Err(e) = result {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_requests() {
        assert_eq!(sort_requests("rating").unwrap().len(), 1);
        assert_eq!(
            sort_requests("page_count:desc").unwrap(),
            vec![TableEvent::SortRequested(BookColumn::PageCount); 2]
        );
        assert!(sort_requests("isbn").is_err());
        assert!(sort_requests("title:sideways").is_err());
    }

    #[test]
    fn test_flag_value() {
        let args: Vec<String> = ["shelf-view", "books.csv", "--search", "tolkien"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(flag_value(&args, "--search"), Some("tolkien"));
        assert_eq!(flag_value(&args, "--page"), None);
    }
}
