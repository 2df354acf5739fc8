use chrono::{DateTime, NaiveDate};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::data::row::ColumnKind;

/// Parse a published date as Google Books reports it ("2001", "2001-07",
/// "2001-07-15") plus a couple of long forms. `None` for anything else.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(&format!("{text}-01-01"), "%Y-%m-%d").ok();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%B %d, %Y") {
        return Some(date);
    }
    NaiveDate::parse_from_str(text, "%b %d, %Y").ok()
}

/// Parse a numeric cell; blank or malformed text counts as zero
pub fn parse_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .unwrap_or(0.0)
}

/// Primary collation key: decomposed, accents stripped, lowercased.
/// "Émile" and "emile" share a key.
pub fn collation_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Accent- and case-folded comparison with the raw text as tie-breaker, so
/// "Émile", "emile" and "Emile" sit together and the order stays total.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        // Unaccented before accented, then lowercase before uppercase
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Compare two cells of a column for the given direction.
///
/// Unparsable dates sort after every valid date in both directions.
pub fn compare_cells(kind: ColumnKind, a: &str, b: &str, ascending: bool) -> Ordering {
    let directed = |ord: Ordering| if ascending { ord } else { ord.reverse() };

    match kind {
        ColumnKind::Date => match (parse_date(a), parse_date(b)) {
            (Some(a), Some(b)) => directed(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        ColumnKind::Numeric => directed(
            parse_number(a)
                .partial_cmp(&parse_number(b))
                .unwrap_or(Ordering::Equal),
        ),
        ColumnKind::Text => directed(compare_text(a, b)),
    }
}
