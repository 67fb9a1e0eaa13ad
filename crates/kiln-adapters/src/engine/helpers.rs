//! Filters registered on every engine.
//!
//! All of them are pure: same input, same output. There is deliberately no
//! `now()`; dates come from the render context so output is reproducible.

use chrono::{DateTime, NaiveDate, format::Item, format::StrftimeItems};
use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase, ToUpperCamelCase,
};
use minijinja::{Environment, Error, ErrorKind};

pub fn register(env: &mut Environment<'static>) {
    env.add_filter("snake_case", |s: String| s.to_snake_case());
    env.add_filter("kebab_case", |s: String| s.to_kebab_case());
    env.add_filter("pascal_case", |s: String| s.to_upper_camel_case());
    env.add_filter("camel_case", |s: String| s.to_lower_camel_case());
    env.add_filter("screaming_snake_case", |s: String| s.to_shouty_snake_case());
    env.add_filter("title_case", |s: String| s.to_title_case());
    env.add_filter("truncate", truncate);
    env.add_filter("date", date);
}

/// Keep the first `len` characters, appending `end` only when something was
/// cut.
pub fn truncate(value: String, len: usize, end: Option<String>) -> String {
    if value.chars().count() <= len {
        return value;
    }
    let mut out: String = value.chars().take(len).collect();
    if let Some(end) = end {
        out.push_str(&end);
    }
    out
}

/// Reformat an ISO date (`2024-03-09`) or RFC 3339 timestamp with a
/// strftime pattern.
pub fn date(value: String, format: String) -> Result<String, Error> {
    let items: Vec<Item<'_>> = StrftimeItems::new(&format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format '{format}'"),
        ));
    }

    let trimmed = value.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day.format_with_items(items.into_iter()).to_string());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.format_with_items(items.into_iter()).to_string());
    }
    Err(Error::new(
        ErrorKind::InvalidOperation,
        format!("'{trimmed}' is not an ISO date"),
    ))
}
