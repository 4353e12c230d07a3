//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Longest excerpt shown in list cards, in characters.
const EXCERPT_CHARS: usize = 160;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Shortens body text for list cards, cutting on a word boundary.
///
/// Usage in templates: `{{ announcement.content|excerpt }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn excerpt(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(excerpt_text(&value.to_string(), EXCERPT_CHARS))
}

fn excerpt_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let cut = cut
        .rfind(char::is_whitespace)
        .map_or(cut.as_str(), |idx| cut.get(..idx).unwrap_or(&cut))
        .trim_end();
    format!("{cut}…")
}
