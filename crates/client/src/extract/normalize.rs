//! Whitespace cleanup and final page text layout.
//!
//! Every extractor ends with [`compose_page_text`], so all successful
//! results share one shape:
//!
//! ```text
//! Title: <page title>
//! <fragment 1>
//! <fragment 2>
//! ...
//! ```

/// Title used when a page has none.
pub const UNTITLED: &str = "Untitled";

/// Collapse every whitespace run to a single space and trim.
pub fn clean_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters on a char boundary.
pub fn clamp_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Lay out the title line and body, clamped to `max_chars`.
///
/// `body` is expected to be cleaned fragments joined by single newlines.
pub fn compose_page_text(title: &str, body: &str, max_chars: usize) -> String {
    let title = clean_whitespace(title);
    let title = if title.is_empty() { UNTITLED } else { title.as_str() };

    let full = format!("Title: {title}\n{}", body.trim());
    clamp_chars(&full, max_chars).trim_end().to_string()
}
