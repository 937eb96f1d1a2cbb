//! Text fields recovered from structured data and script-embedded JSON.
//!
//! Both sources are speculative. Every parse is "try, and on any failure
//! skip this source": a malformed block never fails the extraction, it just
//! contributes nothing. This is lossy on purpose.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

use super::normalize::clean_whitespace;

/// Descriptive fields read from JSON-LD blocks, in preference order.
pub const JSON_LD_KEYS: &[&str] = &["headline", "name", "description", "abstract", "articleBody", "text"];

/// Content-like keys searched for in script-embedded JSON.
pub const EMBEDDED_KEYS: &[&str] = &["articleBody", "body", "content", "text", "description", "summary", "excerpt"];

/// Minimum length of a string value taken from embedded JSON.
pub const EMBEDDED_MIN_CHARS: usize = 50;

/// JSON nesting walked before giving up.
const MAX_DEPTH: usize = 8;

/// `window.__STATE__ = {...};` style assignments.
static ASSIGNED_OBJECT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)=\s*(\{.*\})\s*;?").ok());

/// String fields of every JSON-LD block in the document.
pub fn json_ld_fragments(doc: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for script in doc.select(&selector) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => collect_json_ld(&value, 0, &mut out),
            Err(e) => tracing::debug!(error = %e, "skipping malformed JSON-LD block"),
        }
    }
    out
}

fn collect_json_ld(value: &Value, depth: usize, out: &mut Vec<String>) {
    if depth > MAX_DEPTH {
        return;
    }

    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_json_ld(v, depth + 1, out)),
        Value::Object(map) => {
            for key in JSON_LD_KEYS {
                if let Some(Value::String(s)) = map.get(*key) {
                    let cleaned = clean_whitespace(s);
                    if !cleaned.is_empty() {
                        out.push(cleaned);
                    }
                }
            }
            for key in ["@graph", "mainEntity", "itemListElement"] {
                if let Some(nested) = map.get(key) {
                    collect_json_ld(nested, depth + 1, out);
                }
            }
        }
        _ => {}
    }
}

/// Raw bodies of inline scripts that are not JSON-LD.
///
/// Taken before scripts are stripped from the tree.
pub fn inline_scripts(doc: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("script:not([src])") else {
        return Vec::new();
    };

    doc.select(&selector)
        .filter(|s| s.value().attr("type") != Some("application/ld+json"))
        .map(|s| s.text().collect::<String>())
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Content-like strings from JSON embedded in script bodies.
///
/// A script body is parsed as JSON directly, or else the object literal on
/// the right of its first assignment is tried. Scripts that do not parse
/// are skipped.
pub fn embedded_json_fragments<S: AsRef<str>>(scripts: &[S]) -> Vec<String> {
    let mut out = Vec::new();

    for script in scripts {
        let script = script.as_ref().trim();
        let Some(value) = parse_script_json(script) else {
            continue;
        };
        collect_embedded(&value, 0, &mut out);
    }
    out
}

fn parse_script_json(script: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(script) {
        return Some(value);
    }

    let regex = ASSIGNED_OBJECT.as_ref()?;
    let literal = regex.captures(script)?.get(1)?.as_str();
    serde_json::from_str::<Value>(literal).ok()
}

fn collect_embedded(value: &Value, depth: usize, out: &mut Vec<String>) {
    if depth > MAX_DEPTH {
        return;
    }

    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_embedded(v, depth + 1, out)),
        Value::Object(map) => {
            for (key, nested) in map {
                match nested {
                    Value::String(s) if EMBEDDED_KEYS.contains(&key.as_str()) => {
                        if let Some(text) = content_like(s) {
                            out.push(text);
                        }
                    }
                    Value::Array(_) | Value::Object(_) => collect_embedded(nested, depth + 1, out),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// Long enough prose that is neither markup nor a link.
fn content_like(s: &str) -> Option<String> {
    let cleaned = clean_whitespace(s);
    let usable = cleaned.chars().count() >= EMBEDDED_MIN_CHARS && !cleaned.contains('<') && !cleaned.starts_with("http");
    usable.then_some(cleaned)
}
