//! DOM helpers shared by the rendered and static extractors.

use scraper::{ElementRef, Html, Selector};

use super::normalize::{UNTITLED, clean_whitespace};

/// Likely main-content regions, most specific first.
pub const PRIORITY_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#main-content",
    "#content",
    ".main-content",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".article-body",
    ".story-body",
    ".content",
    "#main",
];

/// Case-insensitive substrings that mark navigation, legal or placeholder text.
pub const BOILERPLATE_KEYWORDS: &[&str] = &[
    "cookie",
    "privacy policy",
    "terms of service",
    "terms of use",
    "all rights reserved",
    "loading...",
    "please enable javascript",
    "sign in",
    "log in",
    "subscribe to our newsletter",
    "accept all",
    "skip to content",
];

/// Elements that never carry page content.
pub const NON_CONTENT: &str = "script, style, noscript, template, svg";

/// Layout regions dropped before scanning.
pub const LAYOUT_CHROME: &str = "nav, header, footer, aside, form";

/// Tags whose full text is one fragment.
const TEXT_BLOCKS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote", "pre", "td", "dd", "figcaption",
];

/// Generic containers; their text minus nested blocks is one fragment.
const CONTAINERS: &[&str] = &["div", "section", "article"];

/// Other elements that start a new line of visible text.
const LINE_BREAKING: &[&str] = &[
    "main", "ul", "ol", "dl", "dt", "table", "thead", "tbody", "tfoot", "tr", "th", "figure", "header", "footer",
    "nav", "aside", "form", "address", "details", "summary", "hr",
];

fn is_emitted_block(name: &str) -> bool {
    TEXT_BLOCKS.contains(&name) || CONTAINERS.contains(&name)
}

fn is_line_breaking(name: &str) -> bool {
    is_emitted_block(name) || LINE_BREAKING.contains(&name)
}

pub fn is_boilerplate(text: &str) -> bool {
    let lower = text.to_lowercase();
    BOILERPLATE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Detach every element matching `css` from the tree.
pub fn strip_elements(doc: &mut Html, css: &str) -> usize {
    let Ok(selector) = Selector::parse(css) else {
        return 0;
    };

    let ids: Vec<_> = doc.select(&selector).map(|el| el.id()).collect();
    for id in &ids {
        if let Some(mut node) = doc.tree.get_mut(*id) {
            node.detach();
        }
    }
    ids.len()
}

/// Append the visible text under `el` to `out`.
///
/// Inline elements flow into the surrounding text. Line-breaking elements
/// and `<br>` are bracketed by newlines. With `skip_emitted`, headings,
/// text blocks and nested containers contribute only a separator.
fn push_flow(el: &ElementRef<'_>, out: &mut String, skip_emitted: bool) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if name == "br" {
            out.push('\n');
        } else if skip_emitted && is_emitted_block(name) {
            out.push('\n');
        } else if is_line_breaking(name) {
            out.push('\n');
            push_flow(&child, out, skip_emitted);
            out.push('\n');
        } else {
            push_flow(&child, out, skip_emitted);
        }
    }
}

/// Whitespace-normalized text of an element and its descendants.
pub fn element_text(el: &ElementRef<'_>) -> String {
    let mut flow = String::new();
    push_flow(el, &mut flow, false);
    clean_whitespace(&flow)
}

/// Text of a container without the headings, text blocks and containers
/// nested in it, which the block scan emits on their own.
pub fn container_text(el: &ElementRef<'_>) -> String {
    let mut flow = String::new();
    push_flow(el, &mut flow, true);
    clean_whitespace(&flow)
}

/// Visible text under `el` as cleaned, non-empty lines.
///
/// Text split across inline tags stays on one line.
pub fn visible_lines(el: &ElementRef<'_>) -> Vec<String> {
    let mut flow = String::new();
    push_flow(el, &mut flow, false);
    flow.lines()
        .map(clean_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// First `content` attribute of the elements matching `css`.
pub fn meta_content(doc: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(clean_whitespace)
        .find(|s| !s.is_empty())
}

/// Page title from `<title>`, then `og:title`, then the first `<h1>`.
pub fn page_title(doc: &Html) -> String {
    let from_tag = |css: &str| {
        let selector = Selector::parse(css).ok()?;
        doc.select(&selector)
            .map(|el| element_text(&el))
            .find(|t| !t.is_empty())
    };

    from_tag("title")
        .or_else(|| meta_content(doc, "meta[property='og:title']"))
        .or_else(|| from_tag("h1"))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Run the priority-selector pass.
///
/// The first selector with at least one element whose text is longer than
/// `min_chars` wins; later selectors are not consulted even if they would
/// have produced more text. A match nested inside another match of the same
/// selector is skipped, its text is already part of the outer one.
pub fn priority_pass(doc: &Html, min_chars: usize) -> Option<(&'static str, Vec<String>)> {
    for css in PRIORITY_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };

        let fragments: Vec<String> = doc
            .select(&selector)
            .filter(|el| !el.ancestors().filter_map(ElementRef::wrap).any(|a| selector.matches(&a)))
            .map(|el| element_text(&el))
            .filter(|t| t.chars().count() > min_chars)
            .collect();

        if !fragments.is_empty() {
            return Some((*css, fragments));
        }
    }
    None
}

/// Headings, then text blocks, then container text, in document order
/// within each group.
///
/// Text blocks nested inside another text block are skipped since the
/// outer block already carries their text.
pub fn block_fragments(doc: &Html, min_chars: usize) -> Vec<String> {
    let Ok(headings) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };
    let Ok(blocks) = Selector::parse("p, li, blockquote, pre, td, dd, figcaption") else {
        return Vec::new();
    };
    let Ok(containers) = Selector::parse(&CONTAINERS.join(", ")) else {
        return Vec::new();
    };

    let long_enough = |t: &String| t.chars().count() >= min_chars;

    let mut out: Vec<String> = doc
        .select(&headings)
        .map(|el| element_text(&el))
        .filter(long_enough)
        .collect();

    out.extend(
        doc.select(&blocks)
            .filter(|el| !inside_text_block(el))
            .map(|el| element_text(&el))
            .filter(long_enough),
    );

    out.extend(doc.select(&containers).map(|el| container_text(&el)).filter(long_enough));

    out
}

fn inside_text_block(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| TEXT_BLOCKS.contains(&a.value().name()))
}
