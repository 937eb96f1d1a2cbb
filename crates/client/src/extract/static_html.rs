//! Heuristic text harvesting from unrendered HTML.

use scraper::{Html, Selector};

use pagechat_core::Error;

use super::dom::{
    LAYOUT_CHROME, NON_CONTENT, block_fragments, is_boilerplate, meta_content, page_title, priority_pass,
    strip_elements, visible_lines,
};
use super::embedded::{embedded_json_fragments, inline_scripts, json_ld_fragments};
use super::normalize::clean_whitespace;
use super::{ExtractConfig, FragmentSet, PageText};

/// Description meta tags, read in order.
const META_DESCRIPTIONS: &[&str] = &[
    "meta[name='description']",
    "meta[property='og:description']",
    "meta[name='twitter:description']",
];

/// Attributes that sometimes carry the real text of script-driven widgets.
const CONTENT_ATTRIBUTES: &[&str] = &["data-content", "data-text", "data-description", "data-title", "aria-label"];

/// Accumulates fragments across strategies.
struct Harvest<'a> {
    config: &'a ExtractConfig,
    fragments: FragmentSet,
}

impl<'a> Harvest<'a> {
    fn new(config: &'a ExtractConfig) -> Self {
        Self { config, fragments: FragmentSet::new(config.dedup_prefix_chars) }
    }

    fn satisfied(&self) -> bool {
        self.fragments.body_chars() >= self.config.min_content_chars
    }

    fn take<I, S>(&mut self, strategy: &'static str, fragments: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added = self.fragments.extend(fragments);
        tracing::debug!(strategy, added, body_chars = self.fragments.body_chars(), "static strategy ran");
    }

    /// Keep fragments that are not boilerplate and not already present
    /// inside an accepted fragment.
    fn novel(&self, candidates: Vec<String>, min_chars: usize) -> Vec<String> {
        candidates
            .into_iter()
            .filter(|f| f.chars().count() >= min_chars)
            .filter(|f| !is_boilerplate(f) && !self.fragments.covers(f))
            .collect()
    }
}

/// Harvest text from HTML fetched without running scripts.
///
/// Strategies run in a fixed order and accumulate into one deduplicated
/// fragment set. Each strategy after the first only runs while the body is
/// still below `min_content_chars`.
pub fn extract_static(html: &str, config: &ExtractConfig) -> Result<PageText, Error> {
    let mut doc = Html::parse_document(html);
    let title = page_title(&doc);
    let scripts = inline_scripts(&doc);
    let mut harvest = Harvest::new(config);

    harvest.take("json_ld", json_ld_fragments(&doc));

    if !harvest.satisfied() {
        let descriptions: Vec<String> = META_DESCRIPTIONS.iter().filter_map(|css| meta_content(&doc, css)).collect();
        harvest.take("meta", descriptions);
    }

    strip_elements(&mut doc, NON_CONTENT);

    if !harvest.satisfied()
        && let Some((selector, found)) = priority_pass(&doc, config.static_selector_min)
    {
        tracing::debug!(selector, "static priority selector matched");
        harvest.take("priority_selectors", found);
    }

    if !harvest.satisfied() {
        strip_elements(&mut doc, LAYOUT_CHROME);
        strip_elements(&mut doc, "button");
        let blocks = harvest.novel(block_fragments(&doc, config.fragment_min), config.fragment_min);
        harvest.take("text_blocks", blocks);
    }

    if !harvest.satisfied() {
        let embedded = harvest.novel(embedded_json_fragments(&scripts), 0);
        harvest.take("embedded_json", embedded);
    }

    if !harvest.satisfied() {
        let attributes = harvest.novel(attribute_fragments(&doc), config.fragment_min);
        harvest.take("attributes", attributes);
    }

    if !harvest.satisfied() {
        let lines = harvest
            .novel(text_lines(&doc), config.line_min)
            .into_iter()
            .take(config.max_fallback_lines);
        harvest.take("text_lines", lines);
    }

    PageText::finish(&title, &harvest.fragments, config)
}

fn attribute_fragments(doc: &Html) -> Vec<String> {
    let mut out = Vec::new();
    for attr in CONTENT_ATTRIBUTES {
        let Ok(selector) = Selector::parse(&format!("[{attr}]")) else {
            continue;
        };
        out.extend(
            doc.select(&selector)
                .filter_map(|el| el.value().attr(attr))
                .map(clean_whitespace)
                .filter(|s| !s.is_empty()),
        );
    }
    out
}

/// Remaining visible body text split into cleaned lines.
fn text_lines(doc: &Html) -> Vec<String> {
    let Ok(body) = Selector::parse("body") else {
        return Vec::new();
    };
    doc.select(&body).next().map(|body| visible_lines(&body)).unwrap_or_default()
}
