//! Text extraction from HTML.
//!
//! ### Rendered Markup
//! - Strip non-content and layout elements
//! - Priority selectors (main, article, role=main, ...) with a 100 char floor
//! - Broad heading/paragraph/container scan when no selector matches
//!
//! ### Static Markup
//! Ordered strategies, each run only while the collected body is below the
//! content minimum:
//! 1. JSON-LD structured data
//! 2. Meta descriptions
//! 3. Priority selectors (50 char floor)
//! 4. Text blocks, boilerplate filtered
//! 5. JSON embedded in scripts
//! 6. Content-bearing attributes
//! 7. Body text lines
//!
//! ### Output
//! - `Title: <title>` line, then fragments joined by newlines
//! - Fragments deduplicated by normalized prefix
//! - Clamped to the page character limit

pub mod dom;
pub mod embedded;
pub mod fragments;
pub mod normalize;
pub mod rendered;
pub mod static_html;

pub use fragments::{DEDUP_PREFIX_CHARS, FragmentSet, dedup_fragments, dedup_key};
pub use normalize::{UNTITLED, clean_whitespace, compose_page_text};
pub use rendered::extract_rendered;
pub use static_html::extract_static;

use pagechat_core::config::MAX_PAGE_CHARS;
use pagechat_core::{AppConfig, Error};

/// Thresholds for text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Maximum characters of final page text (default: 20000)
    pub max_chars: usize,

    /// Minimum body characters for a successful extraction (default: 200)
    pub min_content_chars: usize,

    /// Priority-selector floor for rendered markup (default: 100)
    pub dynamic_selector_min: usize,

    /// Priority-selector floor for static markup (default: 50)
    pub static_selector_min: usize,

    /// Minimum length of a block fragment (default: 20)
    pub fragment_min: usize,

    /// Minimum length of a body text line (default: 30)
    pub line_min: usize,

    /// Maximum body text lines taken by the last static strategy (default: 100)
    pub max_fallback_lines: usize,

    /// Prefix length for dedup keys (default: 100)
    pub dedup_prefix_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_chars: MAX_PAGE_CHARS,
            min_content_chars: 200,
            dynamic_selector_min: 100,
            static_selector_min: 50,
            fragment_min: 20,
            line_min: 30,
            max_fallback_lines: 100,
            dedup_prefix_chars: DEDUP_PREFIX_CHARS,
        }
    }
}

impl From<&AppConfig> for ExtractConfig {
    fn from(config: &AppConfig) -> Self {
        Self { max_chars: config.max_chars, min_content_chars: config.min_content_chars, ..Default::default() }
    }
}

/// Title and composed text of an extracted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: String,
    pub text: String,
}

impl PageText {
    /// Compose the final text, or fail when the body is below the minimum.
    ///
    /// The minimum is measured on the joined fragments, not the title line.
    pub fn finish(title: &str, fragments: &FragmentSet, config: &ExtractConfig) -> Result<Self, Error> {
        let body_chars = fragments.body_chars();
        if body_chars < config.min_content_chars {
            return Err(Error::InsufficientContent(format!(
                "extracted {body_chars} characters, below the {} character minimum; \
                 content may require JavaScript or be restricted",
                config.min_content_chars
            )));
        }

        let title = clean_whitespace(title);
        let title = if title.is_empty() { UNTITLED.to_string() } else { title };
        let text = compose_page_text(&title, &fragments.join(), config.max_chars);

        Ok(Self { title, text })
    }
}
