//! Text harvesting from browser-rendered markup.

use scraper::Html;

use pagechat_core::Error;

use super::dom::{LAYOUT_CHROME, NON_CONTENT, block_fragments, page_title, priority_pass, strip_elements};
use super::{ExtractConfig, FragmentSet, PageText};

/// Harvest visible text from fully rendered HTML.
///
/// Non-content and layout elements are stripped, then the priority-selector
/// pass runs with the dynamic threshold. Only if no selector yields enough
/// text does the broad heading/paragraph/container scan run.
/// `browser_title` takes precedence over the document's own title.
pub fn extract_rendered(html: &str, browser_title: Option<&str>, config: &ExtractConfig) -> Result<PageText, Error> {
    let mut doc = Html::parse_document(html);

    let title = browser_title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| page_title(&doc));

    strip_elements(&mut doc, NON_CONTENT);
    strip_elements(&mut doc, LAYOUT_CHROME);

    let mut fragments = FragmentSet::new(config.dedup_prefix_chars);

    match priority_pass(&doc, config.dynamic_selector_min) {
        Some((selector, found)) => {
            let added = fragments.extend(&found);
            tracing::debug!(selector, fragments = added, "rendered priority selector matched");
        }
        None => {
            let added = fragments.extend(block_fragments(&doc, config.fragment_min));
            tracing::debug!(fragments = added, "rendered broad scan");
        }
    }

    PageText::finish(&title, &fragments, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractConfig {
        ExtractConfig::default()
    }

    #[test]
    fn test_rendered_priority_selector() {
        let body = "Rendered article body with plenty of text to pass every threshold. ".repeat(5);
        let html = format!(
            "<html><head><title>Doc Title</title></head><body>\
             <nav>Home About Contact and a lot of other navigation words</nav>\
             <article>{body}</article>\
             <footer>Footer text that should never show up in the output at all</footer>\
             </body></html>"
        );

        let page = extract_rendered(&html, None, &config()).unwrap();
        assert!(page.text.starts_with("Title: Doc Title\nRendered article body"));
        assert!(!page.text.contains("navigation words"));
        assert!(!page.text.contains("Footer text"));
        assert_eq!(page.title, "Doc Title");
    }

    #[test]
    fn test_rendered_browser_title_wins() {
        let body = "x ".repeat(300);
        let html = format!("<html><head><title>Old</title></head><body><main>{body}</main></body></html>");
        let page = extract_rendered(&html, Some(" New Title "), &config()).unwrap();
        assert!(page.text.starts_with("Title: New Title\n"));
    }

    #[test]
    fn test_rendered_broad_scan_fallback() {
        let paragraph = "A paragraph rendered by client-side script with meaningful words.";
        let html = format!(
            "<html><body><div id=\"app\"><h2>Section heading here</h2>\
             <p>{paragraph}</p><p>{paragraph} Second.</p><p>{paragraph} Third.</p>\
             <p>{paragraph}</p><p>tiny</p></div></body></html>"
        );

        let page = extract_rendered(&html, None, &config()).unwrap();
        assert!(page.text.contains("Section heading here"));
        assert_eq!(page.text.matches(paragraph).count(), 3);
        assert!(!page.text.contains("tiny"));
    }

    #[test]
    fn test_rendered_strips_scripts() {
        let body = "Visible content that is long enough to count as real content. ".repeat(4);
        let html = format!(
            "<html><body><main>{body}<script>window.secret = 'hidden script text';</script>\
             <style>.x {{ color: red }}</style></main></body></html>"
        );
        let page = extract_rendered(&html, None, &config()).unwrap();
        assert!(!page.text.contains("hidden script text"));
        assert!(!page.text.contains("color: red"));
    }

    #[test]
    fn test_rendered_insufficient_content() {
        let html = "<html><body><div id=\"root\"><p>Please wait</p></div></body></html>";
        let result = extract_rendered(html, None, &config());
        assert!(matches!(result, Err(Error::InsufficientContent(_))));
    }

    #[test]
    fn test_rendered_clamped() {
        let body = "Long rendered sentence that repeats many times over. ".repeat(1_000);
        let html = format!("<html><body><article>{body}</article></body></html>");
        let page = extract_rendered(&html, None, &config()).unwrap();
        assert_eq!(page.text.chars().count(), 20_000);
    }

    #[test]
    fn test_rendered_inline_markup_in_divs() {
        let html = "<html><head><title>Rust</title></head><body>\
             <div>Rust is a language empowering <a href=\"/\">everyone</a> to build <b>reliable</b> and efficient software today.</div>\
             <div>The ownership model guarantees <em>memory safety</em> and <em>thread safety</em> at compile time.</div>\
             <div>Cargo is the <code>package manager</code> and build system that ships with every install.</div>\
             </body></html>";

        let page = extract_rendered(html, None, &config()).unwrap();
        assert!(page.text.contains("Rust is a language empowering everyone to build reliable and efficient software today."));
        assert!(page.text.contains("Cargo is the package manager and build system"));
    }

    #[test]
    fn test_rendered_nested_articles_once() {
        let inner = "Story text rendered inside a nested article element that must not be repeated. ".repeat(3);
        let html = format!(
            "<html><head><title>Nested</title></head><body><article><h2>Section heading</h2>\
             <article><p>{inner}</p></article></article></body></html>"
        );

        let page = extract_rendered(&html, None, &config()).unwrap();
        assert_eq!(page.text.matches("must not be repeated").count(), 3);
        assert_eq!(page.text.lines().count(), 2);
    }
}
