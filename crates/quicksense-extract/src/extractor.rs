//! Readable-text extraction from an HTML document.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use tracing::debug;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Tags whose text never counts as page text.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Landmark tags dropped in the body fallback.
const LANDMARK_TAGS: &[&str] = &["nav", "header", "footer", "aside"];

/// ARIA roles dropped in the body fallback.
const LANDMARK_ROLES: &[&str] = &["navigation", "banner", "contentinfo"];

/// Extract plain text from raw HTML.
pub fn extract(html: &str) -> String {
    let document = Html::parse_document(html);
    extract_document(&document)
}

/// Extract plain text from a parsed document.
pub fn extract_document(document: &Html) -> String {
    let mut raw = String::new();

    if let Some(article) = first_element(document, "article") {
        debug!("Extracting from <article>");
        collect_text(article, &mut raw, false);
    } else if let Some(main) = first_element(document, "main") {
        debug!("Extracting from <main>");
        collect_text(main, &mut raw, false);
    } else if let Some(body) = first_element(document, "body") {
        debug!("Extracting from <body> without landmarks");
        collect_text(body, &mut raw, true);
    }

    collapse_whitespace(&raw)
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

fn first_element<'a>(document: &'a Html, name: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name)
}

fn is_landmark(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    if LANDMARK_TAGS.contains(&value.name()) {
        return true;
    }
    value
        .attr("role")
        .map(|role| LANDMARK_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Append the text under `el` to `out`.
///
/// With `skip_landmarks`, landmark subtrees are pruned and element boundaries
/// are separated by newlines.
fn collect_text(el: ElementRef<'_>, out: &mut String, skip_landmarks: bool) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if NON_CONTENT_TAGS.contains(&element.name()) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if skip_landmarks {
                    if is_landmark(&child_el) {
                        continue;
                    }
                    out.push('\n');
                }
                collect_text(child_el, out, skip_landmarks);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_normalized(text: &str) {
        assert_eq!(text, text.trim());
        let mut prev_ws = false;
        for c in text.chars() {
            let ws = c.is_whitespace();
            assert!(!(ws && prev_ws), "consecutive whitespace in {:?}", text);
            prev_ws = ws;
        }
    }

    #[test]
    fn test_prefers_article() {
        let html = "<html><body><nav>Menu</nav><main>Main text</main>\
                    <article><h1>Title</h1><p>Body   of\n the article</p></article></body></html>";
        assert_eq!(extract(html), "TitleBody of the article");
    }

    #[test]
    fn test_first_article_wins() {
        let html = "<body><article>First</article><article>Second</article></body>";
        assert_eq!(extract(html), "First");
    }

    #[test]
    fn test_falls_back_to_main() {
        let html = "<body><header>Site</header><main><p>Main content</p></main></body>";
        assert_eq!(extract(html), "Main content");
    }

    #[test]
    fn test_body_fallback_skips_landmarks() {
        let html = r#"<body>
            <header>Logo</header>
            <nav><a href="/">Home</a></nav>
            <div role="navigation">Breadcrumbs</div>
            <div role="banner">Banner</div>
            <div><p>Paragraph one.</p><p>Paragraph two.</p></div>
            <aside>Related</aside>
            <div role="contentinfo">Copyright</div>
            <footer>Footer</footer>
        </body>"#;
        let text = extract(html);
        assert_eq!(text, "Paragraph one. Paragraph two.");
        assert_normalized(&text);
    }

    #[test]
    fn test_body_fallback_separates_blocks() {
        let html = "<body><p>one</p><p>two</p></body>";
        assert_eq!(extract(html), "one two");
    }

    #[test]
    fn test_scripts_and_styles_ignored() {
        let html = "<body><style>.a{color:red}</style><p>Visible</p>\
                    <script>var x = 1;</script><noscript>Enable JS</noscript></body>";
        assert_eq!(extract(html), "Visible");
    }

    #[test]
    fn test_entities_decoded() {
        let html = "<article>A &amp; B &lt; C</article>";
        assert_eq!(extract(html), "A & B < C");
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(extract(""), "");
        assert_eq!(extract("<html><body>   \n\t </body></html>"), "");
        assert_eq!(extract("<body><nav>only nav</nav></body>"), "");
    }

    #[test]
    fn test_output_always_normalized() {
        let pages = [
            "<article>\n\n  spaced\t\tout \u{a0} text  </article>",
            "<main> a <b> b </b>\n c </main>",
            "<body>\n<div>\n  x\n</div>\n<div> y </div>\n</body>",
            "<body><div><span> nested </span>  <em>inline</em></div></body>",
            "plain text outside any tags   ",
        ];
        for page in pages {
            assert_normalized(&extract(page));
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b\t c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }
}
