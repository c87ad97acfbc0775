//! Text helpers shared by the listing and detail parsers.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Elements whose text never renders.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses a selector that is known at compile time.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

/// Trimmed text fragments of an element joined by single spaces.
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Raw text nodes in document order, skipping script and style bodies.
pub fn visible_text_nodes(document: &Html) -> impl Iterator<Item = &str> {
    document.root_element().descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| HIDDEN_TAGS.contains(&e.name()))
        });
        if hidden {
            None
        } else {
            Some(&**text)
        }
    })
}

/// Concatenated visible text. Line breaks are kept so line-oriented patterns still work.
pub fn visible_text(document: &Html) -> String {
    visible_text_nodes(document).collect()
}

/// Raw body of an inline script.
pub fn script_text(element: &ElementRef) -> String {
    element.text().collect()
}

pub fn class_matches(element: &ElementRef, pattern: &Regex) -> bool {
    element.value().classes().any(|class| pattern.is_match(class))
}

pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

pub fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Deduplicated, sorted join. Same input always renders the same bytes.
pub fn join_sorted<I, S>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(separator)
}

/// Resolves `href` against `base`; `None` for unparseable links.
pub fn absolutize(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_skips_scripts() {
        let html = Html::parse_document(
            "<html><head><script>var secret = 1;</script><style>p{}</style></head>\
             <body><p>Hello</p>\n<p>World</p></body></html>",
        );
        let text = visible_text(&html);
        assert!(text.contains("Hello"));
        assert!(text.contains("World"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("p{}"));
    }

    #[test]
    fn test_element_text_collapses_fragments() {
        let html = Html::parse_fragment("<p>  <i></i> Xətai r.,  <b>Bakı</b> </p>");
        let p = html.select(&selector("p")).next().unwrap();
        assert_eq!(element_text(&p), "Xətai r., Bakı");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("şəkil", 3), "şək");
    }

    #[test]
    fn test_join_sorted_dedups() {
        assert_eq!(join_sorted(["b", "a", "b"], ", "), "a, b");
    }
}
