//! Pre-computed view of an email that every content rule reads

use super::EmailDocument;
use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"<[^>]*>"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s+"));
static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<img[^>]*"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?i)<a[^>]*href=["']([^"']*)["']"#));
static ANCHOR_CLOSE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</a\s*>"));

pub(crate) fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("built-in content pattern must compile")
}

/// A hyperlink found in the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<'a> {
    /// Opening tag text up to and including the href value
    pub tag: &'a str,
    pub href: &'a str,
    /// Markup between the opening tag and the next `</a>`
    pub label: &'a str,
}

/// Everything the rules need, computed once per document
#[derive(Debug, Clone)]
pub struct ContentSnapshot<'a> {
    pub subject: &'a str,
    pub html: &'a str,
    /// Markup with tags removed and whitespace collapsed
    pub text: String,
    pub text_length: usize,
    pub image_count: usize,
    pub images_without_alt: usize,
    pub links: Vec<Link<'a>>,
    pub byte_size: usize,
}

impl<'a> ContentSnapshot<'a> {
    pub fn new(document: &'a EmailDocument) -> Self {
        let html = document.html.as_str();

        let stripped = TAG.replace_all(html, "");
        let text = WHITESPACE.replace_all(&stripped, " ").trim().to_string();
        let text_length = text.chars().count();

        let images: Vec<&str> = IMG_TAG.find_iter(html).map(|m| m.as_str()).collect();
        let images_without_alt = images
            .iter()
            .filter(|tag| !tag.to_ascii_lowercase().contains("alt="))
            .count();

        let links = LINK
            .captures_iter(html)
            .filter_map(|caps| {
                let tag = caps.get(0)?;
                let href = caps.get(1)?;
                let label = ANCHOR_CLOSE
                    .find_at(html, tag.end())
                    .map(|close| {
                        let rest = &html[tag.end()..close.start()];
                        // skip the remainder of the opening tag
                        rest.split_once('>').map(|(_, label)| label).unwrap_or(rest)
                    })
                    .unwrap_or("");
                Some(Link {
                    tag: tag.as_str(),
                    href: href.as_str(),
                    label,
                })
            })
            .collect();

        Self {
            subject: document.subject.as_str(),
            html,
            text,
            text_length,
            image_count: images.len(),
            images_without_alt,
            links,
            byte_size: html.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(html: &str) -> EmailDocument {
        EmailDocument::new("Subject", html)
    }

    #[test]
    fn test_text_extraction() {
        let document = doc("<html><body><p>Hello\n\n   <b>world</b></p></body></html>");
        let snapshot = ContentSnapshot::new(&document);
        assert_eq!(snapshot.text, "Hello world");
        assert_eq!(snapshot.text_length, 11);
    }

    #[test]
    fn test_images_and_alt() {
        let document = doc(r#"<img src="a.png" alt="A"><IMG src="b.png"><img src="c.png" ALT="">"#);
        let snapshot = ContentSnapshot::new(&document);
        assert_eq!(snapshot.image_count, 3);
        assert_eq!(snapshot.images_without_alt, 1);
    }

    #[test]
    fn test_links_with_labels() {
        let document = doc(
            r##"<a href="https://x.com/a">First</a> <a class="btn" href='#' style="x">Unsubscribe</a>"##,
        );
        let snapshot = ContentSnapshot::new(&document);
        assert_eq!(snapshot.links.len(), 2);
        assert_eq!(snapshot.links[0].href, "https://x.com/a");
        assert_eq!(snapshot.links[0].label, "First");
        assert_eq!(snapshot.links[1].href, "#");
        assert_eq!(snapshot.links[1].label, "Unsubscribe");
    }

    #[test]
    fn test_unclosed_anchor_has_empty_label() {
        let document = doc(r#"<a href="https://x.com">dangling"#);
        let snapshot = ContentSnapshot::new(&document);
        assert_eq!(snapshot.links.len(), 1);
        assert_eq!(snapshot.links[0].label, "");
    }

    #[test]
    fn test_byte_size_counts_utf8() {
        let document = doc("£");
        assert_eq!(ContentSnapshot::new(&document).byte_size, 2);
    }
}
