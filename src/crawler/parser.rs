//! HTML parser turning a fetched document into page events
//!
//! The document is parsed and matched in one synchronous pass; the resulting
//! events are plain owned values, so nothing borrowed from the DOM outlives
//! this module.
//!
//! Events come out in handler order:
//! - the `<body>` inner HTML
//! - the inner HTML of the first `<title>`
//! - the `content` of every `meta[name=keywords]`
//! - the `content` of every `meta[name=description]`
//! - every `a[href]`, with its `rel` and whether it sits in a header/footer

use scraper::{ElementRef, Html, Selector};

/// Which meta tag a [`PageEvent::MetaFound`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    Description,
    Keywords,
}

/// A link observed on a page, before any filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Raw `href` attribute value
    pub href: String,

    /// Raw `rel` attribute value, if present
    pub rel: Option<String>,

    /// True when any ancestor is a `<header>` or `<footer>`
    pub in_header_footer: bool,
}

impl LinkCandidate {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: None,
            in_header_footer: false,
        }
    }
}

/// A DOM match on a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Raw inner HTML of `<body>`
    BodyFound(String),

    /// Raw inner HTML of `<title>`
    TitleFound(String),

    /// `content` attribute of a named meta tag; empty if missing
    MetaFound { kind: MetaKind, content: String },

    LinkFound(LinkCandidate),
}

/// Compiled selectors for every event the parser produces
struct Selectors {
    body: Selector,
    title: Selector,
    keywords: Selector,
    description: Selector,
    link: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            body: Selector::parse("body").expect("body selector"),
            title: Selector::parse("title").expect("title selector"),
            keywords: Selector::parse("meta[name=keywords]").expect("keywords selector"),
            description: Selector::parse("meta[name=description]")
                .expect("description selector"),
            link: Selector::parse("a[href]").expect("link selector"),
        }
    }
}

/// Parses an HTML document and returns its page events in handler order
///
/// # Arguments
///
/// * `html` - The HTML document
///
/// # Returns
///
/// Every event matched on the document; an empty document still yields a
/// `BodyFound` with an empty string.
///
/// # Example
///
/// ```
/// use feedcast_crawler::crawler::{parse_page, PageEvent};
///
/// let events = parse_page("<html><head><title>Test</title></head><body>Hi</body></html>");
/// assert!(events.contains(&PageEvent::TitleFound("Test".to_string())));
/// ```
pub fn parse_page(html: &str) -> Vec<PageEvent> {
    let selectors = Selectors::new();
    let document = Html::parse_document(html);
    let mut events = Vec::new();

    for body in document.select(&selectors.body) {
        events.push(PageEvent::BodyFound(body.inner_html()));
    }

    if let Some(title) = document.select(&selectors.title).next() {
        events.push(PageEvent::TitleFound(title.inner_html()));
    }

    for (selector, kind) in [
        (&selectors.keywords, MetaKind::Keywords),
        (&selectors.description, MetaKind::Description),
    ] {
        for meta in document.select(selector) {
            events.push(PageEvent::MetaFound {
                kind,
                content: meta.value().attr("content").unwrap_or("").to_string(),
            });
        }
    }

    for anchor in document.select(&selectors.link) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        events.push(PageEvent::LinkFound(LinkCandidate {
            href: href.to_string(),
            rel: anchor.value().attr("rel").map(str::to_string),
            in_header_footer: in_header_footer(anchor),
        }));
    }

    events
}

fn in_header_footer(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| matches!(ancestor.value().name(), "header" | "footer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(events: &[PageEvent]) -> Vec<&LinkCandidate> {
        events
            .iter()
            .filter_map(|event| match event {
                PageEvent::LinkFound(link) => Some(link),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        let events = parse_page(html);
        assert!(events.contains(&PageEvent::TitleFound("Test Page".to_string())));
    }

    #[test]
    fn test_only_first_title() {
        let html = r#"<html><head><title>First</title></head><body><svg><title>Icon</title></svg></body></html>"#;
        let titles: Vec<_> = parse_page(html)
            .into_iter()
            .filter(|event| matches!(event, PageEvent::TitleFound(_)))
            .collect();
        assert_eq!(titles, vec![PageEvent::TitleFound("First".to_string())]);
    }

    #[test]
    fn test_title_is_raw_inner_html() {
        let html = r#"<html><head><title>Fish &amp; Chips</title></head><body></body></html>"#;
        let events = parse_page(html);
        assert!(events.contains(&PageEvent::TitleFound("Fish &amp; Chips".to_string())));
    }

    #[test]
    fn test_no_title() {
        let events = parse_page(r#"<html><head></head><body></body></html>"#);
        assert!(!events
            .iter()
            .any(|event| matches!(event, PageEvent::TitleFound(_))));
    }

    #[test]
    fn test_meta_tags() {
        let html = r#"<html><head>
            <meta name="description" content="A page">
            <meta name="keywords" content="a, b">
            <meta name="author" content="me">
        </head><body></body></html>"#;
        let events = parse_page(html);

        assert!(events.contains(&PageEvent::MetaFound {
            kind: MetaKind::Description,
            content: "A page".to_string()
        }));
        assert!(events.contains(&PageEvent::MetaFound {
            kind: MetaKind::Keywords,
            content: "a, b".to_string()
        }));
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, PageEvent::MetaFound { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_meta_without_content_is_empty() {
        let html = r#"<html><head><meta name="keywords"></head><body></body></html>"#;
        assert!(parse_page(html).contains(&PageEvent::MetaFound {
            kind: MetaKind::Keywords,
            content: String::new()
        }));
    }

    #[test]
    fn test_body_inner_html() {
        let html = r#"<html><body><p>Hello</p></body></html>"#;
        assert_eq!(
            parse_page(html)[0],
            PageEvent::BodyFound("<p>Hello</p>".to_string())
        );
    }

    #[test]
    fn test_empty_document_has_empty_body() {
        assert_eq!(parse_page(""), vec![PageEvent::BodyFound(String::new())]);
    }

    #[test]
    fn test_body_comes_first_and_links_last() {
        let html = r#"<html><head><title>T</title></head><body><a href="/x">x</a></body></html>"#;
        let events = parse_page(html);

        assert!(matches!(events.first(), Some(PageEvent::BodyFound(_))));
        assert!(matches!(events.last(), Some(PageEvent::LinkFound(_))));
    }

    #[test]
    fn test_links_keep_raw_href_and_rel() {
        let html = r#"<html><body>
            <a href="/page?q=1#top" rel="nofollow">One</a>
            <a href="https://other.com/">Two</a>
            <a name="anchor">No href</a>
        </body></html>"#;
        let events = parse_page(html);
        let found = links(&events);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].href, "/page?q=1#top");
        assert_eq!(found[0].rel.as_deref(), Some("nofollow"));
        assert_eq!(found[1].href, "https://other.com/");
        assert_eq!(found[1].rel, None);
    }

    #[test]
    fn test_header_footer_links_flagged() {
        let html = r#"<html><body>
            <header><nav><a href="/home">Home</a></nav></header>
            <main><a href="/article">Article</a></main>
            <footer><a href="/legal">Legal</a></footer>
        </body></html>"#;
        let events = parse_page(html);
        let found = links(&events);

        assert_eq!(found.len(), 3);
        assert!(found[0].in_header_footer);
        assert!(!found[1].in_header_footer);
        assert!(found[2].in_header_footer);
    }
}
