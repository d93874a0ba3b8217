//! Whitelist HTML policy
//!
//! Everything not explicitly allowed is stripped: disallowed tags disappear
//! but their text is kept, except for elements whose whole content is
//! skipped. Text is re-escaped on output so the result is still markup.

use scraper::{ElementRef, Html, Node};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Elements whose content is never worth keeping, regardless of policy
const DEFAULT_SKIP_CONTENT: &[&str] = &[
    "frameset", "iframe", "noembed", "noframes", "noscript", "script", "style", "template",
    "title",
];

/// Attributes kept on `<img>` when images are allowed
const IMAGE_ATTRIBUTES: &[&str] = &["src", "alt", "width", "height", "align"];

/// Elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "img", "hr", "wbr"];

/// A tag/attribute whitelist
#[derive(Debug, Clone)]
pub struct Policy {
    /// Allowed element name -> allowed attribute names
    allowed: HashMap<String, HashSet<String>>,
    skip_content: HashSet<String>,
}

impl Policy {
    /// A policy that allows nothing and skips the default content set
    pub fn new() -> Self {
        Self {
            allowed: HashMap::new(),
            skip_content: DEFAULT_SKIP_CONTENT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Allows `<img>` with its presentational attributes
    pub fn allow_images(mut self) -> Self {
        self.allowed.insert(
            "img".to_string(),
            IMAGE_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Allows the given elements without any attributes
    pub fn allow_elements(mut self, names: &[&str]) -> Self {
        for name in names {
            self.allowed.entry(name.to_string()).or_default();
        }
        self
    }

    /// Drops the given elements together with everything inside them
    pub fn skip_elements_content(mut self, names: &[&str]) -> Self {
        self.skip_content
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.contains_key(name)
    }

    pub fn skips_content(&self, name: &str) -> bool {
        self.skip_content.contains(name)
    }

    /// Sanitizes an HTML fragment
    pub fn sanitize(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let mut out = String::with_capacity(html.len());
        self.walk(fragment.root_element(), &mut out);
        out
    }

    fn walk(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    out.push_str(&html_escape::encode_text(&**text));
                }
                Node::Element(el) => {
                    let name = el.name();
                    if self.skips_content(name) {
                        continue;
                    }

                    let Some(child_ref) = ElementRef::wrap(child) else {
                        continue;
                    };

                    match self.allowed.get(name) {
                        Some(attributes) => self.write_element(child_ref, attributes, out),
                        None => self.walk(child_ref, out),
                    }
                }
                _ => {}
            }
        }
    }

    fn write_element(
        &self,
        element: ElementRef<'_>,
        attributes: &HashSet<String>,
        out: &mut String,
    ) {
        let name = element.value().name();

        let mut kept: Vec<(&str, &str)> = element
            .value()
            .attrs()
            .filter(|(attr, value)| attributes.contains(*attr) && is_safe_value(attr, value))
            .collect();
        kept.sort_by_key(|(attr, _)| *attr);

        // An image stripped of every attribute carries nothing
        if name == "img" && kept.is_empty() {
            return;
        }

        out.push('<');
        out.push_str(name);
        for (attr, value) in kept {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        self.walk(element, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new()
    }
}

/// Image sources must be absolute http(s) URLs
fn is_safe_value(attr: &str, value: &str) -> bool {
    if attr != "src" {
        return true;
    }

    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// The policy applied to page bodies: images and line breaks survive, and
/// the content of headers, footers, anchors, scripts and objects is dropped
pub fn body_policy() -> Policy {
    Policy::new()
        .allow_images()
        .allow_elements(&["br"])
        .skip_elements_content(&["header", "footer", "a", "script", "object"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_keeps_text() {
        let policy = Policy::new();
        assert_eq!(
            policy.sanitize("<div><p>Hello <strong>world</strong></p></div>"),
            "Hello world"
        );
    }

    #[test]
    fn test_skips_default_content() {
        let policy = Policy::new();
        let html = "<p>Keep</p><script>alert(1)</script><style>p{}</style>";
        assert_eq!(policy.sanitize(html), "Keep");
    }

    #[test]
    fn test_body_policy_skips_regions() {
        let html = r#"<header>Site nav</header><main>Article <a href="/x">link text</a>body</main><footer>Copyright</footer><object>flash</object>"#;
        assert_eq!(body_policy().sanitize(html), "Article body");
    }

    #[test]
    fn test_body_policy_keeps_line_breaks() {
        assert_eq!(body_policy().sanitize("one<br>two<br/>three"), "one<br>two<br>three");
    }

    #[test]
    fn test_body_policy_keeps_images() {
        let html = r#"<p><img src="https://example.com/a.png" alt="A" onerror="x()"></p>"#;
        assert_eq!(
            body_policy().sanitize(html),
            r#"<img alt="A" src="https://example.com/a.png">"#
        );
    }

    #[test]
    fn test_image_with_unsafe_src_dropped() {
        let html = r#"<img src="javascript:alert(1)">"#;
        assert_eq!(body_policy().sanitize(html), "");

        let html = r#"<img src="javascript:alert(1)" alt="kept">"#;
        assert_eq!(body_policy().sanitize(html), r#"<img alt="kept">"#);
    }

    #[test]
    fn test_text_is_escaped() {
        let policy = Policy::new();
        assert_eq!(policy.sanitize("<p>a &lt; b &amp; c</p>"), "a &lt; b &amp; c");
    }

    #[test]
    fn test_allow_elements() {
        let policy = Policy::new().allow_elements(&["em"]);
        assert!(policy.is_allowed("em"));
        assert!(!policy.is_allowed("strong"));
        assert_eq!(
            policy.sanitize(r#"<em class="x">hi</em> <strong>there</strong>"#),
            "<em>hi</em> there"
        );
    }
}
