//! Page markup parsing.
//!
//! Turns fetched HTML text into the two pieces a swap needs: the direct
//! child elements of `<head>` and the `<body>` element. Parsing is done with
//! `tl`; nothing else in the crate touches the parser.

use std::borrow::Cow;

use thiserror::Error;

use crate::utils::html::{escape, is_void_element, render_attrs, unescape};

/// Attribute list in document order. `None` marks a valueless attribute.
pub type Attrs = Vec<(String, Option<String>)>;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("failed to parse page markup: {0}")]
    Parse(String),
}

// =============================================================================
// Head Elements
// =============================================================================

/// A direct child element of a document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadElement {
    tag: String,
    attrs: Attrs,
    inner_html: String,
    outer_html: String,
}

impl HeadElement {
    /// Build an element and serialize its markup.
    pub fn new(tag: impl Into<String>, attrs: Attrs, inner_html: impl Into<String>) -> Self {
        let tag = tag.into().to_ascii_lowercase();
        let inner_html = inner_html.into();
        let outer_html = if is_void_element(&tag) {
            format!("<{tag}{}>", render_attrs(&attrs))
        } else {
            format!("<{tag}{}>{inner_html}</{tag}>", render_attrs(&attrs))
        };
        Self {
            tag,
            attrs,
            inner_html,
            outer_html,
        }
    }

    /// Shorthand for `<script src="...">`.
    pub fn script(src: &str) -> Self {
        Self::new("script", vec![("src".into(), Some(src.into()))], "")
    }

    /// Shorthand for `<link rel="stylesheet" href="...">`.
    pub fn stylesheet(href: &str) -> Self {
        Self::new(
            "link",
            vec![
                ("rel".into(), Some("stylesheet".into())),
                ("href".into(), Some(href.into())),
            ],
            "",
        )
    }

    /// Shorthand for `<title>...</title>`.
    pub fn title(text: &str) -> Self {
        Self::new("title", Vec::new(), escape(text))
    }

    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[inline]
    pub fn attrs(&self) -> &[(String, Option<String>)] {
        &self.attrs
    }

    /// Attribute value; valueless attributes read as `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    /// Attribute value, treating an empty value as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|value| !value.is_empty())
    }

    #[inline]
    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    /// Serialized markup, used as identity for non-resource elements.
    #[inline]
    pub fn outer_html(&self) -> &str {
        &self.outer_html
    }

    /// Text content with entities decoded.
    pub fn text(&self) -> Cow<'_, str> {
        unescape(self.inner_html.trim())
    }
}

// =============================================================================
// Body
// =============================================================================

/// The `<body>` element of a fetched page, replaced wholesale on swap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyMarkup {
    pub attrs: Attrs,
    pub inner_html: String,
}

impl BodyMarkup {
    pub fn to_html(&self) -> String {
        format!("<body{}>{}</body>", render_attrs(&self.attrs), self.inner_html)
    }
}

/// A fetched page split into head children and body.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub head: Vec<HeadElement>,
    pub body: BodyMarkup,
}

impl ParsedPage {
    /// Text of the last `<title>` in the head, if any.
    pub fn title(&self) -> Option<String> {
        self.head
            .iter()
            .rev()
            .find(|el| el.tag() == "title")
            .map(|el| el.text().into_owned())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a full HTML document.
///
/// A document without `<head>` yields no head elements. A document without
/// `<body>` uses the whole input as body content.
pub fn parse_page(html: &str) -> Result<ParsedPage, MarkupError> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| MarkupError::Parse(format!("{e:?}")))?;
    let parser = dom.parser();

    let head = find_tag(&dom, "head")
        .map(|tag| child_elements(tag, parser))
        .unwrap_or_default();

    let body = match find_tag(&dom, "body") {
        Some(tag) => BodyMarkup {
            attrs: collect_attrs(tag),
            inner_html: tag.inner_html(parser).to_string(),
        },
        None => BodyMarkup {
            attrs: Vec::new(),
            inner_html: html.to_string(),
        },
    };

    Ok(ParsedPage { head, body })
}

/// Parse the children of a serialized `<head>` element.
///
/// Used by hosts that can only hand back live head markup as text.
pub fn parse_head(head_html: &str) -> Result<Vec<HeadElement>, MarkupError> {
    let dom = tl::parse(head_html, tl::ParserOptions::default())
        .map_err(|e| MarkupError::Parse(format!("{e:?}")))?;
    let parser = dom.parser();
    Ok(find_tag(&dom, "head")
        .map(|tag| child_elements(tag, parser))
        .unwrap_or_default())
}

fn find_tag<'d, 'a>(dom: &'d tl::VDom<'a>, name: &str) -> Option<&'d tl::HTMLTag<'a>> {
    dom.nodes().iter().find_map(|node| {
        node.as_tag()
            .filter(|tag| tag.name().as_utf8_str().eq_ignore_ascii_case(name))
    })
}

fn child_elements(tag: &tl::HTMLTag<'_>, parser: &tl::Parser<'_>) -> Vec<HeadElement> {
    tag.children()
        .top()
        .iter()
        .filter_map(|handle| handle.get(parser)?.as_tag())
        .map(|child| HeadElement {
            tag: child.name().as_utf8_str().to_ascii_lowercase(),
            attrs: collect_attrs(child),
            inner_html: child.inner_html(parser).to_string(),
            outer_html: child.outer_html(parser).to_string(),
        })
        .collect()
}

fn collect_attrs(tag: &tl::HTMLTag<'_>) -> Attrs {
    tag.attributes()
        .iter()
        .map(|(key, value)| (key.to_string(), value.map(|v| v.to_string())))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Blog &amp; Notes</title>
  <link rel="stylesheet" href="/style.a1.css">
  <script src="/blog.a.js" defer></script>
</head>
<body class="post"><h1>Hello</h1></body>
</html>"#;

    #[test]
    fn test_parse_head_children_in_order() {
        let page = parse_page(PAGE).unwrap();
        let tags: Vec<_> = page.head.iter().map(HeadElement::tag).collect();
        assert_eq!(tags, ["meta", "title", "link", "script"]);
    }

    #[test]
    fn test_parse_attributes() {
        let page = parse_page(PAGE).unwrap();
        let script = &page.head[3];
        assert_eq!(script.attr("src"), Some("/blog.a.js"));
        assert_eq!(script.attr("defer"), Some(""));
        assert_eq!(script.non_empty_attr("defer"), None);
        assert_eq!(script.attr("async"), None);
    }

    #[test]
    fn test_parse_title_decodes_entities() {
        let page = parse_page(PAGE).unwrap();
        assert_eq!(page.title().as_deref(), Some("Blog & Notes"));
    }

    #[test]
    fn test_parse_body() {
        let page = parse_page(PAGE).unwrap();
        assert!(page.body.inner_html.contains("<h1>Hello</h1>"));
        assert!(page.body.to_html().starts_with(r#"<body class="post">"#));
    }

    #[test]
    fn test_missing_head_and_body() {
        let page = parse_page("<p>fragment</p>").unwrap();
        assert!(page.head.is_empty());
        assert_eq!(page.body.inner_html, "<p>fragment</p>");
    }

    #[test]
    fn test_outer_html_is_stable_identity() {
        let a = parse_page(PAGE).unwrap();
        let b = parse_page(PAGE).unwrap();
        assert_eq!(a.head[0].outer_html(), b.head[0].outer_html());
        assert!(a.head[0].outer_html().contains("charset"));
    }

    #[test]
    fn test_constructed_elements() {
        let link = HeadElement::stylesheet("/main.css");
        assert_eq!(
            link.outer_html(),
            r#"<link rel="stylesheet" href="/main.css">"#
        );
        let title = HeadElement::title("A < B");
        assert_eq!(title.outer_html(), "<title>A &lt; B</title>");
        assert_eq!(title.text(), "A < B");
    }

    #[test]
    fn test_parse_head_fragment() {
        let head = parse_head(r#"<head><meta name="x" content="y"><script src="/a.js"></script></head>"#)
            .unwrap();
        assert_eq!(head.len(), 2);
        assert_eq!(head[1].attr("src"), Some("/a.js"));
    }
}
