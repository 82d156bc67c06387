//! Head element classification and resource identity.
//!
//! A versioned resource URL such as `/js/blog.3f2a.js` is split on a divider
//! (default `.`): the first piece is the identity, the second-to-last piece
//! is the version. Two pages that reference `blog` at different versions
//! cannot share a live document.

use crate::config::NavConfig;
use crate::markup::HeadElement;

/// Which head element carried a versioned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `<script src>`, appended after the swap so it runs against the new body.
    Script,
    /// `<link href>`, appended during the swap.
    Link,
}

/// How a head element takes part in reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadEntry {
    Resource {
        kind: ResourceKind,
        identity: String,
        version: String,
    },
    /// `<title>` text, applied directly to the document.
    Title(String),
    /// Any other element, identified by its serialized markup.
    Markup(String),
}

impl HeadEntry {
    /// Registry key and version, if the entry is tracked at all.
    pub fn registry_pair(&self) -> Option<(&str, &str)> {
        match self {
            Self::Resource {
                identity, version, ..
            } => Some((identity.as_str(), version.as_str())),
            Self::Markup(markup) => Some((markup.as_str(), "")),
            Self::Title(_) => None,
        }
    }
}

/// Classify a head element.
pub fn classify(element: &HeadElement, config: &NavConfig) -> HeadEntry {
    let resource = match element.tag() {
        "script" => element
            .non_empty_attr("src")
            .map(|url| (ResourceKind::Script, url)),
        "link" => element
            .non_empty_attr("href")
            .map(|url| (ResourceKind::Link, url)),
        "title" => return HeadEntry::Title(element.text().into_owned()),
        _ => None,
    };

    match resource {
        Some((kind, url)) => {
            let divider = element
                .non_empty_attr(&config.divider_attribute)
                .unwrap_or(config.divider.as_str());
            let explicit = element.attr(&config.id_attribute);
            let (identity, version) = resource_identity(url, divider, explicit);
            HeadEntry::Resource {
                kind,
                identity,
                version,
            }
        }
        None => HeadEntry::Markup(element.outer_html().to_owned()),
    }
}

/// Split a resource URL into `(identity, version)`.
///
/// - explicit identity present and non-empty: `(explicit, url)`
/// - divider found: first piece and second-to-last piece
/// - divider absent: `(url, "")`
pub fn resource_identity(url: &str, divider: &str, explicit: Option<&str>) -> (String, String) {
    if let Some(id) = explicit.filter(|id| !id.is_empty()) {
        return (id.to_owned(), url.to_owned());
    }

    if divider.is_empty() {
        return (url.to_owned(), String::new());
    }

    let pieces: Vec<&str> = url.split(divider).collect();
    if pieces.len() > 1 {
        (pieces[0].to_owned(), pieces[pieces.len() - 2].to_owned())
    } else {
        (url.to_owned(), String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_identity_versioned_url() {
        assert_eq!(
            resource_identity("/js/blog.a1b2.js", ".", None),
            pair("/js/blog", "a1b2")
        );
    }

    #[test]
    fn test_identity_many_pieces_uses_second_to_last() {
        assert_eq!(
            resource_identity("/js/app.v2.min.js", ".", None),
            pair("/js/app", "min")
        );
    }

    #[test]
    fn test_identity_two_pieces() {
        assert_eq!(resource_identity("app.js", ".", None), pair("app", "app"));
    }

    #[test]
    fn test_identity_no_divider() {
        assert_eq!(
            resource_identity("/fonts/inter", ".", None),
            pair("/fonts/inter", "")
        );
    }

    #[test]
    fn test_identity_divider_at_boundary() {
        assert_eq!(resource_identity(".js", ".", None), pair("", ""));
        assert_eq!(resource_identity("app.", ".", None), pair("app", "app"));
    }

    #[test]
    fn test_identity_custom_divider() {
        assert_eq!(
            resource_identity("/css/site-42-x.css", "-", None),
            pair("/css/site", "42")
        );
    }

    #[test]
    fn test_identity_explicit() {
        assert_eq!(
            resource_identity("/js/blog.a.js", ".", Some("blog-bundle")),
            pair("blog-bundle", "/js/blog.a.js")
        );
        // empty explicit identity falls back to splitting
        assert_eq!(
            resource_identity("/js/blog.a.js", ".", Some("")),
            pair("/js/blog", "a")
        );
    }

    #[test]
    fn test_classify_script_and_link() {
        let config = NavConfig::default();
        assert_eq!(
            classify(&HeadElement::script("/blog.a.js"), &config),
            HeadEntry::Resource {
                kind: ResourceKind::Script,
                identity: "/blog".into(),
                version: "a".into(),
            }
        );
        assert!(matches!(
            classify(&HeadElement::stylesheet("/site.css"), &config),
            HeadEntry::Resource {
                kind: ResourceKind::Link,
                ..
            }
        ));
    }

    #[test]
    fn test_classify_inline_script_is_markup() {
        let config = NavConfig::default();
        let inline = HeadElement::new("script", Vec::new(), "window.x = 1;");
        assert_eq!(
            classify(&inline, &config),
            HeadEntry::Markup("<script>window.x = 1;</script>".into())
        );
    }

    #[test]
    fn test_classify_title_and_meta() {
        let config = NavConfig::default();
        assert_eq!(
            classify(&HeadElement::title("Shop"), &config),
            HeadEntry::Title("Shop".into())
        );
        let meta = HeadElement::new(
            "meta",
            vec![("name".into(), Some("theme-color".into()))],
            "",
        );
        assert_eq!(
            classify(&meta, &config),
            HeadEntry::Markup(r#"<meta name="theme-color">"#.into())
        );
    }

    #[test]
    fn test_classify_honors_override_attributes() {
        let config = NavConfig::default();
        let script = HeadElement::new(
            "script",
            vec![
                ("src".into(), Some("/js/cart_7_min.js".into())),
                ("data-softnav-divider".into(), Some("_".into())),
            ],
            "",
        );
        assert_eq!(
            classify(&script, &config).registry_pair(),
            Some(("/js/cart", "7"))
        );

        let pinned = HeadElement::new(
            "link",
            vec![
                ("href".into(), Some("https://cdn.example/font.css".into())),
                ("data-softnav-id".into(), Some("font".into())),
            ],
            "",
        );
        assert_eq!(
            classify(&pinned, &config).registry_pair(),
            Some(("font", "https://cdn.example/font.css"))
        );
    }
}
