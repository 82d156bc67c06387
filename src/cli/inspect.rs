//! `softnav inspect`: show how a page's head is tracked.
//!
//! ```text
//! script  /js/blog         a
//! link    /css/site        v1
//! title   Post 1
//! markup  <meta charset="utf-8">
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use softnav::NavConfig;
use softnav::head::{HeadEntry, ResourceKind, classify};
use softnav::markup::parse_page;

/// Print the classified head entries of the page at `path`.
pub fn inspect_page(path: &Path, config: &NavConfig) -> Result<()> {
    let html =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    for line in describe(&html, config)? {
        println!("{line}");
    }
    Ok(())
}

fn describe(html: &str, config: &NavConfig) -> Result<Vec<String>> {
    let page = parse_page(html)?;
    let lines = page
        .head
        .iter()
        .map(|element| match classify(element, config) {
            HeadEntry::Resource {
                kind,
                identity,
                version,
            } => {
                let label = match kind {
                    ResourceKind::Script => "script",
                    ResourceKind::Link => "link",
                };
                let version = if version.is_empty() {
                    "-".to_owned()
                } else {
                    version
                };
                format!("{:<7} {:<24} {}", label.cyan(), identity, version.green())
            }
            HeadEntry::Title(title) => format!("{:<7} {}", "title".yellow(), title),
            HeadEntry::Markup(markup) => format!("{:<7} {}", "markup".dimmed(), markup),
        })
        .collect();
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_head() {
        let html = r#"<html><head>
            <title>Post 1</title>
            <script src="/js/blog.a.js"></script>
            <link rel="stylesheet" href="/css/site.css" data-softnav-id="site">
            <link rel="icon" href="/favicon">
        </head><body></body></html>"#;

        let lines = describe(html, &NavConfig::default()).unwrap();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Post 1"));
        assert!(lines[1].contains("/js/blog") && lines[1].contains('a'));
        assert!(lines[2].contains("site") && lines[2].contains("/css/site.css"));
        assert!(lines[3].contains("/favicon") && lines[3].contains('-'));
    }
}
