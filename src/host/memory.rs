//! In-process host.
//!
//! `MemoryHost` keeps a document and a session history in plain data and
//! records every side effect the engine asks for (reloads, full navigations,
//! history pushes), so tests and the replay CLI can inspect them.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use url::Url;

use super::{Document, Fetch, FetchError, History, Host, PopEvent};
use crate::markup::{BodyMarkup, HeadElement, MarkupError, ParsedPage, parse_page};
use crate::page::PageKey;

// =============================================================================
// MemoryHost
// =============================================================================

/// One session history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub key: Option<PageKey>,
    pub url: Url,
}

#[derive(Debug, Clone)]
pub struct MemoryHost {
    head: Vec<HeadElement>,
    body: String,
    title: String,
    scroll: f64,

    entries: Vec<HistoryEntry>,
    index: usize,
    manual_scroll: bool,

    reloads: usize,
    assigned: Vec<Url>,
    capable: bool,
}

impl MemoryHost {
    /// A host showing `page` at `url`, with one history entry.
    pub fn new(url: Url, page: ParsedPage) -> Self {
        let title = page.title().unwrap_or_default();
        Self {
            head: page.head,
            body: page.body.to_html(),
            title,
            scroll: 0.0,
            entries: vec![HistoryEntry { key: None, url }],
            index: 0,
            manual_scroll: false,
            reloads: 0,
            assigned: Vec::new(),
            capable: true,
        }
    }

    /// A host showing the page described by `html`.
    pub fn from_markup(url: Url, html: &str) -> Result<Self, MarkupError> {
        Ok(Self::new(url, parse_page(html)?))
    }

    /// Pretend the environment lacks history/parsing support.
    pub fn without_capabilities(mut self) -> Self {
        self.capable = false;
        self
    }

    #[inline]
    pub fn head(&self) -> &[HeadElement] {
        &self.head
    }

    #[inline]
    pub fn body_html(&self) -> &str {
        &self.body
    }

    /// Number of full reloads requested.
    #[inline]
    pub fn reloads(&self) -> usize {
        self.reloads
    }

    /// Full navigations requested, oldest first.
    #[inline]
    pub fn assigned(&self) -> &[Url] {
        &self.assigned
    }

    #[inline]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[inline]
    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    #[inline]
    pub fn scroll_restoration_is_manual(&self) -> bool {
        self.manual_scroll
    }

    /// Count of head elements whose serialized markup equals `outer_html`.
    pub fn head_count(&self, outer_html: &str) -> usize {
        self.head
            .iter()
            .filter(|el| el.outer_html() == outer_html)
            .count()
    }

    /// Step back one history entry, as the back button would.
    pub fn back(&mut self) -> Option<PopEvent> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.pop_event())
    }

    /// Step forward one history entry.
    pub fn forward(&mut self) -> Option<PopEvent> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.pop_event())
    }

    fn pop_event(&self) -> PopEvent {
        let entry = &self.entries[self.index];
        PopEvent {
            key: entry.key.clone(),
            url: Some(entry.url.clone()),
        }
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        let head: String = self.head.iter().map(HeadElement::outer_html).collect();
        format!("<html><head>{head}</head>{}</html>", self.body)
    }
}

impl Document for MemoryHost {
    type Body = String;

    fn body(&self) -> String {
        self.body.clone()
    }

    fn set_body(&mut self, body: String) {
        self.body = body;
    }

    fn replace_body(&mut self, markup: &BodyMarkup) {
        self.body = markup.to_html();
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn scroll_to(&mut self, offset: f64) {
        self.scroll = offset;
    }

    fn head_elements(&self) -> Vec<HeadElement> {
        self.head.clone()
    }

    fn append_head(&mut self, element: &HeadElement) {
        self.head.push(element.clone());
    }
}

impl History for MemoryHost {
    fn location(&self) -> Url {
        self.current_entry().url.clone()
    }

    fn push_state(&mut self, key: &PageKey, url: &Url) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            key: Some(key.clone()),
            url: url.clone(),
        });
        self.index = self.entries.len() - 1;
    }

    fn replace_state(&mut self, key: &PageKey, url: &Url) {
        self.entries[self.index] = HistoryEntry {
            key: Some(key.clone()),
            url: url.clone(),
        };
    }

    fn manual_scroll_restoration(&mut self) {
        self.manual_scroll = true;
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }

    fn assign(&mut self, url: &Url) {
        self.assigned.push(url.clone());
    }
}

impl Host for MemoryHost {
    fn supports_soft_navigation(&self) -> bool {
        self.capable
    }
}

// =============================================================================
// StaticFetcher
// =============================================================================

/// Serves fixed pages by URL path and records every request.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: FxHashMap<String, String>,
    requests: RefCell<Vec<Url>>,
    offline: bool,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for requests to `path`.
    pub fn page(mut self, path: &str, html: impl Into<String>) -> Self {
        self.insert(path, html);
        self
    }

    pub fn insert(&mut self, path: &str, html: impl Into<String>) {
        self.pages.insert(path.to_owned(), html.into());
    }

    /// Fail every request as a network error.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// URLs requested so far, oldest first.
    pub fn requests(&self) -> Vec<Url> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Fetch for StaticFetcher {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.clone());
        if self.offline {
            return Err(FetchError::network(url, "offline"));
        }
        self.pages
            .get(url.path())
            .cloned()
            .ok_or_else(|| FetchError::network(url, "connection refused"))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://site.test").unwrap().join(path).unwrap()
    }

    fn host() -> MemoryHost {
        MemoryHost::from_markup(
            url("/"),
            "<html><head><title>Home</title></head><body>home</body></html>",
        )
        .unwrap()
    }

    #[test]
    fn test_initial_document() {
        let host = host();
        assert_eq!(host.title(), "Home");
        assert_eq!(host.body_html(), "<body>home</body>");
        assert_eq!(host.head().len(), 1);
        assert_eq!(host.location(), url("/"));
    }

    #[test]
    fn test_history_push_back_forward() {
        let mut host = host();
        let a = PageKey::mint("a");
        let b = PageKey::mint("b");
        host.push_state(&a, &url("/a"));
        host.push_state(&b, &url("/b"));
        assert_eq!(host.entries().len(), 3);

        let pop = host.back().unwrap();
        assert_eq!(pop.key, Some(a.clone()));
        assert_eq!(host.location(), url("/a"));

        let pop = host.forward().unwrap();
        assert_eq!(pop.key, Some(b));
        assert!(host.forward().is_none());
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut host = host();
        host.push_state(&PageKey::mint("a"), &url("/a"));
        host.push_state(&PageKey::mint("b"), &url("/b"));
        host.back();
        host.push_state(&PageKey::mint("c"), &url("/c"));

        let paths: Vec<_> = host.entries().iter().map(|e| e.url.path()).collect();
        assert_eq!(paths, ["/", "/a", "/c"]);
        assert!(host.forward().is_none());
    }

    #[test]
    fn test_back_at_start() {
        let mut host = host();
        assert!(host.back().is_none());
    }

    #[test]
    fn test_static_fetcher_records_requests() {
        let mut fetcher = StaticFetcher::new().page("/a", "<p>a</p>");
        assert_eq!(fetcher.fetch(&url("/a")).unwrap(), "<p>a</p>");
        assert!(fetcher.fetch(&url("/missing")).is_err());

        fetcher.set_offline(true);
        assert!(matches!(
            fetcher.fetch(&url("/a")),
            Err(FetchError::Network { .. })
        ));
        assert_eq!(fetcher.request_count(), 3);
    }
}
