//! Navigation engine.
//!
//! # Architecture
//!
//! ```text
//! link activation ──> begin_link ──> FetchTicket ──(fetch)──> complete ──> swap
//! history pop ──────> traverse ──┬─> Restored (cache hit, no fetch)
//!                                └─> FetchTicket ──(fetch)──> complete ──> swap
//! ```
//!
//! The fetch is the only suspension point. Tickets carry the page key that
//! was current when they were issued; a response arriving after the current
//! key has moved on is discarded.
//!
//! A swap plans the incoming head first. If any tracked resource changed
//! version the browser is reloaded and nothing else is touched. Otherwise:
//! scroll to top, replace body, commit head, fire `initialize` then
//! `onload`, and finally append the staged scripts.

mod link;

pub use link::Anchor;

use std::fmt;

use url::Url;

use crate::config::NavConfig;
use crate::head::{HeadPlan, HeadRegistry, StaleResource, plan};
use crate::host::{Fetch, FetchError, Host, PopEvent};
use crate::lifecycle::{LifecycleBus, PageState};
use crate::markup::{ParsedPage, parse_page};
use crate::page::{CacheEntry, PageCache, PageIdentity, PageKey};
use crate::{debug, log};

// =============================================================================
// Tickets and Outcomes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKind {
    /// Forward navigation from a link; pushes a new history entry.
    Link,
    /// Cache miss on back/forward; the history entry already exists.
    Traversal,
}

/// An in-flight page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    url: Url,
    origin: PageKey,
    kind: TicketKind,
}

impl FetchTicket {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// URL to fetch.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Page key current when the fetch was issued.
    #[inline]
    pub fn origin(&self) -> &PageKey {
        &self.origin
    }

    #[inline]
    pub fn kind(&self) -> TicketKind {
        self.kind
    }
}

/// Result of a history traversal before any fetch.
#[derive(Debug)]
pub enum Traversal {
    /// Served from cache.
    Restored,
    /// Needs the page fetched; finish with [`Navigator::complete`].
    Fetch(FetchTicket),
    /// The entry carries no page key.
    Ignored,
}

/// What a navigation ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The link is not ours; the browser navigates normally.
    NotIntercepted,
    /// New content swapped in.
    Swapped,
    /// Cached snapshot restored.
    Restored,
    /// A tracked resource changed version; full reload requested.
    Reloaded(StaleResource),
    /// Fetch or parse failed; full navigation to the URL requested.
    FellBack(Url),
    /// Response arrived after a later navigation and was dropped.
    Discarded,
    /// History entry without a page key.
    Ignored,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotIntercepted => f.write_str("not intercepted"),
            Self::Swapped => f.write_str("swapped"),
            Self::Restored => f.write_str("restored from cache"),
            Self::Reloaded(stale) => write!(
                f,
                "reloaded ({} changed {} -> {})",
                stale.identity, stale.current, stale.incoming
            ),
            Self::FellBack(url) => write!(f, "full navigation to {url}"),
            Self::Discarded => f.write_str("discarded stale response"),
            Self::Ignored => f.write_str("ignored"),
        }
    }
}

// =============================================================================
// Navigator
// =============================================================================

/// Soft navigation engine bound to one host for the whole session.
pub struct Navigator<H: Host> {
    host: H,
    config: NavConfig,
    identity: PageIdentity,
    cache: PageCache<H::Body>,
    registry: HeadRegistry,
    bus: LifecycleBus,
    next_ticket: u64,
    /// Key made current by a traversal whose page has not been swapped in yet.
    pending_render: Option<PageKey>,
}

impl<H: Host> fmt::Debug for Navigator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("current", &self.identity.current().to_string())
            .field("cached", &self.cache.len())
            .field("tracked", &self.registry.len())
            .finish()
    }
}

impl<H: Host> Navigator<H> {
    /// Take over navigation for `host`.
    ///
    /// Mints a key for the current location, stores it in the current history
    /// entry, and switches scroll restoration to manual. Returns `None`
    /// without touching the host when it fails the capability probe.
    pub fn attach(mut host: H, config: NavConfig) -> Option<Self> {
        if !host.supports_soft_navigation() {
            debug!("nav"; "host lacks history support, soft navigation disabled");
            return None;
        }

        let location = host.location();
        let key = PageKey::for_url(&location);
        host.replace_state(&key, &location);
        host.manual_scroll_restoration();
        debug!("nav"; "attached as {}", key);

        Some(Self {
            host,
            cache: PageCache::new(config.cache_capacity),
            config,
            identity: PageIdentity::new(key),
            registry: HeadRegistry::new(),
            bus: LifecycleBus::new(),
            next_ticket: 0,
            pending_render: None,
        })
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[inline]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    #[inline]
    pub fn current_key(&self) -> &PageKey {
        self.identity.current()
    }

    /// Script key that registrations and dispatch currently use.
    #[inline]
    pub fn script_key(&self) -> &str {
        self.identity.script_key()
    }

    #[inline]
    pub fn cache(&self) -> &PageCache<H::Body> {
        &self.cache
    }

    #[inline]
    pub fn registry(&self) -> &HeadRegistry {
        &self.registry
    }

    #[inline]
    pub fn bus(&self) -> &LifecycleBus {
        &self.bus
    }

    /// The initial document finished loading.
    ///
    /// Seeds the head registry from the live head and runs the first
    /// `initialize` and `onload`.
    pub fn page_loaded(&mut self) {
        let head = self.host.head_elements();
        self.registry.seed(&head, &self.config);
        debug!("head"; "tracking {} entries", self.registry.len());

        self.bus.fire_initialize(self.identity.script_key());
        self.bus.fire_onload(self.identity.script_key(), None);
    }

    // -------------------------------------------------------------------------
    // Lifecycle registration
    // -------------------------------------------------------------------------

    /// Run `listener` after every swap into the current section.
    pub fn initialize(&mut self, listener: impl FnMut() + 'static) {
        self.bus.initialize(self.identity.script_key(), listener);
    }

    /// Run `listener` after `initialize`; receives restored state on back/forward.
    pub fn onload(&mut self, listener: impl FnMut(Option<&PageState>) + 'static) {
        self.bus.onload(self.identity.script_key(), listener);
    }

    /// Collect state from `listener` when leaving a page of the current section.
    pub fn beforeunload(&mut self, listener: impl FnMut() -> Option<PageState> + 'static) {
        self.bus.beforeunload(self.identity.script_key(), listener);
    }

    // -------------------------------------------------------------------------
    // Interception
    // -------------------------------------------------------------------------

    /// Target URL if this anchor should be soft-navigated.
    pub fn intercept(&self, anchor: &Anchor) -> Option<Url> {
        anchor.soft_target(&self.config.marker, &self.host.location())
    }

    /// Start a link navigation. `None` means the default action should run.
    pub fn begin_link(&mut self, anchor: &Anchor) -> Option<FetchTicket> {
        let url = self.intercept(anchor)?;
        let ticket = self.issue(url, TicketKind::Link);
        debug!("nav"; "#{} fetching {}", ticket.id, ticket.url);
        Some(ticket)
    }

    /// Handle a back/forward traversal.
    ///
    /// The page being left is snapshotted first. A cached target is restored
    /// in place; otherwise a ticket is returned for the entry's URL.
    pub fn traverse(&mut self, event: PopEvent) -> Traversal {
        let Some(key) = event.key else {
            debug!("nav"; "history entry without page key, ignoring");
            return Traversal::Ignored;
        };

        self.depart();
        self.identity.replace(key.clone());

        if let Some(entry) = self.cache.restore(&key) {
            debug!("cache"; "hit {}", key);
            self.pending_render = None;
            self.host.set_body(entry.body.clone());
            self.host.set_title(&entry.title);
            self.host.scroll_to(entry.scroll);
            self.bus
                .fire_onload(self.identity.script_key(), Some(&entry.state));
            return Traversal::Restored;
        }

        let url = event.url.unwrap_or_else(|| self.section_url(&key));
        debug!("cache"; "miss {}, fetching {}", key, url);
        self.pending_render = Some(key);
        Traversal::Fetch(self.issue(url, TicketKind::Traversal))
    }

    /// Finish a fetch started by [`begin_link`](Self::begin_link) or
    /// [`traverse`](Self::traverse).
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        response: Result<String, FetchError>,
    ) -> Outcome {
        if ticket.origin != *self.identity.current() {
            debug!(
                "nav";
                "#{} dropped: issued on {}, now on {}",
                ticket.id, ticket.origin, self.identity.current()
            );
            return Outcome::Discarded;
        }

        let page = match response {
            Ok(html) => match parse_page(&html) {
                Ok(page) => page,
                Err(err) => return self.fall_back(ticket.url, &err),
            },
            Err(err) => return self.fall_back(ticket.url, &err),
        };

        if ticket.kind == TicketKind::Link {
            self.depart();
            let key = PageKey::for_url(&ticket.url);
            self.host.push_state(&key, &ticket.url);
            self.identity.replace(key);
        }

        self.swap(page)
    }

    // -------------------------------------------------------------------------
    // Synchronous drivers
    // -------------------------------------------------------------------------

    /// Activate `anchor`, fetching through `fetcher` right away.
    pub fn follow<F: Fetch + ?Sized>(&mut self, anchor: &Anchor, fetcher: &F) -> Outcome {
        let Some(ticket) = self.begin_link(anchor) else {
            return Outcome::NotIntercepted;
        };
        let response = fetcher.fetch(&ticket.url);
        self.complete(ticket, response)
    }

    /// Handle a traversal, fetching through `fetcher` on a cache miss.
    pub fn pop<F: Fetch + ?Sized>(&mut self, event: PopEvent, fetcher: &F) -> Outcome {
        match self.traverse(event) {
            Traversal::Restored => Outcome::Restored,
            Traversal::Ignored => Outcome::Ignored,
            Traversal::Fetch(ticket) => {
                let response = fetcher.fetch(&ticket.url);
                self.complete(ticket, response)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn issue(&mut self, url: Url, kind: TicketKind) -> FetchTicket {
        self.next_ticket += 1;
        FetchTicket {
            id: self.next_ticket,
            url,
            origin: self.identity.current().clone(),
            kind,
        }
    }

    /// Snapshot the current page into the cache.
    ///
    /// Nothing is stored while the current key's page is still being fetched;
    /// the document then shows a different page.
    fn depart(&mut self) {
        if self.pending_render.as_ref() == Some(self.identity.current()) {
            debug!("cache"; "{} never rendered, not stored", self.identity.current());
            self.bus.mark_navigated();
            return;
        }
        let state = self.bus.collect_state(self.identity.script_key());
        let entry = CacheEntry {
            body: self.host.body(),
            title: self.host.title(),
            scroll: self.host.scroll_offset(),
            state,
        };
        let key = self.identity.current().clone();
        debug!("cache"; "store {}", key);
        self.cache.store(key, entry);
        self.bus.mark_navigated();
    }

    fn swap(&mut self, page: ParsedPage) -> Outcome {
        let reconciliation = match plan(&self.registry, &page.head, &self.config) {
            HeadPlan::Apply(reconciliation) => reconciliation,
            HeadPlan::Stale(stale) => {
                log!(
                    "head";
                    "{} changed version ({} -> {}), reloading",
                    stale.identity, stale.current, stale.incoming
                );
                self.host.reload();
                return Outcome::Reloaded(stale);
            }
        };
        debug!(
            "head";
            "kept {}, appending {}, staging {} scripts",
            reconciliation.kept(),
            reconciliation.appends().len(),
            reconciliation.scripts().len()
        );

        self.host.scroll_to(0.0);
        self.host.replace_body(&page.body);
        let scripts = reconciliation.commit(&mut self.registry, &mut self.host);

        self.bus.fire_initialize(self.identity.script_key());
        self.bus.fire_onload(self.identity.script_key(), None);

        for script in &scripts {
            self.host.append_head(script);
        }
        self.pending_render = None;
        Outcome::Swapped
    }

    fn fall_back(&mut self, url: Url, err: &dyn std::error::Error) -> Outcome {
        log!("nav"; "{}, navigating to {}", err, url);
        self.host.assign(&url);
        Outcome::FellBack(url)
    }

    /// URL of a key's section root, for pops that carry no location.
    fn section_url(&self, key: &PageKey) -> Url {
        let location = self.host.location();
        location
            .join(&format!("/{}", key.segment()))
            .unwrap_or(location)
    }
}
