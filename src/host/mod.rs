//! Host environment seams.
//!
//! The engine never touches a browser directly. It talks to:
//!
//! - [`Document`] - body, title, scroll offset, and head of the live page
//! - [`History`] - session history entries, location, reload and navigation
//! - [`Fetch`] - text fetch of a page URL
//!
//! `memory` provides an in-process host used by tests and the replay CLI;
//! `site` fetches pages from a directory; `web` (wasm32 only) binds the
//! engine to a real browser window.

mod memory;
mod site;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::{HistoryEntry, MemoryHost, StaticFetcher};
pub use site::DirFetcher;

use thiserror::Error;
use url::Url;

use crate::markup::{BodyMarkup, HeadElement};
use crate::page::PageKey;

/// Failure of the page transport.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("response from {url} is not readable text: {reason}")]
    Body { url: String, reason: String },
}

impl FetchError {
    pub fn network(url: &Url, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Live document access.
pub trait Document {
    /// Handle to a rendered body. Cloning must be cheap or at least correct:
    /// the cache hands out clones when restoring.
    type Body: Clone;

    fn body(&self) -> Self::Body;
    fn set_body(&mut self, body: Self::Body);
    /// Replace the body with freshly parsed markup.
    fn replace_body(&mut self, markup: &BodyMarkup);

    fn title(&self) -> String;
    fn set_title(&mut self, title: &str);

    /// Vertical scroll offset of the document.
    fn scroll_offset(&self) -> f64;
    fn scroll_to(&mut self, offset: f64);

    /// Direct children of the live `<head>`, in order.
    fn head_elements(&self) -> Vec<HeadElement>;
    fn append_head(&mut self, element: &HeadElement);
}

/// Session history and location.
pub trait History {
    fn location(&self) -> Url;
    fn push_state(&mut self, key: &PageKey, url: &Url);
    fn replace_state(&mut self, key: &PageKey, url: &Url);
    /// Stop the browser from restoring scroll on traversal.
    fn manual_scroll_restoration(&mut self);
    /// Full reload of the current location.
    fn reload(&mut self);
    /// Full navigation to `url`.
    fn assign(&mut self, url: &Url);
}

/// Everything the navigator needs from its environment.
pub trait Host: Document + History {
    /// Capability probe. A host that cannot support soft navigation leaves
    /// the engine uninitialized.
    fn supports_soft_navigation(&self) -> bool {
        true
    }
}

/// Synchronous page transport.
pub trait Fetch {
    fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// History traversal notification (back/forward).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopEvent {
    /// Key stored in the entry's state, if it has one.
    pub key: Option<PageKey>,
    /// Location of the entry being returned to.
    pub url: Option<Url>,
}
