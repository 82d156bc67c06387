//! Softnav - soft navigation for multi-page sites.
//!
//! Intercepts same-origin links marked with an opt-in attribute, fetches the
//! target page, and swaps its body into the live document. Head resources
//! are reconciled by identity and version so scripts and stylesheets load at
//! most once, and a version change forces a real reload. Pages left behind
//! are cached for instant back/forward restoration.
//!
//! # Module Structure
//!
//! ```text
//! softnav/
//! ├── config/     # softnav.toml, NavConfig
//! ├── head/       # resource identity, registry, reconciliation
//! ├── host/       # Document / History / Fetch seams, memory + web hosts
//! ├── lifecycle/  # initialize / onload / beforeunload bus
//! ├── nav/        # Navigator engine
//! ├── page/       # PageKey, snapshot cache
//! ├── markup.rs   # HTML parsing (tl)
//! └── logger.rs   # log! / debug!
//! ```

pub mod logger;

pub mod config;
pub mod head;
pub mod host;
pub mod lifecycle;
pub mod markup;
pub mod nav;
pub mod page;
pub mod utils;

pub use config::{Config, NavConfig};
pub use host::{Document, Fetch, FetchError, History, Host, PopEvent};
pub use lifecycle::PageState;
pub use nav::{Anchor, FetchTicket, Navigator, Outcome, TicketKind, Traversal};
pub use page::PageKey;
