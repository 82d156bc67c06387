//! Page identity and snapshot cache.
//!
//! - `key` - PageKey minting and the current-page tracker
//! - `cache` - bounded, insertion-ordered snapshot store

mod cache;
mod key;

pub use cache::{CacheEntry, PageCache};
pub use key::{PageIdentity, PageKey, PageKeyError, primary_segment};
