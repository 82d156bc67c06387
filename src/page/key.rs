//! Page identity.
//!
//! A [`PageKey`] names one visit to a page: `<segment>|<token>`. The segment
//! is the first path segment of the visited URL and doubles as the script key
//! that namespaces lifecycle listeners. The token keeps repeated visits to the
//! same path apart, so history entries and cache entries pair one-to-one.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const TOKEN_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 8;
const SEPARATOR: char = '|';

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid page key `{0}`: expected `<segment>|<token>`")]
pub struct PageKeyError(String);

// =============================================================================
// PageKey
// =============================================================================

/// Identity of one navigation instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PageKey {
    segment: String,
    token: String,
}

impl PageKey {
    /// Mint a fresh key for a path segment.
    pub fn mint(segment: &str) -> Self {
        Self {
            segment: segment.to_owned(),
            token: fresh_token(),
        }
    }

    /// Mint a key for the primary segment of a URL.
    pub fn for_url(url: &Url) -> Self {
        Self::mint(primary_segment(url))
    }

    /// The primary path segment, used as script key.
    #[inline]
    pub fn segment(&self) -> &str {
        &self.segment
    }

    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.segment, self.token)
    }
}

impl FromStr for PageKey {
    type Err = PageKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(SEPARATOR) {
            Some((segment, token)) if !token.is_empty() => Ok(Self {
                segment: segment.to_owned(),
                token: token.to_owned(),
            }),
            _ => Err(PageKeyError(s.to_owned())),
        }
    }
}

impl From<PageKey> for String {
    fn from(key: PageKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PageKey {
    type Error = PageKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

fn fresh_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// First path segment of a URL: `/blog/1` -> `blog`, `/` -> ``.
pub fn primary_segment(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or("")
}

// =============================================================================
// PageIdentity
// =============================================================================

/// Tracks which key is current. Exactly one key is current at any time.
#[derive(Debug, Clone)]
pub struct PageIdentity {
    current: PageKey,
}

impl PageIdentity {
    pub fn new(initial: PageKey) -> Self {
        Self { current: initial }
    }

    #[inline]
    pub fn current(&self) -> &PageKey {
        &self.current
    }

    /// Make `key` current, returning the key it replaced.
    pub fn replace(&mut self, key: PageKey) -> PageKey {
        std::mem::replace(&mut self.current, key)
    }

    /// Script key of the current page.
    #[inline]
    pub fn script_key(&self) -> &str {
        self.current.segment()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_format() {
        let key = PageKey::mint("blog");
        let text = key.to_string();
        assert!(text.starts_with("blog|"));
        assert_eq!(key.token().len(), TOKEN_LEN);
        assert!(key.token().bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_mint_distinguishes_repeat_visits() {
        let a = PageKey::mint("blog");
        let b = PageKey::mint("blog");
        assert_eq!(a.segment(), b.segment());
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_round_trip() {
        let key = PageKey::mint("shop");
        let parsed: PageKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("blog".parse::<PageKey>().is_err());
        assert!("blog|".parse::<PageKey>().is_err());
        let root: PageKey = "|abc".parse().unwrap();
        assert_eq!(root.segment(), "");
    }

    #[test]
    fn test_serde_as_string() {
        let key: PageKey = "blog|abc123".parse().unwrap();
        let json = serde_json::json!({ "key": key });
        assert_eq!(json.to_string(), r#"{"key":"blog|abc123"}"#);

        let back: PageKey = serde_json::from_value(json["key"].clone()).unwrap();
        assert_eq!(back.segment(), "blog");
        assert!(serde_json::from_str::<PageKey>(r#""nokey""#).is_err());
    }

    #[test]
    fn test_primary_segment() {
        let url = |s: &str| Url::parse(s).unwrap();
        assert_eq!(primary_segment(&url("https://x.dev/blog/1")), "blog");
        assert_eq!(primary_segment(&url("https://x.dev/shop")), "shop");
        assert_eq!(primary_segment(&url("https://x.dev/")), "");
        assert_eq!(primary_segment(&url("https://x.dev/a?q=1")), "a");
    }

    #[test]
    fn test_identity_replace() {
        let first = PageKey::mint("blog");
        let mut identity = PageIdentity::new(first.clone());
        assert_eq!(identity.script_key(), "blog");

        let old = identity.replace(PageKey::mint("shop"));
        assert_eq!(old, first);
        assert_eq!(identity.script_key(), "shop");
    }
}
