//! Directory-backed page transport.
//!
//! Maps a URL path onto a built site directory the way a static file server
//! would: `/blog/1` tries `blog/1`, `blog/1.html`, then `blog/1/index.html`.

use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use super::{Fetch, FetchError};

#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that serves `url`, if any.
    pub fn resolve(&self, url: &Url) -> Option<PathBuf> {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        // never serve anything outside the root
        if segments.iter().any(|s| *s == ".." || s.contains('\\')) {
            return None;
        }

        let base = segments.iter().fold(self.root.clone(), |path, s| path.join(s));
        let candidates = if segments.is_empty() {
            vec![base.join("index.html")]
        } else {
            vec![
                base.clone(),
                base.with_extension("html"),
                base.join("index.html"),
            ]
        };

        candidates.into_iter().find(|path| path.is_file())
    }
}

impl Fetch for DirFetcher {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let path = self
            .resolve(url)
            .ok_or_else(|| FetchError::network(url, "no such page"))?;
        fs::read_to_string(&path).map_err(|err| FetchError::Body {
            url: url.to_string(),
            reason: format!("{}: {err}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> (TempDir, DirFetcher) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("index.html"), "home").unwrap();
        fs::write(root.join("about.html"), "about").unwrap();
        fs::create_dir_all(root.join("blog/1")).unwrap();
        fs::write(root.join("blog/1/index.html"), "post one").unwrap();
        let fetcher = DirFetcher::new(root);
        (dir, fetcher)
    }

    fn url(path: &str) -> Url {
        Url::parse("http://localhost").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_resolves_index_and_extensions() {
        let (_dir, fetcher) = site();
        assert_eq!(fetcher.fetch(&url("/")).unwrap(), "home");
        assert_eq!(fetcher.fetch(&url("/about")).unwrap(), "about");
        assert_eq!(fetcher.fetch(&url("/blog/1")).unwrap(), "post one");
        assert_eq!(fetcher.fetch(&url("/blog/1/")).unwrap(), "post one");
    }

    #[test]
    fn test_missing_page_is_network_error() {
        let (_dir, fetcher) = site();
        assert!(matches!(
            fetcher.fetch(&url("/nope")),
            Err(FetchError::Network { .. })
        ));
    }
}
