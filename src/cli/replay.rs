//! `softnav replay`: drive the engine through a scripted browsing session.
//!
//! # Script format
//!
//! ```toml
//! site = "public"              # built site, relative to the script
//! start = "/blog/1"
//! origin = "http://localhost"  # optional
//!
//! [[step]]
//! action = "click"
//! href = "/blog/2"
//!
//! [[step]]
//! action = "click"
//! href = "/about"
//! plain = true                 # link without the opt-in marker
//!
//! [[step]]
//! action = "back"
//! ```
//!
//! Full navigations (unmarked links, forced reloads, fallbacks) load the
//! target fresh, as a browser would, which starts a new engine session.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use softnav::host::{DirFetcher, MemoryHost};
use softnav::{Anchor, Fetch, History, NavConfig, Navigator, Outcome, PageKey, debug, log};

// =============================================================================
// Script
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    #[serde(default = "default_site")]
    pub site: PathBuf,
    pub start: String,
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

fn default_site() -> PathBuf {
    PathBuf::from("public")
}

fn default_origin() -> String {
    "http://localhost".into()
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    Click {
        href: String,
        #[serde(default)]
        plain: bool,
    },
    Back,
    Forward,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { href, plain: false } => write!(f, "click {href}"),
            Self::Click { href, plain: true } => write!(f, "click {href} (plain)"),
            Self::Back => f.write_str("back"),
            Self::Forward => f.write_str("forward"),
        }
    }
}

impl ReplayScript {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    fn start_url(&self) -> Result<Url> {
        let origin = Url::parse(&self.origin)
            .with_context(|| format!("invalid origin `{}`", self.origin))?;
        origin
            .join(&self.start)
            .with_context(|| format!("invalid start path `{}`", self.start))
    }
}

// =============================================================================
// Replay
// =============================================================================

/// What a replay did.
#[derive(Debug)]
pub struct ReplayReport {
    /// Outcome of every step that ran.
    pub outcomes: Vec<Outcome>,
    /// Location at the end of the session.
    pub location: Url,
    /// Cached page keys at the end of the session, oldest first.
    pub cached: Vec<PageKey>,
}

/// Run the script at `path` against its site.
pub fn run_replay(path: &Path, config: &NavConfig) -> Result<ReplayReport> {
    let script = ReplayScript::load(path)?;
    let root = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&script.site);
    let fetcher = DirFetcher::new(root);
    debug!("replay"; "serving {}", fetcher.root().display());

    let mut nav = open(&fetcher, script.start_url()?, config)?;
    let mut outcomes = Vec::with_capacity(script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        let n = index + 1;
        let outcome = match step {
            Step::Click { href, plain } => {
                let anchor = if *plain {
                    Anchor::plain(href)
                } else {
                    Anchor::opted_in(href, &config.marker)
                };
                nav.follow(&anchor, &fetcher)
            }
            Step::Back | Step::Forward => {
                let event = match step {
                    Step::Back => nav.host_mut().back(),
                    _ => nav.host_mut().forward(),
                };
                let Some(event) = event else {
                    log!("replay"; "#{} {}: no history entry, skipped", n, step);
                    continue;
                };
                nav.pop(event, &fetcher)
            }
        };
        log!("replay"; "#{} {}: {}", n, step, outcome);

        if let Some(target) = full_navigation(&nav, step, &outcome) {
            nav = open(&fetcher, target, config)?;
        }
        outcomes.push(outcome);
    }

    let cached: Vec<PageKey> = nav.cache().keys().cloned().collect();
    let listed: Vec<String> = cached.iter().map(PageKey::to_string).collect();
    log!("cache"; "{} snapshot(s): {}", cached.len(), listed.join(", "));

    Ok(ReplayReport {
        outcomes,
        location: nav.host().location(),
        cached,
    })
}

/// Load `url` as a fresh document and attach a new engine to it.
fn open(fetcher: &DirFetcher, url: Url, config: &NavConfig) -> Result<Navigator<MemoryHost>> {
    let html = fetcher
        .fetch(&url)
        .with_context(|| format!("failed to load {url}"))?;
    let host = MemoryHost::from_markup(url, &html)?;
    let mut nav = Navigator::attach(host, config.clone())
        .context("host does not support soft navigation")?;
    nav.page_loaded();
    Ok(nav)
}

/// Where the browser would go with a full page load after `outcome`.
fn full_navigation(nav: &Navigator<MemoryHost>, step: &Step, outcome: &Outcome) -> Option<Url> {
    match (outcome, step) {
        (Outcome::NotIntercepted, Step::Click { href, .. }) => nav.host().location().join(href).ok(),
        (Outcome::Reloaded(_), _) => Some(nav.host().location()),
        (Outcome::FellBack(url), _) => Some(url.clone()),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(title: &str, bundle: &str, body: &str) -> String {
        format!(
            r#"<html><head><title>{title}</title><script src="/js/blog.{bundle}.js"></script></head><body>{body}</body></html>"#
        )
    }

    fn site(script: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(public.join("blog")).unwrap();
        fs::write(public.join("blog/1.html"), page("Post 1", "a", "one")).unwrap();
        fs::write(public.join("blog/2.html"), page("Post 2", "a", "two")).unwrap();
        fs::write(public.join("blog/3.html"), page("Post 3", "b", "three")).unwrap();
        fs::write(public.join("shop.html"), page("Shop", "a", "shop")).unwrap();

        let path = dir.path().join("session.toml");
        fs::write(&path, script).unwrap();
        (dir, path)
    }

    #[test]
    fn test_parse_script() {
        let script = ReplayScript::parse(
            r#"
            start = "/blog/1"

            [[step]]
            action = "click"
            href = "/blog/2"

            [[step]]
            action = "back"
            "#,
        )
        .unwrap();

        assert_eq!(script.site, PathBuf::from("public"));
        assert_eq!(script.start_url().unwrap().as_str(), "http://localhost/blog/1");
        assert_eq!(
            script.steps,
            [
                Step::Click {
                    href: "/blog/2".into(),
                    plain: false
                },
                Step::Back
            ]
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = ReplayScript::parse(
            r#"
            start = "/"
            [[step]]
            action = "hover"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_session_with_cache_hits() {
        let (_dir, path) = site(
            r#"
            start = "/blog/1"
            [[step]]
            action = "click"
            href = "/blog/2"
            [[step]]
            action = "click"
            href = "/shop"
            [[step]]
            action = "back"
            [[step]]
            action = "forward"
            "#,
        );

        let report = run_replay(&path, &NavConfig::default()).unwrap();

        assert_eq!(
            report.outcomes,
            [
                Outcome::Swapped,
                Outcome::Swapped,
                Outcome::Restored,
                Outcome::Restored
            ]
        );
        assert_eq!(report.location.path(), "/shop");
        let sections: Vec<&str> = report.cached.iter().map(PageKey::segment).collect();
        assert_eq!(sections, ["blog", "blog", "shop"]);
    }

    #[test]
    fn test_full_navigations_start_fresh_sessions() {
        let (_dir, path) = site(
            r#"
            start = "/blog/1"
            [[step]]
            action = "back"
            [[step]]
            action = "click"
            href = "/blog/3"
            [[step]]
            action = "click"
            href = "/shop"
            plain = true
            "#,
        );

        let report = run_replay(&path, &NavConfig::default()).unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(report.outcomes[0], Outcome::Reloaded(_)));
        assert_eq!(report.outcomes[1], Outcome::NotIntercepted);
        assert_eq!(report.location.path(), "/shop");
        assert!(report.cached.is_empty());
    }

    #[test]
    fn test_missing_start_page_fails() {
        let (_dir, path) = site(r#"start = "/nowhere""#);
        assert!(run_replay(&path, &NavConfig::default()).is_err());
    }
}
