//! Head reconciliation.
//!
//! Incoming head elements are planned against the registry first and applied
//! only when nothing is stale, so a version mismatch leaves the live document
//! untouched:
//!
//! ```text
//! incoming head ──plan──> Stale(resource)          -> caller forces reload
//!                    └──> Apply(Reconciliation)   ─commit─> title, links, markup
//!                                                   └─> staged scripts
//! ```

use rustc_hash::FxHashMap;

use super::registry::HeadRegistry;
use super::resource::{HeadEntry, ResourceKind, classify};
use crate::config::NavConfig;
use crate::host::Document;
use crate::markup::HeadElement;

/// A tracked resource whose version differs from the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleResource {
    pub identity: String,
    pub current: String,
    pub incoming: String,
}

/// Outcome of planning an incoming head.
#[derive(Debug)]
pub enum HeadPlan {
    Apply(Reconciliation),
    Stale(StaleResource),
}

/// Changes to make to the live head, in incoming document order.
#[derive(Debug, Default)]
pub struct Reconciliation {
    registrations: Vec<(String, String)>,
    appends: Vec<HeadElement>,
    scripts: Vec<HeadElement>,
    title: Option<String>,
    kept: usize,
}

impl Reconciliation {
    /// Title to apply, the last `<title>` of the incoming head.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Elements appended to the live head during commit.
    pub fn appends(&self) -> &[HeadElement] {
        &self.appends
    }

    /// Scripts staged until after lifecycle dispatch.
    pub fn scripts(&self) -> &[HeadElement] {
        &self.scripts
    }

    /// Elements already present and left alone.
    pub fn kept(&self) -> usize {
        self.kept
    }

    /// Register new entries, apply the title, and append non-script
    /// elements. Returns the staged scripts for the caller to append once
    /// the new page is initialized.
    pub fn commit<D>(self, registry: &mut HeadRegistry, document: &mut D) -> Vec<HeadElement>
    where
        D: Document + ?Sized,
    {
        for (identity, version) in self.registrations {
            registry.insert(identity, version);
        }
        if let Some(title) = &self.title {
            document.set_title(title);
        }
        for element in &self.appends {
            document.append_head(element);
        }
        self.scripts
    }
}

/// Classify every incoming head element against the registry.
///
/// Stops at the first tracked resource whose version changed.
pub fn plan(registry: &HeadRegistry, incoming: &[HeadElement], config: &NavConfig) -> HeadPlan {
    // entries registered earlier in this same pass
    let mut pending: FxHashMap<String, String> = FxHashMap::default();
    let mut plan = Reconciliation::default();

    for element in incoming {
        match classify(element, config) {
            HeadEntry::Title(title) => plan.title = Some(title),

            HeadEntry::Resource {
                kind,
                identity,
                version,
            } => {
                let known = pending
                    .get(&identity)
                    .map(String::as_str)
                    .or_else(|| registry.version(&identity))
                    .map(str::to_owned);

                match known {
                    None => {
                        pending.insert(identity.clone(), version.clone());
                        plan.registrations.push((identity, version));
                        match kind {
                            ResourceKind::Script => plan.scripts.push(element.clone()),
                            ResourceKind::Link => plan.appends.push(element.clone()),
                        }
                    }
                    Some(current) if current != version => {
                        return HeadPlan::Stale(StaleResource {
                            identity,
                            current,
                            incoming: version,
                        });
                    }
                    Some(_) => plan.kept += 1,
                }
            }

            HeadEntry::Markup(markup) => {
                if pending.contains_key(&markup) || registry.contains(&markup) {
                    plan.kept += 1;
                } else {
                    pending.insert(markup.clone(), String::new());
                    plan.registrations.push((markup, String::new()));
                    plan.appends.push(element.clone());
                }
            }
        }
    }

    HeadPlan::Apply(plan)
}
