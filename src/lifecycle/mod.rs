//! Lifecycle event bus.
//!
//! Page code hooks three phases of a navigation:
//!
//! | Phase          | Fired                                   | Catch-up on register |
//! |----------------|-----------------------------------------|----------------------|
//! | `initialize`   | after every swap, before `onload`       | yes                  |
//! | `onload`       | after `initialize`; gets restored state | yes                  |
//! | `beforeunload` | when leaving a page; returns state      | no                   |
//!
//! Listeners are namespaced by script key, the primary path segment of the
//! current page. Dispatch only reaches listeners registered under the current
//! script key, in registration order. Listeners are never removed.

mod state;

pub use state::PageState;

use std::fmt;

use rustc_hash::FxHashMap;

use crate::debug;

pub type InitializeFn = dyn FnMut();
pub type OnloadFn = dyn FnMut(Option<&PageState>);
pub type BeforeunloadFn = dyn FnMut() -> Option<PageState>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Initialize,
    Onload,
    Beforeunload,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initialize => "initialize",
            Self::Onload => "onload",
            Self::Beforeunload => "beforeunload",
        })
    }
}

// =============================================================================
// Channel
// =============================================================================

/// Listeners of one phase, grouped by script key.
struct Channel<F: ?Sized> {
    by_script: FxHashMap<String, Vec<Box<F>>>,
}

impl<F: ?Sized> Channel<F> {
    fn new() -> Self {
        Self {
            by_script: FxHashMap::default(),
        }
    }

    fn push(&mut self, script_key: &str, listener: Box<F>) {
        self.by_script
            .entry(script_key.to_owned())
            .or_default()
            .push(listener);
    }

    fn listeners(&mut self, script_key: &str) -> &mut [Box<F>] {
        self.by_script
            .get_mut(script_key)
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    fn count(&self, script_key: &str) -> usize {
        self.by_script.get(script_key).map_or(0, Vec::len)
    }
}

// =============================================================================
// LifecycleBus
// =============================================================================

/// Engine-scoped listener registry.
pub struct LifecycleBus {
    initialize: Channel<InitializeFn>,
    onload: Channel<OnloadFn>,
    beforeunload: Channel<BeforeunloadFn>,
    /// Set once the first page has been left (and cached).
    navigated: bool,
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LifecycleBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleBus")
            .field("scripts", &self.initialize.by_script.len())
            .field("navigated", &self.navigated)
            .finish()
    }
}

impl LifecycleBus {
    pub fn new() -> Self {
        Self {
            initialize: Channel::new(),
            onload: Channel::new(),
            beforeunload: Channel::new(),
            navigated: false,
        }
    }

    /// Whether at least one navigation has completed in this session.
    #[inline]
    pub fn has_navigated(&self) -> bool {
        self.navigated
    }

    pub fn mark_navigated(&mut self) {
        self.navigated = true;
    }

    /// Register an `initialize` listener, running it at once if a navigation
    /// already happened.
    pub fn initialize(&mut self, script_key: &str, mut listener: impl FnMut() + 'static) {
        if self.navigated {
            listener();
        }
        self.initialize.push(script_key, Box::new(listener));
    }

    /// Register an `onload` listener, running it at once (without state) if a
    /// navigation already happened.
    pub fn onload(
        &mut self,
        script_key: &str,
        mut listener: impl FnMut(Option<&PageState>) + 'static,
    ) {
        if self.navigated {
            listener(None);
        }
        self.onload.push(script_key, Box::new(listener));
    }

    pub fn beforeunload(
        &mut self,
        script_key: &str,
        listener: impl FnMut() -> Option<PageState> + 'static,
    ) {
        self.beforeunload.push(script_key, Box::new(listener));
    }

    pub fn fire_initialize(&mut self, script_key: &str) {
        let listeners = self.initialize.listeners(script_key);
        debug!("nav"; "initialize [{}] x{}", script_key, listeners.len());
        for listener in listeners {
            listener();
        }
    }

    pub fn fire_onload(&mut self, script_key: &str, state: Option<&PageState>) {
        let listeners = self.onload.listeners(script_key);
        debug!("nav"; "onload [{}] x{}", script_key, listeners.len());
        for listener in listeners {
            listener(state);
        }
    }

    /// Run `beforeunload` listeners and merge what they return.
    ///
    /// Later listeners overwrite keys set by earlier ones.
    pub fn collect_state(&mut self, script_key: &str) -> PageState {
        let mut merged = PageState::default();
        for listener in self.beforeunload.listeners(script_key) {
            if let Some(state) = listener() {
                merged.merge(state);
            }
        }
        merged
    }

    pub fn listener_count(&self, script_key: &str, phase: Phase) -> usize {
        match phase {
            Phase::Initialize => self.initialize.count(script_key),
            Phase::Onload => self.onload.count(script_key),
            Phase::Beforeunload => self.beforeunload.count(script_key),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
