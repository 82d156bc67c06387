//! Browser binding.
//!
//! Binds one [`Navigator`] to the page's window for the lifetime of the
//! module:
//!
//! ```text
//! click (document) ──> begin_link ──> gloo-net GET ──> complete
//! popstate (window) ─> traverse ─┬─> restored in place
//!                                └─> gloo-net GET ──> complete
//! load (window) ─────> page_loaded
//! ```
//!
//! Page scripts register listeners through the exported `initialize`,
//! `onload` and `beforeunload` functions. Registrations made while the
//! engine is busy (a listener registering another listener) are queued and
//! applied once the engine is released. State crosses the boundary as JSON.

use std::cell::RefCell;

use gloo_net::http::Request;
use js_sys::{Function, JSON, Object, Reflect};
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, HtmlElement, MouseEvent, PopStateEvent, ScrollRestoration, Window};

use super::{Document, FetchError, History, Host, PopEvent};
use crate::config::NavConfig;
use crate::lifecycle::PageState;
use crate::markup::{BodyMarkup, HeadElement, parse_head};
use crate::nav::{Anchor, FetchTicket, Navigator, Traversal};
use crate::page::PageKey;
use crate::{debug, log};

// =============================================================================
// WebHost
// =============================================================================

/// Host backed by the real window, document and session history.
pub struct WebHost {
    window: Window,
    document: web_sys::Document,
    /// Location at attach time, used if `location.href` is unreadable.
    fallback: Url,
}

impl WebHost {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let fallback = Url::parse(&window.location().href().ok()?).ok()?;
        Some(Self {
            window,
            document,
            fallback,
        })
    }

    fn create(&self, tag: &str, attrs: &[(String, Option<String>)]) -> Option<Element> {
        let element = self.document.create_element(tag).ok()?;
        for (name, value) in attrs {
            let value = value.as_deref().unwrap_or("");
            if element.set_attribute(name, value).is_err() {
                debug!("nav"; "skipping attribute `{}` on <{}>", name, tag);
            }
        }
        Some(element)
    }

    fn history(&self) -> Option<web_sys::History> {
        self.window.history().ok()
    }

    fn key_state(key: &PageKey) -> JsValue {
        let state = Object::new();
        let _ = Reflect::set(
            &state,
            &JsValue::from_str("key"),
            &JsValue::from_str(&key.to_string()),
        );
        state.into()
    }
}

impl Document for WebHost {
    type Body = Option<HtmlElement>;

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    fn set_body(&mut self, body: Option<HtmlElement>) {
        self.document.set_body(body.as_ref());
    }

    fn replace_body(&mut self, markup: &BodyMarkup) {
        let Some(body) = self
            .create("body", &markup.attrs)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            log!("error"; "could not create replacement body");
            return;
        };
        body.set_inner_html(&markup.inner_html);
        self.document.set_body(Some(&body));
    }

    fn title(&self) -> String {
        self.document.title()
    }

    fn set_title(&mut self, title: &str) {
        self.document.set_title(title);
    }

    fn scroll_offset(&self) -> f64 {
        self.document
            .document_element()
            .map_or(0.0, |root| f64::from(root.scroll_top()))
    }

    fn scroll_to(&mut self, offset: f64) {
        self.window.scroll_to_with_x_and_y(0.0, offset);
    }

    fn head_elements(&self) -> Vec<HeadElement> {
        let Some(head) = self.document.head() else {
            return Vec::new();
        };
        parse_head(&head.outer_html()).unwrap_or_default()
    }

    fn append_head(&mut self, element: &HeadElement) {
        let Some(head) = self.document.head() else {
            return;
        };
        let Some(node) = self.create(element.tag(), element.attrs()) else {
            log!("error"; "could not create <{}>", element.tag());
            return;
        };
        node.set_inner_html(element.inner_html());
        if head.append_child(&node).is_err() {
            log!("error"; "could not append <{}> to head", element.tag());
        }
    }
}

impl History for WebHost {
    fn location(&self) -> Url {
        self.window
            .location()
            .href()
            .ok()
            .and_then(|href| Url::parse(&href).ok())
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn push_state(&mut self, key: &PageKey, url: &Url) {
        let pushed = self.history().map(|history| {
            history.push_state_with_url(&Self::key_state(key), "", Some(url.as_str()))
        });
        if !matches!(pushed, Some(Ok(()))) {
            log!("error"; "pushState to {} failed", url);
        }
    }

    fn replace_state(&mut self, key: &PageKey, url: &Url) {
        let replaced = self.history().map(|history| {
            history.replace_state_with_url(&Self::key_state(key), "", Some(url.as_str()))
        });
        if !matches!(replaced, Some(Ok(()))) {
            log!("error"; "replaceState to {} failed", url);
        }
    }

    fn manual_scroll_restoration(&mut self) {
        let Some(history) = self.history() else {
            return;
        };
        if let Err(err) = history.set_scroll_restoration(ScrollRestoration::Manual) {
            debug!("nav"; "manual scroll restoration unavailable: {:?}", err);
        }
    }

    fn reload(&mut self) {
        if let Err(err) = self.window.location().reload() {
            log!("error"; "reload failed: {:?}", err);
        }
    }

    fn assign(&mut self, url: &Url) {
        if let Err(err) = self.window.location().assign(url.as_str()) {
            log!("error"; "navigation to {} failed: {:?}", url, err);
        }
    }
}

impl Host for WebHost {
    fn supports_soft_navigation(&self) -> bool {
        let Some(history) = self.history() else {
            return false;
        };
        self.document.head().is_some()
            && Reflect::has(&history, &JsValue::from_str("pushState")).unwrap_or(false)
    }
}

// =============================================================================
// Engine slot
// =============================================================================

enum Registration {
    Initialize(Function),
    Onload(Function),
    Beforeunload(Function),
}

impl Registration {
    fn apply(self, nav: &mut Navigator<WebHost>) {
        match self {
            Self::Initialize(callback) => nav.initialize(move || {
                report(callback.call0(&JsValue::NULL));
            }),
            Self::Onload(callback) => nav.onload(move |state| {
                let arg = state.and_then(state_to_js).unwrap_or(JsValue::UNDEFINED);
                report(callback.call1(&JsValue::NULL, &arg));
            }),
            Self::Beforeunload(callback) => nav.beforeunload(move || {
                match callback.call0(&JsValue::NULL) {
                    Ok(value) => state_from_js(&value),
                    Err(err) => {
                        report(Err(err));
                        None
                    }
                }
            }),
        }
    }
}

thread_local! {
    static ENGINE: RefCell<Option<Navigator<WebHost>>> = const { RefCell::new(None) };
    static PENDING: RefCell<Vec<Registration>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` against the engine, then apply queued registrations.
///
/// Returns `None` if there is no engine or it is already in use.
fn with_engine<R>(f: impl FnOnce(&mut Navigator<WebHost>) -> R) -> Option<R> {
    let result = ENGINE.with(|slot| {
        let mut slot = slot.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    });
    drain_pending();
    result
}

fn drain_pending() {
    ENGINE.with(|slot| {
        let Ok(mut slot) = slot.try_borrow_mut() else {
            return;
        };
        let Some(nav) = slot.as_mut() else {
            return;
        };
        // catch-up listeners may register more while we apply
        loop {
            let batch = PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()));
            if batch.is_empty() {
                break;
            }
            for registration in batch {
                registration.apply(nav);
            }
        }
    });
}

fn register(registration: Registration) {
    PENDING.with(|pending| pending.borrow_mut().push(registration));
    drain_pending();
}

fn report(result: Result<JsValue, JsValue>) {
    if let Err(err) = result {
        log!("error"; "listener threw: {:?}", err);
    }
}

fn state_to_js(state: &PageState) -> Option<JsValue> {
    let json = serde_json::to_string(state).ok()?;
    JSON::parse(&json).ok()
}

fn state_from_js(value: &JsValue) -> Option<PageState> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    let json = JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str::<serde_json::Value>(&json)
        .ok()
        .map(PageState::from)
}

// =============================================================================
// Exports
// =============================================================================

/// Register a callback run after every navigation into the calling section.
#[wasm_bindgen]
pub fn initialize(callback: Function) {
    register(Registration::Initialize(callback));
}

/// Register a callback run after `initialize`; receives restored state.
#[wasm_bindgen]
pub fn onload(callback: Function) {
    register(Registration::Onload(callback));
}

/// Register a callback whose returned object is saved when leaving the page.
#[wasm_bindgen]
pub fn beforeunload(callback: Function) {
    register(Registration::Beforeunload(callback));
}

#[wasm_bindgen(start)]
pub fn start() {
    let Some(host) = WebHost::new() else {
        return;
    };
    let Some(nav) = Navigator::attach(host, NavConfig::default()) else {
        return;
    };
    ENGINE.with(|slot| *slot.borrow_mut() = Some(nav));

    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(document) = window.document() {
        listen(&document, "click", on_click);
    }
    listen(&window, "popstate", on_popstate);
    listen(&window, "load", on_load);
}

// =============================================================================
// Event handlers
// =============================================================================

fn listen(target: &web_sys::EventTarget, name: &str, handler: fn(Event)) {
    let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
    if target
        .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
        .is_err()
    {
        log!("error"; "could not listen for `{}`", name);
    }
    callback.forget();
}

fn on_load(_event: Event) {
    with_engine(Navigator::page_loaded);
}

fn on_click(event: Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    // leave new-tab and download gestures to the browser
    if mouse.default_prevented()
        || mouse.button() != 0
        || mouse.ctrl_key()
        || mouse.meta_key()
        || mouse.shift_key()
        || mouse.alt_key()
    {
        return;
    }

    let Some(anchor) = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest("a").ok().flatten())
        .map(|element| anchor_of(&element))
    else {
        return;
    };

    let Some(ticket) = with_engine(|nav| nav.begin_link(&anchor)).flatten() else {
        return;
    };
    event.prevent_default();
    spawn_local(finish(ticket));
}

fn on_popstate(event: Event) {
    let key = event
        .dyn_ref::<PopStateEvent>()
        .and_then(|pop| key_of(&pop.state()));
    let url = web_sys::window()
        .and_then(|window| window.location().href().ok())
        .and_then(|href| Url::parse(&href).ok());

    if let Some(Traversal::Fetch(ticket)) = with_engine(|nav| nav.traverse(PopEvent { key, url }))
    {
        spawn_local(finish(ticket));
    }
}

async fn finish(ticket: FetchTicket) {
    let response = fetch_text(ticket.url()).await;
    if let Some(outcome) = with_engine(|nav| nav.complete(ticket, response)) {
        debug!("nav"; "{}", outcome);
    }
}

async fn fetch_text(url: &Url) -> Result<String, FetchError> {
    let response = Request::get(url.as_str())
        .send()
        .await
        .map_err(|err| FetchError::network(url, err.to_string()))?;
    response.text().await.map_err(|err| FetchError::Body {
        url: url.to_string(),
        reason: err.to_string(),
    })
}

fn anchor_of(element: &Element) -> Anchor {
    let attrs = element
        .get_attribute_names()
        .iter()
        .filter_map(|name| name.as_string())
        .map(|name| {
            let value = element.get_attribute(&name);
            (name, value)
        })
        .collect();
    Anchor::new(attrs)
}

fn key_of(state: &JsValue) -> Option<PageKey> {
    Reflect::get(state, &JsValue::from_str("key"))
        .ok()?
        .as_string()?
        .parse()
        .ok()
}
