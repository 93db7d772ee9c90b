use std::cell::{Cell, RefCell};

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;

use crate::apply::PageSink;
use crate::dom;

const THEME_LINK_SELECTOR: &str = "link[data-color-theme]";

/// A synthetic DOM event fired on one of the host page's own controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub kind: String,
    pub target: String,
    pub value: String,
}

/// Headless stand-in for the browser window: the live document plus the
/// bits of window state the switcher reads and writes.
pub struct Page {
    document: NodeRef,
    path: String,
    viewport_width: Cell<u32>,
    scroll: Cell<(f64, f64)>,
    reload_requested: Cell<bool>,
    dispatched: RefCell<Vec<DispatchedEvent>>,
}

impl Page {
    pub fn parse(html: &str, path: impl Into<String>, viewport_width: u32) -> Self {
        Self {
            document: kuchiki::parse_html().one(html),
            path: path.into(),
            viewport_width: Cell::new(viewport_width),
            scroll: Cell::new((0.0, 0.0)),
            reload_requested: Cell::new(false),
            dispatched: RefCell::new(Vec::new()),
        }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    pub fn root(&self) -> Option<NodeRef> {
        dom::select_first(&self.document, "html")
    }

    pub fn select_first(&self, selector: &str) -> Option<NodeRef> {
        dom::select_first(&self.document, selector)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width.get()
    }

    pub fn set_viewport_width(&self, width: u32) {
        self.viewport_width.set(width);
    }

    pub fn scroll(&self) -> (f64, f64) {
        self.scroll.get()
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        self.scroll.set((x, y));
    }

    pub fn request_reload(&self) {
        tracing::info!(path = %self.path, "page reload requested");
        self.reload_requested.set(true);
    }

    pub fn reload_requested(&self) -> bool {
        self.reload_requested.get()
    }

    pub fn dispatch(&self, target: &NodeRef, kind: &str) {
        let name = dom::attr(target, "id")
            .or_else(|| dom::attr(target, "name"))
            .unwrap_or_default();
        let value = if target
            .as_element()
            .is_some_and(|el| el.name.local.as_ref() == "select")
        {
            dom::select_value(target)
        } else {
            dom::attr(target, "value").unwrap_or_default()
        };
        tracing::debug!(kind, target = %name, value = %value, "dispatch host event");
        self.dispatched.borrow_mut().push(DispatchedEvent {
            kind: kind.to_string(),
            target: name,
            value,
        });
    }

    pub fn dispatched(&self) -> Vec<DispatchedEvent> {
        self.dispatched.borrow().clone()
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        dom::serialize(&self.document)
    }

    fn theme_links(&self) -> Vec<NodeRef> {
        dom::select_all(&self.document, THEME_LINK_SELECTOR)
    }
}

impl PageSink for Page {
    fn root_attribute(&self, name: &str) -> Option<String> {
        self.root().and_then(|root| dom::attr(&root, name))
    }

    fn set_root_attribute(&self, name: &str, value: &str) {
        if let Some(root) = self.root() {
            dom::set_attr(&root, name, value);
        }
    }

    fn theme_link_families(&self) -> Vec<String> {
        self.theme_links()
            .iter()
            .map(|link| dom::attr(link, "data-color-theme").unwrap_or_default())
            .collect()
    }

    fn set_theme_link_active(&self, index: usize, active: bool) {
        let Some(link) = self.theme_links().into_iter().nth(index) else {
            return;
        };
        if active {
            if let Some(href) = dom::attr(&link, "data-href") {
                dom::set_attr(&link, "href", &href);
            }
            dom::set_attr(&link, "media", "all");
        } else {
            dom::remove_attr(&link, "href");
            dom::set_attr(&link, "media", "not all");
        }
    }
}
