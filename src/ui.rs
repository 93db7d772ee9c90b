use anyhow::Context as _;
use kuchiki::NodeRef;
use maud::{Markup, PreEscaped, html};

use crate::dom;
use crate::parser::AppearanceSettings;

pub const HEADER_SELECTOR: &str = ".AppHeader-globalBar-end";
pub const SEARCH_SELECTOR: &str = ".AppHeader-search";
pub const MODE_SELECT_ID: &str = "github-mode-switcher-select";
pub const THEME_SELECT_ID: &str = "github-theme-switcher-select";

const SPINNER_SVG: &str = r##"<svg width="16" height="16" viewBox="0 0 16 16" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="8" cy="8" r="7" stroke="#57606a" stroke-width="2" opacity="0.25"/><path d="M15 8A7 7 0 1 1 8 1" stroke="#57606a" stroke-width="2" stroke-linecap="round"><animateTransform attributeName="transform" type="rotate" from="0 8 8" to="360 8 8" dur="0.7s" repeatCount="indefinite"/></path></svg>"##;

/// Handles to every control the switcher wires up after insertion.
pub struct Controls {
    pub wrapper: NodeRef,
    pub mode_select: NodeRef,
    pub theme_select: NodeRef,
    pub spinner: NodeRef,
    pub tooltip: NodeRef,
    pub toggle_row: NodeRef,
    pub toggle: NodeRef,
    pub dark_label: NodeRef,
    pub light_label: NodeRef,
}

impl Controls {
    /// Moves the compact toggle to the given mode.
    pub fn set_toggle(&self, mode: &str) {
        let dark = mode == "dark";
        dom::set_class(&self.toggle, "dark", dark);
        dom::set_class(&self.toggle_row, "dark", dark);
        dom::set_class(&self.dark_label, "active", dark);
        dom::set_class(&self.light_label, "active", !dark);
    }

    pub fn toggle_shows_dark(&self) -> bool {
        dom::has_class(&self.toggle, "dark")
    }

    pub fn show_spinner(&self) {
        dom::set_attr(&self.theme_select, "disabled", "");
        dom::set_style(&self.spinner, "display", "block");
    }

    pub fn hide_spinner(&self) {
        dom::set_style(&self.spinner, "display", "none");
        dom::remove_attr(&self.theme_select, "disabled");
    }

    pub fn theme_select_busy(&self) -> bool {
        dom::has_attr(&self.theme_select, "disabled")
    }
}

fn insert_at(header: &NodeRef, node: NodeRef) {
    match search_sibling(header) {
        Some(search) => search.insert_before(node),
        None => header.append(node),
    }
}

/// The page's first search box, only when it sits directly inside `header`.
fn search_sibling(header: &NodeRef) -> Option<NodeRef> {
    let search = dom::select_first(&dom::owner_document(header), SEARCH_SELECTOR)?;
    let parent = search.parent()?;
    dom::same_node(&parent, header).then_some(search)
}

fn loading_markup() -> Markup {
    html! {
        div class="theme-switcher-wrapper loading" {
            span class="theme-switcher-spinner" style="display: block" { (PreEscaped(SPINNER_SVG)) }
            span style="color: #57606a; font-size: 14px" { "Loading theme switcher..." }
        }
    }
}

pub fn insert_loading_placeholder(header: &NodeRef) -> anyhow::Result<NodeRef> {
    let placeholder = dom::fragment(
        &loading_markup().into_string(),
        "div.theme-switcher-wrapper",
    )
    .context("render loading placeholder")?;
    insert_at(header, placeholder.clone());
    Ok(placeholder)
}

fn switcher_markup(settings: &AppearanceSettings) -> Markup {
    html! {
        div class="theme-switcher-wrapper" {
            div class="theme-switcher-toggle-row" style="display: none" {
                span class="theme-switcher-toggle-label" data-side="dark" { "Dark" }
                div class="theme-switcher-toggle" {
                    div class="toggle-thumb" {}
                }
                span class="theme-switcher-toggle-label" data-side="light" { "Light" }
            }
            select class="form-select" id=(MODE_SELECT_ID) {
                @for mode in &settings.modes {
                    option value=(mode.value) selected[mode.selected] { (mode.label) }
                }
            }
            select class="form-select" id=(THEME_SELECT_ID) {
                @for theme in &settings.themes {
                    option value=(theme.value) selected[theme.checked] {
                        @if theme.label.is_empty() { (theme.value) } @else { (theme.label) }
                    }
                }
            }
            span class="theme-switcher-spinner" style="display: none" { (PreEscaped(SPINNER_SVG)) }
        }
        tool-tip for=(THEME_SELECT_ID) popover="manual" data-direction="s" data-type="label"
            data-view-component="true" role="tooltip" class="position-absolute sr-only"
            style="position: absolute; z-index: 1000; pointer-events: none; visibility: hidden" {
            "Select GitHub theme"
        }
    }
}

fn required(root: &NodeRef, selector: &str) -> anyhow::Result<NodeRef> {
    dom::select_first(root, selector).with_context(|| format!("rendered switcher lacks {selector}"))
}

/// Renders the switcher, swaps it in for `placeholder` and returns its controls.
pub fn build(
    header: &NodeRef,
    settings: &AppearanceSettings,
    placeholder: Option<&NodeRef>,
) -> anyhow::Result<Controls> {
    let markup = switcher_markup(settings).into_string();
    let wrapper = dom::fragment(&markup, "div.theme-switcher-wrapper")
        .context("render theme switcher")?;
    let tooltip = dom::fragment(&markup, "tool-tip").context("render theme tooltip")?;

    let controls = Controls {
        mode_select: required(&wrapper, &format!("#{MODE_SELECT_ID}"))?,
        theme_select: required(&wrapper, &format!("#{THEME_SELECT_ID}"))?,
        spinner: required(&wrapper, "span.theme-switcher-spinner")?,
        toggle_row: required(&wrapper, "div.theme-switcher-toggle-row")?,
        toggle: required(&wrapper, "div.theme-switcher-toggle")?,
        dark_label: required(&wrapper, r#"span[data-side="dark"]"#)?,
        light_label: required(&wrapper, r#"span[data-side="light"]"#)?,
        wrapper,
        tooltip,
    };

    if let Some(placeholder) = placeholder {
        placeholder.detach();
    }
    insert_at(header, controls.wrapper.clone());
    insert_at(header, controls.tooltip.clone());
    Ok(controls)
}
