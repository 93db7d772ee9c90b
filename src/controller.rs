use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::task::JoinHandle;

use crate::apply;
use crate::config::SwitcherConfig;
use crate::dom;
use crate::fetcher::{Fetcher, PreferenceUpdate};
use crate::form::{FormSource, HOST_MODE_CONTROL};
use crate::page::Page;
use crate::parser::AppearanceSettings;
use crate::responsive::{self, SINGLE_MODE};
use crate::ui::Controls;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    /// A theme update is in flight and the theme select is locked.
    Submitting,
}

/// Bounding box of the hovered control, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ModeSelected(String),
    ThemeSelected(String),
    ToggleClicked,
    Resized(u32),
    PointerEntered(Rect),
    PointerLeft,
}

/// The installed switcher: its controls plus everything the event handlers
/// need to keep the page, the source form and the stored preference in step.
pub struct Switcher {
    page: Rc<Page>,
    source: Box<dyn FormSource>,
    settings: AppearanceSettings,
    controls: Controls,
    client: Fetcher,
    config: SwitcherConfig,
    state: Cell<SyncState>,
    background: RefCell<Vec<JoinHandle<()>>>,
}

impl Switcher {
    pub(crate) fn new(
        page: Rc<Page>,
        source: Box<dyn FormSource>,
        settings: AppearanceSettings,
        controls: Controls,
        client: Fetcher,
        config: SwitcherConfig,
    ) -> Self {
        Self {
            page,
            source,
            settings,
            controls,
            client,
            config,
            state: Cell::new(SyncState::Idle),
            background: RefCell::new(Vec::new()),
        }
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn settings(&self) -> &AppearanceSettings {
        &self.settings
    }

    pub fn source(&self) -> &dyn FormSource {
        &*self.source
    }

    pub fn state(&self) -> SyncState {
        self.state.get()
    }

    pub fn mode_value(&self) -> String {
        dom::select_value(&self.controls.mode_select)
    }

    pub fn theme_value(&self) -> String {
        dom::select_value(&self.controls.theme_select)
    }

    fn on_settings_page(&self) -> bool {
        self.config.is_settings_page(self.page.path())
    }

    /// Initial toggle position and layout for a fresh install.
    pub(crate) fn init(&self) {
        let light = apply::current_mode(&*self.page).as_deref() == Some("light");
        self.controls.set_toggle(if light { "light" } else { "dark" });
        self.relayout();
    }

    fn relayout(&self) {
        let layout = responsive::layout_for(
            self.page.viewport_width(),
            self.config.compact_breakpoint,
            &self.mode_value(),
        );
        responsive::apply(&self.controls, layout);
    }

    pub async fn handle(&self, event: UiEvent) -> anyhow::Result<()> {
        tracing::debug!(?event, state = ?self.state.get(), "switcher event");
        match event {
            UiEvent::ModeSelected(mode) => self.on_mode_selected(&mode).await,
            UiEvent::ThemeSelected(theme) => self.on_theme_selected(&theme).await,
            UiEvent::ToggleClicked => {
                self.on_toggle_clicked().await;
                Ok(())
            }
            UiEvent::Resized(width) => {
                self.page.set_viewport_width(width);
                self.relayout();
                Ok(())
            }
            UiEvent::PointerEntered(rect) => {
                self.show_tooltip(rect);
                Ok(())
            }
            UiEvent::PointerLeft => {
                dom::set_style(&self.controls.tooltip, "visibility", "hidden");
                Ok(())
            }
        }
    }

    async fn on_mode_selected(&self, mode: &str) -> anyhow::Result<()> {
        if !dom::has_option(&self.controls.mode_select, mode) {
            tracing::warn!(mode, "mode not offered by the switcher; ignoring");
            return Ok(());
        }
        dom::set_select_value(&self.controls.mode_select, mode);
        dom::set_displayed(
            &self.controls.theme_select,
            responsive::theme_select_visible(
                self.page.viewport_width(),
                self.config.compact_breakpoint,
                mode,
            ),
        );

        if self.on_settings_page() {
            match self.page.select_first(HOST_MODE_CONTROL) {
                Some(real) => {
                    dom::set_select_value(&real, mode);
                    self.page.dispatch(&real, "change");
                }
                None => tracing::warn!(mode, "host mode control not found"),
            }
            return Ok(());
        }

        if mode != SINGLE_MODE {
            self.submit(PreferenceUpdate::Mode(mode.to_string())).await?;
            apply::apply_mode(&*self.page, mode);
            self.page.request_reload();
            return Ok(());
        }

        let theme = self.theme_value();
        if !theme.is_empty() {
            self.submit(PreferenceUpdate::Theme(theme.clone())).await?;
        }
        apply::apply_mode(&*self.page, &theme);
        Ok(())
    }

    async fn on_theme_selected(&self, theme: &str) -> anyhow::Result<()> {
        if self.state.get() == SyncState::Submitting || self.controls.theme_select_busy() {
            tracing::debug!(theme, "theme select busy; ignoring");
            return Ok(());
        }
        if !dom::has_option(&self.controls.theme_select, theme) {
            tracing::warn!(theme, "theme not offered by the switcher; ignoring");
            return Ok(());
        }
        dom::set_select_value(&self.controls.theme_select, theme);

        if self.on_settings_page() {
            if !self.source.click_theme_radio(theme) {
                tracing::warn!(theme, "no theme radio for selection");
            }
            return Ok(());
        }

        self.state.set(SyncState::Submitting);
        self.controls.show_spinner();
        if let Err(err) = self.submit(PreferenceUpdate::Theme(theme.to_string())).await {
            self.controls.hide_spinner();
            self.state.set(SyncState::Idle);
            return Err(err);
        }
        apply::swap_theme_stylesheets(&*self.page, theme);

        tokio::time::sleep(self.config.theme_settle_delay).await;
        self.controls.hide_spinner();
        apply::apply_theme(&*self.page, theme);
        self.source.click_theme_radio(theme);
        self.state.set(SyncState::Idle);
        Ok(())
    }

    async fn on_toggle_clicked(&self) {
        let light = apply::current_mode(&*self.page).as_deref() == Some("light");
        let next = if light { "dark" } else { "light" };
        self.controls.set_toggle(next);

        tokio::time::sleep(self.config.toggle_delay).await;
        apply::apply_theme(&*self.page, next);
        apply::swap_theme_stylesheets(&*self.page, next);
        self.submit_in_background(PreferenceUpdate::Mode(next.to_string()));
        dom::set_select_value(&self.controls.theme_select, next);
    }

    fn show_tooltip(&self, anchor: Rect) {
        let (scroll_x, scroll_y) = self.page.scroll();
        let top = format!("{}px", anchor.bottom + scroll_y + self.config.tooltip_offset);
        let left = format!("{}px", anchor.left + scroll_x);
        let tooltip = &self.controls.tooltip;
        dom::set_style(tooltip, "--tool-tip-position-top", &top);
        dom::set_style(tooltip, "--tool-tip-position-left", &left);
        dom::set_style(tooltip, "top", &top);
        dom::set_style(tooltip, "left", &left);
        dom::set_style(tooltip, "visibility", "visible");
    }

    async fn submit(&self, update: PreferenceUpdate) -> anyhow::Result<()> {
        let url = self.config.update_url()?;
        self.client
            .submit(url, &self.settings.token, &update)
            .await
    }

    fn submit_in_background(&self, update: PreferenceUpdate) {
        let url = match self.config.update_url() {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(error = %err, "skipping preference update");
                return;
            }
        };
        let client = self.client.clone();
        let token = self.settings.token.clone();
        let handle = tokio::spawn(async move {
            if let Err(err) = client.submit(url, &token, &update).await {
                tracing::warn!("background preference update failed: {err:#}");
            }
        });
        let mut background = self.background.borrow_mut();
        background.retain(|h| !h.is_finished());
        background.push(handle);
    }

    /// Waits for preference updates that were sent without blocking the UI.
    pub async fn settle(&self) {
        let pending: Vec<_> = self.background.borrow_mut().drain(..).collect();
        for handle in pending {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "background preference update aborted");
            }
        }
    }
}
