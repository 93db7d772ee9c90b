use std::time::Duration;

use url::Url;

use crate::error::SwitcherError;

pub const DEFAULT_BASE_URL: &str = "https://github.com/";
pub const SETTINGS_PATH: &str = "/settings/appearance";
pub const UPDATE_PATH: &str = "/settings/appearance/color_mode";

/// Below this viewport width the compact day/night toggle replaces the selects.
pub const COMPACT_BREAKPOINT: u32 = 1360;

/// Lets the toggle animation finish before stylesheets are swapped.
pub const TOGGLE_DELAY: Duration = Duration::from_millis(300);

/// Pacing between a theme update and releasing the theme select.
pub const THEME_SETTLE_DELAY: Duration = Duration::from_millis(500);

pub const TOOLTIP_OFFSET_PX: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct SwitcherConfig {
    pub base_url: Url,
    pub settings_path: String,
    pub update_path: String,
    pub compact_breakpoint: u32,
    pub toggle_delay: Duration,
    pub theme_settle_delay: Duration,
    pub tooltip_offset: f64,
}

impl SwitcherConfig {
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn settings_url(&self) -> Result<Url, SwitcherError> {
        self.join(&self.settings_path)
    }

    pub fn update_url(&self) -> Result<Url, SwitcherError> {
        self.join(&self.update_path)
    }

    pub fn is_settings_page(&self, path: &str) -> bool {
        path.trim_end_matches('/') == self.settings_path.trim_end_matches('/')
    }

    fn join(&self, path: &str) -> Result<Url, SwitcherError> {
        self.base_url
            .join(path)
            .map_err(|source| SwitcherError::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url"),
            settings_path: SETTINGS_PATH.to_string(),
            update_path: UPDATE_PATH.to_string(),
            compact_breakpoint: COMPACT_BREAKPOINT,
            toggle_delay: TOGGLE_DELAY,
            theme_settle_delay: THEME_SETTLE_DELAY,
            tooltip_offset: TOOLTIP_OFFSET_PX,
        }
    }
}
