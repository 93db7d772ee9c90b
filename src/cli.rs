use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use url::Url;

use crate::config::{self, SwitcherConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Site the appearance settings live on.
    #[arg(long, default_value = config::DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Raw `Cookie` header value carrying the logged-in session.
    #[arg(long)]
    pub cookie: Option<String>,

    /// File holding the `Cookie` header value (takes precedence over `--cookie`).
    #[arg(long)]
    pub cookie_file: Option<PathBuf>,

    /// HTTP User-Agent for settings requests.
    #[arg(long, default_value = "github-theme-switcher/0.1")]
    pub user_agent: String,

    /// Viewport width below which the compact day/night toggle is shown.
    #[arg(long, default_value_t = config::COMPACT_BREAKPOINT)]
    pub compact_breakpoint: u32,

    /// Pause between flipping the day/night toggle and applying the new mode.
    #[arg(long, default_value_t = 300)]
    pub toggle_delay_ms: u64,

    /// Pause between a theme update and releasing the theme select.
    #[arg(long, default_value_t = 500)]
    pub theme_delay_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the available modes and themes, and which are active, as JSON.
    Inspect,

    /// Install the switcher into a saved page, replay UI events, and write the result.
    Inject {
        /// Saved HTML of the page to inject into.
        #[arg(long)]
        page: PathBuf,

        /// Location path the page was served from.
        #[arg(long, default_value = "/")]
        path: String,

        /// Viewport width at load.
        #[arg(long, default_value_t = 1400)]
        width: u32,

        /// Output file (defaults to stdout).
        #[arg(long)]
        out: Option<PathBuf>,

        /// Choose a mode in the mode select.
        #[arg(long)]
        mode: Option<String>,

        /// Choose a theme in the theme select.
        #[arg(long)]
        theme: Option<String>,

        /// Click the compact day/night toggle.
        #[arg(long)]
        toggle: bool,

        /// Resize the viewport after the other events.
        #[arg(long)]
        resize: Option<u32>,
    },

    /// Store a theme preference.
    SetTheme { value: String },

    /// Store a color mode preference.
    SetMode { value: String },
}

impl Args {
    pub fn switcher_config(&self) -> SwitcherConfig {
        SwitcherConfig {
            compact_breakpoint: self.compact_breakpoint,
            toggle_delay: Duration::from_millis(self.toggle_delay_ms),
            theme_settle_delay: Duration::from_millis(self.theme_delay_ms),
            ..SwitcherConfig::with_base_url(self.base_url.clone())
        }
    }
}
