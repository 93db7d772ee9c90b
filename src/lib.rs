mod apply;
mod cli;
mod config;
mod controller;
pub mod dom;
mod error;
mod fetcher;
mod form;
mod page;
mod parser;
mod responsive;
pub mod ui;

use std::path::Path;
use std::rc::Rc;

use anyhow::Context as _;
use cli::{Args, Command};

pub use apply::PageSink;
pub use cli::{Args as CliArgs, Command as CliCommand};
pub use config::SwitcherConfig;
pub use controller::{Rect, Switcher, SyncState, UiEvent};
pub use error::{FailureKind, SwitcherError};
pub use fetcher::{Fetcher, PreferenceUpdate};
pub use form::FormSource;
pub use page::{DispatchedEvent, Page};
pub use parser::{AppearanceSettings, ModeOption, ThemeOption};
pub use ui::Controls;

/// Installs the switcher into `page`'s header.
///
/// Returns `Ok(None)` when the page has no header to host it. If the settings
/// form cannot be located or parsed, the loading placeholder is removed and
/// the page is left as it was.
pub async fn install(
    page: Rc<Page>,
    client: Fetcher,
    config: SwitcherConfig,
) -> anyhow::Result<Option<Switcher>> {
    let Some(header) = page.select_first(ui::HEADER_SELECTOR) else {
        tracing::debug!(path = page.path(), "no header insertion point");
        return Ok(None);
    };
    let placeholder = ui::insert_loading_placeholder(&header)?;

    let loaded = async {
        let source = form::locate(&page, &client, &config).await?;
        let settings = parser::parse(&*source)?;
        Ok::<_, SwitcherError>((source, settings))
    }
    .await;
    let (source, settings) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::error!(error = %err, kind = ?err.kind(), "theme switcher not installed");
            placeholder.detach();
            return Err(err.into());
        }
    };
    tracing::info!(
        modes = settings.modes.len(),
        themes = settings.themes.len(),
        live = source.is_live(),
        "appearance settings loaded"
    );

    let controls = match ui::build(&header, &settings, Some(&placeholder)) {
        Ok(controls) => controls,
        Err(err) => {
            placeholder.detach();
            return Err(err);
        }
    };
    let switcher = Switcher::new(page, source, settings, controls, client, config);
    switcher.init();
    Ok(Some(switcher))
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let cookie = load_cookie(args.cookie.as_deref(), args.cookie_file.as_deref())?;
    if cookie.is_none() {
        tracing::warn!("no session cookie given; requests are anonymous");
    }
    let fetcher = Fetcher::new(&args.user_agent, cookie.as_deref())?;
    let config = args.switcher_config();

    match args.command {
        Command::Inspect => inspect(&fetcher, &config).await,
        Command::Inject {
            page,
            path,
            width,
            out,
            mode,
            theme,
            toggle,
            resize,
        } => {
            let mut events = Vec::new();
            if let Some(mode) = mode {
                events.push(UiEvent::ModeSelected(mode));
            }
            if let Some(theme) = theme {
                events.push(UiEvent::ThemeSelected(theme));
            }
            if toggle {
                events.push(UiEvent::ToggleClicked);
            }
            if let Some(width) = resize {
                events.push(UiEvent::Resized(width));
            }
            let target = InjectTarget {
                page: &page,
                path,
                width,
                out: out.as_deref(),
            };
            inject(target, events, fetcher, config).await
        }
        Command::SetTheme { value } => {
            set_preference(&fetcher, &config, PreferenceUpdate::Theme(value)).await
        }
        Command::SetMode { value } => {
            set_preference(&fetcher, &config, PreferenceUpdate::Mode(value)).await
        }
    }
}

fn load_cookie(cookie: Option<&str>, cookie_file: Option<&Path>) -> anyhow::Result<Option<String>> {
    if let Some(path) = cookie_file {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        return Ok(Some(raw.trim().to_string()).filter(|c| !c.is_empty()));
    }
    Ok(cookie.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()))
}

async fn inspect(fetcher: &Fetcher, config: &SwitcherConfig) -> anyhow::Result<()> {
    let form = form::fetch_remote(fetcher, config).await?;
    let settings = parser::parse(&form)?;
    let json = serde_json::to_string_pretty(&settings).context("serialize settings")?;
    println!("{json}");
    Ok(())
}

struct InjectTarget<'a> {
    page: &'a Path,
    path: String,
    width: u32,
    out: Option<&'a Path>,
}

async fn inject(
    target: InjectTarget<'_>,
    events: Vec<UiEvent>,
    fetcher: Fetcher,
    config: SwitcherConfig,
) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(target.page)
        .with_context(|| format!("read {}", target.page.display()))?;
    let page = Rc::new(Page::parse(&html, target.path, target.width));

    match install(page.clone(), fetcher, config)
        .await
        .context("install theme switcher")?
    {
        Some(switcher) => {
            for event in events {
                switcher.handle(event).await?;
            }
            switcher.settle().await;
        }
        None => tracing::warn!("page has no header; written unchanged"),
    }
    if page.reload_requested() {
        tracing::info!("mode change requested a reload; output shows the pre-reload page");
    }

    let html = page.to_html()?;
    match target.out {
        Some(out) => write_output(out, &html),
        None => {
            print!("{html}");
            Ok(())
        }
    }
}

fn write_output(out: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    std::fs::write(out, html).with_context(|| format!("write {}", out.display()))
}

async fn set_preference(
    fetcher: &Fetcher,
    config: &SwitcherConfig,
    update: PreferenceUpdate,
) -> anyhow::Result<()> {
    let form = form::fetch_remote(fetcher, config).await?;
    let settings = parser::parse(&form)?;

    let known: Vec<&str> = match &update {
        PreferenceUpdate::Mode(_) => settings.modes.iter().map(|m| m.value.as_str()).collect(),
        PreferenceUpdate::Theme(_) => settings.themes.iter().map(|t| t.value.as_str()).collect(),
    };
    let (field, value) = update.field();
    if !known.is_empty() && !known.contains(&value) {
        anyhow::bail!("unknown {field} {value:?}; expected one of {}", known.join(", "));
    }

    fetcher
        .submit(config.update_url()?, &settings.token, &update)
        .await?;
    tracing::info!(field, value, "preference submitted");
    Ok(())
}
