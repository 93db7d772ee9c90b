use std::rc::Rc;

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;

use crate::config::SwitcherConfig;
use crate::dom;
use crate::error::SwitcherError;
use crate::fetcher::Fetcher;
use crate::page::Page;

pub const HOST_MODE_CONTROL: &str = "#color_mode_type_select";
pub const THEME_RADIO_SELECTOR: &str = r#"input[type="radio"][name="user_theme"]"#;
pub const TOKEN_SELECTOR: &str = r#"input[name="authenticity_token"]"#;

/// The appearance form the switcher reads from, and mirrors into.
pub trait FormSource {
    fn form(&self) -> &NodeRef;

    /// Whether changes to this form reach the real page.
    fn is_live(&self) -> bool;

    /// The host mode select, looked up in the form's owning document.
    fn mode_control(&self) -> Option<NodeRef> {
        dom::select_first(&dom::owner_document(self.form()), HOST_MODE_CONTROL)
    }

    fn theme_radios(&self) -> Vec<NodeRef> {
        dom::select_all(self.form(), THEME_RADIO_SELECTOR)
    }

    fn theme_radio(&self, value: &str) -> Option<NodeRef> {
        self.theme_radios()
            .into_iter()
            .find(|radio| dom::attr(radio, "value").as_deref() == Some(value))
    }

    fn token(&self) -> Option<String> {
        dom::select_first(self.form(), TOKEN_SELECTOR)
            .and_then(|input| dom::attr(&input, "value"))
            .filter(|token| !token.is_empty())
    }

    /// Activates the theme radio for `value`. Returns false if no radio matches.
    fn click_theme_radio(&self, value: &str) -> bool;
}

/// The form as it exists on the page the user is looking at.
pub struct LiveForm {
    page: Rc<Page>,
    form: NodeRef,
}

impl LiveForm {
    pub fn new(page: Rc<Page>, form: NodeRef) -> Self {
        Self { page, form }
    }
}

impl FormSource for LiveForm {
    fn form(&self) -> &NodeRef {
        &self.form
    }

    fn is_live(&self) -> bool {
        true
    }

    fn click_theme_radio(&self, value: &str) -> bool {
        let Some(radio) = self.theme_radio(value) else {
            return false;
        };
        dom::check_radio(self.page.document(), &radio);
        self.page.dispatch(&radio, "click");
        true
    }
}

/// The form inside a fetched, detached copy of the settings page.
///
/// Holds the parsed document as well: kuchiki parents are only weakly
/// referenced by their children, so the form alone would lose its ancestors.
pub struct FetchedForm {
    doc: NodeRef,
    form: NodeRef,
}

impl FetchedForm {
    pub fn new(doc: NodeRef, form: NodeRef) -> Self {
        Self { doc, form }
    }

    /// Parses a settings page and picks its appearance form.
    pub fn parse(html: &str, action: &str) -> Option<Self> {
        let doc = kuchiki::parse_html().one(html);
        let form = find_appearance_form(&doc, action)?;
        Some(Self::new(doc, form))
    }
}

impl FormSource for FetchedForm {
    fn form(&self) -> &NodeRef {
        &self.form
    }

    fn is_live(&self) -> bool {
        false
    }

    fn mode_control(&self) -> Option<NodeRef> {
        dom::select_first(&self.doc, HOST_MODE_CONTROL)
    }

    fn click_theme_radio(&self, value: &str) -> bool {
        let Some(radio) = self.theme_radio(value) else {
            return false;
        };
        dom::check_radio(&self.doc, &radio);
        true
    }
}

/// First form posting to `action` that contains at least one theme radio.
pub fn find_appearance_form(root: &NodeRef, action: &str) -> Option<NodeRef> {
    let selector = format!(r#"form[action="{}"]"#, action);
    dom::select_all(root, &selector)
        .into_iter()
        .find(|form| dom::select_first(form, THEME_RADIO_SELECTOR).is_some())
}

pub async fn locate(
    page: &Rc<Page>,
    client: &Fetcher,
    config: &SwitcherConfig,
) -> Result<Box<dyn FormSource>, SwitcherError> {
    if config.is_settings_page(page.path()) {
        let form = find_appearance_form(page.document(), &config.update_path).ok_or_else(|| {
            SwitcherError::FormNotFound {
                location: page.path().to_string(),
            }
        })?;
        tracing::debug!("using live appearance form");
        return Ok(Box::new(LiveForm::new(page.clone(), form)));
    }

    let form = fetch_remote(client, config).await?;
    Ok(Box::new(form))
}

/// Fetches the settings page and parses it into a detached document.
pub async fn fetch_remote(
    client: &Fetcher,
    config: &SwitcherConfig,
) -> Result<FetchedForm, SwitcherError> {
    let url = config.settings_url()?;
    let html = client.get_text(url.clone()).await?;
    let form = FetchedForm::parse(&html, &config.update_path).ok_or_else(|| {
        SwitcherError::FormNotFound {
            location: url.to_string(),
        }
    })?;
    tracing::debug!(%url, "using fetched appearance form");
    Ok(form)
}

#[cfg(test)]
mod tests {
    use kuchiki::traits::TendrilSink as _;

    use super::*;
    use crate::config::UPDATE_PATH;

    const SETTINGS: &str = include_str!("../tests/fixtures/settings_appearance.html");

    #[test]
    fn skips_forms_without_theme_radios() {
        let form = FetchedForm::parse(SETTINGS, UPDATE_PATH).unwrap();
        assert!(!form.theme_radios().is_empty());
    }

    #[test]
    fn missing_action_finds_nothing() {
        let doc = kuchiki::parse_html().one(SETTINGS);
        assert!(find_appearance_form(&doc, "/elsewhere").is_none());
    }

    #[test]
    fn fetched_form_sees_mode_control_in_its_document() {
        let form = FetchedForm::parse(SETTINGS, UPDATE_PATH).unwrap();
        assert!(form.mode_control().is_some());
        assert!(!form.is_live());
    }

    #[test]
    fn fetched_click_only_touches_detached_copy() {
        let form = FetchedForm::parse(SETTINGS, UPDATE_PATH).unwrap();
        assert!(form.click_theme_radio("light"));
        let checked: Vec<_> = form
            .theme_radios()
            .iter()
            .filter(|r| dom::has_attr(r, "checked"))
            .filter_map(|r| dom::attr(r, "value"))
            .collect();
        assert_eq!(checked, vec!["light"]);
        assert!(!form.click_theme_radio("nope"));
    }

    #[tokio::test]
    async fn fetched_settings_keep_mode_control_after_fetch() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/settings/appearance");
            then.status(200).body(SETTINGS);
        });
        let base = url::Url::parse(&server.url("/")).unwrap();
        let config = SwitcherConfig::with_base_url(base);
        let client = Fetcher::new("test-agent", None).unwrap();

        let form = fetch_remote(&client, &config).await.unwrap();
        let select = form.mode_control().unwrap();
        assert_eq!(dom::select_value(&select), "single");
        let settings = crate::parser::parse(&form).unwrap();
        let modes: Vec<_> = settings.modes.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(modes, vec!["auto", "single"]);
    }

    #[test]
    fn live_click_dispatches_on_page() {
        let page = Rc::new(Page::parse(SETTINGS, "/settings/appearance", 1400));
        let form = find_appearance_form(page.document(), UPDATE_PATH).unwrap();
        let live = LiveForm::new(page.clone(), form);
        assert!(live.click_theme_radio("dark"));
        let events = page.dispatched();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "click");
        assert_eq!(events[0].value, "dark");
    }
}
