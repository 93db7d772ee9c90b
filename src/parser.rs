use kuchiki::NodeRef;
use serde::Serialize;

use crate::dom;
use crate::error::SwitcherError;
use crate::form::FormSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeOption {
    pub value: String,
    pub label: String,
    pub checked: bool,
    /// Mode family from `data-mode`, empty when absent.
    pub mode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppearanceSettings {
    pub modes: Vec<ModeOption>,
    pub themes: Vec<ThemeOption>,
    #[serde(skip)]
    pub token: String,
}

impl AppearanceSettings {
    pub fn current_mode(&self) -> Option<&ModeOption> {
        self.modes.iter().find(|m| m.selected)
    }

    pub fn current_theme(&self) -> Option<&ThemeOption> {
        self.themes.iter().find(|t| t.checked)
    }
}

pub fn parse(source: &dyn FormSource) -> Result<AppearanceSettings, SwitcherError> {
    let modes = source
        .mode_control()
        .map(|select| parse_modes(&select))
        .unwrap_or_default();
    let themes = source
        .theme_radios()
        .iter()
        .map(|radio| parse_theme(source.form(), radio))
        .collect();
    let token = source.token().ok_or(SwitcherError::TokenMissing)?;

    Ok(AppearanceSettings {
        modes,
        themes,
        token,
    })
}

fn parse_modes(select: &NodeRef) -> Vec<ModeOption> {
    let options = dom::options(select);
    let selected = dom::selected_index(&options);
    options
        .iter()
        .enumerate()
        .map(|(idx, option)| ModeOption {
            value: dom::option_value(option),
            label: option.text_contents().trim().to_string(),
            selected: Some(idx) == selected,
        })
        .collect()
}

fn parse_theme(form: &NodeRef, radio: &NodeRef) -> ThemeOption {
    let value = dom::attr(radio, "value").unwrap_or_default();
    let label = dom::attr(radio, "id")
        .filter(|id| !id.is_empty())
        .and_then(|id| dom::select_first(form, &format!(r#"label[for="{}"]"#, id)))
        .map(|label| {
            let text = match dom::select_first(&label, "div") {
                Some(name) => name.text_contents(),
                None => label.text_contents(),
            };
            dom::collapse_whitespace(&text)
        })
        .unwrap_or_else(|| value.clone());

    ThemeOption {
        label,
        checked: dom::has_attr(radio, "checked"),
        mode: dom::attr(radio, "data-mode").unwrap_or_default(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UPDATE_PATH;
    use crate::form::FetchedForm;

    const SETTINGS: &str = include_str!("../tests/fixtures/settings_appearance.html");

    fn fetched(html: &str) -> FetchedForm {
        FetchedForm::parse(html, UPDATE_PATH).unwrap()
    }

    #[test]
    fn modes_in_document_order_with_one_selected() {
        let settings = parse(&fetched(SETTINGS)).unwrap();
        assert_eq!(
            settings.modes,
            vec![
                ModeOption {
                    value: "auto".into(),
                    label: "Sync with system".into(),
                    selected: false,
                },
                ModeOption {
                    value: "single".into(),
                    label: "Single theme".into(),
                    selected: true,
                },
            ]
        );
        assert_eq!(settings.current_mode().unwrap().value, "single");
        assert_eq!(settings.token, "tok-123");
    }

    #[test]
    fn theme_labels_prefer_nested_text_and_collapse_whitespace() {
        let settings = parse(&fetched(SETTINGS)).unwrap();
        let labels: Vec<_> = settings.themes.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Light default",
                "Light high contrast",
                "Dark default",
                "Dark dimmed",
                "Dark high contrast",
                "custom_theme",
            ]
        );
    }

    #[test]
    fn theme_flags_and_mode_tags() {
        let settings = parse(&fetched(SETTINGS)).unwrap();
        assert_eq!(settings.current_theme().unwrap().value, "dark_dimmed");
        assert_eq!(settings.themes.iter().filter(|t| t.checked).count(), 1);
        assert_eq!(settings.themes[0].mode, "light");
        assert_eq!(settings.themes[4].mode, "");
    }

    #[test]
    fn missing_token_is_fatal() {
        let html = SETTINGS.replace(r#"name="authenticity_token" value="tok-123""#, r#"name="other""#);
        let err = parse(&fetched(&html)).unwrap_err();
        assert!(matches!(err, SwitcherError::TokenMissing));
    }

    #[test]
    fn empty_token_is_fatal() {
        let html = SETTINGS.replace("tok-123", "");
        assert!(matches!(
            parse(&fetched(&html)),
            Err(SwitcherError::TokenMissing)
        ));
    }

    #[test]
    fn missing_mode_control_yields_no_modes() {
        let html = SETTINGS.replace("color_mode_type_select", "something_else");
        let settings = parse(&fetched(&html)).unwrap();
        assert!(settings.modes.is_empty());
        assert_eq!(settings.themes.len(), 6);
    }
}
