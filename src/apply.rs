//! Root attribute and stylesheet updates that make a mode or theme change
//! visible without a reload.

pub const COLOR_MODE_ATTR: &str = "data-color-mode";
pub const LIGHT_THEME_ATTR: &str = "data-light-theme";
pub const DARK_THEME_ATTR: &str = "data-dark-theme";

/// The global page state touched by mode and theme changes.
pub trait PageSink {
    fn root_attribute(&self, name: &str) -> Option<String>;
    fn set_root_attribute(&self, name: &str, value: &str);
    /// Family tag of every theme stylesheet link, in document order.
    fn theme_link_families(&self) -> Vec<String>;
    fn set_theme_link_active(&self, index: usize, active: bool);
}

pub fn current_mode(sink: &dyn PageSink) -> Option<String> {
    sink.root_attribute(COLOR_MODE_ATTR)
}

pub fn is_light_theme(theme: &str) -> bool {
    theme.starts_with("light")
}

pub fn apply_mode(sink: &dyn PageSink, mode: &str) {
    sink.set_root_attribute(COLOR_MODE_ATTR, mode);
}

pub fn apply_theme(sink: &dyn PageSink, theme: &str) {
    if is_light_theme(theme) {
        sink.set_root_attribute(COLOR_MODE_ATTR, "light");
        sink.set_root_attribute(LIGHT_THEME_ATTR, theme);
    } else {
        sink.set_root_attribute(COLOR_MODE_ATTR, "dark");
        sink.set_root_attribute(DARK_THEME_ATTR, theme);
    }
}

/// Activates every stylesheet whose family tag prefixes `theme` and
/// deactivates the rest.
pub fn swap_theme_stylesheets(sink: &dyn PageSink, theme: &str) {
    for (idx, family) in sink.theme_link_families().iter().enumerate() {
        sink.set_theme_link_active(idx, theme.starts_with(family.as_str()));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub attrs: RefCell<BTreeMap<String, String>>,
        pub links: RefCell<Vec<(String, bool)>>,
    }

    impl RecordingSink {
        pub fn with_links(families: &[&str]) -> Self {
            let sink = Self::default();
            *sink.links.borrow_mut() = families.iter().map(|f| (f.to_string(), false)).collect();
            sink
        }

        fn attr(&self, name: &str) -> Option<String> {
            self.attrs.borrow().get(name).cloned()
        }

        fn active(&self) -> Vec<String> {
            self.links
                .borrow()
                .iter()
                .filter(|(_, on)| *on)
                .map(|(f, _)| f.clone())
                .collect()
        }
    }

    impl PageSink for RecordingSink {
        fn root_attribute(&self, name: &str) -> Option<String> {
            self.attr(name)
        }

        fn set_root_attribute(&self, name: &str, value: &str) {
            self.attrs
                .borrow_mut()
                .insert(name.to_string(), value.to_string());
        }

        fn theme_link_families(&self) -> Vec<String> {
            self.links.borrow().iter().map(|(f, _)| f.clone()).collect()
        }

        fn set_theme_link_active(&self, index: usize, active: bool) {
            if let Some(link) = self.links.borrow_mut().get_mut(index) {
                link.1 = active;
            }
        }
    }

    #[test]
    fn light_theme_sets_light_attributes() {
        let sink = RecordingSink::default();
        apply_theme(&sink, "light_high_contrast");
        assert_eq!(sink.attr(COLOR_MODE_ATTR).as_deref(), Some("light"));
        assert_eq!(
            sink.attr(LIGHT_THEME_ATTR).as_deref(),
            Some("light_high_contrast")
        );
        assert!(sink.attr(DARK_THEME_ATTR).is_none());
    }

    #[test]
    fn non_light_theme_is_dark() {
        let sink = RecordingSink::default();
        apply_theme(&sink, "dark_dimmed");
        assert_eq!(sink.attr(COLOR_MODE_ATTR).as_deref(), Some("dark"));
        assert_eq!(sink.attr(DARK_THEME_ATTR).as_deref(), Some("dark_dimmed"));

        apply_theme(&sink, "soft");
        assert_eq!(sink.attr(DARK_THEME_ATTR).as_deref(), Some("soft"));
    }

    #[test]
    fn stylesheet_families_match_by_prefix() {
        let sink = RecordingSink::with_links(&["light", "dark", "dark_dimmed", "light_high_contrast"]);
        swap_theme_stylesheets(&sink, "light_high_contrast");
        assert_eq!(sink.active(), vec!["light", "light_high_contrast"]);

        swap_theme_stylesheets(&sink, "dark");
        assert_eq!(sink.active(), vec!["dark"]);
    }

    #[test]
    fn mode_only_touches_color_mode() {
        let sink = RecordingSink::default();
        apply_mode(&sink, "auto");
        assert_eq!(current_mode(&sink).as_deref(), Some("auto"));
        assert_eq!(sink.attrs.borrow().len(), 1);
    }
}
