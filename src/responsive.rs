use crate::dom;
use crate::ui::Controls;

pub const SINGLE_MODE: &str = "single";

/// Which switcher presentation is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub toggle: bool,
    pub mode_select: bool,
    pub theme_select: bool,
}

pub fn theme_select_visible(width: u32, breakpoint: u32, mode: &str) -> bool {
    mode == SINGLE_MODE && width >= breakpoint
}

pub fn layout_for(width: u32, breakpoint: u32, mode: &str) -> Layout {
    if width < breakpoint {
        return Layout {
            toggle: true,
            mode_select: false,
            theme_select: false,
        };
    }
    Layout {
        toggle: false,
        mode_select: true,
        theme_select: theme_select_visible(width, breakpoint, mode),
    }
}

pub fn apply(controls: &Controls, layout: Layout) {
    dom::set_style(
        &controls.toggle_row,
        "display",
        if layout.toggle { "flex" } else { "none" },
    );
    dom::set_displayed(&controls.mode_select, layout.mode_select);
    dom::set_displayed(&controls.theme_select, layout.theme_select);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_below_breakpoint_regardless_of_mode() {
        for mode in ["single", "auto", "dark"] {
            assert_eq!(
                layout_for(1200, 1360, mode),
                Layout {
                    toggle: true,
                    mode_select: false,
                    theme_select: false,
                }
            );
        }
    }

    #[test]
    fn wide_shows_theme_only_for_single() {
        assert!(layout_for(1400, 1360, "single").theme_select);
        assert!(!layout_for(1400, 1360, "auto").theme_select);
        assert!(layout_for(1360, 1360, "auto").mode_select);
        assert!(!layout_for(1360, 1360, "auto").toggle);
    }
}
