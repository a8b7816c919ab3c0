//! Responsive navigation modes.

use waymark_core::Viewport;

use crate::config::Breakpoints;

/// How link clicks on submenu-owning items behave, derived from viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationMode {
    /// Links toggle their submenu instead of navigating.
    Small,
    /// Links navigate normally.
    Wide,
}

impl NavigationMode {
    /// The mode for the current viewport.
    pub fn for_viewport(viewport: &Viewport, breakpoints: &Breakpoints) -> Self {
        if viewport.width_in_root_units() <= breakpoints.suppress_links_at_or_below_em {
            Self::Small
        } else {
            Self::Wide
        }
    }

    /// Whether link navigation is suppressed in this mode.
    pub fn suppresses_links(self) -> bool {
        self == Self::Small
    }
}

impl Breakpoints {
    /// Whether a resize to `viewport` closes every open submenu.
    pub fn closes_submenus(&self, viewport: &Viewport) -> bool {
        viewport.width_in_root_units() > self.close_submenus_above_em
    }

    /// Whether the menu container height is pinned at attach time.
    pub fn pins_menu_height(&self, viewport: &Viewport) -> bool {
        viewport.outer_width > 0.0 && viewport.outer_width <= self.pin_menu_height_max_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_boundary() {
        let bp = Breakpoints::default();
        // 880 / 16 = 55 root units exactly.
        assert_eq!(NavigationMode::for_viewport(&Viewport::new(880.0, 600.0), &bp), NavigationMode::Small);
        assert_eq!(NavigationMode::for_viewport(&Viewport::new(881.0, 600.0), &bp), NavigationMode::Wide);
        let large_font = Viewport::new(1100.0, 600.0).with_root_font_size(20.0);
        assert!(NavigationMode::for_viewport(&large_font, &bp).suppresses_links());
    }

    #[test]
    fn test_breakpoints_are_distinct() {
        let bp = Breakpoints::default();
        // 56 root units: wide mode, but not wide enough to force-close submenus.
        let viewport = Viewport::new(896.0, 600.0);
        assert_eq!(NavigationMode::for_viewport(&viewport, &bp), NavigationMode::Wide);
        assert!(!bp.closes_submenus(&viewport));
        assert!(bp.closes_submenus(&Viewport::new(913.0, 600.0)));
    }

    #[test]
    fn test_pins_menu_height() {
        let bp = Breakpoints::default();
        let mut viewport = Viewport::new(400.0, 700.0);
        viewport.outer_width = 800.0;
        assert!(bp.pins_menu_height(&viewport));
        viewport.outer_width = 0.0;
        assert!(!bp.pins_menu_height(&viewport));
        viewport.outer_width = 801.0;
        assert!(!bp.pins_menu_height(&viewport));
    }
}
