//! Navigation configuration.
//!
//! Every class name, selector, breakpoint and timing constant the controllers
//! use is a field here, with defaults matching the stock theme markup. A page
//! only needs to supply the localized toggle labels.
//!
//! Configuration can be loaded from JSON or TOML documents:
//!
//! ```
//! use waymark::NavigationConfig;
//!
//! let config = NavigationConfig::from_toml_str(r#"
//!     [menu]
//!     exclusive_submenus = true
//!
//!     [strings]
//!     expand = "Expand child menu"
//!     collapse = "Collapse child menu"
//! "#).unwrap();
//!
//! assert!(config.menu.exclusive_submenus);
//! assert_eq!(config.toc.debounce_ms, 100);
//! ```

use serde::{Deserialize, Serialize};
use waymark_core::{SelectorError, SelectorList};

use crate::toc::RootMargin;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The TOML document could not be parsed.
    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A selector field did not parse.
    #[error("Invalid selector for '{field}': {source}")]
    InvalidSelector {
        field: &'static str,
        #[source]
        source: SelectorError,
    },

    /// The intersection root margin did not parse.
    #[error("Invalid root margin '{value}': {message}")]
    InvalidRootMargin { value: String, message: String },

    /// A field holds an unusable value.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// Localized labels for submenu toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenReaderText {
    /// Label shown while the submenu is closed.
    pub expand: String,
    /// Label shown while the submenu is open.
    pub collapse: String,
}

impl ScreenReaderText {
    /// Create a label pair.
    pub fn new(expand: impl Into<String>, collapse: impl Into<String>) -> Self {
        Self {
            expand: expand.into(),
            collapse: collapse.into(),
        }
    }

    /// The label describing the action available in the given state.
    pub fn label_for(&self, open: bool) -> &str {
        if open { &self.collapse } else { &self.expand }
    }
}

/// Complete configuration for both controllers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Dropdown menu settings.
    pub menu: MenuConfig,
    /// Table-of-contents settings.
    pub toc: TocConfig,
    /// Localized toggle labels. Labels are left untouched when absent.
    pub strings: Option<ScreenReaderText>,
}

impl NavigationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the localized toggle labels.
    pub fn with_strings(mut self, strings: ScreenReaderText) -> Self {
        self.strings = Some(strings);
        self
    }

    /// Check every field the controllers will compile.
    pub fn validate(&self) -> ConfigResult<()> {
        self.menu.validate()?;
        self.toc.validate()
    }
}

/// Viewport thresholds for responsive behaviour.
///
/// Widths are compared in root-font units (`inner_width / root_font_size`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    /// On resize, every submenu closes when the width exceeds this.
    pub close_submenus_above_em: f64,
    /// Links with real destinations toggle instead of navigating at or below this.
    pub suppress_links_at_or_below_em: f64,
    /// At attach time the menu container height is pinned when `0 < outer_width <=` this.
    pub pin_menu_height_max_px: f64,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            close_submenus_above_em: 57.0,
            suppress_links_at_or_below_em: 55.0,
            pin_menu_height_max_px: 800.0,
        }
    }
}

/// Dropdown menu markup contract and behaviour switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Navigation roots whose submenus become collapsible.
    pub nav_root_selector: String,
    /// Submenu lists inside a navigation root.
    pub submenu_selector: String,
    /// Class marking a block-editor navigation item.
    pub block_item_class: String,
    /// Class of the pre-built block-editor toggle button.
    pub block_toggle_class: String,
    /// Class of the classic dropdown placeholder span.
    pub dropdown_class: String,
    /// Class of the icon inside a synthesized dropdown span.
    pub dropdown_symbol_class: String,
    /// Class given to synthesized toggle buttons.
    pub toggle_button_class: String,
    /// State class on an open menu item.
    pub item_open_class: String,
    /// State class on an open submenu list.
    pub submenu_open_class: String,
    /// Marker class on items whose toggle is already set up.
    pub has_toggle_class: String,
    /// Small-screen navigation toggle controls.
    pub menu_toggle_selector: String,
    /// Containers shown and hidden by the small-screen toggle.
    pub small_nav_selector: String,
    /// State class on expanded small-screen containers.
    pub small_nav_open_class: String,
    /// Container whose height is pinned on narrow windows.
    pub menu_container_selector: String,
    /// Class of visually hidden label text inside a toggle.
    pub screen_reader_text_class: String,
    /// Opening a submenu closes its open siblings.
    pub exclusive_submenus: bool,
    /// Responsive thresholds.
    pub breakpoints: Breakpoints,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            nav_root_selector: ".nav--toggle-sub".into(),
            submenu_selector: "ul.sub-menu, ul.wp-block-navigation__submenu-container".into(),
            block_item_class: "wp-block-navigation-item".into(),
            block_toggle_class: "wp-block-navigation-submenu__toggle".into(),
            dropdown_class: "dropdown".into(),
            dropdown_symbol_class: "dropdown-symbol".into(),
            toggle_button_class: "dropdown-toggle".into(),
            item_open_class: "menu-item--toggled-on".into(),
            submenu_open_class: "toggle-show".into(),
            has_toggle_class: "menu-item--has-toggle".into(),
            menu_toggle_selector: ".menu-toggle".into(),
            small_nav_selector: ".nav--toggle-small".into(),
            small_nav_open_class: "nav--toggled-on".into(),
            menu_container_selector: ".primary-menu-container".into(),
            screen_reader_text_class: "screen-reader-text".into(),
            exclusive_submenus: false,
            breakpoints: Breakpoints::default(),
        }
    }
}

impl MenuConfig {
    /// Check selectors, class names and breakpoints.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("nav_root_selector", &self.nav_root_selector),
            ("submenu_selector", &self.submenu_selector),
            ("menu_toggle_selector", &self.menu_toggle_selector),
            ("small_nav_selector", &self.small_nav_selector),
            ("menu_container_selector", &self.menu_container_selector),
        ] {
            parse_selector(field, value)?;
        }
        for (field, value) in [
            ("block_item_class", &self.block_item_class),
            ("block_toggle_class", &self.block_toggle_class),
            ("dropdown_class", &self.dropdown_class),
            ("dropdown_symbol_class", &self.dropdown_symbol_class),
            ("toggle_button_class", &self.toggle_button_class),
            ("item_open_class", &self.item_open_class),
            ("submenu_open_class", &self.submenu_open_class),
            ("has_toggle_class", &self.has_toggle_class),
            ("small_nav_open_class", &self.small_nav_open_class),
            ("screen_reader_text_class", &self.screen_reader_text_class),
        ] {
            validate_class(field, value)?;
        }

        let bp = &self.breakpoints;
        for (field, value) in [
            ("breakpoints.close_submenus_above_em", bp.close_submenus_above_em),
            ("breakpoints.suppress_links_at_or_below_em", bp.suppress_links_at_or_below_em),
            ("breakpoints.pin_menu_height_max_px", bp.pin_menu_height_max_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid_value(field, "must be a non-negative number"));
            }
        }
        Ok(())
    }
}

/// Table-of-contents markup contract and tracking heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// TOC links pointing at headings.
    pub link_selector: String,
    /// Panel whose visible box the active link must stay within.
    pub panel_selector: String,
    /// Scrollable element inside the panel; the panel itself when absent.
    pub scroll_container_selector: String,
    /// State class on the active link.
    pub active_class: String,
    /// Attribute on a link's list item carrying the heading level.
    pub level_attribute: String,
    /// Level assumed when the attribute is missing or malformed.
    pub default_level: u8,
    /// Scroll offsets at or below this snap to the first heading.
    pub top_snap_px: f64,
    /// Fraction of the viewport height below the scroll position used as the probe line.
    pub probe_ratio: f64,
    /// Quiet period after the last scroll before recomputing.
    pub debounce_ms: u64,
    /// Intersection observer root margin.
    pub root_margin: String,
    /// Intersection observer thresholds.
    pub thresholds: Vec<f64>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            link_selector: ".toc-list a".into(),
            panel_selector: ".doc-right".into(),
            scroll_container_selector: ".toc".into(),
            active_class: "toc-active".into(),
            level_attribute: "data-level".into(),
            default_level: 2,
            top_snap_px: 10.0,
            probe_ratio: 0.15,
            debounce_ms: 100,
            root_margin: "-10% 0px -85% 0px".into(),
            thresholds: vec![0.0, 0.1],
        }
    }
}

impl TocConfig {
    /// Check selectors, the root margin and numeric ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        parse_selector("link_selector", &self.link_selector)?;
        parse_selector("panel_selector", &self.panel_selector)?;
        parse_selector("scroll_container_selector", &self.scroll_container_selector)?;
        validate_class("active_class", &self.active_class)?;
        self.root_margin.parse::<RootMargin>()?;

        if !(0.0..=1.0).contains(&self.probe_ratio) {
            return Err(ConfigError::invalid_value("probe_ratio", "must be within 0..=1"));
        }
        if !self.top_snap_px.is_finite() || self.top_snap_px < 0.0 {
            return Err(ConfigError::invalid_value(
                "top_snap_px",
                "must be a non-negative number",
            ));
        }
        if self.thresholds.iter().any(|t| !(0.0..=1.0).contains(t)) {
            return Err(ConfigError::invalid_value(
                "thresholds",
                "every threshold must be within 0..=1",
            ));
        }
        Ok(())
    }
}

/// Parse a selector field, tagging failures with the field name.
pub(crate) fn parse_selector(field: &'static str, value: &str) -> ConfigResult<SelectorList> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidSelector { field, source })
}

fn validate_class(field: &'static str, value: &str) -> ConfigResult<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(field, format!("'{value}' is not a single class name")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = NavigationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.menu.breakpoints.close_submenus_above_em, 57.0);
        assert_eq!(config.menu.breakpoints.suppress_links_at_or_below_em, 55.0);
        assert_eq!(config.toc.thresholds, vec![0.0, 0.1]);
        assert!(config.strings.is_none());
    }

    #[test]
    fn test_json_partial_document() {
        let config = NavigationConfig::from_json_str(
            r#"{ "toc": { "debounce_ms": 250 }, "strings": { "expand": "Open", "collapse": "Close" } }"#,
        )
        .unwrap();
        assert_eq!(config.toc.debounce_ms, 250);
        assert_eq!(config.toc.active_class, "toc-active");
        assert_eq!(config.strings.unwrap().label_for(true), "Close");
    }

    #[test]
    fn test_json_syntax_error() {
        let err = NavigationConfig::from_json_str("{ menu: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_invalid_selector_names_field() {
        let err = NavigationConfig::from_toml_str("[menu]\nsubmenu_selector = \"ul >\"\n").unwrap_err();
        match err {
            ConfigError::InvalidSelector { field, .. } => assert_eq!(field, "submenu_selector"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_class_name() {
        let mut config = NavigationConfig::default();
        config.menu.item_open_class = "open now".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "item_open_class", .. })
        ));
    }

    #[test]
    fn test_invalid_root_margin() {
        let mut config = NavigationConfig::default();
        config.toc.root_margin = "-10% sideways".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRootMargin { .. })
        ));
    }

    #[test]
    fn test_invalid_probe_ratio() {
        let mut config = NavigationConfig::default();
        config.toc.probe_ratio = 1.5;
        assert!(config.validate().is_err());
    }
}
