//! Accessible multi-level dropdown menus.
//!
//! [`MenuController`] discovers collapsible submenus under every navigation
//! root, gives each submenu-owning item exactly one toggle affordance, and
//! keeps the item's open state, the submenu's visibility class and the
//! affordance's ARIA attributes in agreement.
//!
//! # Markup
//!
//! ```text
//! nav.nav--toggle-sub
//! └── ul
//!     └── li                      <- menu item
//!         ├── a[href]             <- optional parent link
//!         ├── button.dropdown-toggle   (synthesized, or pre-built block toggle)
//!         └── ul.sub-menu         <- submenu
//! ```
//!
//! The toggle, focus and cascade logic live in free functions over the
//! document ([`toggle`], [`focus`]) so they can be exercised without a
//! controller.

mod affordance;
mod controller;
pub mod focus;
pub mod toggle;

pub use affordance::{ParentLink, ToggleAffordance};
pub use controller::{MenuController, MenuItem};
pub use focus::FocusDirection;
pub use toggle::{Toggler, Transition};

use waymark_core::{Selector, SelectorList, SelectorPart};

use crate::config::{ConfigResult, MenuConfig, parse_selector};

/// Selectors compiled once from a [`MenuConfig`].
#[derive(Debug, Clone)]
pub struct MenuSelectors {
    pub(crate) nav_roots: SelectorList,
    pub(crate) submenus: SelectorList,
    pub(crate) own_submenu: SelectorList,
    pub(crate) own_link: SelectorList,
    pub(crate) own_dropdown: SelectorList,
    pub(crate) own_affordance: SelectorList,
    pub(crate) own_screen_reader_text: SelectorList,
    pub(crate) open_items: SelectorList,
    pub(crate) menu_toggles: SelectorList,
    pub(crate) small_navs: SelectorList,
    pub(crate) menu_container: SelectorList,
    pub(crate) focusable: SelectorList,
}

impl MenuSelectors {
    /// Compile the selectors named by `config`.
    pub fn compile(config: &MenuConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            nav_roots: parse_selector("nav_root_selector", &config.nav_root_selector)?,
            submenus: parse_selector("submenu_selector", &config.submenu_selector)?,
            own_submenu: direct_child(SelectorPart::tag("ul")),
            own_link: direct_child(SelectorPart::tag("a")),
            own_dropdown: direct_child(SelectorPart::class(&config.dropdown_class)),
            own_affordance: SelectorList::new(vec![
                Selector::simple(SelectorPart::scope())
                    .child(SelectorPart::class(&config.toggle_button_class)),
                Selector::simple(SelectorPart::scope())
                    .child(SelectorPart::class(&config.block_toggle_class)),
            ]),
            own_screen_reader_text: direct_child(SelectorPart::class(
                &config.screen_reader_text_class,
            )),
            open_items: Selector::simple(
                SelectorPart::tag("li").with_class(&config.item_open_class),
            )
            .into(),
            menu_toggles: parse_selector("menu_toggle_selector", &config.menu_toggle_selector)?,
            small_navs: parse_selector("small_nav_selector", &config.small_nav_selector)?,
            menu_container: parse_selector(
                "menu_container_selector",
                &config.menu_container_selector,
            )?,
            focusable: SelectorList::new(vec![
                Selector::simple(SelectorPart::tag("a")),
                Selector::simple(SelectorPart::tag("button")),
            ]),
        })
    }
}

fn direct_child(part: SelectorPart) -> SelectorList {
    Selector::simple(SelectorPart::scope()).child(part).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_defaults() {
        let selectors = MenuSelectors::compile(&MenuConfig::default()).unwrap();
        assert_eq!(
            selectors.own_affordance.to_string(),
            ":scope > .dropdown-toggle, :scope > .wp-block-navigation-submenu__toggle"
        );
        assert_eq!(selectors.open_items.to_string(), "li.menu-item--toggled-on");
        assert_eq!(selectors.submenus.len(), 2);
    }
}
