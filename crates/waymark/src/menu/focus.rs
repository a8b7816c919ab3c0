//! Keyboard focus movement out of open submenus.
//!
//! Tab from the last visible focusable element of an open submenu (or
//! Shift+Tab from the first) moves focus outside it, so the submenu closes.
//! Membership is decided by element identity against a snapshot of each
//! enclosing open submenu's visible focusables, taken before any state
//! changes.

use waymark_core::{Document, ElementId};

use super::MenuSelectors;
use crate::config::MenuConfig;

/// The direction focus moves on Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusDirection {
    /// Tab.
    Forward,
    /// Shift+Tab.
    Backward,
}

impl FocusDirection {
    /// The direction for a Tab press with the given Shift state.
    pub fn from_shift(shift: bool) -> Self {
        if shift { Self::Backward } else { Self::Forward }
    }
}

/// Focusable `a`/`button` descendants of `submenu` in document order,
/// skipping those inside nested submenus that are closed.
pub fn visible_focusables(
    doc: &Document,
    selectors: &MenuSelectors,
    config: &MenuConfig,
    submenu: ElementId,
) -> Vec<ElementId> {
    doc.query_selector_all(submenu, &selectors.focusable)
        .into_iter()
        .filter(|&candidate| {
            doc.ancestors(candidate)
                .take_while(|&ancestor| ancestor != submenu)
                .all(|ancestor| {
                    !selectors.submenus.matches(doc, ancestor, None)
                        || doc.has_class(ancestor, &config.submenu_open_class)
                })
        })
        .collect()
}

/// Open submenus enclosing `target`, innermost first.
pub fn enclosing_open_submenus(
    doc: &Document,
    selectors: &MenuSelectors,
    config: &MenuConfig,
    target: ElementId,
) -> Vec<ElementId> {
    doc.ancestors(target)
        .filter(|&ancestor| {
            selectors.submenus.matches(doc, ancestor, None)
                && doc.has_class(ancestor, &config.submenu_open_class)
        })
        .collect()
}

/// The menu items whose submenus focus leaves when Tab is pressed on `target`.
///
/// Walks the enclosing open submenus innermost first and stops at the first
/// one where `target` is not the boundary element for `direction`. Returns
/// the owning items, innermost first.
pub fn submenus_exited_by(
    doc: &Document,
    selectors: &MenuSelectors,
    config: &MenuConfig,
    target: ElementId,
    direction: FocusDirection,
) -> Vec<ElementId> {
    let mut exited = Vec::new();
    for submenu in enclosing_open_submenus(doc, selectors, config, target) {
        let focusables = visible_focusables(doc, selectors, config, submenu);
        let boundary = match direction {
            FocusDirection::Forward => focusables.last(),
            FocusDirection::Backward => focusables.first(),
        };
        if boundary != Some(&target) {
            break;
        }
        match doc.parent(submenu) {
            Some(item) => exited.push(item),
            None => break,
        }
    }
    exited
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::el;

    fn fixture() -> (Document, MenuSelectors, MenuConfig) {
        let mut doc = Document::new();
        let body = doc.body();
        doc.mount(
            body,
            el("ul").child(
                el("li")
                    .id("outer")
                    .child(el("a").attr("href", "#"))
                    .child(el("button").class("dropdown-toggle"))
                    .child(
                        el("ul").class("sub-menu").class("toggle-show").children([
                            el("li").child(el("a").id("first").attr("href", "/a")),
                            el("li")
                                .id("inner")
                                .child(el("a").id("inner-link").attr("href", "/b"))
                                .child(el("button").id("inner-toggle").class("dropdown-toggle"))
                                .child(
                                    el("ul")
                                        .class("sub-menu")
                                        .child(el("li").child(el("a").id("hidden").attr("href", "/c"))),
                                ),
                        ]),
                    ),
            ),
        );
        let config = MenuConfig::default();
        let selectors = MenuSelectors::compile(&config).unwrap();
        (doc, selectors, config)
    }

    #[test]
    fn test_visible_focusables_skip_closed_nested() {
        let (doc, selectors, config) = fixture();
        let outer = doc.element_by_id("outer").unwrap();
        let submenu = doc.query_selector(outer, &selectors.own_submenu).unwrap();
        let ids: Vec<_> = visible_focusables(&doc, &selectors, &config, submenu)
            .into_iter()
            .map(|id| doc.attribute(id, "id").unwrap_or_default().to_string())
            .collect();
        assert_eq!(ids, vec!["first", "inner-link", "inner-toggle"]);
    }

    #[test]
    fn test_tab_on_last_exits() {
        let (doc, selectors, config) = fixture();
        let outer = doc.element_by_id("outer").unwrap();
        let last = doc.element_by_id("inner-toggle").unwrap();
        assert_eq!(
            submenus_exited_by(&doc, &selectors, &config, last, FocusDirection::Forward),
            vec![outer]
        );
    }

    #[test]
    fn test_tab_on_middle_stays() {
        let (doc, selectors, config) = fixture();
        let middle = doc.element_by_id("inner-link").unwrap();
        assert!(submenus_exited_by(&doc, &selectors, &config, middle, FocusDirection::Forward).is_empty());
    }

    #[test]
    fn test_shift_tab_on_first_exits() {
        let (doc, selectors, config) = fixture();
        let outer = doc.element_by_id("outer").unwrap();
        let first = doc.element_by_id("first").unwrap();
        assert_eq!(
            submenus_exited_by(&doc, &selectors, &config, first, FocusDirection::Backward),
            vec![outer]
        );
        assert!(submenus_exited_by(&doc, &selectors, &config, first, FocusDirection::Forward).is_empty());
    }

    #[test]
    fn test_nested_exit_walks_outward() {
        let (mut doc, selectors, config) = fixture();
        let outer = doc.element_by_id("outer").unwrap();
        let inner = doc.element_by_id("inner").unwrap();
        let nested = doc.query_selector(inner, &selectors.own_submenu).unwrap();
        doc.add_class(nested, "toggle-show").unwrap();

        let hidden = doc.element_by_id("hidden").unwrap();
        assert_eq!(
            submenus_exited_by(&doc, &selectors, &config, hidden, FocusDirection::Forward),
            vec![inner, outer]
        );
    }
}
