//! Submenu open/close state transitions.
//!
//! State lives entirely in the document: an item is open when it carries the
//! item-open class. Every transition writes the item class, the submenu
//! visibility class and the affordance ARIA attributes together, so the three
//! never disagree.

use waymark_core::{Document, DomResult, ElementId};

use super::{MenuSelectors, ToggleAffordance};
use crate::config::{MenuConfig, ScreenReaderText};

/// One item changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    /// The menu item.
    pub item: ElementId,
    /// Whether it is now open.
    pub open: bool,
}

/// Applies toggle transitions to a document.
#[derive(Debug, Clone, Copy)]
pub struct Toggler<'a> {
    selectors: &'a MenuSelectors,
    config: &'a MenuConfig,
    strings: Option<&'a ScreenReaderText>,
}

impl<'a> Toggler<'a> {
    /// Create a toggler over compiled selectors and class names.
    pub fn new(
        selectors: &'a MenuSelectors,
        config: &'a MenuConfig,
        strings: Option<&'a ScreenReaderText>,
    ) -> Self {
        Self {
            selectors,
            config,
            strings,
        }
    }

    /// The item's own toggle affordance.
    pub fn affordance(&self, doc: &Document, item: ElementId) -> Option<ToggleAffordance> {
        let button = doc.query_selector(item, &self.selectors.own_affordance)?;
        if doc.has_class(button, &self.config.block_toggle_class) {
            Some(ToggleAffordance::Block { button })
        } else {
            Some(ToggleAffordance::Classic { button })
        }
    }

    /// The item's own submenu list.
    pub fn submenu(&self, doc: &Document, item: ElementId) -> Option<ElementId> {
        doc.query_selector(item, &self.selectors.own_submenu)
    }

    /// Whether the item is open.
    pub fn is_open(&self, doc: &Document, item: ElementId) -> bool {
        doc.has_class(item, &self.config.item_open_class)
    }

    /// Move the item to `open`.
    ///
    /// Returns `None` when the item already is in that state or has no
    /// recognizable submenu or affordance.
    pub fn set_open(&self, doc: &mut Document, item: ElementId, open: bool) -> Option<Transition> {
        if self.is_open(doc, item) == open {
            return None;
        }
        let affordance = self.affordance(doc, item)?;
        let submenu = self.submenu(doc, item)?;

        if let Err(err) = self.write_state(doc, item, submenu, affordance, open) {
            tracing::debug!(target: "waymark::menu", ?item, %err, "failed to update submenu state");
            return None;
        }
        tracing::trace!(target: "waymark::menu", ?item, open, "submenu state changed");
        Some(Transition { item, open })
    }

    fn write_state(
        &self,
        doc: &mut Document,
        item: ElementId,
        submenu: ElementId,
        affordance: ToggleAffordance,
        open: bool,
    ) -> DomResult<()> {
        doc.set_class(item, &self.config.item_open_class, open)?;
        doc.set_class(submenu, &self.config.submenu_open_class, open)?;

        let button = affordance.element();
        if affordance.owns_aria_expanded() {
            doc.set_attribute(button, "aria-expanded", if open { "true" } else { "false" })?;
        }
        if let Some(strings) = self.strings {
            let label = strings.label_for(open);
            doc.set_attribute(button, "aria-label", label)?;
            if let Some(text) = doc.query_selector(button, &self.selectors.own_screen_reader_text) {
                doc.set_text(text, label)?;
            }
        }
        Ok(())
    }

    /// Close the item and every open item nested inside it.
    pub fn close_with_descendants(&self, doc: &mut Document, item: ElementId) -> Vec<Transition> {
        let nested = doc.query_selector_all(item, &self.selectors.open_items);
        std::iter::once(item)
            .chain(nested)
            .filter_map(|open_item| self.set_open(doc, open_item, false))
            .collect()
    }

    /// Close every open sibling of `item` at its level, with their descendants.
    pub fn close_open_siblings(&self, doc: &mut Document, item: ElementId) -> Vec<Transition> {
        let Some(parent) = doc.parent(item) else {
            return Vec::new();
        };
        let siblings: Vec<ElementId> = doc
            .children(parent)
            .iter()
            .copied()
            .filter(|&sibling| sibling != item && self.is_open(doc, sibling))
            .collect();
        siblings
            .into_iter()
            .flat_map(|sibling| self.close_with_descendants(doc, sibling))
            .collect()
    }

    /// Flip the item's state.
    ///
    /// With `exclusive`, opening first closes the open siblings at the same
    /// level and closing also closes open descendants.
    pub fn toggle_sub_menu(
        &self,
        doc: &mut Document,
        item: ElementId,
        exclusive: bool,
    ) -> Vec<Transition> {
        if self.affordance(doc, item).is_none() || self.submenu(doc, item).is_none() {
            tracing::debug!(target: "waymark::menu", ?item, "toggle ignored: no submenu or affordance");
            return Vec::new();
        }

        if self.is_open(doc, item) {
            if exclusive {
                self.close_with_descendants(doc, item)
            } else {
                self.set_open(doc, item, false).into_iter().collect()
            }
        } else {
            let mut transitions = if exclusive {
                self.close_open_siblings(doc, item)
            } else {
                Vec::new()
            };
            transitions.extend(self.set_open(doc, item, true));
            transitions
        }
    }

    /// Close every open item in the document.
    pub fn close_all(&self, doc: &mut Document) -> Vec<Transition> {
        let root = doc.document_element();
        let open = doc.query_selector_all(root, &self.selectors.open_items);
        open.into_iter()
            .filter_map(|item| self.set_open(doc, item, false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::el;

    struct Fixture {
        doc: Document,
        selectors: MenuSelectors,
        config: MenuConfig,
        strings: ScreenReaderText,
        first: ElementId,
        second: ElementId,
        nested: ElementId,
    }

    fn item(id: &str, child_items: Vec<waymark_core::ElementBuilder>) -> waymark_core::ElementBuilder {
        el("li")
            .id(id)
            .child(el("a").attr("href", "#"))
            .child(
                el("button")
                    .class("dropdown-toggle")
                    .attr("aria-expanded", "false")
                    .child(el("span").class("screen-reader-text")),
            )
            .child(el("ul").class("sub-menu").children(child_items))
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        doc.mount(
            body,
            el("ul").children([
                item("first", vec![item("nested", vec![el("li")])]),
                item("second", vec![el("li")]),
            ]),
        );
        let config = MenuConfig::default();
        Fixture {
            first: doc.element_by_id("first").unwrap(),
            second: doc.element_by_id("second").unwrap(),
            nested: doc.element_by_id("nested").unwrap(),
            selectors: MenuSelectors::compile(&config).unwrap(),
            strings: ScreenReaderText::new("expand child menu", "collapse child menu"),
            config,
            doc,
        }
    }

    fn states_agree(f: &Fixture, toggler: &Toggler<'_>, item: ElementId) -> bool {
        let submenu = toggler.submenu(&f.doc, item).unwrap();
        toggler.is_open(&f.doc, item) == f.doc.has_class(submenu, "toggle-show")
    }

    #[test]
    fn test_open_writes_classes_and_aria() {
        let mut f = fixture();
        let selectors = f.selectors.clone();
        let config = f.config.clone();
        let strings = f.strings.clone();
        let toggler = Toggler::new(&selectors, &config, Some(&strings));

        let transitions = toggler.toggle_sub_menu(&mut f.doc, f.first, false);
        assert_eq!(transitions, vec![Transition { item: f.first, open: true }]);

        let button = toggler.affordance(&f.doc, f.first).unwrap().element();
        assert_eq!(f.doc.attribute(button, "aria-expanded"), Some("true"));
        assert_eq!(f.doc.attribute(button, "aria-label"), Some("collapse child menu"));
        let text = f.doc.children(button)[0];
        assert_eq!(f.doc.text(text), "collapse child menu");
        assert!(states_agree(&f, &toggler, f.first));

        toggler.toggle_sub_menu(&mut f.doc, f.first, false);
        assert_eq!(f.doc.attribute(button, "aria-expanded"), Some("false"));
        assert_eq!(f.doc.attribute(button, "aria-label"), Some("expand child menu"));
        assert!(states_agree(&f, &toggler, f.first));
    }

    #[test]
    fn test_missing_strings_leave_label_alone() {
        let mut f = fixture();
        let selectors = f.selectors.clone();
        let config = f.config.clone();
        let toggler = Toggler::new(&selectors, &config, None);

        toggler.toggle_sub_menu(&mut f.doc, f.first, false);
        let button = toggler.affordance(&f.doc, f.first).unwrap().element();
        assert!(toggler.is_open(&f.doc, f.first));
        assert_eq!(f.doc.attribute(button, "aria-label"), None);
    }

    #[test]
    fn test_exclusive_open_closes_sibling_and_its_descendants() {
        let mut f = fixture();
        let selectors = f.selectors.clone();
        let config = f.config.clone();
        let toggler = Toggler::new(&selectors, &config, None);

        toggler.toggle_sub_menu(&mut f.doc, f.first, false);
        toggler.toggle_sub_menu(&mut f.doc, f.nested, false);
        let transitions = toggler.toggle_sub_menu(&mut f.doc, f.second, true);

        assert!(!toggler.is_open(&f.doc, f.first));
        assert!(!toggler.is_open(&f.doc, f.nested));
        assert!(toggler.is_open(&f.doc, f.second));
        assert_eq!(transitions.len(), 3);
        assert_eq!(transitions.last(), Some(&Transition { item: f.second, open: true }));
    }

    #[test]
    fn test_non_exclusive_keeps_siblings_open() {
        let mut f = fixture();
        let selectors = f.selectors.clone();
        let config = f.config.clone();
        let toggler = Toggler::new(&selectors, &config, None);

        toggler.toggle_sub_menu(&mut f.doc, f.first, false);
        toggler.toggle_sub_menu(&mut f.doc, f.second, false);
        assert!(toggler.is_open(&f.doc, f.first));
        assert!(toggler.is_open(&f.doc, f.second));
    }

    #[test]
    fn test_exclusive_close_cascades() {
        let mut f = fixture();
        let selectors = f.selectors.clone();
        let config = f.config.clone();
        let toggler = Toggler::new(&selectors, &config, None);

        toggler.toggle_sub_menu(&mut f.doc, f.first, false);
        toggler.toggle_sub_menu(&mut f.doc, f.nested, false);
        toggler.toggle_sub_menu(&mut f.doc, f.first, true);
        assert!(!toggler.is_open(&f.doc, f.nested));
        assert!(states_agree(&f, &toggler, f.nested));
    }

    #[test]
    fn test_close_all() {
        let mut f = fixture();
        let selectors = f.selectors.clone();
        let config = f.config.clone();
        let toggler = Toggler::new(&selectors, &config, None);

        for item in [f.first, f.nested, f.second] {
            toggler.toggle_sub_menu(&mut f.doc, item, false);
        }
        assert_eq!(toggler.close_all(&mut f.doc).len(), 3);
        let root = f.doc.document_element();
        assert!(f.doc.query_selector_all(root, &selectors.open_items).is_empty());
    }

    #[test]
    fn test_item_without_affordance_is_noop() {
        let mut f = fixture();
        let selectors = f.selectors.clone();
        let config = f.config.clone();
        let toggler = Toggler::new(&selectors, &config, None);

        let body = f.doc.body();
        let bare = f.doc.mount(body, el("li").child(el("ul").class("sub-menu")));
        assert!(toggler.toggle_sub_menu(&mut f.doc, bare, true).is_empty());
        assert!(f.doc.take_mutations().is_empty());
    }
}
