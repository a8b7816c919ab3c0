//! Toggle affordances and parent-link classification.

use waymark_core::{Document, ElementId};

/// The button that opens and closes one submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleAffordance {
    /// A `button.dropdown-toggle` synthesized from a `.dropdown` span.
    Classic {
        /// The button element.
        button: ElementId,
    },
    /// A toggle rendered by the block editor.
    ///
    /// The block's own script owns `aria-expanded` on it.
    Block {
        /// The button element.
        button: ElementId,
    },
}

impl ToggleAffordance {
    /// The affordance element.
    pub fn element(&self) -> ElementId {
        match *self {
            Self::Classic { button } | Self::Block { button } => button,
        }
    }

    /// Whether this controller writes `aria-expanded` on the affordance.
    pub fn owns_aria_expanded(&self) -> bool {
        matches!(self, Self::Classic { .. })
    }
}

/// The direct link of a submenu-owning item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentLink {
    /// The item has no direct link; its whole surface toggles.
    None,
    /// A link with no usable destination (`href` absent, empty or `#`).
    Placeholder(ElementId),
    /// A link to a real destination.
    Destination(ElementId),
}

impl ParentLink {
    /// Classify the optional direct link of an item.
    pub fn classify(doc: &Document, link: Option<ElementId>) -> Self {
        let Some(link) = link else {
            return Self::None;
        };
        match doc.attribute(link, "href") {
            None | Some("") | Some("#") => Self::Placeholder(link),
            Some(_) => Self::Destination(link),
        }
    }

    /// The link element, if any.
    pub fn element(&self) -> Option<ElementId> {
        match *self {
            Self::None => None,
            Self::Placeholder(link) | Self::Destination(link) => Some(link),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::el;

    #[test]
    fn test_classify_links() {
        let mut doc = Document::new();
        let body = doc.body();
        let links: Vec<_> = [
            el("a"),
            el("a").attr("href", ""),
            el("a").attr("href", "#"),
            el("a").attr("href", "/docs"),
            el("a").attr("href", "#intro"),
        ]
        .into_iter()
        .map(|markup| doc.mount(body, markup))
        .collect();

        assert_eq!(ParentLink::classify(&doc, None), ParentLink::None);
        assert_eq!(ParentLink::classify(&doc, Some(links[0])), ParentLink::Placeholder(links[0]));
        assert_eq!(ParentLink::classify(&doc, Some(links[1])), ParentLink::Placeholder(links[1]));
        assert_eq!(ParentLink::classify(&doc, Some(links[2])), ParentLink::Placeholder(links[2]));
        assert_eq!(ParentLink::classify(&doc, Some(links[3])), ParentLink::Destination(links[3]));
        assert_eq!(ParentLink::classify(&doc, Some(links[4])), ParentLink::Destination(links[4]));
    }

    #[test]
    fn test_aria_ownership() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        assert!(ToggleAffordance::Classic { button }.owns_aria_expanded());
        assert!(!ToggleAffordance::Block { button }.owns_aria_expanded());
    }
}
