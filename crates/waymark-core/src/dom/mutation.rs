//! Mutation journal entries.

use super::ElementId;

/// A recorded change to the document.
///
/// Hosts that mirror a real DOM drain these with
/// [`Document::take_mutations`](super::Document::take_mutations) after each
/// event and replay them onto the corresponding browser nodes, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A new, detached element was created.
    Created {
        /// The new element.
        id: ElementId,
        /// Its tag name.
        tag: String,
    },
    /// An element was inserted under `parent`, before `before` (or appended).
    Inserted {
        /// The new parent.
        parent: ElementId,
        /// The inserted element.
        child: ElementId,
        /// The sibling it was inserted before, if any.
        before: Option<ElementId>,
    },
    /// `old` was replaced by `new` under `parent`.
    Replaced {
        /// The shared parent.
        parent: ElementId,
        /// The element now in the tree.
        new: ElementId,
        /// The element removed from the tree.
        old: ElementId,
    },
    /// A class was added.
    ClassAdded {
        /// Target element.
        id: ElementId,
        /// Class name.
        class: String,
    },
    /// A class was removed.
    ClassRemoved {
        /// Target element.
        id: ElementId,
        /// Class name.
        class: String,
    },
    /// An attribute was set.
    AttributeSet {
        /// Target element.
        id: ElementId,
        /// Attribute name.
        name: String,
        /// New value.
        value: String,
    },
    /// An attribute was removed.
    AttributeRemoved {
        /// Target element.
        id: ElementId,
        /// Attribute name.
        name: String,
    },
    /// An inline style property was set.
    StyleSet {
        /// Target element.
        id: ElementId,
        /// CSS property name.
        property: String,
        /// New value.
        value: String,
    },
    /// The element's text content was replaced.
    TextSet {
        /// Target element.
        id: ElementId,
        /// New text.
        text: String,
    },
}

impl Mutation {
    /// The element this mutation primarily affects.
    pub fn target(&self) -> ElementId {
        match self {
            Self::Created { id, .. }
            | Self::ClassAdded { id, .. }
            | Self::ClassRemoved { id, .. }
            | Self::AttributeSet { id, .. }
            | Self::AttributeRemoved { id, .. }
            | Self::StyleSet { id, .. }
            | Self::TextSet { id, .. } => *id,
            Self::Inserted { child, .. } => *child,
            Self::Replaced { new, .. } => *new,
        }
    }
}
