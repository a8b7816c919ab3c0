//! Page document model.
//!
//! Provides an arena-backed element tree standing in for the rendered page:
//! - Stable element identifiers via [`slotmap`] keys
//! - Parent-child relationships in document order
//! - Classes, attributes, inline styles and text per element
//! - Layout boxes and scroll offsets reported by the host
//! - A mutation journal so browser hosts can replay changes onto real nodes
//!
//! Controllers only ever read and write the page through [`Document`]; a
//! headless page (tests, server-side simulation) and a browser-mirrored page
//! look identical to them.
//!
//! # Key Types
//!
//! - [`Document`] - The element tree
//! - [`ElementId`] - Handle to one element
//! - [`ElementBuilder`] - Declarative construction of static markup
//! - [`Mutation`] - Journal entry describing one change

mod builder;
mod mutation;

use slotmap::{SlotMap, new_key_type};

use crate::error::{DomError, DomResult};
use crate::geometry::{Rect, Viewport};
use crate::selector::SelectorList;

pub use builder::{ElementBuilder, el};
pub use mutation::Mutation;

new_key_type! {
    /// A unique identifier for an element in a [`Document`].
    ///
    /// Ids stay valid for the lifetime of the document; elements are never
    /// destroyed, only detached.
    pub struct ElementId;
}

impl ElementId {
    /// Convert the id to a raw u64 value.
    ///
    /// Useful for hosts that need to tag foreign objects with an id.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create an id from a raw value produced by [`ElementId::as_raw`].
    ///
    /// This does not check that the element exists in any document.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Internal data stored for each element.
#[derive(Debug, Clone, Default)]
struct ElementData {
    /// Lowercase tag name.
    tag: String,
    /// Class list, in insertion order, without duplicates.
    classes: Vec<String>,
    /// Attributes other than `class`, in insertion order.
    attributes: Vec<(String, String)>,
    /// Inline style properties.
    style: Vec<(String, String)>,
    /// Text content of the element itself.
    text: String,
    /// Parent element, `None` when detached or for the root.
    parent: Option<ElementId>,
    /// Child elements in document order.
    children: Vec<ElementId>,
    /// Layout box in document coordinates.
    layout: Rect,
    /// Vertical scroll offset for scroll containers.
    scroll_top: f64,
    /// Total scrollable height.
    scroll_height: f64,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }
}

/// An element tree representing one rendered page.
#[derive(Debug, Clone)]
pub struct Document {
    elements: SlotMap<ElementId, ElementData>,
    root: ElementId,
    body: ElementId,
    journal: Vec<Mutation>,
    journaling: bool,
}

impl Document {
    /// Create a document containing an empty `<html><body></body></html>`.
    pub fn new() -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(ElementData::new("html"));
        let mut body_data = ElementData::new("body");
        body_data.parent = Some(root);
        let body = elements.insert(body_data);
        elements[root].children.push(body);

        Self {
            elements,
            root,
            body,
            journal: Vec::new(),
            journaling: true,
        }
    }

    /// The root (`<html>`) element.
    #[inline]
    pub fn document_element(&self) -> ElementId {
        self.root
    }

    /// The `<body>` element.
    #[inline]
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Whether `id` refers to an element of this document.
    #[inline]
    pub fn is_valid(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Total number of elements, attached or not.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn data(&self, id: ElementId) -> DomResult<&ElementData> {
        self.elements.get(id).ok_or(DomError::InvalidElementId)
    }

    fn data_mut(&mut self, id: ElementId) -> DomResult<&mut ElementData> {
        self.elements.get_mut(id).ok_or(DomError::InvalidElementId)
    }

    fn record(&mut self, mutation: Mutation) {
        if self.journaling {
            tracing::trace!(target: "waymark_core::dom", ?mutation, "recorded mutation");
            self.journal.push(mutation);
        }
    }

    // =========================================================================
    // Journal
    // =========================================================================

    /// Enable or disable journaling, returning the previous setting.
    ///
    /// Hosts disable journaling while mirroring markup that already exists.
    pub fn set_journaling(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.journaling, enabled)
    }

    /// Mutations recorded since the last [`take_mutations`](Self::take_mutations).
    pub fn pending_mutations(&self) -> &[Mutation] {
        &self.journal
    }

    /// Drain the mutation journal.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    // =========================================================================
    // Tree Structure
    // =========================================================================

    /// Create a new detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let data = ElementData::new(tag);
        let tag = data.tag.clone();
        let id = self.elements.insert(data);
        self.record(Mutation::Created { id, tag });
        id
    }

    /// Build static markup under `parent` without journaling it.
    ///
    /// Returns the id of the top-level built element.
    pub fn mount(&mut self, parent: ElementId, markup: ElementBuilder) -> ElementId {
        let was_journaling = self.set_journaling(false);
        let id = markup.build(self);
        if self.append_child(parent, id).is_err() {
            tracing::debug!(target: "waymark_core::dom", "mount parent is not in this document");
        }
        self.set_journaling(was_journaling);
        id
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`, or append when `None`.
    ///
    /// `child` is detached from its previous parent first.
    pub fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> DomResult<()> {
        self.data(parent)?;
        self.data(child)?;
        if self.contains(child, parent) {
            return Err(DomError::CircularParentage);
        }
        if let Some(reference) = reference {
            if self.data(reference)?.parent != Some(parent) || reference == child {
                return Err(DomError::NotAChild);
            }
        }

        self.detach(child);
        let siblings = &mut self.data_mut(parent)?.children;
        let index = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.data_mut(child)?.parent = Some(parent);

        self.record(Mutation::Inserted {
            parent,
            child,
            before: reference,
        });
        Ok(())
    }

    /// Replace `old` (a child of `parent`) with `new`.
    pub fn replace_child(
        &mut self,
        parent: ElementId,
        new: ElementId,
        old: ElementId,
    ) -> DomResult<()> {
        self.data(new)?;
        if self.data(old)?.parent != Some(parent) {
            return Err(DomError::NotAChild);
        }
        if new == old {
            return Ok(());
        }
        if self.contains(new, parent) {
            return Err(DomError::CircularParentage);
        }

        self.detach(new);
        let siblings = &mut self.data_mut(parent)?.children;
        if let Some(slot) = siblings.iter_mut().find(|c| **c == old) {
            *slot = new;
        }
        self.data_mut(old)?.parent = None;
        self.data_mut(new)?.parent = Some(parent);

        self.record(Mutation::Replaced { parent, new, old });
        Ok(())
    }

    fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.elements.get(id).and_then(|d| d.parent) else {
            return;
        };
        if let Some(parent_data) = self.elements.get_mut(parent) {
            parent_data.children.retain(|&c| c != id);
        }
        if let Some(data) = self.elements.get_mut(id) {
            data.parent = None;
        }
    }

    /// The parent of `id`, if attached.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id).and_then(|d| d.parent)
    }

    /// The children of `id` in document order (empty for unknown ids).
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id)
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over the ancestors of `id`, nearest first (excluding `id`).
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            current: self.parent(id),
        }
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        if !self.is_valid(node) {
            return false;
        }
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether `id` is attached to the document root.
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.contains(self.root, id)
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether `id` matches `selectors` (with `:scope` as the document element).
    pub fn matches(&self, id: ElementId, selectors: &SelectorList) -> bool {
        self.is_valid(id) && selectors.matches(self, id, None)
    }

    /// The nearest inclusive ancestor of `id` matching `selectors`.
    pub fn closest(&self, id: ElementId, selectors: &SelectorList) -> Option<ElementId> {
        if !self.is_valid(id) {
            return None;
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&candidate| selectors.matches(self, candidate, None))
    }

    /// All descendants of `scope` matching `selectors`, in document order.
    ///
    /// `:scope` in the selectors refers to `scope` itself.
    pub fn query_selector_all(&self, scope: ElementId, selectors: &SelectorList) -> Vec<ElementId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| selectors.matches(self, id, Some(scope)))
            .collect()
    }

    /// The first descendant of `scope` matching `selectors`.
    pub fn query_selector(&self, scope: ElementId, selectors: &SelectorList) -> Option<ElementId> {
        self.query_selector_all(scope, selectors).into_iter().next()
    }

    /// The first attached element whose `id` attribute equals `element_id`.
    pub fn element_by_id(&self, element_id: &str) -> Option<ElementId> {
        if element_id.is_empty() {
            return None;
        }
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.attribute(id, "id") == Some(element_id))
    }

    // =========================================================================
    // Element State
    // =========================================================================

    /// The lowercase tag name of `id`.
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.elements.get(id).map(|d| d.tag.as_str())
    }

    /// The class list of `id`.
    pub fn classes(&self, id: ElementId) -> &[String] {
        self.elements
            .get(id)
            .map(|d| d.classes.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `id` carries `class`.
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// Add `class` to `id`. Returns `true` if the class list changed.
    pub fn add_class(&mut self, id: ElementId, class: &str) -> DomResult<bool> {
        let data = self.data_mut(id)?;
        if data.classes.iter().any(|c| c == class) {
            return Ok(false);
        }
        data.classes.push(class.to_string());
        self.record(Mutation::ClassAdded {
            id,
            class: class.to_string(),
        });
        Ok(true)
    }

    /// Remove `class` from `id`. Returns `true` if the class list changed.
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> DomResult<bool> {
        let data = self.data_mut(id)?;
        let before = data.classes.len();
        data.classes.retain(|c| c != class);
        if data.classes.len() == before {
            return Ok(false);
        }
        self.record(Mutation::ClassRemoved {
            id,
            class: class.to_string(),
        });
        Ok(true)
    }

    /// Add or remove `class` depending on `present`.
    pub fn set_class(&mut self, id: ElementId, class: &str, present: bool) -> DomResult<bool> {
        if present {
            self.add_class(id, class)
        } else {
            self.remove_class(id, class)
        }
    }

    /// The value of attribute `name` on `id`.
    ///
    /// Classes are not attributes here; read them with [`classes`](Self::classes).
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        let data = self.elements.get(id)?;
        data.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set attribute `name` on `id`.
    ///
    /// Setting `class` replaces the whole class list.
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> DomResult<()> {
        let data = self.data_mut(id)?;
        if name == "class" {
            data.classes = Vec::new();
            for class in value.split_whitespace() {
                if !data.classes.iter().any(|c| c == class) {
                    data.classes.push(class.to_string());
                }
            }
        } else {
            match data.attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) if *existing == value => return Ok(()),
                Some((_, existing)) => *existing = value.to_string(),
                None => data.attributes.push((name.to_string(), value.to_string())),
            }
        }
        self.record(Mutation::AttributeSet {
            id,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Remove attribute `name` from `id`.
    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> DomResult<()> {
        let data = self.data_mut(id)?;
        let before = data.attributes.len();
        data.attributes.retain(|(n, _)| n != name);
        if data.attributes.len() != before {
            self.record(Mutation::AttributeRemoved {
                id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// The inline style value of `property` on `id`.
    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        let data = self.elements.get(id)?;
        data.style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set an inline style property on `id`.
    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) -> DomResult<()> {
        let data = self.data_mut(id)?;
        match data.style.iter_mut().find(|(p, _)| p == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.style.push((property.to_string(), value.to_string())),
        }
        self.record(Mutation::StyleSet {
            id,
            property: property.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    /// The element's own text.
    pub fn text(&self, id: ElementId) -> &str {
        self.elements.get(id).map(|d| d.text.as_str()).unwrap_or("")
    }

    /// Replace the element's own text.
    pub fn set_text(&mut self, id: ElementId, text: &str) -> DomResult<()> {
        let data = self.data_mut(id)?;
        if data.text == text {
            return Ok(());
        }
        data.text = text.to_string();
        self.record(Mutation::TextSet {
            id,
            text: text.to_string(),
        });
        Ok(())
    }

    // =========================================================================
    // Layout (host-measured, not journaled)
    // =========================================================================

    /// The layout box of `id` in document coordinates.
    pub fn layout(&self, id: ElementId) -> Rect {
        self.elements.get(id).map(|d| d.layout).unwrap_or_default()
    }

    /// Record the layout box of `id` in document coordinates.
    pub fn set_layout(&mut self, id: ElementId, layout: Rect) -> DomResult<()> {
        self.data_mut(id)?.layout = layout;
        Ok(())
    }

    /// The vertical scroll offset of a scroll container.
    pub fn scroll_top(&self, id: ElementId) -> f64 {
        self.elements.get(id).map(|d| d.scroll_top).unwrap_or(0.0)
    }

    /// Record the vertical scroll offset of a scroll container.
    pub fn set_scroll_top(&mut self, id: ElementId, scroll_top: f64) -> DomResult<()> {
        self.data_mut(id)?.scroll_top = scroll_top;
        Ok(())
    }

    /// The total scrollable height of `id`.
    pub fn scroll_height(&self, id: ElementId) -> f64 {
        self.elements.get(id).map(|d| d.scroll_height).unwrap_or(0.0)
    }

    /// Record the total scrollable height of `id`.
    pub fn set_scroll_height(&mut self, id: ElementId, height: f64) -> DomResult<()> {
        self.data_mut(id)?.scroll_height = height;
        Ok(())
    }

    /// The box of `id` relative to the viewport, like `getBoundingClientRect()`.
    pub fn client_rect(&self, id: ElementId, viewport: &Viewport) -> Option<Rect> {
        let layout = self.data(id).ok()?.layout;
        let container_scroll: f64 = self.ancestors(id).map(|a| self.scroll_top(a)).sum();
        Some(layout.translated(0.0, -(viewport.scroll_y + container_scroll)))
    }

    /// The top of `id` in page coordinates at the current scroll position.
    pub fn page_top(&self, id: ElementId, viewport: &Viewport) -> Option<f64> {
        self.client_rect(id, viewport)
            .map(|rect| rect.top() + viewport.scroll_y)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over an element's ancestors, nearest first.
pub struct Ancestors<'a> {
    doc: &'a Document,
    current: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        let list = doc.mount(
            body,
            el("ul").class("menu").children([
                el("li").id("first").child(el("a").attr("href", "/a")),
                el("li").id("second").child(el("a").attr("href", "#")),
            ]),
        );
        (doc, list)
    }

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert_eq!(doc.tag(doc.document_element()), Some("html"));
        assert_eq!(doc.tag(doc.body()), Some("body"));
        assert_eq!(doc.parent(doc.body()), Some(doc.document_element()));
        assert!(doc.pending_mutations().is_empty());
    }

    #[test]
    fn test_mount_is_not_journaled() {
        let (doc, list) = sample();
        assert!(doc.pending_mutations().is_empty());
        assert_eq!(doc.children(list).len(), 2);
        assert!(doc.is_connected(list));
    }

    #[test]
    fn test_descendants_document_order() {
        let (doc, list) = sample();
        let tags: Vec<_> = doc
            .descendants(list)
            .into_iter()
            .filter_map(|id| doc.tag(id).map(str::to_string))
            .collect();
        assert_eq!(tags, vec!["li", "a", "li", "a"]);
    }

    #[test]
    fn test_element_by_id() {
        let (doc, _) = sample();
        let second = doc.element_by_id("second").unwrap();
        assert_eq!(doc.tag(second), Some("li"));
        assert!(doc.element_by_id("missing").is_none());
        assert!(doc.element_by_id("").is_none());
    }

    #[test]
    fn test_insert_before_and_journal() {
        let (mut doc, list) = sample();
        let second = doc.element_by_id("second").unwrap();
        let span = doc.create_element("SPAN");
        doc.insert_before(list, span, Some(second)).unwrap();

        assert_eq!(doc.children(list)[1], span);
        assert_eq!(doc.tag(span), Some("span"));

        let mutations = doc.take_mutations();
        assert_eq!(mutations.len(), 2);
        assert!(matches!(mutations[0], Mutation::Created { id, .. } if id == span));
        assert!(matches!(
            mutations[1],
            Mutation::Inserted { parent, child, before: Some(b) } if parent == list && child == span && b == second
        ));
        assert!(doc.pending_mutations().is_empty());
    }

    #[test]
    fn test_insert_rejects_cycles_and_strangers() {
        let (mut doc, list) = sample();
        let first = doc.element_by_id("first").unwrap();
        assert_eq!(
            doc.append_child(first, list),
            Err(DomError::CircularParentage)
        );

        let stray = doc.create_element("li");
        let other = doc.create_element("li");
        assert_eq!(
            doc.insert_before(list, stray, Some(other)),
            Err(DomError::NotAChild)
        );
    }

    #[test]
    fn test_replace_child() {
        let (mut doc, list) = sample();
        let first = doc.element_by_id("first").unwrap();
        let replacement = doc.create_element("li");
        doc.replace_child(list, replacement, first).unwrap();

        assert_eq!(doc.children(list)[0], replacement);
        assert_eq!(doc.parent(first), None);
        assert!(!doc.is_connected(first));
    }

    #[test]
    fn test_class_changes_only_journal_when_changed() {
        let (mut doc, list) = sample();
        assert!(doc.add_class(list, "open").unwrap());
        assert!(!doc.add_class(list, "open").unwrap());
        assert!(doc.remove_class(list, "open").unwrap());
        assert!(!doc.remove_class(list, "open").unwrap());
        assert_eq!(doc.take_mutations().len(), 2);
    }

    #[test]
    fn test_class_attribute_replaces_class_list() {
        let (mut doc, list) = sample();
        doc.set_attribute(list, "class", "a b  a").unwrap();
        assert_eq!(doc.classes(list), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_client_rect_accounts_for_scroll() {
        let mut doc = Document::new();
        let body = doc.body();
        let panel = doc.mount(
            body,
            el("div")
                .layout(Rect::new(0.0, 100.0, 200.0, 300.0))
                .child(el("a").layout(Rect::new(0.0, 500.0, 200.0, 20.0))),
        );
        let link = doc.children(panel)[0];
        doc.set_scroll_top(panel, 150.0).unwrap();

        let viewport = Viewport::new(1024.0, 768.0).with_scroll_y(50.0);
        assert_eq!(doc.client_rect(panel, &viewport).unwrap().top(), 50.0);
        assert_eq!(doc.client_rect(link, &viewport).unwrap().top(), 300.0);
        assert_eq!(doc.page_top(panel, &viewport), Some(100.0));
    }
}
