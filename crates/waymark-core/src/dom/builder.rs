//! Declarative element construction.
//!
//! ```
//! use waymark_core::{Document, el};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let nav = doc.mount(
//!     body,
//!     el("nav").class("nav--toggle-sub").child(
//!         el("ul").child(el("li").child(el("a").attr("href", "/docs").text("Docs"))),
//!     ),
//! );
//! assert_eq!(doc.descendants(nav).len(), 3);
//! ```

use crate::geometry::Rect;

use super::{Document, ElementId};

/// Start building an element with the given tag.
pub fn el(tag: &str) -> ElementBuilder {
    ElementBuilder::new(tag)
}

/// Builder for a static element subtree.
#[derive(Debug, Clone, Default)]
pub struct ElementBuilder {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    text: Option<String>,
    layout: Option<Rect>,
    scroll_height: Option<f64>,
    children: Vec<ElementBuilder>,
}

impl ElementBuilder {
    /// Create a builder for `tag`.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    /// Add a class.
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Set the `id` attribute.
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Set an attribute.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Set an inline style property.
    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.style.push((property.to_string(), value.to_string()));
        self
    }

    /// Set the element's own text.
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Set the layout box in document coordinates.
    pub fn layout(mut self, rect: Rect) -> Self {
        self.layout = Some(rect);
        self
    }

    /// Shorthand for a full-width box at `top` with the given height.
    pub fn at(self, top: f64, height: f64) -> Self {
        self.layout(Rect::new(0.0, top, 0.0, height))
    }

    /// Set the scrollable height.
    pub fn scroll_height(mut self, height: f64) -> Self {
        self.scroll_height = Some(height);
        self
    }

    /// Append a child.
    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = ElementBuilder>,
    {
        self.children.extend(children);
        self
    }

    /// Build the subtree as a detached element of `doc`.
    pub(crate) fn build(self, doc: &mut Document) -> ElementId {
        let id = doc.create_element(&self.tag);
        // Ids come straight from `create_element`, so every write below targets a live element.
        for class in &self.classes {
            let _ = doc.add_class(id, class);
        }
        for (name, value) in &self.attributes {
            let _ = doc.set_attribute(id, name, value);
        }
        for (property, value) in &self.style {
            let _ = doc.set_style(id, property, value);
        }
        if let Some(text) = &self.text {
            let _ = doc.set_text(id, text);
        }
        if let Some(layout) = self.layout {
            let _ = doc.set_layout(id, layout);
        }
        if let Some(height) = self.scroll_height {
            let _ = doc.set_scroll_height(id, height);
        }
        for child in self.children {
            let child_id = child.build(doc);
            let _ = doc.append_child(id, child_id);
        }
        id
    }
}
