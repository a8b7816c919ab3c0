//! Mirroring the browser DOM into a [`Document`].
//!
//! The mirror captures `<body>` once at startup: tags, classes, attributes,
//! inline styles, own text and layout boxes. Afterwards the model owns the
//! structure and changes flow the other way, through the mutation journal.

use std::collections::HashSet;

use slotmap::SecondaryMap;
use wasm_bindgen::prelude::*;
use waymark_core::{Document, ElementId, Rect, Viewport};
use web_sys::{Element, HtmlElement, Node, Window};

use crate::error::{WebError, WebResult};

/// Bidirectional mapping between model ids and browser elements.
pub struct DomMirror {
    elements: SecondaryMap<ElementId, Element>,
    /// Browser element to index into `ids`.
    lookup: js_sys::WeakMap,
    ids: Vec<ElementId>,
}

impl DomMirror {
    /// Capture the page's `<body>` into a fresh document.
    #[tracing::instrument(skip_all, target = "waymark_web", level = "debug")]
    pub fn capture(dom: &web_sys::Document) -> WebResult<(Self, Document)> {
        let root = dom
            .document_element()
            .ok_or(WebError::MissingGlobal("document.documentElement"))?;
        let body = dom.body().ok_or(WebError::MissingGlobal("document.body"))?;

        let mut doc = Document::new();
        let was_journaling = doc.set_journaling(false);
        let mut mirror = Self {
            elements: SecondaryMap::new(),
            lookup: js_sys::WeakMap::new(),
            ids: Vec::new(),
        };
        mirror.bind(doc.document_element(), &root);
        let body_id = doc.body();
        mirror.bind(body_id, &body);
        copy_element(&mut doc, body_id, &body)?;
        mirror.capture_children(&mut doc, body_id, &body)?;
        if let Err(err) = doc.set_scroll_height(body_id, f64::from(body.scroll_height())) {
            tracing::debug!(target: "waymark_web", %err, "failed to record body height");
        }
        doc.set_journaling(was_journaling);

        tracing::debug!(target: "waymark_web", elements = mirror.ids.len(), "captured page");
        Ok((mirror, doc))
    }

    fn capture_children(&mut self, doc: &mut Document, parent: ElementId, element: &Element) -> WebResult<()> {
        let children = element.children();
        for index in 0..children.length() {
            let Some(child) = children.item(index) else {
                continue;
            };
            let id = doc.create_element(&child.local_name());
            copy_element(doc, id, &child)?;
            doc.append_child(parent, id)
                .map_err(|err| WebError::Dom { call: "appendChild", message: err.to_string() })?;
            self.bind(id, &child);
            self.capture_children(doc, id, &child)?;
        }
        Ok(())
    }

    /// Associate `id` with a browser element.
    pub fn bind(&mut self, id: ElementId, element: &Element) {
        let index = self.ids.len();
        self.ids.push(id);
        self.lookup.set(element.as_ref(), &JsValue::from_f64(index as f64));
        self.elements.insert(id, element.clone());
    }

    /// The browser element for `id`.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// The model id of `element` or of its nearest mirrored ancestor.
    pub fn resolve(&self, node: &Node) -> Option<ElementId> {
        let mut current = match node.dyn_ref::<Element>() {
            Some(element) => Some(element.clone()),
            None => node.parent_element(),
        };
        while let Some(element) = current {
            if let Some(id) = self.id_of(&element) {
                return Some(id);
            }
            current = element.parent_element();
        }
        None
    }

    fn id_of(&self, element: &Element) -> Option<ElementId> {
        let index = self.lookup.get(element.as_ref()).as_f64()?;
        self.ids.get(index as usize).copied()
    }

    /// Re-measure the layout boxes of `targets` and of their ancestors.
    ///
    /// Layout is recorded in document coordinates, with the scroll offsets of
    /// enclosing scroll containers added back, so model rects match the
    /// browser's `getBoundingClientRect()` at the current scroll position.
    pub fn refresh_layout(&self, doc: &mut Document, viewport: &Viewport, targets: &[ElementId]) {
        let was_journaling = doc.set_journaling(false);
        let mut seen = HashSet::new();
        for &target in targets {
            let chain: Vec<ElementId> = std::iter::once(target).chain(doc.ancestors(target)).collect();
            for id in chain {
                if !seen.insert(id) {
                    continue;
                }
                let Some(element) = self.elements.get(id) else {
                    continue;
                };
                if let Err(err) = doc.set_scroll_top(id, f64::from(element.scroll_top())) {
                    tracing::debug!(target: "waymark_web", %err, "failed to record scroll offset");
                }
            }
        }
        for id in seen {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            let container_scroll: f64 = doc.ancestors(id).map(|a| doc.scroll_top(a)).sum();
            let rect = element.get_bounding_client_rect();
            let layout = Rect::new(
                rect.x(),
                rect.y() + viewport.scroll_y + container_scroll,
                rect.width(),
                rect.height(),
            );
            if let Err(err) = doc.set_layout(id, layout) {
                tracing::debug!(target: "waymark_web", %err, "failed to record layout");
            }
        }
        doc.set_journaling(was_journaling);
    }

    /// Measure every mirrored element.
    pub fn refresh_all(&self, doc: &mut Document, viewport: &Viewport) {
        self.refresh_layout(doc, viewport, &self.ids);
    }

    /// Number of mirrored elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

fn copy_element(doc: &mut Document, id: ElementId, element: &Element) -> WebResult<()> {
    let to_web = |err: waymark_core::DomError| WebError::Dom {
        call: "capture",
        message: err.to_string(),
    };

    let classes = element.class_list();
    for index in 0..classes.length() {
        if let Some(class) = classes.item(index) {
            doc.add_class(id, &class).map_err(to_web)?;
        }
    }

    let attributes = element.attributes();
    for index in 0..attributes.length() {
        let Some(attr) = attributes.item(index) else {
            continue;
        };
        let name = attr.name();
        if name == "class" || name == "style" {
            continue;
        }
        doc.set_attribute(id, &name, &attr.value()).map_err(to_web)?;
    }

    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let style = html.style();
        for index in 0..style.length() {
            let property = style.item(index);
            if let Ok(value) = style.get_property_value(&property) {
                doc.set_style(id, &property, &value).map_err(to_web)?;
            }
        }
    }

    let text = own_text(element);
    if !text.is_empty() {
        doc.set_text(id, &text).map_err(to_web)?;
    }
    Ok(())
}

/// Concatenated text of the element's direct text nodes, trimmed.
fn own_text(element: &Element) -> String {
    let nodes = element.child_nodes();
    let mut text = String::new();
    for index in 0..nodes.length() {
        if let Some(node) = nodes.item(index) {
            if node.node_type() == Node::TEXT_NODE {
                text.push_str(&node.text_content().unwrap_or_default());
            }
        }
    }
    text.trim().to_string()
}

/// Read the window metrics the controllers use.
pub fn read_viewport(window: &Window, dom: &web_sys::Document) -> WebResult<Viewport> {
    let number = |value: Result<JsValue, JsValue>, call: &'static str| -> WebResult<f64> {
        value
            .map_err(|err| WebError::dom(call, err))
            .map(|value| value.as_f64().unwrap_or(0.0))
    };
    let inner_width = number(window.inner_width(), "innerWidth")?;
    let inner_height = number(window.inner_height(), "innerHeight")?;
    let outer_width = number(window.outer_width(), "outerWidth")?;
    let scroll_y = window.scroll_y().map_err(|err| WebError::dom("scrollY", err))?;

    let root_font_size = dom
        .document_element()
        .and_then(|root| window.get_computed_style(&root).ok().flatten())
        .and_then(|style| style.get_property_value("font-size").ok())
        .and_then(|size| size.trim_end_matches("px").parse::<f64>().ok())
        .filter(|size| *size > 0.0)
        .unwrap_or(waymark_core::DEFAULT_ROOT_FONT_SIZE);

    let mut viewport = Viewport::new(inner_width, inner_height)
        .with_scroll_y(scroll_y)
        .with_root_font_size(root_font_size);
    viewport.outer_width = outer_width;
    Ok(viewport)
}
