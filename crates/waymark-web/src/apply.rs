//! Replaying model changes onto the browser DOM.

use wasm_bindgen::prelude::*;
use waymark::{Effect, Mutation, ScrollBehavior, ScrollBlock};
use web_sys::{HtmlElement, Node, ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Window};

use crate::error::{WebError, WebResult};
use crate::mirror::DomMirror;

/// Apply journaled mutations in order.
///
/// Mutations on elements the mirror does not know are skipped; a failing DOM
/// call aborts the batch.
pub fn apply_mutations(
    dom: &web_sys::Document,
    mirror: &mut DomMirror,
    mutations: Vec<Mutation>,
) -> WebResult<()> {
    for mutation in mutations {
        tracing::trace!(target: "waymark_web", ?mutation, "applying mutation");
        if let Mutation::Created { id, tag } = &mutation {
            let element = dom
                .create_element(tag)
                .map_err(|err| WebError::dom("createElement", err))?;
            mirror.bind(*id, &element);
            continue;
        }

        let Some(target) = mirror.element(mutation.target()).cloned() else {
            tracing::debug!(target: "waymark_web", ?mutation, "mutation target is not mirrored");
            continue;
        };
        match mutation {
            Mutation::Created { .. } => {}
            Mutation::Inserted { parent, before, .. } => {
                let Some(parent) = mirror.element(parent) else {
                    continue;
                };
                let reference: Option<&Node> = before
                    .and_then(|before| mirror.element(before))
                    .map(|element| element.as_ref());
                parent
                    .insert_before(&target, reference)
                    .map_err(|err| WebError::dom("insertBefore", err))?;
            }
            Mutation::Replaced { parent, old, .. } => {
                let (Some(parent), Some(old)) = (mirror.element(parent), mirror.element(old)) else {
                    continue;
                };
                parent
                    .replace_child(&target, old)
                    .map_err(|err| WebError::dom("replaceChild", err))?;
            }
            Mutation::ClassAdded { class, .. } => {
                target
                    .class_list()
                    .add_1(&class)
                    .map_err(|err| WebError::dom("classList.add", err))?;
            }
            Mutation::ClassRemoved { class, .. } => {
                target
                    .class_list()
                    .remove_1(&class)
                    .map_err(|err| WebError::dom("classList.remove", err))?;
            }
            Mutation::AttributeSet { name, value, .. } => {
                target
                    .set_attribute(&name, &value)
                    .map_err(|err| WebError::dom("setAttribute", err))?;
            }
            Mutation::AttributeRemoved { name, .. } => {
                target
                    .remove_attribute(&name)
                    .map_err(|err| WebError::dom("removeAttribute", err))?;
            }
            Mutation::StyleSet { property, value, .. } => {
                if let Some(html) = target.dyn_ref::<HtmlElement>() {
                    html.style()
                        .set_property(&property, &value)
                        .map_err(|err| WebError::dom("style.setProperty", err))?;
                }
            }
            Mutation::TextSet { text, .. } => {
                target.set_text_content(Some(&text));
            }
        }
    }
    Ok(())
}

/// Perform queued page effects.
pub fn apply_effects(window: &Window, mirror: &DomMirror, effects: Vec<Effect>) -> WebResult<()> {
    for effect in effects {
        tracing::trace!(target: "waymark_web", ?effect, "applying effect");
        match effect {
            Effect::ScrollIntoView {
                target,
                behavior,
                block,
            } => {
                let Some(element) = mirror.element(target) else {
                    continue;
                };
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(scroll_behavior(behavior));
                options.set_block(scroll_block(block));
                element.scroll_into_view_with_scroll_into_view_options(&options);
            }
            Effect::ScrollContainerTo {
                container,
                top,
                behavior,
            } => {
                let Some(element) = mirror.element(container) else {
                    continue;
                };
                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(scroll_behavior(behavior));
                element.scroll_to_with_scroll_to_options(&options);
            }
            Effect::PushHash { hash } => {
                window
                    .history()
                    .map_err(|err| WebError::dom("history", err))?
                    .push_state_with_url(&JsValue::NULL, "", Some(&hash))
                    .map_err(|err| WebError::dom("history.pushState", err))?;
            }
        }
    }
    Ok(())
}

fn scroll_behavior(behavior: ScrollBehavior) -> web_sys::ScrollBehavior {
    match behavior {
        ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
    }
}

fn scroll_block(block: ScrollBlock) -> ScrollLogicalPosition {
    match block {
        ScrollBlock::Start => ScrollLogicalPosition::Start,
        ScrollBlock::Center => ScrollLogicalPosition::Center,
        ScrollBlock::End => ScrollLogicalPosition::End,
        ScrollBlock::Nearest => ScrollLogicalPosition::Nearest,
    }
}
