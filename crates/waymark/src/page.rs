//! The page the controllers operate on.
//!
//! A [`Page`] bundles the document, the current viewport metrics and a queue
//! of [`Effect`]s: side effects the model cannot perform itself (smooth
//! scrolling, history pushes). Hosts drain the queue after each dispatch,
//! together with the document's mutation journal.

use waymark_core::{Document, ElementId, Viewport};

/// Scroll animation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollBehavior {
    /// Animated scroll.
    #[default]
    Smooth,
    /// Instant jump.
    Auto,
}

impl ScrollBehavior {
    /// The CSSOM `behavior` keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Auto => "auto",
        }
    }
}

/// Vertical alignment for [`Effect::ScrollIntoView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollBlock {
    /// Align the element's top with the viewport top.
    #[default]
    Start,
    /// Center the element.
    Center,
    /// Align the element's bottom with the viewport bottom.
    End,
    /// Scroll the minimum amount.
    Nearest,
}

impl ScrollBlock {
    /// The CSSOM `block` keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
            Self::Nearest => "nearest",
        }
    }
}

/// A side effect requested by a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Scroll the page so that `target` becomes visible.
    ScrollIntoView {
        /// Element to reveal.
        target: ElementId,
        /// Animation style.
        behavior: ScrollBehavior,
        /// Vertical alignment.
        block: ScrollBlock,
    },
    /// Scroll a container element (not the page) to an offset.
    ScrollContainerTo {
        /// The scroll container.
        container: ElementId,
        /// New `scrollTop`.
        top: f64,
        /// Animation style.
        behavior: ScrollBehavior,
    },
    /// Push a new history entry with the given fragment (including `#`).
    PushHash {
        /// The new location hash.
        hash: String,
    },
}

/// A document, its viewport and pending effects.
#[derive(Debug, Clone, Default)]
pub struct Page {
    document: Document,
    viewport: Viewport,
    effects: Vec<Effect>,
    location_hash: Option<String>,
}

impl Page {
    /// Create a page over an existing document.
    pub fn new(document: Document, viewport: Viewport) -> Self {
        Self {
            document,
            viewport,
            effects: Vec::new(),
            location_hash: None,
        }
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The current viewport metrics.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Replace the viewport metrics (after a resize).
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Record the page scroll offset (after a scroll).
    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.viewport.scroll_y = scroll_y;
    }

    /// The fragment of the last pushed history entry.
    pub fn location_hash(&self) -> Option<&str> {
        self.location_hash.as_deref()
    }

    /// Queue an effect.
    pub fn push_effect(&mut self, effect: Effect) {
        tracing::trace!(target: "waymark::page", ?effect, "queued effect");
        self.effects.push(effect);
    }

    /// Effects queued since the last [`take_effects`](Self::take_effects).
    pub fn pending_effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Drain the effect queue.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Request a page scroll bringing `target` into view.
    pub fn scroll_into_view(&mut self, target: ElementId, behavior: ScrollBehavior, block: ScrollBlock) {
        self.push_effect(Effect::ScrollIntoView {
            target,
            behavior,
            block,
        });
    }

    /// Request a container scroll.
    pub fn scroll_container_to(&mut self, container: ElementId, top: f64, behavior: ScrollBehavior) {
        self.push_effect(Effect::ScrollContainerTo {
            container,
            top,
            behavior,
        });
    }

    /// Push `#fragment` onto the session history.
    pub fn push_hash(&mut self, fragment: &str) {
        let hash = format!("#{fragment}");
        self.location_hash = Some(hash.clone());
        self.push_effect(Effect::PushHash { hash });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_hash_records_location_and_effect() {
        let mut page = Page::default();
        page.push_hash("usage");
        assert_eq!(page.location_hash(), Some("#usage"));
        assert_eq!(
            page.take_effects(),
            vec![Effect::PushHash {
                hash: "#usage".into()
            }]
        );
        assert!(page.pending_effects().is_empty());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(ScrollBehavior::Smooth.as_str(), "smooth");
        assert_eq!(ScrollBlock::Center.as_str(), "center");
    }
}
