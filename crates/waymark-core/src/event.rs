//! Page events delivered to navigation controllers.
//!
//! Hosts translate browser events into [`PageEvent`]s and dispatch them in
//! arrival order. Timestamps are host-clock [`Duration`]s, see [`crate::timer`].

use std::time::Duration;

use crate::dom::ElementId;

/// A keyboard key relevant to navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// The Tab key.
    Tab,
    /// The Enter key.
    Enter,
    /// The Escape key.
    Escape,
    /// Any other key, by its `KeyboardEvent.key` name.
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One entry of an intersection notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// The observed element.
    pub target: ElementId,
    /// Whether the element overlaps the observation band.
    pub is_intersecting: bool,
    /// Visible fraction of the element within the band, `0.0..=1.0`.
    pub ratio: f64,
}

/// An event delivered to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// A click (or activation) with the innermost target element.
    Click {
        /// Innermost element under the pointer.
        target: ElementId,
    },
    /// An element received focus.
    Focus {
        /// The focused element.
        target: ElementId,
    },
    /// A key was pressed while `target` had focus.
    KeyDown {
        /// Focused element.
        target: ElementId,
        /// The key.
        key: Key,
        /// Whether Shift was held.
        shift: bool,
    },
    /// The window was resized. Hosts update the viewport before dispatching.
    Resize,
    /// The document scrolled at time `at`.
    Scroll {
        /// Host clock time.
        at: Duration,
    },
    /// Timer tick at time `at`, used to flush debounced work.
    Tick {
        /// Host clock time.
        at: Duration,
    },
    /// Intersection observer notification.
    Intersection(Vec<IntersectionEntry>),
}

impl PageEvent {
    /// The element the event is aimed at, for targeted events.
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Click { target } | Self::Focus { target } | Self::KeyDown { target, .. } => {
                Some(*target)
            }
            _ => None,
        }
    }
}

/// The result of dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// The browser's default action (link navigation) must be suppressed.
    pub default_prevented: bool,
}

impl EventOutcome {
    /// An outcome that leaves the default action alone.
    pub const fn proceed() -> Self {
        Self {
            default_prevented: false,
        }
    }

    /// An outcome that suppresses the default action.
    pub const fn prevent_default() -> Self {
        Self {
            default_prevented: true,
        }
    }

    /// Combine two outcomes.
    pub fn merge(self, other: Self) -> Self {
        Self {
            default_prevented: self.default_prevented || other.default_prevented,
        }
    }
}
