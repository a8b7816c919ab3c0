//! Prelude module for Waymark.
//!
//! ```ignore
//! use waymark::prelude::*;
//! ```
//!
//! This provides access to:
//! - The runtime (`Navigation`, `Page`, `PageEvent`)
//! - Controllers (`MenuController`, `TocScrollTracker`)
//! - Configuration (`NavigationConfig` and its sections)
//! - The document model (`Document`, `ElementId`, `el`)

// ============================================================================
// Runtime
// ============================================================================

pub use crate::navigation::Navigation;
pub use crate::page::{Effect, Page, ScrollBehavior, ScrollBlock};
pub use waymark_core::{EventOutcome, IntersectionEntry, Key, PageEvent};

// ============================================================================
// Controllers
// ============================================================================

pub use crate::menu::{MenuController, MenuItem, ParentLink, ToggleAffordance};
pub use crate::toc::{TocEntry, TocScrollTracker};
pub use crate::viewport::NavigationMode;

// ============================================================================
// Configuration
// ============================================================================

pub use crate::config::{
    Breakpoints, ConfigError, MenuConfig, NavigationConfig, ScreenReaderText, TocConfig,
};

// ============================================================================
// Document Model
// ============================================================================

pub use waymark_core::{
    Document, ElementBuilder, ElementId, Rect, SelectorList, Signal, Viewport, el,
};
