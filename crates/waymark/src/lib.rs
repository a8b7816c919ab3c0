//! Waymark - accessible menus and scroll-synchronized tables of contents.
//!
//! Waymark runs the interactive navigation of a server-rendered page:
//!
//! - **Menus**: [`MenuController`] turns nested lists into collapsible,
//!   keyboard-accessible dropdowns with consistent ARIA state
//! - **Table of contents**: [`TocScrollTracker`] marks the TOC link for the
//!   section being read and scrolls to headings on click
//! - **Runtime**: [`Navigation`] owns both and routes [`PageEvent`]s
//!
//! Controllers operate on a [`Page`]: a [`Document`], the viewport metrics and
//! a queue of [`Effect`]s. A browser host mirrors the real DOM into the page,
//! dispatches events and replays the recorded mutations and effects.
//!
//! # Example
//!
//! ```
//! use waymark::prelude::*;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! doc.mount(
//!     body,
//!     el("nav").class("nav--toggle-sub").child(
//!         el("ul").child(
//!             el("li")
//!                 .id("docs")
//!                 .child(el("a").attr("href", "/docs"))
//!                 .child(el("ul").class("sub-menu")),
//!         ),
//!     ),
//! );
//! let mut page = Page::new(doc, Viewport::new(1280.0, 800.0));
//!
//! let mut nav = Navigation::new(NavigationConfig::default()).unwrap();
//! nav.attach(&mut page);
//!
//! let item = page.document().element_by_id("docs").unwrap();
//! let toggle = nav.menu().item(item).unwrap().affordance.element();
//! nav.dispatch(&mut page, &PageEvent::Click { target: toggle });
//! assert!(nav.menu().is_open(page.document(), item));
//! ```

pub mod config;
pub mod menu;
mod navigation;
pub mod page;
pub mod prelude;
pub mod toc;
pub mod viewport;

pub use config::{
    Breakpoints, ConfigError, ConfigResult, MenuConfig, NavigationConfig, ScreenReaderText,
    TocConfig,
};
pub use menu::{MenuController, MenuItem, ParentLink, ToggleAffordance};
pub use navigation::Navigation;
pub use page::{Effect, Page, ScrollBehavior, ScrollBlock};
pub use toc::{ObserverOptions, RootMargin, TocEntry, TocScrollTracker};
pub use viewport::NavigationMode;

pub use waymark_core::{
    Document, ElementBuilder, ElementId, EventOutcome, IntersectionEntry, Key, Mutation,
    PageEvent, Rect, Selector, SelectorList, Signal, Viewport, el,
};

static_assertions::assert_impl_all!(Navigation: Send, Sync);
static_assertions::assert_impl_all!(MenuController: Send, Sync);
static_assertions::assert_impl_all!(TocScrollTracker: Send, Sync);
