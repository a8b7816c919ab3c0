//! Core systems for Waymark.
//!
//! This crate provides the page model the Waymark navigation controllers run
//! against, independent of any browser:
//!
//! - **Document**: Arena-backed element tree with classes, attributes and layout
//! - **Selectors**: The CSS selector subset used to find menus and TOC links
//! - **Events**: Clicks, focus, keys, resize, scroll and intersection notifications
//! - **Signal/Slot System**: Type-safe change notification for hosts
//! - **Timers**: One-shot timers and a debouncer on a host-supplied clock
//! - **Mutation Journal**: Ordered record of changes for mirroring onto a real DOM
//!
//! # Document Example
//!
//! ```
//! use waymark_core::{Document, SelectorList, el};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let menu = doc.mount(
//!     body,
//!     el("ul").class("menu").child(
//!         el("li").child(el("a").attr("href", "#")).child(el("ul").class("sub-menu")),
//!     ),
//! );
//!
//! let submenus: SelectorList = "ul.sub-menu".parse().unwrap();
//! assert_eq!(doc.query_selector_all(menu, &submenus).len(), 1);
//! ```
//!
//! # Signal/Slot Example
//!
//! ```
//! use waymark_core::Signal;
//!
//! let toggled = Signal::<bool>::new();
//! let conn_id = toggled.connect(|open| println!("submenu open: {open}"));
//! toggled.emit(true);
//! toggled.disconnect(conn_id);
//! ```

pub mod dom;
mod error;
mod event;
pub mod geometry;
pub mod logging;
pub mod selector;
pub mod signal;
pub mod timer;

pub use dom::{Ancestors, Document, ElementBuilder, ElementId, Mutation, el};
pub use error::{CoreError, DomError, DomResult, Result, SelectorError, TimerError};
pub use event::{EventOutcome, IntersectionEntry, Key, PageEvent};
pub use geometry::{DEFAULT_ROOT_FONT_SIZE, Rect, Viewport};
pub use logging::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};
pub use selector::{Combinator, Selector, SelectorList, SelectorPart};
pub use signal::{ConnectionId, Signal};
pub use timer::{Debouncer, TimerId, TimerManager};

static_assertions::assert_impl_all!(Document: Send, Sync);
static_assertions::assert_impl_all!(Signal<ElementId>: Send, Sync);
static_assertions::assert_impl_all!(Debouncer: Send, Sync);
