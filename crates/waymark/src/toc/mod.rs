//! Scroll-synchronized table of contents.
//!
//! [`TocScrollTracker`] pairs `.toc-list a` links with the headings their
//! fragments name and keeps the link for the section being read marked with
//! `toc-active`.
//!
//! # Resolution
//!
//! ```text
//! scroll_y <= 10            -> first heading
//! probe = scroll_y + 0.15 * viewport height
//! last heading with top <= probe, else the first heading
//! ```
//!
//! Resolution is a pure function ([`resolve_active`]) over heading tops, so
//! the policy is testable without a page.

mod entry;
mod intersection;
mod resolver;
mod tracker;

pub use entry::{TocEntry, TocIndex, fragment_of};
pub use intersection::{IntersectionBand, IntersectionWatcher, MarginLength, RootMargin};
pub use resolver::{ResolverParams, probe_line, resolve_active};
pub use tracker::{ObserverOptions, TocScrollTracker};
