//! Logging and debugging facilities for Waymark.
//!
//! This module provides:
//! - Target names for filtering `tracing` output by subsystem
//! - Debug visualization for document subtrees
//!
//! # Tracing Integration
//!
//! Waymark uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the host:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("waymark=debug,waymark_core=info")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use waymark_core::{Document, el};
//! use waymark_core::logging::DocumentTreeDebug;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let nav = doc.mount(body, el("nav").class("main").child(el("ul")));
//! let text = DocumentTreeDebug::new().format_subtree(&doc, nav);
//! assert!(text.starts_with("nav.main"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::dom::{Document, ElementId};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core model target.
    pub const CORE: &str = "waymark_core";
    /// Document model target.
    pub const DOM: &str = "waymark_core::dom";
    /// Timer system target.
    pub const TIMER: &str = "waymark_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "waymark_core::signal";
    /// Menu controller target.
    pub const MENU: &str = "waymark::menu";
    /// TOC scroll tracker target.
    pub const TOC: &str = "waymark::toc";
    /// Page effects target.
    pub const PAGE: &str = "waymark::page";
    /// Browser host target.
    pub const WEB: &str = "waymark_web";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show non-`id` attributes.
    pub show_attributes: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_attributes: false,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed output, including attributes.
    pub fn detailed() -> Self {
        Self {
            show_attributes: true,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing document subtrees.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the subtree rooted at `root`, one element per line.
    pub fn format_subtree(&self, doc: &Document, root: ElementId) -> String {
        let mut output = String::new();
        self.format_into(doc, root, "", true, 0, &mut output);
        output
    }

    fn format_into(
        &self,
        doc: &Document,
        id: ElementId,
        indent: &str,
        is_last: bool,
        depth: usize,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        let (tee, corner, bar) = match self.options.style {
            TreeStyle::Ascii => ("+-- ", "`-- ", "|   "),
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "\u{2502}   "),
        };

        if depth > 0 {
            output.push_str(indent);
            output.push_str(if is_last { corner } else { tee });
        }
        output.push_str(&describe(doc, id));
        if self.options.show_attributes {
            for name in ["href", "aria-expanded", "aria-label", "data-level"] {
                if let Some(value) = doc.attribute(id, name) {
                    let _ = write!(output, " {name}=\"{value}\"");
                }
            }
        }
        output.push('\n');

        let child_indent = if depth == 0 {
            String::new()
        } else if is_last {
            format!("{indent}    ")
        } else {
            format!("{indent}{bar}")
        };
        let children = doc.children(id);
        for (i, &child) in children.iter().enumerate() {
            self.format_into(doc, child, &child_indent, i + 1 == children.len(), depth + 1, output);
        }
    }
}

/// Short `tag#id.class` description of an element.
pub fn describe(doc: &Document, id: ElementId) -> String {
    let mut out = doc.tag(id).unwrap_or("?").to_string();
    if let Some(element_id) = doc.attribute(id, "id") {
        let _ = write!(out, "#{element_id}");
    }
    for class in doc.classes(id) {
        let _ = write!(out, ".{class}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::el;

    #[test]
    fn test_describe() {
        let mut doc = Document::new();
        let body = doc.body();
        let li = doc.mount(body, el("li").id("x").class("a").class("b"));
        assert_eq!(describe(&doc, li), "li#x.a.b");
    }

    #[test]
    fn test_format_subtree_ascii() {
        let mut doc = Document::new();
        let body = doc.body();
        let ul = doc.mount(
            body,
            el("ul").children([el("li").child(el("a")), el("li")]),
        );
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        });
        let text = debug.format_subtree(&doc, ul);
        assert_eq!(text, "ul\n+-- li\n|   `-- a\n`-- li\n");
    }

    #[test]
    fn test_max_depth() {
        let mut doc = Document::new();
        let body = doc.body();
        let ul = doc.mount(body, el("ul").child(el("li").child(el("a"))));
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
            max_depth: Some(1),
            ..Default::default()
        });
        assert_eq!(debug.format_subtree(&doc, ul).lines().count(), 2);
    }
}
