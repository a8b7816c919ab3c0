//! TOC link to heading pairing.

use std::collections::HashMap;

use waymark_core::{Document, ElementId, Selector, SelectorList, SelectorPart};

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// The heading's `id`, also the link fragment.
    pub id: String,
    /// The TOC link.
    pub link: ElementId,
    /// The heading element.
    pub heading: ElementId,
    /// Heading level (2 for `h2`, ...).
    pub level: u8,
}

/// The same-page fragment a TOC `href` points at.
///
/// Only hrefs starting with `#` are same-page links; anything else points at
/// another document. Empty fragments yield `None`.
pub fn fragment_of(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|fragment| !fragment.is_empty())
}

/// Links and entries collected from a page.
#[derive(Debug, Clone, Default)]
pub struct TocIndex {
    /// Every TOC link, in document order.
    pub links: Vec<ElementId>,
    /// Entries with resolvable headings, one per heading id, in link order.
    pub entries: Vec<TocEntry>,
}

impl TocIndex {
    /// Collect TOC links and pair them with headings.
    ///
    /// Links whose fragment matches no element are dropped. When several links
    /// target the same heading, the last one is used.
    pub fn collect(
        doc: &Document,
        link_selector: &SelectorList,
        level_attribute: &str,
        default_level: u8,
    ) -> Self {
        let root = doc.document_element();
        let links = doc.query_selector_all(root, link_selector);
        let list_item: SelectorList = Selector::simple(SelectorPart::tag("li")).into();

        let mut entries: Vec<TocEntry> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        for &link in &links {
            let Some(id) = doc.attribute(link, "href").and_then(fragment_of) else {
                continue;
            };
            let Some(heading) = doc.element_by_id(id) else {
                tracing::trace!(target: "waymark::toc", id, "TOC link target missing");
                continue;
            };
            let level = doc
                .closest(link, &list_item)
                .and_then(|li| doc.attribute(li, level_attribute))
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(default_level);

            match by_id.get(id) {
                Some(&index) => entries[index].link = link,
                None => {
                    by_id.insert(id.to_string(), entries.len());
                    entries.push(TocEntry {
                        id: id.to_string(),
                        link,
                        heading,
                        level,
                    });
                }
            }
        }

        Self { links, entries }
    }

    /// Whether tracking has nothing to work with.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() || self.entries.is_empty()
    }
}
