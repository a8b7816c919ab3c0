//! The table-of-contents scroll tracker.

use std::time::Duration;

use waymark_core::{
    Debouncer, Document, ElementId, EventOutcome, IntersectionEntry, Rect, SelectorList, Signal,
};

use super::entry::{TocEntry, TocIndex, fragment_of};
use super::intersection::{IntersectionWatcher, RootMargin};
use super::resolver::{ResolverParams, resolve_active};
use crate::config::{ConfigResult, TocConfig, parse_selector};
use crate::page::{Page, ScrollBehavior, ScrollBlock};

/// Options a browser host passes to its `IntersectionObserver`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    /// CSS `rootMargin`.
    pub root_margin: String,
    /// `threshold` list.
    pub thresholds: Vec<f64>,
}

/// Keeps exactly one TOC link marked as the reader's current section.
///
/// Two inputs drive the same resolver: intersection notifications for the
/// observed headings, and page scrolls debounced to their trailing edge.
/// Clicking a TOC link scrolls to its heading and activates it immediately.
///
/// Without TOC links or without resolvable headings the tracker is inert and
/// every handler is a no-op.
///
/// # Signals
///
/// - `active_changed`: the id of the newly active heading
pub struct TocScrollTracker {
    config: TocConfig,
    link_selector: SelectorList,
    panel_selector: SelectorList,
    scroll_container_selector: SelectorList,
    /// Every TOC link, in document order.
    links: Vec<ElementId>,
    /// Entries sorted by heading position.
    entries: Vec<TocEntry>,
    active: Option<String>,
    debouncer: Debouncer,
    watcher: IntersectionWatcher,

    /// Emitted with the heading id whenever the active section changes.
    pub active_changed: Signal<String>,
}

impl TocScrollTracker {
    /// Create a tracker, validating the configuration.
    pub fn new(config: TocConfig) -> ConfigResult<Self> {
        config.validate()?;
        let margin: RootMargin = config.root_margin.parse()?;
        Ok(Self {
            link_selector: parse_selector("link_selector", &config.link_selector)?,
            panel_selector: parse_selector("panel_selector", &config.panel_selector)?,
            scroll_container_selector: parse_selector(
                "scroll_container_selector",
                &config.scroll_container_selector,
            )?,
            links: Vec::new(),
            entries: Vec::new(),
            active: None,
            debouncer: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            watcher: IntersectionWatcher::new(margin, &config.thresholds),
            active_changed: Signal::new(),
            config,
        })
    }

    /// The tracker configuration.
    pub fn config(&self) -> &TocConfig {
        &self.config
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Collect entries, start observing headings and resolve the initial
    /// active section.
    #[tracing::instrument(skip_all, target = "waymark::toc", level = "debug")]
    pub fn attach(&mut self, page: &mut Page) {
        let index = TocIndex::collect(
            page.document(),
            &self.link_selector,
            &self.config.level_attribute,
            self.config.default_level,
        );
        if index.is_empty() {
            tracing::debug!(
                target: "waymark::toc",
                links = index.links.len(),
                "no resolvable TOC entries, tracker inert"
            );
            self.links.clear();
            self.entries.clear();
            self.watcher.disconnect();
            return;
        }

        let TocIndex { links, mut entries } = index;
        let doc = page.document();
        let viewport = page.viewport();
        // Stable sort keeps document order for headings at the same height.
        entries.sort_by(|a, b| {
            let a = doc.page_top(a.heading, viewport).unwrap_or(0.0);
            let b = doc.page_top(b.heading, viewport).unwrap_or(0.0);
            a.total_cmp(&b)
        });

        self.watcher.observe(entries.iter().map(|entry| entry.heading));
        self.links = links;
        self.entries = entries;
        self.active = None;
        tracing::debug!(
            target: "waymark::toc",
            links = self.links.len(),
            entries = self.entries.len(),
            "TOC tracker attached"
        );

        self.update_active(page);
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Record a page scroll at host time `at`. Resolution runs once the
    /// debounce window passes without further scrolls.
    pub fn handle_scroll(&mut self, at: Duration) {
        if self.is_inert() {
            return;
        }
        self.debouncer.signal(at);
    }

    /// Flush the scroll debounce if its deadline has passed.
    ///
    /// Returns `true` if the active section changed.
    pub fn handle_tick(&mut self, page: &mut Page, at: Duration) -> bool {
        if self.debouncer.poll(at) {
            tracing::trace!(target: "waymark::toc", ?at, "scroll settled");
            return self.update_active(page);
        }
        false
    }

    /// React to an intersection notification.
    ///
    /// Any notification about an observed heading triggers a recomputation.
    pub fn handle_intersection(&mut self, page: &mut Page, entries: &[IntersectionEntry]) -> bool {
        let relevant = entries
            .iter()
            .any(|entry| self.watcher.targets().contains(&entry.target));
        if !relevant {
            return false;
        }
        self.update_active(page)
    }

    /// Compute intersection changes from recorded layout and handle them.
    ///
    /// Headless pages call this after moving the viewport; browser hosts use
    /// a real observer instead.
    pub fn sync_intersections(&mut self, page: &mut Page) -> bool {
        let changed = self.watcher.compute(page.document(), page.viewport());
        if changed.is_empty() {
            return false;
        }
        self.handle_intersection(page, &changed)
    }

    /// Handle a click bubbling from `target`.
    ///
    /// A click inside a TOC link always suppresses navigation. If the link's
    /// heading exists, the page smooth-scrolls to it, `#id` is pushed onto the
    /// history and the clicked link becomes active at once.
    pub fn handle_click(&mut self, page: &mut Page, target: ElementId) -> EventOutcome {
        let doc = page.document();
        if !doc.is_valid(target) {
            return EventOutcome::proceed();
        }
        let Some(link) = std::iter::once(target)
            .chain(doc.ancestors(target))
            .find(|candidate| self.links.contains(candidate))
        else {
            return EventOutcome::proceed();
        };

        let href = doc.attribute(link, "href");
        if href.is_some_and(|href| !href.starts_with('#')) {
            return EventOutcome::proceed();
        }
        let Some(id) = href.and_then(fragment_of).map(str::to_string) else {
            return EventOutcome::prevent_default();
        };
        let Some(heading) = doc.element_by_id(&id) else {
            tracing::debug!(target: "waymark::toc", %id, "clicked TOC link has no heading");
            return EventOutcome::prevent_default();
        };

        page.scroll_into_view(heading, ScrollBehavior::Smooth, ScrollBlock::Start);
        page.push_hash(&id);
        self.mark_active(page.document_mut(), link);
        if self.active.as_deref() != Some(id.as_str()) {
            tracing::debug!(target: "waymark::toc", %id, "TOC link activated by click");
            self.active = Some(id.clone());
            self.active_changed.emit(id);
        }
        EventOutcome::prevent_default()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Resolve the active section from the current scroll position and apply
    /// it if it changed. Returns `true` on change.
    pub fn update_active(&mut self, page: &mut Page) -> bool {
        let Some(index) = self.resolve(page) else {
            return false;
        };
        let entry = &self.entries[index];
        if self.active.as_deref() == Some(entry.id.as_str()) {
            return false;
        }

        let id = entry.id.clone();
        let link = entry.link;
        self.mark_active(page.document_mut(), link);
        self.active = Some(id.clone());
        tracing::debug!(target: "waymark::toc", %id, scroll_y = page.viewport().scroll_y, "active section changed");
        self.reveal_link(page, link);
        self.active_changed.emit(id);
        true
    }

    fn resolve(&self, page: &Page) -> Option<usize> {
        let doc = page.document();
        let viewport = page.viewport();
        let tops: Vec<f64> = self
            .entries
            .iter()
            .map(|entry| doc.page_top(entry.heading, viewport).unwrap_or(0.0))
            .collect();
        resolve_active(
            &tops,
            viewport.scroll_y,
            viewport.inner_height,
            ResolverParams {
                top_snap: self.config.top_snap_px,
                probe_ratio: self.config.probe_ratio,
            },
        )
    }

    /// Clear the active class from every TOC link, then set it on `link`.
    fn mark_active(&self, doc: &mut Document, link: ElementId) {
        for &other in &self.links {
            if let Err(err) = doc.remove_class(other, &self.config.active_class) {
                tracing::debug!(target: "waymark::toc", %err, "failed to clear active link");
            }
        }
        if let Err(err) = doc.add_class(link, &self.config.active_class) {
            tracing::debug!(target: "waymark::toc", %err, "failed to mark active link");
        }
    }

    /// Scroll the TOC's own container so `link` sits in its center, if the
    /// link lies outside the panel.
    fn reveal_link(&self, page: &mut Page, link: ElementId) {
        let doc = page.document();
        let viewport = page.viewport();
        let root = doc.document_element();
        let Some(panel) = doc.query_selector(root, &self.panel_selector) else {
            return;
        };
        let (Some(link_rect), Some(panel_rect)) =
            (doc.client_rect(link, viewport), doc.client_rect(panel, viewport))
        else {
            return;
        };
        if link_rect.is_vertically_within(&panel_rect) {
            return;
        }

        let container = doc
            .query_selector(panel, &self.scroll_container_selector)
            .unwrap_or(panel);
        let Some(container_rect) = doc.client_rect(container, viewport) else {
            return;
        };
        let top = centered_scroll_top(doc.scroll_top(container), &link_rect, &container_rect);
        tracing::trace!(target: "waymark::toc", top, "scrolling TOC panel");
        page.scroll_container_to(container, top, ScrollBehavior::Smooth);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether the page lacked TOC links or headings at attach time.
    pub fn is_inert(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by heading position.
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// The id of the active heading.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The entry for heading `id`.
    pub fn entry(&self, id: &str) -> Option<&TocEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Headings under observation.
    pub fn observed_targets(&self) -> &[ElementId] {
        self.watcher.targets()
    }

    /// Options for a browser `IntersectionObserver`.
    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin: self.config.root_margin.clone(),
            thresholds: self.watcher.thresholds().to_vec(),
        }
    }

    /// When the pending scroll debounce fires, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.debouncer.deadline()
    }
}

/// The `scrollTop` that centers `link` within `container`.
fn centered_scroll_top(scroll_top: f64, link: &Rect, container: &Rect) -> f64 {
    let offset = link.top() - container.top();
    (scroll_top + offset - (container.height - link.height) / 2.0).max(0.0)
}

impl std::fmt::Debug for TocScrollTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TocScrollTracker")
            .field("links", &self.links.len())
            .field("entries", &self.entries.len())
            .field("active", &self.active)
            .field("debounce_pending", &self.debouncer.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Effect;
    use waymark_core::{Viewport, el};

    fn page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        doc.mount(
            body,
            el("div").children([
                el("div").class("doc-right").layout(Rect::new(900.0, 0.0, 300.0, 200.0)).child(
                    el("nav").class("toc").layout(Rect::new(900.0, 0.0, 300.0, 200.0)).child(
                        el("ul").class("toc-list").children([
                            el("li").child(el("a").id("l-intro").attr("href", "#intro").layout(Rect::new(900.0, 10.0, 300.0, 20.0))),
                            el("li").child(el("a").id("l-usage").attr("href", "#usage").layout(Rect::new(900.0, 400.0, 300.0, 20.0))),
                            el("li").child(el("a").id("l-setup").attr("href", "#setup").layout(Rect::new(900.0, 40.0, 300.0, 20.0))),
                            el("li").child(el("a").id("l-other").attr("href", "/other-guide#setup").layout(Rect::new(900.0, 70.0, 300.0, 20.0))),
                        ]),
                    ),
                ),
                el("h2").id("intro").layout(Rect::new(0.0, 0.0, 800.0, 40.0)),
                el("h2").id("usage").layout(Rect::new(0.0, 3000.0, 800.0, 40.0)),
                el("h2").id("setup").layout(Rect::new(0.0, 1200.0, 800.0, 40.0)),
            ]),
        );
        Page::new(doc, Viewport::new(1280.0, 800.0))
    }

    fn link(page: &Page, id: &str) -> ElementId {
        page.document().element_by_id(id).unwrap()
    }

    #[test]
    fn test_attach_sorts_and_activates_first() {
        let mut page = page();
        let mut toc = TocScrollTracker::new(TocConfig::default()).unwrap();
        toc.attach(&mut page);

        let ids: Vec<_> = toc.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "setup", "usage"]);
        assert_eq!(toc.active_id(), Some("intro"));
        assert!(page.document().has_class(link(&page, "l-intro"), "toc-active"));
        assert_eq!(toc.observed_targets().len(), 3);
    }

    #[test]
    fn test_scroll_is_debounced() {
        let mut page = page();
        let mut toc = TocScrollTracker::new(TocConfig::default()).unwrap();
        toc.attach(&mut page);

        page.set_scroll_y(1150.0);
        toc.handle_scroll(Duration::from_millis(0));
        toc.handle_scroll(Duration::from_millis(60));
        assert_eq!(toc.next_deadline(), Some(Duration::from_millis(160)));
        assert!(!toc.handle_tick(&mut page, Duration::from_millis(120)));
        assert_eq!(toc.active_id(), Some("intro"));

        assert!(toc.handle_tick(&mut page, Duration::from_millis(160)));
        assert_eq!(toc.active_id(), Some("setup"));
        assert!(!page.document().has_class(link(&page, "l-intro"), "toc-active"));
        assert!(toc.next_deadline().is_none());
    }

    #[test]
    fn test_reveal_scrolls_panel_container() {
        let mut page = page();
        let mut toc = TocScrollTracker::new(TocConfig::default()).unwrap();
        toc.attach(&mut page);
        page.take_effects();

        page.set_scroll_y(2900.0);
        assert!(toc.update_active(&mut page));
        assert_eq!(toc.active_id(), Some("usage"));

        // The panel scrolled away with the page, so the active link is outside it.
        let selector: SelectorList = ".toc".parse().unwrap();
        let doc = page.document();
        let container = doc.query_selector(doc.document_element(), &selector).unwrap();
        let effects = page.take_effects();
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            effects[0],
            Effect::ScrollContainerTo { container: c, behavior: ScrollBehavior::Smooth, .. } if c == container
        ));
    }

    #[test]
    fn test_click_on_other_page_link_navigates() {
        let mut page = page();
        let mut toc = TocScrollTracker::new(TocConfig::default()).unwrap();
        toc.attach(&mut page);
        page.take_effects();

        let other = link(&page, "l-other");
        let outcome = toc.handle_click(&mut page, other);
        assert!(!outcome.default_prevented);
        assert_eq!(toc.active_id(), Some("intro"));
        assert_eq!(page.location_hash(), None);
        assert!(page.take_effects().is_empty());
        assert!(toc.entries().iter().all(|entry| entry.link != other));
    }

    #[test]
    fn test_centered_scroll_top() {
        let container = Rect::new(0.0, 100.0, 200.0, 200.0);
        let link = Rect::new(0.0, 500.0, 200.0, 20.0);
        assert_eq!(centered_scroll_top(0.0, &link, &container), 310.0);
        let above = Rect::new(0.0, 50.0, 200.0, 20.0);
        assert_eq!(centered_scroll_top(0.0, &above, &container), 0.0);
    }

    #[test]
    fn test_inert_without_headings() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.mount(body, el("ul").class("toc-list").child(el("li").child(el("a").attr("href", "#nowhere"))));
        let mut page = Page::new(doc, Viewport::default());

        let mut toc = TocScrollTracker::new(TocConfig::default()).unwrap();
        toc.attach(&mut page);
        assert!(toc.is_inert());
        toc.handle_scroll(Duration::ZERO);
        assert!(toc.next_deadline().is_none());
        assert!(!toc.sync_intersections(&mut page));
        assert_eq!(toc.active_id(), None);
    }

    #[test]
    fn test_observer_options() {
        let toc = TocScrollTracker::new(TocConfig::default()).unwrap();
        let options = toc.observer_options();
        assert_eq!(options.root_margin, "-10% 0px -85% 0px");
        assert_eq!(options.thresholds, vec![0.0, 0.1]);
    }
}
