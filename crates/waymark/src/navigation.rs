//! The page-level navigation runtime.

use std::time::Duration;

use waymark_core::{EventOutcome, PageEvent};

use crate::config::{ConfigResult, NavigationConfig};
use crate::menu::MenuController;
use crate::page::Page;
use crate::toc::TocScrollTracker;

/// Owns the menu controller and the TOC tracker for one page and routes
/// page events to them.
///
/// # Example
///
/// ```
/// use waymark::{Navigation, NavigationConfig, Page, PageEvent, SelectorList, el};
///
/// let mut page = Page::default();
/// let body = page.document().body();
/// page.document_mut().mount(body, el("button").class("menu-toggle"));
///
/// let mut nav = Navigation::new(NavigationConfig::default()).unwrap();
/// nav.attach(&mut page);
///
/// let toggles: SelectorList = ".menu-toggle".parse().unwrap();
/// let toggle = page.document().query_selector(body, &toggles).unwrap();
/// nav.dispatch(&mut page, &PageEvent::Click { target: toggle });
/// assert!(nav.menu().is_nav_expanded());
/// ```
#[derive(Debug)]
pub struct Navigation {
    menu: MenuController,
    toc: TocScrollTracker,
}

impl Navigation {
    /// Build both controllers from `config`.
    pub fn new(config: NavigationConfig) -> ConfigResult<Self> {
        config.validate()?;
        let NavigationConfig { menu, toc, strings } = config;
        Ok(Self {
            menu: MenuController::new(menu, strings)?,
            toc: TocScrollTracker::new(toc)?,
        })
    }

    /// Run setup for both controllers.
    #[tracing::instrument(skip_all, target = "waymark::page", level = "debug")]
    pub fn attach(&mut self, page: &mut Page) {
        self.menu.attach(page);
        self.toc.attach(page);
    }

    /// Deliver one event. Hosts update the page viewport before dispatching
    /// `Resize` and `Scroll`.
    #[tracing::instrument(skip(self, page), target = "waymark::page", level = "trace")]
    pub fn dispatch(&mut self, page: &mut Page, event: &PageEvent) -> EventOutcome {
        match event {
            PageEvent::Click { target } => {
                let menu = self.menu.handle_click(page, *target);
                menu.merge(self.toc.handle_click(page, *target))
            }
            PageEvent::Focus { target } => {
                self.menu.handle_focus(page, *target);
                EventOutcome::proceed()
            }
            PageEvent::KeyDown { target, key, shift } => {
                self.menu.handle_key_down(page, *target, key, *shift)
            }
            PageEvent::Resize => {
                self.menu.handle_resize(page);
                EventOutcome::proceed()
            }
            PageEvent::Scroll { at } => {
                self.toc.handle_scroll(*at);
                EventOutcome::proceed()
            }
            PageEvent::Tick { at } => {
                self.toc.handle_tick(page, *at);
                EventOutcome::proceed()
            }
            PageEvent::Intersection(entries) => {
                self.toc.handle_intersection(page, entries);
                EventOutcome::proceed()
            }
        }
    }

    /// When the host should next deliver a [`PageEvent::Tick`].
    pub fn next_deadline(&self) -> Option<Duration> {
        self.toc.next_deadline()
    }

    /// Compute and deliver intersection changes from recorded layout.
    pub fn sync_intersections(&mut self, page: &mut Page) -> bool {
        self.toc.sync_intersections(page)
    }

    /// The menu controller.
    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    /// Mutable access to the menu controller.
    pub fn menu_mut(&mut self) -> &mut MenuController {
        &mut self.menu
    }

    /// The TOC tracker.
    pub fn toc(&self) -> &TocScrollTracker {
        &self.toc
    }

    /// Mutable access to the TOC tracker.
    pub fn toc_mut(&mut self) -> &mut TocScrollTracker {
        &mut self.toc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::{Document, Key, Rect, Viewport, el};

    #[test]
    fn test_dispatch_routes_scroll_and_tick() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.mount(
            body,
            el("div").children([
                el("ul").class("toc-list").children([
                    el("li").child(el("a").attr("href", "#a")),
                    el("li").child(el("a").attr("href", "#b")),
                ]),
                el("h2").id("a").layout(Rect::new(0.0, 0.0, 100.0, 30.0)),
                el("h2").id("b").layout(Rect::new(0.0, 900.0, 100.0, 30.0)),
            ]),
        );
        let mut page = Page::new(doc, Viewport::new(1280.0, 800.0));
        let mut nav = Navigation::new(NavigationConfig::default()).unwrap();
        nav.attach(&mut page);
        assert_eq!(nav.toc().active_id(), Some("a"));

        page.set_scroll_y(850.0);
        nav.dispatch(&mut page, &PageEvent::Scroll { at: Duration::from_millis(5) });
        assert_eq!(nav.next_deadline(), Some(Duration::from_millis(105)));
        nav.dispatch(&mut page, &PageEvent::Tick { at: Duration::from_millis(105) });
        assert_eq!(nav.toc().active_id(), Some("b"));
    }

    #[test]
    fn test_non_tab_keys_are_ignored() {
        let mut page = Page::default();
        let body = page.document().body();
        let mut nav = Navigation::new(NavigationConfig::default()).unwrap();
        nav.attach(&mut page);
        let outcome = nav.dispatch(
            &mut page,
            &PageEvent::KeyDown {
                target: body,
                key: Key::Enter,
                shift: false,
            },
        );
        assert!(!outcome.default_prevented);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = NavigationConfig::default();
        config.toc.probe_ratio = 2.0;
        assert!(Navigation::new(config).is_err());
    }
}
