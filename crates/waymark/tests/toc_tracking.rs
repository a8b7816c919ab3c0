//! Integration tests for the scroll-synchronized table of contents.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use waymark::prelude::*;

const VIEWPORT_HEIGHT: f64 = 800.0;

fn heading(id: &str, top: f64) -> ElementBuilder {
    el("h2").id(id).layout(Rect::new(0.0, top, 800.0, 40.0))
}

fn toc_link(link_id: &str, target: &str, top: f64) -> ElementBuilder {
    el("li").attr("data-level", "2").child(
        el("a")
            .id(link_id)
            .attr("href", &format!("#{target}"))
            .layout(Rect::new(900.0, top, 280.0, 20.0))
            .child(el("span").id(&format!("{link_id}-label")).text(target)),
    )
}

/// `#intro` at 0, `#setup` at 1200 and `#usage` at 3000.
fn setup() -> (Page, Navigation) {
    let mut doc = Document::new();
    let body = doc.body();
    doc.mount(
        body,
        el("main").children([
            el("aside").class("doc-right").layout(Rect::new(900.0, 0.0, 300.0, 600.0)).child(
                el("div").class("toc").layout(Rect::new(900.0, 0.0, 300.0, 600.0)).child(
                    el("ul").class("toc-list").children([
                        toc_link("toc-intro", "intro", 10.0),
                        toc_link("toc-setup", "setup", 40.0),
                        toc_link("toc-usage", "usage", 700.0),
                    ]),
                ),
            ),
            el("article").children([
                heading("intro", 0.0),
                heading("setup", 1200.0),
                heading("usage", 3000.0),
            ]),
        ]),
    );
    let mut page = Page::new(doc, Viewport::new(1280.0, VIEWPORT_HEIGHT));
    let mut nav = Navigation::new(NavigationConfig::default()).unwrap();
    nav.attach(&mut page);
    (page, nav)
}

fn id(page: &Page, element_id: &str) -> ElementId {
    page.document().element_by_id(element_id).unwrap()
}

fn active_links(page: &Page) -> Vec<String> {
    let active: SelectorList = "a.toc-active".parse().unwrap();
    let doc = page.document();
    doc.query_selector_all(doc.document_element(), &active)
        .into_iter()
        .filter_map(|link| doc.attribute(link, "id").map(str::to_string))
        .collect()
}

fn scroll_and_settle(nav: &mut Navigation, page: &mut Page, scroll_y: f64, at_ms: u64) {
    page.set_scroll_y(scroll_y);
    nav.dispatch(page, &PageEvent::Scroll { at: Duration::from_millis(at_ms) });
    let deadline = nav.next_deadline().unwrap();
    nav.dispatch(page, &PageEvent::Tick { at: deadline });
}

// =========================================================================
// Resolution
// =========================================================================

#[test]
fn test_initial_section_is_first_heading() {
    let (page, nav) = setup();
    assert_eq!(nav.toc().active_id(), Some("intro"));
    assert_eq!(active_links(&page), vec!["toc-intro"]);
}

#[test]
fn test_scroll_positions_resolve_expected_sections() {
    let (mut page, mut nav) = setup();

    scroll_and_settle(&mut nav, &mut page, 1150.0, 0);
    assert_eq!(nav.toc().active_id(), Some("setup"));

    scroll_and_settle(&mut nav, &mut page, 2000.0, 500);
    assert_eq!(nav.toc().active_id(), Some("setup"));

    scroll_and_settle(&mut nav, &mut page, 0.0, 1000);
    assert_eq!(nav.toc().active_id(), Some("intro"));
    assert_eq!(active_links(&page), vec!["toc-intro"]);
}

#[test]
fn test_scroll_waits_for_quiet_window() {
    let (mut page, mut nav) = setup();
    page.set_scroll_y(1150.0);
    for at in [0, 40, 80] {
        nav.dispatch(&mut page, &PageEvent::Scroll { at: Duration::from_millis(at) });
        nav.dispatch(&mut page, &PageEvent::Tick { at: Duration::from_millis(at + 30) });
        assert_eq!(nav.toc().active_id(), Some("intro"));
    }
    nav.dispatch(&mut page, &PageEvent::Tick { at: Duration::from_millis(180) });
    assert_eq!(nav.toc().active_id(), Some("setup"));
}

#[test]
fn test_intersection_triggers_recompute() {
    let (mut page, mut nav) = setup();
    page.set_scroll_y(1150.0);
    assert!(nav.sync_intersections(&mut page));
    assert_eq!(nav.toc().active_id(), Some("setup"));
    // Nothing moved, so there is nothing new to report.
    assert!(!nav.sync_intersections(&mut page));
}

#[test]
fn test_browser_intersection_notification() {
    let (mut page, mut nav) = setup();
    page.set_scroll_y(2950.0);
    let usage = id(&page, "usage");
    nav.dispatch(
        &mut page,
        &PageEvent::Intersection(vec![IntersectionEntry {
            target: usage,
            is_intersecting: true,
            ratio: 0.5,
        }]),
    );
    assert_eq!(nav.toc().active_id(), Some("usage"));
    assert_eq!(active_links(&page), vec!["toc-usage"]);
}

#[test]
fn test_active_signal_fires_on_change_only() {
    let (mut page, mut nav) = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    nav.toc().active_changed.connect(move |id: &String| sink.lock().push(id.clone()));

    scroll_and_settle(&mut nav, &mut page, 1150.0, 0);
    scroll_and_settle(&mut nav, &mut page, 2000.0, 500);
    scroll_and_settle(&mut nav, &mut page, 3500.0, 1000);
    assert_eq!(*seen.lock(), vec!["setup".to_string(), "usage".to_string()]);
}

// =========================================================================
// Click navigation
// =========================================================================

#[test]
fn test_click_activates_synchronously() {
    let (mut page, mut nav) = setup();
    page.take_effects();

    let target = id(&page, "toc-usage");
    let outcome = nav.dispatch(&mut page, &PageEvent::Click { target });
    assert!(outcome.default_prevented);
    assert_eq!(nav.toc().active_id(), Some("usage"));
    assert_eq!(active_links(&page), vec!["toc-usage"]);
    assert_eq!(page.location_hash(), Some("#usage"));

    let usage = id(&page, "usage");
    assert_eq!(
        page.take_effects(),
        vec![
            Effect::ScrollIntoView {
                target: usage,
                behavior: ScrollBehavior::Smooth,
                block: ScrollBlock::Start,
            },
            Effect::PushHash {
                hash: "#usage".into()
            },
        ]
    );
}

#[test]
fn test_click_on_link_content_bubbles_to_link() {
    let (mut page, mut nav) = setup();
    let target = id(&page, "toc-setup-label");
    let outcome = nav.dispatch(&mut page, &PageEvent::Click { target });
    assert!(outcome.default_prevented);
    assert_eq!(nav.toc().active_id(), Some("setup"));
}

#[test]
fn test_clicks_outside_toc_are_ignored() {
    let (mut page, mut nav) = setup();
    let target = id(&page, "setup");
    let outcome = nav.dispatch(&mut page, &PageEvent::Click { target });
    assert!(!outcome.default_prevented);
    assert_eq!(nav.toc().active_id(), Some("intro"));
}

// =========================================================================
// Panel scrolling
// =========================================================================

#[test]
fn test_active_link_outside_panel_scrolls_panel_only() {
    let (mut page, mut nav) = setup();
    let toc_list: SelectorList = ".toc".parse().unwrap();
    let container = {
        let doc = page.document();
        doc.query_selector(doc.document_element(), &toc_list).unwrap()
    };
    page.take_effects();

    // The usage link overflows the panel box.
    scroll_and_settle(&mut nav, &mut page, 3500.0, 0);
    let effects = page.take_effects();
    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::ScrollContainerTo { container: scrolled, behavior, .. } => {
            assert_eq!(*scrolled, container);
            assert_eq!(*behavior, ScrollBehavior::Smooth);
        }
        other => panic!("unexpected effect {other:?}"),
    }
}

#[test]
fn test_levels_are_recorded() {
    let (_page, nav) = setup();
    assert!(nav.toc().entries().iter().all(|entry| entry.level == 2));
}
