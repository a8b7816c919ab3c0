//! The page runtime behind the browser listeners.

use std::time::Duration;

use wasm_bindgen::prelude::*;
use waymark::{EventOutcome, IntersectionEntry, Key, Navigation, NavigationConfig, Page, PageEvent};
use waymark_core::ElementId;
use web_sys::{Node, Window};

use crate::apply::{apply_effects, apply_mutations};
use crate::error::{WebError, WebResult};
use crate::mirror::{DomMirror, read_viewport};

/// The mirrored page, its controllers and the pending debounce timeout.
pub struct Runtime {
    window: Window,
    dom: web_sys::Document,
    page: Page,
    nav: Navigation,
    mirror: DomMirror,
    pending_timeout: Option<i32>,
}

impl Runtime {
    /// Capture the page and attach the controllers.
    #[tracing::instrument(skip_all, target = "waymark_web", level = "debug")]
    pub fn start(window: Window, config: NavigationConfig) -> WebResult<Self> {
        let dom = window.document().ok_or(WebError::MissingGlobal("document"))?;
        let nav = Navigation::new(config)?;
        let viewport = read_viewport(&window, &dom)?;
        let (mirror, mut doc) = DomMirror::capture(&dom)?;
        mirror.refresh_all(&mut doc, &viewport);

        let mut runtime = Self {
            window,
            dom,
            page: Page::new(doc, viewport),
            nav,
            mirror,
            pending_timeout: None,
        };
        runtime.nav.attach(&mut runtime.page);
        runtime.flush();
        Ok(runtime)
    }

    /// The navigation controllers.
    pub fn navigation(&self) -> &Navigation {
        &self.nav
    }

    /// The browser element for a model id.
    pub fn element(&self, id: ElementId) -> Option<&web_sys::Element> {
        self.mirror.element(id)
    }

    /// Host clock reading.
    pub fn now(&self) -> Duration {
        let millis = self
            .window
            .performance()
            .map(|performance| performance.now())
            .unwrap_or(0.0);
        Duration::from_secs_f64(millis.max(0.0) / 1000.0)
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Route a click. Returns whether the default action must be prevented.
    pub fn on_click(&mut self, target: &Node) -> bool {
        let Some(target) = self.mirror.resolve(target) else {
            return false;
        };
        self.dispatch(PageEvent::Click { target }).default_prevented
    }

    /// Route focus arriving on `target`.
    pub fn on_focus(&mut self, target: &Node) {
        if let Some(target) = self.mirror.resolve(target) {
            self.dispatch(PageEvent::Focus { target });
        }
    }

    /// Route a key press.
    pub fn on_key_down(&mut self, target: &Node, key: &str, shift: bool) -> bool {
        let Some(target) = self.mirror.resolve(target) else {
            return false;
        };
        let key = Key::from_key_name(key);
        self.dispatch(PageEvent::KeyDown { target, key, shift })
            .default_prevented
    }

    /// Re-read the window metrics and route a resize.
    pub fn on_resize(&mut self) {
        match read_viewport(&self.window, &self.dom) {
            Ok(viewport) => self.page.set_viewport(viewport),
            Err(err) => {
                tracing::debug!(target: "waymark_web", %err, "failed to read viewport");
                return;
            }
        }
        self.refresh_watched();
        self.dispatch(PageEvent::Resize);
    }

    /// Route a scroll. Returns the delay until the debounce should be flushed.
    pub fn on_scroll(&mut self) -> Option<Duration> {
        self.sync_scroll();
        let at = self.now();
        self.dispatch(PageEvent::Scroll { at });
        self.nav.next_deadline().map(|deadline| deadline.saturating_sub(at))
    }

    /// Flush the scroll debounce. Returns a further delay if the deadline has
    /// not been reached yet.
    pub fn on_tick(&mut self) -> Option<Duration> {
        self.pending_timeout = None;
        self.sync_scroll();
        self.refresh_watched();
        let at = self.now();
        self.dispatch(PageEvent::Tick { at });
        self.nav.next_deadline().map(|deadline| deadline.saturating_sub(at))
    }

    /// Route an intersection notification.
    pub fn on_intersection(&mut self, entries: Vec<(Node, bool, f64)>) {
        let entries: Vec<IntersectionEntry> = entries
            .into_iter()
            .filter_map(|(node, is_intersecting, ratio)| {
                self.mirror.resolve(&node).map(|target| IntersectionEntry {
                    target,
                    is_intersecting,
                    ratio,
                })
            })
            .collect();
        if entries.is_empty() {
            return;
        }
        self.sync_scroll();
        self.refresh_watched();
        self.dispatch(PageEvent::Intersection(entries));
    }

    fn dispatch(&mut self, event: PageEvent) -> EventOutcome {
        let outcome = self.nav.dispatch(&mut self.page, &event);
        self.flush();
        outcome
    }

    // =========================================================================
    // Debounce Timeout
    // =========================================================================

    /// Replace the pending timeout with one firing `callback` after `delay`.
    pub fn schedule(&mut self, callback: &js_sys::Function, delay: Duration) {
        self.cancel_timeout();
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX).saturating_add(1);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, millis)
        {
            Ok(handle) => self.pending_timeout = Some(handle),
            Err(err) => {
                tracing::debug!(target: "waymark_web", err = %WebError::dom("setTimeout", err), "failed to schedule tick");
            }
        }
    }

    /// Clear the pending timeout, if any.
    pub fn cancel_timeout(&mut self) {
        if let Some(handle) = self.pending_timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    fn sync_scroll(&mut self) {
        match self.window.scroll_y() {
            Ok(scroll_y) => self.page.set_scroll_y(scroll_y),
            Err(err) => {
                tracing::debug!(target: "waymark_web", err = %WebError::dom("scrollY", err), "failed to read scroll offset");
            }
        }
    }

    /// Re-measure the elements the TOC tracker reads.
    fn refresh_watched(&mut self) {
        let toc = self.nav.toc();
        let watched: Vec<ElementId> = toc
            .observed_targets()
            .iter()
            .copied()
            .chain(toc.entries().iter().map(|entry| entry.link))
            .collect();
        if watched.is_empty() {
            return;
        }
        let viewport = *self.page.viewport();
        self.mirror
            .refresh_layout(self.page.document_mut(), &viewport, &watched);
    }

    /// Replay journaled mutations and queued effects onto the browser.
    fn flush(&mut self) {
        let mutations = self.page.document_mut().take_mutations();
        if !mutations.is_empty() {
            if let Err(err) = apply_mutations(&self.dom, &mut self.mirror, mutations) {
                tracing::warn!(target: "waymark_web", %err, "failed to apply mutations");
            }
        }
        let effects = self.page.take_effects();
        if !effects.is_empty() {
            if let Err(err) = apply_effects(&self.window, &self.mirror, effects) {
                tracing::warn!(target: "waymark_web", %err, "failed to apply effects");
            }
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.cancel_timeout();
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("nav", &self.nav)
            .field("mirrored", &self.mirror.len())
            .field("pending_timeout", &self.pending_timeout)
            .finish()
    }
}

/// Read a JavaScript config value, treating `undefined` and `null` as defaults.
pub fn config_from_js(value: JsValue) -> WebResult<NavigationConfig> {
    if value.is_undefined() || value.is_null() {
        return Ok(NavigationConfig::default());
    }
    let config: NavigationConfig = serde_wasm_bindgen::from_value(value)?;
    config.validate()?;
    Ok(config)
}
