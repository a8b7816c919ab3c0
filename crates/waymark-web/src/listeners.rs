//! Browser event wiring.
//!
//! Listeners are delegated: one per event type on `document` (click, focusin,
//! keydown) and on `window` (resize, scroll). The controllers walk the bubbling
//! path themselves. Every handler borrows the shared [`Runtime`] for the
//! duration of one dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{
    Event, EventTarget, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    KeyboardEvent, Node, Window,
};

use crate::error::{WebError, WebResult};
use crate::runtime::Runtime;

/// The runtime shared between listeners.
pub type SharedRuntime = Rc<RefCell<Runtime>>;

type EventClosure = Closure<dyn FnMut(Event)>;
type ObserverClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Installed listeners. Dropping this removes them all.
pub struct Listeners {
    runtime: SharedRuntime,
    window: Window,
    document: web_sys::Document,
    document_handlers: Vec<(&'static str, EventClosure)>,
    window_handlers: Vec<(&'static str, EventClosure)>,
    // Kept alive for the pending debounce timeout.
    _tick: Closure<dyn FnMut()>,
    observer: Option<(IntersectionObserver, ObserverClosure)>,
}

impl Listeners {
    /// Attach every listener the runtime needs.
    #[tracing::instrument(skip_all, target = "waymark_web", level = "debug")]
    pub fn install(window: Window, runtime: SharedRuntime) -> WebResult<Self> {
        let document = window.document().ok_or(WebError::MissingGlobal("document"))?;

        let tick = tick_closure(&runtime);
        let tick_fn: js_sys::Function = tick.as_ref().unchecked_ref::<js_sys::Function>().clone();

        let mut listeners = Self {
            runtime: runtime.clone(),
            window: window.clone(),
            document: document.clone(),
            document_handlers: Vec::new(),
            window_handlers: Vec::new(),
            _tick: tick,
            observer: None,
        };

        listeners.on_document("click", {
            let runtime = runtime.clone();
            move |event: Event| {
                let Some(target) = event_node(&event) else {
                    return;
                };
                let Ok(mut runtime) = runtime.try_borrow_mut() else {
                    return;
                };
                if runtime.on_click(&target) {
                    event.prevent_default();
                }
            }
        })?;

        listeners.on_document("focusin", {
            let runtime = runtime.clone();
            move |event: Event| {
                let Some(target) = event_node(&event) else {
                    return;
                };
                if let Ok(mut runtime) = runtime.try_borrow_mut() {
                    runtime.on_focus(&target);
                }
            }
        })?;

        listeners.on_document("keydown", {
            let runtime = runtime.clone();
            move |event: Event| {
                let (Some(target), Some(keyboard)) =
                    (event_node(&event), event.dyn_ref::<KeyboardEvent>())
                else {
                    return;
                };
                let Ok(mut runtime) = runtime.try_borrow_mut() else {
                    return;
                };
                if runtime.on_key_down(&target, &keyboard.key(), keyboard.shift_key()) {
                    event.prevent_default();
                }
            }
        })?;

        listeners.on_window("resize", {
            let runtime = runtime.clone();
            move |_event: Event| {
                if let Ok(mut runtime) = runtime.try_borrow_mut() {
                    runtime.on_resize();
                }
            }
        })?;

        listeners.on_window("scroll", {
            let runtime = runtime.clone();
            let tick_fn = tick_fn.clone();
            move |_event: Event| {
                let Ok(mut runtime) = runtime.try_borrow_mut() else {
                    return;
                };
                if let Some(delay) = runtime.on_scroll() {
                    runtime.schedule(&tick_fn, delay);
                }
            }
        })?;

        listeners.observe_headings()?;
        Ok(listeners)
    }

    fn on_document<F>(&mut self, event: &'static str, handler: F) -> WebResult<()>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = EventClosure::new(handler);
        add_listener(&self.document, event, &closure)?;
        self.document_handlers.push((event, closure));
        Ok(())
    }

    fn on_window<F>(&mut self, event: &'static str, handler: F) -> WebResult<()>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = EventClosure::new(handler);
        add_listener(&self.window, event, &closure)?;
        self.window_handlers.push((event, closure));
        Ok(())
    }

    /// Start an `IntersectionObserver` over the tracked headings.
    fn observe_headings(&mut self) -> WebResult<()> {
        let runtime = self.runtime.try_borrow().map_err(|_| WebError::Unavailable)?;
        let toc = runtime.navigation().toc();
        if toc.is_inert() {
            return Ok(());
        }

        let options = toc.observer_options();
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin);
        let thresholds = js_sys::Array::new();
        for threshold in &options.thresholds {
            thresholds.push(&JsValue::from_f64(*threshold));
        }
        init.set_threshold(&thresholds);

        let callback = ObserverClosure::new({
            let runtime = self.runtime.clone();
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let entries: Vec<(Node, bool, f64)> = entries
                    .iter()
                    .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| {
                        let target: Node = entry.target().into();
                        (target, entry.is_intersecting(), entry.intersection_ratio())
                    })
                    .collect();
                if let Ok(mut runtime) = runtime.try_borrow_mut() {
                    runtime.on_intersection(entries);
                }
            }
        });
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            .map_err(|err| WebError::dom("IntersectionObserver", err))?;

        for &heading in toc.observed_targets() {
            if let Some(element) = runtime.element(heading) {
                observer.observe(element);
            }
        }
        tracing::debug!(
            target: "waymark_web",
            headings = toc.observed_targets().len(),
            root_margin = %options.root_margin,
            "observing headings"
        );
        drop(runtime);
        self.observer = Some((observer, callback));
        Ok(())
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        for (event, closure) in &self.document_handlers {
            remove_listener(&self.document, event, closure);
        }
        for (event, closure) in &self.window_handlers {
            remove_listener(&self.window, event, closure);
        }
        if let Some((observer, _)) = &self.observer {
            observer.disconnect();
        }
        if let Ok(mut runtime) = self.runtime.try_borrow_mut() {
            runtime.cancel_timeout();
        }
        tracing::debug!(target: "waymark_web", "listeners removed");
    }
}

fn tick_closure(runtime: &SharedRuntime) -> Closure<dyn FnMut()> {
    let runtime = runtime.clone();
    // The closure's own JS function, so an early tick can reschedule itself.
    let this: Rc<RefCell<Option<js_sys::Function>>> = Rc::new(RefCell::new(None));
    let slot = this.clone();
    let closure = Closure::<dyn FnMut()>::new(move || {
        let Ok(mut runtime) = runtime.try_borrow_mut() else {
            return;
        };
        if let Some(delay) = runtime.on_tick() {
            if let Some(callback) = slot.borrow().as_ref() {
                runtime.schedule(callback, delay);
            }
        }
    });
    this.replace(Some(closure.as_ref().unchecked_ref::<js_sys::Function>().clone()));
    closure
}

fn event_node(event: &Event) -> Option<Node> {
    event.target().and_then(|target| target.dyn_into::<Node>().ok())
}

fn add_listener(target: &EventTarget, event: &str, closure: &EventClosure) -> WebResult<()> {
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|err| WebError::dom("addEventListener", err))
}

fn remove_listener(target: &EventTarget, event: &str, closure: &EventClosure) {
    if let Err(err) = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        tracing::debug!(target: "waymark_web", err = %WebError::dom("removeEventListener", err), "failed to remove listener");
    }
}
