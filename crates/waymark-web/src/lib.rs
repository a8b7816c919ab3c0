//! WebAssembly bindings for Waymark navigation.
//!
//! This crate runs the Waymark menu controller and TOC tracker against the
//! live browser DOM.
//!
//! # Architecture
//!
//! The page is captured once into a headless `waymark::Page`. Browser events
//! are translated into `PageEvent`s and dispatched to the controllers; the
//! mutations and effects they record are then replayed onto the real DOM.
//! Layout boxes for the TOC's headings and links are re-measured before each
//! resolution, since page layout lives in the browser.
//!
//! ## Module Structure
//!
//! - `mirror` - Capturing the DOM and mapping elements to model ids
//! - `apply` - Replaying mutations and effects onto the DOM
//! - `runtime` - The mirrored page and its controllers
//! - `listeners` - Delegated event listeners, observer and debounce timeout
//! - `error` - Error types with JavaScript interop
//!
//! # Example
//!
//! ```javascript
//! import init, { initNavigation } from 'waymark-web';
//!
//! await init();
//!
//! const nav = initNavigation({
//!   strings: { expand: 'Expand child menu', collapse: 'Collapse child menu' },
//!   menu: { exclusive_submenus: true },
//! });
//!
//! console.log(nav.activeSection());
//! ```

mod apply;
mod error;
mod listeners;
mod mirror;
mod runtime;

pub use error::{ErrorCode, WebError};

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::listeners::{Listeners, SharedRuntime};
use crate::runtime::{Runtime, config_from_js};

/// Initialize the WASM module.
///
/// Installs the panic hook and, with the `console-logging` feature, a
/// tracing subscriber writing to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(feature = "console-logging")]
    console::init();
}

/// Get the version of the waymark-web library.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Start navigation on the current page.
///
/// `config` is a plain object shaped like `NavigationConfig`; `undefined`
/// uses the defaults. Throws an `Error` with a `code` property on failure.
#[wasm_bindgen(js_name = initNavigation)]
pub fn init_navigation(config: JsValue) -> Result<NavigationHandle, JsValue> {
    let config = config_from_js(config)?;
    let window = web_sys::window().ok_or(WebError::MissingGlobal("window"))?;
    let runtime: SharedRuntime = Rc::new(RefCell::new(Runtime::start(window.clone(), config)?));
    let listeners = Listeners::install(window, runtime.clone())?;
    tracing::info!(target: "waymark_web", "navigation started");
    Ok(NavigationHandle {
        runtime,
        listeners: Some(listeners),
    })
}

/// A running navigation instance.
#[wasm_bindgen]
pub struct NavigationHandle {
    runtime: SharedRuntime,
    listeners: Option<Listeners>,
}

#[wasm_bindgen]
impl NavigationHandle {
    /// The id of the active TOC heading.
    #[wasm_bindgen(js_name = activeSection)]
    pub fn active_section(&self) -> Result<Option<String>, JsValue> {
        let runtime = self.runtime.try_borrow().map_err(|_| WebError::Unavailable)?;
        Ok(runtime.navigation().toc().active_id().map(str::to_string))
    }

    /// Whether the small-screen navigation is expanded.
    #[wasm_bindgen(js_name = isNavExpanded)]
    pub fn is_nav_expanded(&self) -> Result<bool, JsValue> {
        let runtime = self.runtime.try_borrow().map_err(|_| WebError::Unavailable)?;
        Ok(runtime.navigation().menu().is_nav_expanded())
    }

    /// Number of menu items with a submenu toggle.
    #[wasm_bindgen(js_name = menuItemCount)]
    pub fn menu_item_count(&self) -> Result<usize, JsValue> {
        let runtime = self.runtime.try_borrow().map_err(|_| WebError::Unavailable)?;
        Ok(runtime.navigation().menu().item_count())
    }

    /// Whether listeners are still installed.
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.listeners.is_some()
    }

    /// Remove every listener and stop observing headings.
    pub fn destroy(&mut self) {
        if self.listeners.take().is_some() {
            tracing::info!(target: "waymark_web", "navigation stopped");
        }
    }
}

#[cfg(feature = "console-logging")]
mod console {
    //! A `tracing` writer for the browser console.

    use std::io;

    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt::MakeWriter;

    /// Buffers one formatted event and logs it when dropped.
    pub struct ConsoleWriter {
        buffer: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            let line = String::from_utf8_lossy(&self.buffer);
            let line = line.trim_end();
            if !line.is_empty() {
                web_sys::console::log_1(&line.into());
            }
        }
    }

    /// Creates a [`ConsoleWriter`] per event.
    pub struct MakeConsoleWriter;

    impl<'a> MakeWriter<'a> for MakeConsoleWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter { buffer: Vec::new() }
        }
    }

    /// Install the console subscriber. Later calls are ignored.
    pub fn init() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("waymark=debug,waymark_web=debug,waymark_core=info"))
            .with_writer(MakeConsoleWriter)
            .with_ansi(false)
            .without_time()
            .try_init();
    }
}
