//! The dropdown menu controller.

use slotmap::SecondaryMap;
use waymark_core::{Document, DomError, DomResult, ElementId, EventOutcome, Key, Signal, Viewport};

use super::focus::{FocusDirection, submenus_exited_by};
use super::{MenuSelectors, ParentLink, ToggleAffordance, Toggler, Transition};
use crate::config::{ConfigResult, MenuConfig, ScreenReaderText};
use crate::page::Page;
use crate::viewport::NavigationMode;

/// A submenu-owning item discovered at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    /// The item element (`li`).
    pub element: ElementId,
    /// The item's submenu list.
    pub submenu: ElementId,
    /// The item's toggle affordance.
    pub affordance: ToggleAffordance,
    /// The item's direct link.
    pub link: ParentLink,
}

impl MenuItem {
    /// Whether the item comes from the block editor.
    pub fn is_block_variant(&self) -> bool {
        matches!(self.affordance, ToggleAffordance::Block { .. })
    }
}

/// Controller for collapsible navigation menus.
///
/// Created once per page, attached once, then fed page events for the page's
/// lifetime. All per-item state lives in the document; the controller keeps
/// only the item registry and the small-screen expanded flag.
///
/// # Signals
///
/// - `submenu_toggled`: `(item, open)` for every item that changed state
/// - `nav_expanded_changed`: the new small-screen expanded flag
pub struct MenuController {
    config: MenuConfig,
    selectors: MenuSelectors,
    strings: Option<ScreenReaderText>,
    /// Registered items keyed by item element.
    items: SecondaryMap<ElementId, MenuItem>,
    /// Affordance element to owning item.
    affordances: SecondaryMap<ElementId, ElementId>,
    /// Direct link element to owning item.
    links: SecondaryMap<ElementId, ElementId>,
    nav_expanded: bool,

    /// Emitted when a submenu opens or closes.
    pub submenu_toggled: Signal<(ElementId, bool)>,
    /// Emitted when the small-screen navigation expands or collapses.
    pub nav_expanded_changed: Signal<bool>,
}

impl MenuController {
    /// Create a controller, compiling the configured selectors.
    pub fn new(config: MenuConfig, strings: Option<ScreenReaderText>) -> ConfigResult<Self> {
        let selectors = MenuSelectors::compile(&config)?;
        Ok(Self {
            config,
            selectors,
            strings,
            items: SecondaryMap::new(),
            affordances: SecondaryMap::new(),
            links: SecondaryMap::new(),
            nav_expanded: false,
            submenu_toggled: Signal::new(),
            nav_expanded_changed: Signal::new(),
        })
    }

    /// The controller configuration.
    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    fn toggler(&self) -> Toggler<'_> {
        Toggler::new(&self.selectors, &self.config, self.strings.as_ref())
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Run every setup step against the page.
    ///
    /// Sets up submenu toggles, initializes the small-screen toggles and pins
    /// the menu container height on narrow windows.
    #[tracing::instrument(skip_all, target = "waymark::menu", level = "debug")]
    pub fn attach(&mut self, page: &mut Page) {
        let added = self.setup_submenus(page.document_mut());
        let toggles = self.init_small_toggles(page.document_mut());
        let pinned = self.pin_menu_height(page);
        tracing::debug!(
            target: "waymark::menu",
            items = self.items.len(),
            added,
            toggles,
            pinned,
            "menu controller attached"
        );
    }

    /// Discover submenus and give each owning item exactly one affordance.
    ///
    /// Safe to run repeatedly: items already registered or already carrying
    /// an affordance are not modified again. Returns the number of newly
    /// registered items.
    pub fn setup_submenus(&mut self, doc: &mut Document) -> usize {
        let root = doc.document_element();
        let navs = doc.query_selector_all(root, &self.selectors.nav_roots);
        if navs.is_empty() {
            tracing::debug!(target: "waymark::menu", "no navigation roots found");
            return 0;
        }

        let mut added = 0;
        for nav in navs {
            for submenu in doc.query_selector_all(nav, &self.selectors.submenus) {
                let Some(item) = doc.parent(submenu) else {
                    continue;
                };
                if self.items.contains_key(item) {
                    continue;
                }
                match self.setup_item(doc, item, submenu) {
                    Ok(Some(entry)) => {
                        self.register(entry);
                        added += 1;
                    }
                    Ok(None) => {}
                    Err(err) => {
                        tracing::debug!(target: "waymark::menu", ?item, %err, "submenu setup failed");
                    }
                }
            }
        }
        added
    }

    fn register(&mut self, entry: MenuItem) {
        self.affordances.insert(entry.affordance.element(), entry.element);
        if let Some(link) = entry.link.element() {
            self.links.insert(link, entry.element);
        }
        self.items.insert(entry.element, entry);
    }

    fn setup_item(
        &self,
        doc: &mut Document,
        item: ElementId,
        submenu: ElementId,
    ) -> DomResult<Option<MenuItem>> {
        let own_link = doc.query_selector(item, &self.selectors.own_link);
        let link = ParentLink::classify(doc, own_link);
        let already_set_up = doc.has_class(item, &self.config.has_toggle_class);

        let affordance = match self.toggler().affordance(doc, item) {
            Some(existing) => existing,
            None if already_set_up => {
                tracing::debug!(target: "waymark::menu", ?item, "marked item has no affordance");
                return Ok(None);
            }
            None if doc.has_class(item, &self.config.block_item_class) => {
                tracing::debug!(target: "waymark::menu", ?item, "block item without a submenu toggle");
                return Ok(None);
            }
            None => {
                let dropdown = match doc.query_selector(item, &self.selectors.own_dropdown) {
                    Some(dropdown) => dropdown,
                    None => self.create_dropdown(doc, item, submenu)?,
                };
                ToggleAffordance::Classic {
                    button: self.convert_dropdown(doc, dropdown)?,
                }
            }
        };

        if !already_set_up {
            if link == ParentLink::None {
                doc.set_style(item, "cursor", "pointer")?;
            }
            doc.add_class(item, &self.config.has_toggle_class)?;
        }

        Ok(Some(MenuItem {
            element: item,
            submenu,
            affordance,
            link,
        }))
    }

    /// Splice a `span.dropdown > i.dropdown-symbol` in front of the submenu.
    fn create_dropdown(
        &self,
        doc: &mut Document,
        item: ElementId,
        submenu: ElementId,
    ) -> DomResult<ElementId> {
        let dropdown = doc.create_element("span");
        doc.add_class(dropdown, &self.config.dropdown_class)?;
        let symbol = doc.create_element("i");
        doc.add_class(symbol, &self.config.dropdown_symbol_class)?;
        doc.append_child(dropdown, symbol)?;
        doc.insert_before(item, dropdown, Some(submenu))?;
        Ok(dropdown)
    }

    /// Replace a dropdown span with a toggle button holding its children.
    fn convert_dropdown(&self, doc: &mut Document, dropdown: ElementId) -> DomResult<ElementId> {
        let parent = doc.parent(dropdown).ok_or(DomError::NotAChild)?;

        let button = doc.create_element("button");
        doc.add_class(button, &self.config.toggle_button_class)?;
        doc.set_attribute(button, "aria-expanded", "false")?;
        if let Some(strings) = &self.strings {
            doc.set_attribute(button, "aria-label", &strings.expand)?;
        }
        let text = doc.text(dropdown).to_string();
        if !text.is_empty() {
            doc.set_text(button, &text)?;
        }
        for child in doc.children(dropdown).to_vec() {
            doc.append_child(button, child)?;
        }
        doc.replace_child(parent, button, dropdown)?;
        Ok(button)
    }

    /// Reset every small-screen toggle to collapsed. Returns the toggle count.
    pub fn init_small_toggles(&mut self, doc: &mut Document) -> usize {
        let root = doc.document_element();
        let toggles = doc.query_selector_all(root, &self.selectors.menu_toggles);
        for &toggle in &toggles {
            if let Err(err) = doc.set_attribute(toggle, "aria-expanded", "false") {
                tracing::debug!(target: "waymark::menu", %err, "failed to reset menu toggle");
            }
        }
        self.nav_expanded = false;
        toggles.len()
    }

    /// Pin the menu container to the document height on narrow windows.
    ///
    /// Returns `true` if a height was written.
    pub fn pin_menu_height(&self, page: &mut Page) -> bool {
        if !self.config.breakpoints.pins_menu_height(page.viewport()) {
            return false;
        }
        let doc = page.document_mut();
        let height = doc.scroll_height(doc.body());
        let root = doc.document_element();
        let Some(container) = doc.query_selector(root, &self.selectors.menu_container) else {
            return false;
        };
        doc.set_style(container, "height", &format!("{height}px")).is_ok()
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Handle a click, bubbling from `target` to the document root.
    pub fn handle_click(&mut self, page: &mut Page, target: ElementId) -> EventOutcome {
        let mode = self.mode(page.viewport());
        let doc = page.document_mut();
        if !doc.is_valid(target) {
            return EventOutcome::proceed();
        }

        let path: Vec<ElementId> = std::iter::once(target).chain(doc.ancestors(target)).collect();
        let mut outcome = EventOutcome::proceed();
        for current in path {
            if let Some(&item) = self.affordances.get(current) {
                self.toggle_from_click(doc, item);
            }

            if let Some(&item) = self.links.get(current) {
                let suppress = match self.items.get(item).map(|entry| entry.link) {
                    Some(ParentLink::Placeholder(_)) => true,
                    Some(ParentLink::Destination(_)) => mode.suppresses_links(),
                    _ => false,
                };
                if suppress {
                    outcome = outcome.merge(EventOutcome::prevent_default());
                    self.toggle_from_click(doc, item);
                }
            }

            if self.is_surface_click(doc, current, target) {
                self.toggle_from_click(doc, current);
            }

            if doc.matches(current, &self.selectors.menu_toggles) {
                self.toggle_navigation(doc);
            }
        }
        outcome
    }

    /// Whether a click on `target` lands on the surface of link-less item `item`.
    ///
    /// Clicks bubbling from a link or button that belongs to another item do
    /// not count, nor do clicks on the item's own affordance.
    fn is_surface_click(&self, doc: &Document, item: ElementId, target: ElementId) -> bool {
        let Some(entry) = self.items.get(item) else {
            return false;
        };
        if entry.link != ParentLink::None {
            return false;
        }
        if doc.contains(entry.affordance.element(), target) {
            return false;
        }
        match doc.closest(target, &self.selectors.focusable) {
            Some(control) => doc.parent(control) == Some(item),
            None => true,
        }
    }

    fn toggle_from_click(&self, doc: &mut Document, item: ElementId) {
        let transitions = self
            .toggler()
            .toggle_sub_menu(doc, item, self.config.exclusive_submenus);
        self.emit_transitions(&transitions);
    }

    /// Handle focus arriving on `target`.
    ///
    /// Focusing an item's direct link closes the open items beside it.
    pub fn handle_focus(&mut self, page: &mut Page, target: ElementId) {
        let Some(&item) = self.links.get(target) else {
            return;
        };
        let transitions = self
            .toggler()
            .close_open_siblings(page.document_mut(), item);
        self.emit_transitions(&transitions);
    }

    /// Handle a key press while `target` has focus.
    pub fn handle_key_down(
        &mut self,
        page: &mut Page,
        target: ElementId,
        key: &Key,
        shift: bool,
    ) -> EventOutcome {
        if *key != Key::Tab {
            return EventOutcome::proceed();
        }
        let doc = page.document_mut();
        let exited = submenus_exited_by(
            doc,
            &self.selectors,
            &self.config,
            target,
            FocusDirection::from_shift(shift),
        );
        let toggler = self.toggler();
        let transitions: Vec<Transition> = exited
            .into_iter()
            .filter_map(|item| toggler.set_open(doc, item, false))
            .collect();
        self.emit_transitions(&transitions);
        EventOutcome::proceed()
    }

    /// Handle a window resize. The page viewport must already be updated.
    pub fn handle_resize(&mut self, page: &mut Page) {
        if self.config.breakpoints.closes_submenus(page.viewport()) {
            let transitions = self.close_all_submenus(page.document_mut());
            if !transitions.is_empty() {
                tracing::debug!(
                    target: "waymark::menu",
                    closed = transitions.len(),
                    "closed submenus for wide viewport"
                );
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Toggle `item`, optionally closing its open siblings first.
    pub fn toggle_sub_menu(
        &self,
        doc: &mut Document,
        item: ElementId,
        exclusive: bool,
    ) -> Vec<Transition> {
        let transitions = self.toggler().toggle_sub_menu(doc, item, exclusive);
        self.emit_transitions(&transitions);
        transitions
    }

    /// Close every open submenu in the document.
    pub fn close_all_submenus(&self, doc: &mut Document) -> Vec<Transition> {
        let transitions = self.toggler().close_all(doc);
        self.emit_transitions(&transitions);
        transitions
    }

    /// Flip the small-screen navigation state. Returns the new state.
    ///
    /// Without any toggle controls on the page this is a no-op.
    pub fn toggle_navigation(&mut self, doc: &mut Document) -> bool {
        let root = doc.document_element();
        let toggles = doc.query_selector_all(root, &self.selectors.menu_toggles);
        if toggles.is_empty() {
            return self.nav_expanded;
        }

        self.nav_expanded = !self.nav_expanded;
        let expanded = if self.nav_expanded { "true" } else { "false" };
        for toggle in toggles {
            if let Err(err) = doc.set_attribute(toggle, "aria-expanded", expanded) {
                tracing::debug!(target: "waymark::menu", %err, "failed to update menu toggle");
            }
        }
        for nav in doc.query_selector_all(root, &self.selectors.small_navs) {
            if let Err(err) = doc.set_class(nav, &self.config.small_nav_open_class, self.nav_expanded) {
                tracing::debug!(target: "waymark::menu", %err, "failed to update navigation container");
            }
        }

        tracing::debug!(target: "waymark::menu", expanded = self.nav_expanded, "navigation toggled");
        self.nav_expanded_changed.emit(self.nav_expanded);
        self.nav_expanded
    }

    fn emit_transitions(&self, transitions: &[Transition]) {
        for transition in transitions {
            self.submenu_toggled.emit((transition.item, transition.open));
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The navigation mode for `viewport`.
    pub fn mode(&self, viewport: &Viewport) -> NavigationMode {
        NavigationMode::for_viewport(viewport, &self.config.breakpoints)
    }

    /// Whether `item` is open.
    pub fn is_open(&self, doc: &Document, item: ElementId) -> bool {
        self.toggler().is_open(doc, item)
    }

    /// Whether the small-screen navigation is expanded.
    pub fn is_nav_expanded(&self) -> bool {
        self.nav_expanded
    }

    /// The registered item for `element`.
    pub fn item(&self, element: ElementId) -> Option<&MenuItem> {
        self.items.get(element)
    }

    /// All registered items.
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.values()
    }

    /// Number of registered items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl std::fmt::Debug for MenuController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuController")
            .field("items", &self.items.len())
            .field("nav_expanded", &self.nav_expanded)
            .field("exclusive_submenus", &self.config.exclusive_submenus)
            .finish()
    }
}
