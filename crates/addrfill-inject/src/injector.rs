//! Overlay injection and value synchronisation.
//!
//! Each discovered field gets a wrapper and a transparent overlay input
//! stacked over it. The user types into the overlay; the original field
//! stays the host page's source of truth and is kept in step through a
//! per-binding [`SyncGuard`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use addrfill_protocols::PlaceDetails;

use crate::discovery::FieldMatch;
use crate::dom::{DomEvent, Document, EventKind, NodeId};
use crate::error::InjectError;
use crate::library::{AutocompleteOptions, LibraryLoader, LoadState, WidgetEvent, WidgetHandler};
use crate::MARKER_ATTR;

/// Properties copied from the original so the overlay renders identically.
pub const COPIED_STYLES: [&str; 10] = [
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "letter-spacing",
    "text-indent",
];

/// Properties of the original hidden while the overlay is authoritative.
const HIDDEN_STYLES: [&str; 2] = ["color", "caret-color"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    Overlay,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::Original => Self::Overlay,
            Self::Overlay => Self::Original,
        }
    }
}

/// Re-entrancy guard of one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncGuard {
    Idle,
    /// A write into this side is in progress.
    Writing(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Overlay shown, widget not yet attached.
    Overlay,
    /// Widget attached to the overlay.
    Autocomplete,
    /// Overlay hidden; the user types into the original field.
    Native,
}

/// The live pairing of a host field and its overlay.
pub struct OverlayBinding {
    original: NodeId,
    overlay: NodeId,
    wrapper: NodeId,
    guard: Cell<SyncGuard>,
    mode: Cell<BindingMode>,
    hidden_styles: Vec<(&'static str, Option<String>)>,
}

impl OverlayBinding {
    pub fn original(&self) -> NodeId {
        self.original
    }

    pub fn overlay(&self) -> NodeId {
        self.overlay
    }

    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    pub fn guard(&self) -> SyncGuard {
        self.guard.get()
    }

    pub fn mode(&self) -> BindingMode {
        self.mode.get()
    }

    fn node(&self, side: Side) -> NodeId {
        match side {
            Side::Original => self.original,
            Side::Overlay => self.overlay,
        }
    }

    /// Copy the value of `from` into the other field.
    ///
    /// Short-circuits while another write on this binding is in progress,
    /// which is what stops the synthetic `input` on the original from
    /// echoing back. Returns whether a write happened.
    pub fn sync_from(&self, doc: &dyn Document, from: Side) -> bool {
        if self.guard.get() != SyncGuard::Idle {
            return false;
        }
        let to = from.other();
        self.guard.set(SyncGuard::Writing(to));

        let value = doc.value(self.node(from));
        doc.set_value(self.node(to), &value);
        if to == Side::Original {
            doc.dispatch(&DomEvent::synthetic(EventKind::Input, self.original));
        }

        self.guard.set(SyncGuard::Idle);
        true
    }

    /// Write `address` into both fields and notify the host page.
    pub fn write_address(&self, doc: &dyn Document, address: &str) -> bool {
        if self.guard.get() != SyncGuard::Idle {
            return false;
        }
        self.guard.set(SyncGuard::Writing(Side::Original));

        doc.set_value(self.overlay, address);
        doc.set_value(self.original, address);
        doc.dispatch(&DomEvent::synthetic(EventKind::Input, self.original));

        self.guard.set(SyncGuard::Idle);
        true
    }

    pub fn apply_place(&self, doc: &dyn Document, place: &PlaceDetails) -> bool {
        debug!("Applying selected place to field {}", self.original);
        self.write_address(doc, &place.formatted_address)
    }

    /// Hand the field back to native typing: restore the original's text
    /// and caret, hide the overlay.
    pub fn fall_back(&self, doc: &dyn Document) {
        if self.mode.get() == BindingMode::Native {
            return;
        }
        for (property, previous) in &self.hidden_styles {
            match previous {
                Some(value) => doc.set_style(self.original, property, value),
                None => doc.remove_style(self.original, property),
            }
        }
        doc.set_style(self.overlay, "display", "none");
        self.mode.set(BindingMode::Native);
    }
}

/// Builds overlays and wires their listeners.
pub struct FieldInjector {
    doc: Rc<dyn Document>,
    loader: Rc<LibraryLoader>,
    options: AutocompleteOptions,
    bindings: RefCell<Vec<Rc<OverlayBinding>>>,
    lookup_warned: Cell<bool>,
}

impl FieldInjector {
    pub fn new(
        doc: Rc<dyn Document>,
        loader: Rc<LibraryLoader>,
        options: AutocompleteOptions,
    ) -> Rc<Self> {
        Rc::new(Self {
            doc,
            loader,
            options,
            bindings: RefCell::new(Vec::new()),
            lookup_warned: Cell::new(false),
        })
    }

    pub fn bindings(&self) -> Vec<Rc<OverlayBinding>> {
        self.bindings.borrow().clone()
    }

    pub fn loader(&self) -> &Rc<LibraryLoader> {
        &self.loader
    }

    /// Wrap the field, stack the overlay on it and bind the listeners.
    ///
    /// # Panics
    ///
    /// Focus on the overlay panics unless the event is dispatched inside a
    /// [`tokio::task::LocalSet`].
    pub fn inject(self: &Rc<Self>, field: &FieldMatch) -> Rc<OverlayBinding> {
        let doc = self.doc.as_ref();
        let original = field.input;

        let wrapper = doc.create_element("div");
        doc.set_attribute(wrapper, MARKER_ATTR, "wrapper");
        doc.set_style(wrapper, "position", "relative");
        if let Some(parent) = doc.parent(original) {
            doc.insert_before(parent, wrapper, original);
        }
        doc.append_child(wrapper, original);

        let overlay = doc.create_element("input");
        doc.set_attribute(overlay, MARKER_ATTR, "overlay");
        doc.set_attribute(overlay, "type", "text");
        doc.set_attribute(overlay, "autocomplete", "off");
        for (property, value) in [
            ("position", "absolute"),
            ("top", "0"),
            ("left", "0"),
            ("width", "100%"),
            ("height", "100%"),
            ("background", "transparent"),
            ("border", "none"),
            ("box-sizing", "border-box"),
        ] {
            doc.set_style(overlay, property, value);
        }
        for property in COPIED_STYLES {
            if let Some(value) = doc.computed_style(original, property) {
                doc.set_style(overlay, property, &value);
            }
        }
        doc.set_value(overlay, &doc.value(original));
        doc.append_child(wrapper, overlay);

        let hidden_styles = HIDDEN_STYLES
            .iter()
            .map(|p| (*p, doc.inline_style(original, p)))
            .collect();
        for property in HIDDEN_STYLES {
            doc.set_style(original, property, "transparent");
        }

        let binding = Rc::new(OverlayBinding {
            original,
            overlay,
            wrapper,
            guard: Cell::new(SyncGuard::Idle),
            mode: Cell::new(BindingMode::Overlay),
            hidden_styles,
        });

        self.listen_sync(&binding, Side::Overlay);
        self.listen_sync(&binding, Side::Original);
        self.listen_focus(&binding);

        self.bindings.borrow_mut().push(Rc::clone(&binding));
        debug!(field = %original, container = %field.container, "Overlay injected");

        if self.loader.state() == LoadState::Failed {
            binding.fall_back(doc);
        }
        binding
    }

    fn listen_sync(self: &Rc<Self>, binding: &Rc<OverlayBinding>, side: Side) {
        let node = binding.node(side);
        for kind in [EventKind::Input, EventKind::Paste] {
            let injector = Rc::downgrade(self);
            let binding = Rc::clone(binding);
            self.doc.add_listener(
                node,
                kind,
                Rc::new(move |_event: &DomEvent| {
                    if let Some(injector) = injector.upgrade() {
                        binding.sync_from(injector.doc.as_ref(), side);
                    }
                }),
            );
        }
    }

    fn listen_focus(self: &Rc<Self>, binding: &Rc<OverlayBinding>) {
        let injector = Rc::downgrade(self);
        let weak_binding = Rc::downgrade(binding);
        self.doc.add_listener(
            binding.overlay,
            EventKind::Focus,
            Rc::new(move |_event: &DomEvent| {
                if let (Some(injector), Some(binding)) = (injector.upgrade(), weak_binding.upgrade()) {
                    injector.activate(binding);
                }
            }),
        );
    }

    /// Attach the widget to a focused overlay, loading the library if this
    /// is the first focus on the page.
    ///
    /// Must run inside a [`tokio::task::LocalSet`].
    fn activate(self: &Rc<Self>, binding: Rc<OverlayBinding>) {
        if binding.mode() != BindingMode::Overlay {
            return;
        }
        let injector = Rc::clone(self);
        tokio::task::spawn_local(async move {
            injector.attach(&binding).await;
        });
    }

    /// Load the library and bind it to `binding`'s overlay.
    pub async fn attach(self: &Rc<Self>, binding: &Rc<OverlayBinding>) {
        let Some(library) = self.loader.get().await else {
            self.fall_back_all();
            return;
        };
        if binding.mode() != BindingMode::Overlay {
            return;
        }

        let injector = Rc::downgrade(self);
        let target = Rc::downgrade(binding);
        let handler: WidgetHandler = Rc::new(move |event: WidgetEvent<'_>| {
            let (Some(injector), Some(binding)) = (injector.upgrade(), target.upgrade()) else {
                return;
            };
            match event {
                WidgetEvent::PlaceChanged(place) => {
                    binding.apply_place(injector.doc.as_ref(), place);
                }
                WidgetEvent::LookupFailed(e) => injector.lookup_failed(&binding, e),
            }
        });

        match library.attach(binding.overlay, &self.options, handler) {
            Ok(()) => {
                binding.mode.set(BindingMode::Autocomplete);
                debug!(field = %binding.original, "Autocomplete attached");
            }
            Err(e) => {
                warn!("{}; field {} falls back to native typing", e, binding.original);
                binding.fall_back(self.doc.as_ref());
            }
        }
    }

    /// A failed lookup disables the overlay of that field only.
    fn lookup_failed(&self, binding: &OverlayBinding, error: &InjectError) {
        if !self.lookup_warned.replace(true) {
            warn!("{}; affected fields fall back to native typing", error);
        } else {
            debug!(field = %binding.original, "Lookup failed: {}", error);
        }
        binding.fall_back(self.doc.as_ref());
    }

    fn fall_back_all(&self) {
        for binding in self.bindings.borrow().iter() {
            binding.fall_back(self.doc.as_ref());
        }
    }
}

#[cfg(test)]
#[path = "injector_tests.rs"]
mod tests;
