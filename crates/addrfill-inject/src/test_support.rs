//! Fakes shared by the unit tests of this crate.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;

use addrfill_protocols::PlaceDetails;

use crate::dom::{Document, MemoryDocument, NodeId};
use crate::error::InjectError;
use crate::library::{
    AutocompleteOptions, LibraryLoader, LibrarySource, PlacesLibrary, WidgetEvent, WidgetHandler,
};

#[derive(Default)]
pub(crate) struct FakeLibrary {
    pub handlers: RefCell<HashMap<NodeId, WidgetHandler>>,
    pub options: RefCell<Vec<AutocompleteOptions>>,
    pub refuse: Cell<bool>,
}

impl FakeLibrary {
    /// Simulate the user picking a suggestion in the widget on `input`.
    pub fn select(&self, input: NodeId, formatted_address: &str) {
        let handler = self.handlers.borrow().get(&input).cloned();
        let handler = handler.expect("no widget attached");
        handler(WidgetEvent::PlaceChanged(&PlaceDetails {
            formatted_address: formatted_address.to_string(),
            address_components: Vec::new(),
            extra: Default::default(),
        }));
    }

    /// Simulate the widget's lookup on `input` failing.
    pub fn fail_lookup(&self, input: NodeId, message: &str) {
        let handler = self.handlers.borrow().get(&input).cloned();
        let handler = handler.expect("no widget attached");
        handler(WidgetEvent::LookupFailed(&InjectError::Lookup(message.to_string())));
    }

    pub fn attached(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl PlacesLibrary for FakeLibrary {
    fn attach(
        &self,
        input: NodeId,
        options: &AutocompleteOptions,
        on_event: WidgetHandler,
    ) -> Result<(), InjectError> {
        if self.refuse.get() {
            return Err(InjectError::Attach("element is not an input".to_string()));
        }
        self.options.borrow_mut().push(options.clone());
        self.handlers.borrow_mut().insert(input, on_event);
        Ok(())
    }
}

pub(crate) struct FakeSource {
    pub library: Rc<FakeLibrary>,
    pub loads: Cell<usize>,
    pub fail: bool,
}

#[async_trait(?Send)]
impl LibrarySource for FakeSource {
    async fn load(&self) -> Result<Rc<dyn PlacesLibrary>, InjectError> {
        self.loads.set(self.loads.get() + 1);
        tokio::task::yield_now().await;
        if self.fail {
            return Err(InjectError::LibraryLoad("script blocked by page CSP".to_string()));
        }
        let library: Rc<dyn PlacesLibrary> = self.library.clone();
        Ok(library)
    }
}

pub(crate) fn source(fail: bool) -> Rc<FakeSource> {
    Rc::new(FakeSource {
        library: Rc::new(FakeLibrary::default()),
        loads: Cell::new(0),
        fail,
    })
}

pub(crate) fn loader(source: &Rc<FakeSource>) -> Rc<LibraryLoader> {
    let source: Rc<dyn LibrarySource> = source.clone();
    Rc::new(LibraryLoader::new(source))
}

/// A host form with one address field inside a rule container.
pub(crate) fn host_form(doc: &MemoryDocument) -> (NodeId, NodeId) {
    let container = doc.append_element(
        doc.root(),
        "div",
        &[("data-test-id", "address-input-wrapper")],
    );
    doc.append_element(container, "label", &[]);
    let field = doc.append_element(container, "input", &[("name", "address")]);
    doc.set_sheet_style(field, "font-size", "14px");
    doc.set_sheet_style(field, "padding-left", "8px");
    doc.set_sheet_style(field, "color", "rgb(51, 71, 91)");
    (container, field)
}

/// Let spawned local tasks run to completion.
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
