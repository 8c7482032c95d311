//! Per-page driver.
//!
//! Runs an initial scan, then rescans whenever the document reports a
//! relevant structural change, injecting an overlay into every new field.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::discovery::{FieldDiscovery, RuleSet};
use crate::dom::{Document, MutationRecord};
use crate::injector::{FieldInjector, OverlayBinding};
use crate::library::{AutocompleteOptions, LibraryLoader, LibrarySource};

/// Messages the content side accepts from the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ContentMessage {
    /// Write an address chosen elsewhere (e.g. the popup) into the page.
    FillAddress { address: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReply {
    pub success: bool,
}

pub struct PageController {
    doc: Rc<dyn Document>,
    discovery: RefCell<FieldDiscovery>,
    injector: Rc<FieldInjector>,
}

impl PageController {
    /// Instrument the page and subscribe to its mutations.
    ///
    /// # Panics
    ///
    /// The first focus on an overlay spawns the widget attach with
    /// [`tokio::task::spawn_local`]; events must therefore be dispatched
    /// from inside a [`tokio::task::LocalSet`], or that focus panics.
    pub fn start(
        doc: Rc<dyn Document>,
        rules: RuleSet,
        source: Rc<dyn LibrarySource>,
        options: AutocompleteOptions,
    ) -> Rc<Self> {
        let loader = Rc::new(LibraryLoader::new(source));
        let controller = Rc::new(Self {
            injector: FieldInjector::new(Rc::clone(&doc), loader, options),
            discovery: RefCell::new(FieldDiscovery::new(rules)),
            doc,
        });

        let weak = Rc::downgrade(&controller);
        controller.doc.observe(Rc::new(move |records: &[MutationRecord]| {
            if let Some(controller) = weak.upgrade() {
                controller.on_mutations(records);
            }
        }));

        let injected = controller.rescan();
        info!(fields = injected, "Address autocomplete active on page");
        controller
    }

    /// Rescan if the batch is relevant. Returns the number of new fields.
    pub fn on_mutations(&self, records: &[MutationRecord]) -> usize {
        if !self.discovery.borrow().is_relevant(self.doc.as_ref(), records) {
            return 0;
        }
        debug!(records = records.len(), "Relevant mutation, rescanning");
        self.rescan()
    }

    /// Scan and inject every newly discovered field.
    pub fn rescan(&self) -> usize {
        let found = self.discovery.borrow_mut().scan(self.doc.as_ref());
        for field in &found {
            self.injector.inject(field);
        }
        found.len()
    }

    pub fn bindings(&self) -> Vec<Rc<OverlayBinding>> {
        self.injector.bindings()
    }

    pub fn processed_count(&self) -> usize {
        self.discovery.borrow().processed_count()
    }

    /// Write `address` into every instrumented field still on the page.
    pub fn fill_address(&self, address: &str) -> usize {
        self.bindings()
            .iter()
            .filter(|b| self.doc.is_connected(b.original()))
            .filter(|b| b.write_address(self.doc.as_ref(), address))
            .count()
    }

    /// `success` is false when no attached field received the address.
    pub fn handle(&self, message: ContentMessage) -> ContentReply {
        match message {
            ContentMessage::FillAddress { address } => {
                let filled = self.fill_address(&address);
                debug!(filled, "Filled address from message");
                ContentReply { success: filled > 0 }
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
