//! # addrfill inject
//!
//! Content-side engine. Finds the host application's address fields in a
//! live, mutating document and stacks an autocomplete overlay on each one
//! without disturbing the host's own wiring.
//!
//! Everything here runs on one thread: documents, bindings and listeners
//! are `Rc`-shared, and the one asynchronous step (loading the widget
//! library) is spawned on a [`tokio::task::LocalSet`].

pub mod controller;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod injector;
pub mod library;
pub mod selector;

#[cfg(test)]
mod test_support;

/// Attribute carried by every node we create; such nodes are never matched.
pub const MARKER_ATTR: &str = "data-addrfill";

pub use controller::{ContentMessage, ContentReply, PageController};
pub use discovery::{FallbackRule, FieldDiscovery, FieldMatch, MatchRule, RuleSet};
pub use dom::{Document, DomEvent, EventKind, MemoryDocument, MutationRecord, NodeId};
pub use error::InjectError;
pub use injector::{BindingMode, FieldInjector, OverlayBinding, Side, SyncGuard, COPIED_STYLES};
pub use library::{
    AutocompleteOptions, LibraryLoader, LibrarySource, LoadState, PlacesLibrary, WidgetEvent,
    WidgetHandler,
};
pub use selector::{Selector, SelectorError};
