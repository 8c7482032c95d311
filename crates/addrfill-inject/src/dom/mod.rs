//! Host document abstraction.
//!
//! The engine only ever talks to the page through [`Document`]. All methods
//! take `&self`: implementations use interior mutability and must not hold
//! any internal borrow while invoking listeners or observers, since those
//! call straight back into the document.

use std::fmt;
use std::rc::Rc;

pub mod memory;

pub use memory::MemoryDocument;

/// Identity of a node within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    Paste,
    Focus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: NodeId,
    /// Dispatched by script rather than by the user.
    pub synthetic: bool,
}

impl DomEvent {
    pub fn user(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            synthetic: false,
        }
    }

    pub fn synthetic(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            synthetic: true,
        }
    }
}

pub type Listener = Rc<dyn Fn(&DomEvent)>;

/// Nodes inserted under `target` by one structural change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
}

pub type MutationObserver = Rc<dyn Fn(&[MutationRecord])>;

pub trait Document {
    fn root(&self) -> NodeId;

    /// Lower-case tag name.
    fn tag(&self, node: NodeId) -> Option<String>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Element children in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);

    fn create_element(&self, tag: &str) -> NodeId;
    /// Append `child`, moving it if it is already attached.
    fn append_child(&self, parent: NodeId, child: NodeId);
    /// Insert `child` under `parent` right before `reference`.
    fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId);
    fn remove(&self, node: NodeId);

    /// Resolved value of a style property.
    fn computed_style(&self, node: NodeId, property: &str) -> Option<String>;
    /// Inline value of a style property.
    fn inline_style(&self, node: NodeId, property: &str) -> Option<String>;
    fn set_style(&self, node: NodeId, property: &str, value: &str);
    fn remove_style(&self, node: NodeId, property: &str);

    fn value(&self, node: NodeId) -> String;
    /// Programmatic write; fires no event.
    fn set_value(&self, node: NodeId, value: &str);

    fn add_listener(&self, node: NodeId, kind: EventKind, listener: Listener);
    /// Synchronously invoke the listeners registered on the event target.
    fn dispatch(&self, event: &DomEvent);

    /// Register for subtree mutation batches.
    fn observe(&self, observer: MutationObserver);

    fn is_connected(&self, node: NodeId) -> bool {
        let root = self.root();
        let mut current = Some(node);
        while let Some(n) = current {
            if n == root {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}
