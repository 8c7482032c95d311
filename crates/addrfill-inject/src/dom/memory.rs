//! In-memory host document.
//!
//! Nodes live in an arena and are never freed, so a [`NodeId`] handed out
//! by this document stays valid for its lifetime. Mutation records are
//! queued and delivered to observers on [`MemoryDocument::flush_mutations`],
//! the way a page delivers them after the current task.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{DomEvent, Document, EventKind, Listener, MutationObserver, MutationRecord, NodeId};

struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    inline_style: BTreeMap<String, String>,
    sheet_style: BTreeMap<String, String>,
    value: String,
    value_writes: usize,
    listeners: Vec<(EventKind, Listener)>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            inline_style: BTreeMap::new(),
            sheet_style: BTreeMap::new(),
            value: String::new(),
            value_writes: 0,
            listeners: Vec::new(),
        }
    }
}

pub struct MemoryDocument {
    nodes: RefCell<Vec<NodeData>>,
    pending: RefCell<Vec<MutationRecord>>,
    observers: RefCell<Vec<MutationObserver>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// A document holding only its `body` root.
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![NodeData::new("body")]),
            pending: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Create an element with `attributes` and append it to `parent`.
    pub fn append_element(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(node, name, value);
        }
        self.append_child(parent, node);
        node
    }

    /// Style coming from the host page's stylesheets rather than inline.
    pub fn set_sheet_style(&self, node: NodeId, property: &str, value: &str) {
        self.with_node_mut(node, |n| {
            n.sheet_style.insert(property.to_string(), value.to_string());
        });
    }

    /// Simulate the user typing: the value changes, then `input` fires.
    pub fn type_text(&self, node: NodeId, value: &str) {
        self.set_value(node, value);
        self.dispatch(&DomEvent::user(EventKind::Input, node));
    }

    /// Simulate a paste that leaves `value` in the field.
    pub fn paste(&self, node: NodeId, value: &str) {
        self.set_value(node, value);
        self.dispatch(&DomEvent::user(EventKind::Paste, node));
    }

    pub fn focus(&self, node: NodeId) {
        self.dispatch(&DomEvent::user(EventKind::Focus, node));
    }

    /// How many programmatic or user writes `node`'s value has seen.
    pub fn value_writes(&self, node: NodeId) -> usize {
        self.with_node(node, |n| n.value_writes).unwrap_or(0)
    }

    pub fn pending_mutations(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Deliver queued mutation records until none remain.
    ///
    /// Observers may mutate the document; their records are delivered in a
    /// following round. Returns the number of rounds delivered.
    pub fn flush_mutations(&self) -> usize {
        let mut rounds = 0;
        loop {
            let records = std::mem::take(&mut *self.pending.borrow_mut());
            if records.is_empty() {
                return rounds;
            }
            rounds += 1;
            let observers = self.observers.borrow().clone();
            for observer in observers {
                observer(&records);
            }
        }
    }

    fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        self.nodes.borrow().get(node.0).map(f)
    }

    fn with_node_mut<R>(&self, node: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
        self.nodes.borrow_mut().get_mut(node.0).map(f)
    }

    fn detach(nodes: &mut [NodeData], node: NodeId) {
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn record(&self, target: NodeId, added: NodeId) {
        self.pending.borrow_mut().push(MutationRecord {
            target,
            added: vec![added],
        });
    }

    fn valid(&self, nodes: &[NodeId]) -> bool {
        let len = self.nodes.borrow().len();
        nodes.iter().all(|n| n.0 < len)
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn tag(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |n| n.tag.clone())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.with_node(node, |n| n.parent).flatten()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.with_node(node, |n| n.children.clone()).unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_node(node, |n| n.attributes.get(name).cloned()).flatten()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.with_node_mut(node, |n| {
            n.attributes.insert(name.to_string(), value.to_string());
        });
    }

    fn create_element(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData::new(tag));
        NodeId(nodes.len() - 1)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        if parent == child || !self.valid(&[parent, child]) {
            return;
        }
        {
            let mut nodes = self.nodes.borrow_mut();
            Self::detach(&mut nodes, child);
            nodes[child.0].parent = Some(parent);
            nodes[parent.0].children.push(child);
        }
        self.record(parent, child);
    }

    fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId) {
        if parent == child || !self.valid(&[parent, child, reference]) {
            return;
        }
        {
            let mut nodes = self.nodes.borrow_mut();
            Self::detach(&mut nodes, child);
            let position = nodes[parent.0]
                .children
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(nodes[parent.0].children.len());
            nodes[child.0].parent = Some(parent);
            nodes[parent.0].children.insert(position, child);
        }
        self.record(parent, child);
    }

    fn remove(&self, node: NodeId) {
        if self.valid(&[node]) {
            Self::detach(&mut self.nodes.borrow_mut(), node);
        }
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.with_node(node, |n| {
            n.inline_style
                .get(property)
                .or_else(|| n.sheet_style.get(property))
                .cloned()
        })
        .flatten()
    }

    fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.with_node(node, |n| n.inline_style.get(property).cloned())
            .flatten()
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        self.with_node_mut(node, |n| {
            n.inline_style.insert(property.to_string(), value.to_string());
        });
    }

    fn remove_style(&self, node: NodeId, property: &str) {
        self.with_node_mut(node, |n| {
            n.inline_style.remove(property);
        });
    }

    fn value(&self, node: NodeId) -> String {
        self.with_node(node, |n| n.value.clone()).unwrap_or_default()
    }

    fn set_value(&self, node: NodeId, value: &str) {
        self.with_node_mut(node, |n| {
            n.value = value.to_string();
            n.value_writes += 1;
        });
    }

    fn add_listener(&self, node: NodeId, kind: EventKind, listener: Listener) {
        self.with_node_mut(node, |n| n.listeners.push((kind, listener)));
    }

    fn dispatch(&self, event: &DomEvent) {
        // Cloned out so listeners can call back into the document.
        let listeners: Vec<Listener> = self
            .with_node(event.target, |n| {
                n.listeners
                    .iter()
                    .filter(|(kind, _)| *kind == event.kind)
                    .map(|(_, l)| l.clone())
                    .collect()
            })
            .unwrap_or_default();

        for listener in listeners {
            listener(event);
        }
    }

    fn observe(&self, observer: MutationObserver) {
        self.observers.borrow_mut().push(observer);
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
