//! In-memory DOM - a reference [`MutationSink`].
//!
//! `MemoryDom` keeps element and text nodes in an index arena, records every
//! mutation it receives in order, and can serialize a subtree to markup.
//! It is the sink used by the tests and demos, and a template for real
//! targets.
//!
//! # Mutation log
//!
//! Every sink call appends one [`Mutation`]. The set of kinds seen since the
//! last [`MemoryDom::take_log`] is tracked as [`MutationKinds`] bitflags, so
//! "nothing visible happened" is a single check:
//!
//! ```ignore
//! assert!(!dom.touched().intersects(MutationKinds::VISIBLE));
//! ```

use std::fmt;

use super::sink::{MutationSink, NodeKind, SinkError};
use crate::types::{Event, Listener, NODE_VALUE, PropValue};

// =============================================================================
// Node Handles
// =============================================================================

/// Handle to a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

// =============================================================================
// Mutation Log
// =============================================================================

bitflags::bitflags! {
    /// Kinds of mutation a sink has received.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MutationKinds: u8 {
        const CREATE = 1 << 0;
        const SET_ATTRIBUTE = 1 << 1;
        const CLEAR_ATTRIBUTE = 1 << 2;
        const ADD_LISTENER = 1 << 3;
        const REMOVE_LISTENER = 1 << 4;
        const APPEND_CHILD = 1 << 5;
        const REMOVE_CHILD = 1 << 6;
        const INSERT_CHILD = 1 << 7;

        /// Mutations that change what is attached to the document.
        /// Creating a detached node is not one of them.
        const VISIBLE = Self::SET_ATTRIBUTE.bits()
            | Self::CLEAR_ATTRIBUTE.bits()
            | Self::ADD_LISTENER.bits()
            | Self::REMOVE_LISTENER.bits()
            | Self::APPEND_CHILD.bits()
            | Self::REMOVE_CHILD.bits()
            | Self::INSERT_CHILD.bits();
    }
}

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create { node: NodeId, kind: String },
    SetAttribute { node: NodeId, name: String, value: String },
    ClearAttribute { node: NodeId, name: String },
    AddListener { node: NodeId, event: String },
    RemoveListener { node: NodeId, event: String },
    AppendChild { parent: NodeId, child: NodeId },
    InsertBefore { parent: NodeId, child: NodeId, before: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
}

impl Mutation {
    /// Kind flag of this mutation.
    pub fn kind(&self) -> MutationKinds {
        match self {
            Mutation::Create { .. } => MutationKinds::CREATE,
            Mutation::SetAttribute { .. } => MutationKinds::SET_ATTRIBUTE,
            Mutation::ClearAttribute { .. } => MutationKinds::CLEAR_ATTRIBUTE,
            Mutation::AddListener { .. } => MutationKinds::ADD_LISTENER,
            Mutation::RemoveListener { .. } => MutationKinds::REMOVE_LISTENER,
            Mutation::AppendChild { .. } => MutationKinds::APPEND_CHILD,
            Mutation::InsertBefore { .. } => MutationKinds::INSERT_CHILD,
            Mutation::RemoveChild { .. } => MutationKinds::REMOVE_CHILD,
        }
    }
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Debug)]
enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, PropValue)>,
        listeners: Vec<(String, Listener)>,
    },
    Text {
        value: String,
    },
}

#[derive(Debug)]
struct DomNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// =============================================================================
// MemoryDom
// =============================================================================

/// In-memory presentation layer.
#[derive(Debug, Default)]
pub struct MemoryDom {
    nodes: Vec<DomNode>,
    log: Vec<Mutation>,
    touched: MutationKinds,
    rejected_attributes: Vec<String>,
}

impl MemoryDom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container element to render into. Not recorded in the log.
    pub fn create_container(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
            listeners: Vec::new(),
        })
    }

    /// Make every future `set_attribute`/`create_node` carrying `name` fail.
    pub fn reject_attribute(&mut self, name: &str) {
        self.rejected_attributes.push(name.to_string());
    }

    // -------------------------------------------------------------------------
    // Log
    // -------------------------------------------------------------------------

    /// Mutations recorded since the last [`MemoryDom::take_log`].
    pub fn log(&self) -> &[Mutation] {
        &self.log
    }

    /// Drain the log and reset [`MemoryDom::touched`].
    pub fn take_log(&mut self) -> Vec<Mutation> {
        self.touched = MutationKinds::empty();
        std::mem::take(&mut self.log)
    }

    /// Kinds of mutation seen since the last [`MemoryDom::take_log`].
    pub fn touched(&self) -> MutationKinds {
        self.touched
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Total number of nodes ever created (including the container).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of a node, in order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    /// Tag of an element node.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text { .. } => None,
        }
    }

    /// Content of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Text { value } => Some(value),
            NodeData::Element { .. } => None,
        }
    }

    /// Attribute of an element node.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { attributes, .. } => {
                attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            NodeData::Text { .. } => None,
        }
    }

    /// Number of listeners registered for `event` on a node.
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element { listeners, .. }) => {
                listeners.iter().filter(|(e, _)| e == event).count()
            }
            _ => 0,
        }
    }

    /// First descendant of `root` (depth-first, pre-order) with the given tag.
    pub fn find(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node != root && self.tag(node) == Some(tag) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev());
        }
        None
    }

    /// Markup for a node and its subtree.
    ///
    /// Attributes are printed in insertion order; listeners are omitted.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Markup for a node's children only.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(entry) = self.nodes.get(node.0) else {
            return;
        };
        match &entry.data {
            NodeData::Text { value } => out.push_str(value),
            NodeData::Element { tag, attributes, .. } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                out.push('>');
                for &child in &entry.children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Deliver an event to the listeners registered on `node` for
    /// `event.name`. Returns how many listeners ran.
    ///
    /// Listeners are cloned out before running, so they may freely enqueue
    /// state updates.
    pub fn dispatch(&self, node: NodeId, event: &Event) -> usize {
        let listeners: Vec<Listener> = match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element { listeners, .. }) => listeners
                .iter()
                .filter(|(e, _)| *e == event.name)
                .map(|(_, l)| l.clone())
                .collect(),
            _ => Vec::new(),
        };
        for listener in &listeners {
            listener.call(event);
        }
        listeners.len()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn record(&mut self, mutation: Mutation) {
        self.touched |= mutation.kind();
        self.log.push(mutation);
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut DomNode, SinkError> {
        self.nodes
            .get_mut(node.0)
            .ok_or_else(|| SinkError::UnknownNode(node.to_string()))
    }

    fn check_attribute(&self, name: &str) -> Result<(), SinkError> {
        if self.rejected_attributes.iter().any(|n| n == name) {
            return Err(SinkError::AttributeRejected {
                name: name.to_string(),
                reason: "rejected by target".to_string(),
            });
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes.get(child.0).and_then(|n| n.parent) {
            if let Some(entry) = self.nodes.get_mut(parent.0) {
                entry.children.retain(|&c| c != child);
            }
        }
        if let Some(entry) = self.nodes.get_mut(child.0) {
            entry.parent = None;
        }
    }
}

impl MutationSink for MemoryDom {
    type Node = NodeId;

    fn create_node(
        &mut self,
        kind: NodeKind<'_>,
        attributes: &[(&str, &PropValue)],
    ) -> Result<NodeId, SinkError> {
        for (name, _) in attributes {
            self.check_attribute(name)?;
        }
        let (data, label) = match kind {
            NodeKind::Text => {
                let value = attributes
                    .iter()
                    .find(|(n, _)| *n == NODE_VALUE)
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default();
                (NodeData::Text { value }, "#text".to_string())
            }
            NodeKind::Element(tag) => (
                NodeData::Element {
                    tag: tag.to_string(),
                    attributes: attributes
                        .iter()
                        .map(|(n, v)| (n.to_string(), (*v).clone()))
                        .collect(),
                    listeners: Vec::new(),
                },
                tag.to_string(),
            ),
        };
        let node = self.alloc(data);
        self.record(Mutation::Create { node, kind: label });
        Ok(node)
    }

    fn set_attribute(
        &mut self,
        node: &NodeId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), SinkError> {
        self.check_attribute(name)?;
        match &mut self.node_mut(*node)?.data {
            NodeData::Text { value: text } => {
                if name == NODE_VALUE {
                    *text = value.to_string();
                }
            }
            NodeData::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(n, _)| n == name) {
                    Some(slot) => slot.1 = value.clone(),
                    None => attributes.push((name.to_string(), value.clone())),
                }
            }
        }
        self.record(Mutation::SetAttribute {
            node: *node,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn clear_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), SinkError> {
        match &mut self.node_mut(*node)?.data {
            NodeData::Text { value } => {
                if name == NODE_VALUE {
                    value.clear();
                }
            }
            NodeData::Element { attributes, .. } => attributes.retain(|(n, _)| n != name),
        }
        self.record(Mutation::ClearAttribute {
            node: *node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_event_binding(
        &mut self,
        node: &NodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), SinkError> {
        match &mut self.node_mut(*node)?.data {
            NodeData::Element { listeners, .. } => {
                listeners.push((event.to_string(), listener.clone()));
            }
            NodeData::Text { .. } => {
                return Err(SinkError::Other(format!(
                    "cannot listen for `{event}` on text node {node}"
                )));
            }
        }
        self.record(Mutation::AddListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_event_binding(
        &mut self,
        node: &NodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), SinkError> {
        if let NodeData::Element { listeners, .. } = &mut self.node_mut(*node)?.data {
            if let Some(index) = listeners
                .iter()
                .position(|(e, l)| e == event && l == listener)
            {
                listeners.remove(index);
            }
        }
        self.record(Mutation::RemoveListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), SinkError> {
        self.node_mut(*parent)?;
        self.node_mut(*child)?;
        self.detach(*child);
        self.node_mut(*parent)?.children.push(*child);
        self.node_mut(*child)?.parent = Some(*parent);
        self.record(Mutation::AppendChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        before: &NodeId,
    ) -> Result<(), SinkError> {
        if self.parent(*before) != Some(*parent) {
            return Err(SinkError::NotAChild {
                parent: parent.to_string(),
                child: before.to_string(),
            });
        }
        self.node_mut(*child)?;
        self.detach(*child);
        let entry = self.node_mut(*parent)?;
        let index = entry
            .children
            .iter()
            .position(|c| c == before)
            .unwrap_or(entry.children.len());
        entry.children.insert(index, *child);
        self.node_mut(*child)?.parent = Some(*parent);
        self.record(Mutation::InsertBefore {
            parent: *parent,
            child: *child,
            before: *before,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), SinkError> {
        if self.parent(*child) != Some(*parent) {
            return Err(SinkError::NotAChild {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        self.detach(*child);
        self.record(Mutation::RemoveChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_build_and_serialize() {
        let mut dom = MemoryDom::new();
        let root = dom.create_container("main");
        let id = PropValue::from("foo");
        let div = dom.create_node(NodeKind::Element("div"), &[("id", &id)]).unwrap();
        let value = PropValue::from("hi");
        let text = dom.create_node(NodeKind::Text, &[(NODE_VALUE, &value)]).unwrap();
        dom.append_child(&div, &text).unwrap();
        dom.append_child(&root, &div).unwrap();

        assert_eq!(dom.inner_html(root), "<div id=\"foo\">hi</div>");
        assert_eq!(dom.parent(div), Some(root));
        assert_eq!(dom.text(text), Some("hi"));
    }

    #[test]
    fn test_container_not_logged() {
        let mut dom = MemoryDom::new();
        dom.create_container("main");
        assert!(dom.log().is_empty());
        assert_eq!(dom.touched(), MutationKinds::empty());
    }

    #[test]
    fn test_touched_flags() {
        let mut dom = MemoryDom::new();
        let root = dom.create_container("main");
        let div = dom.create_node(NodeKind::Element("div"), &[]).unwrap();
        assert_eq!(dom.touched(), MutationKinds::CREATE);
        assert!(!dom.touched().intersects(MutationKinds::VISIBLE));

        dom.append_child(&root, &div).unwrap();
        assert!(dom.touched().contains(MutationKinds::APPEND_CHILD));

        let log = dom.take_log();
        assert_eq!(log.len(), 2);
        assert_eq!(dom.touched(), MutationKinds::empty());
    }

    #[test]
    fn test_remove_child_requires_parent() {
        let mut dom = MemoryDom::new();
        let root = dom.create_container("main");
        let div = dom.create_node(NodeKind::Element("div"), &[]).unwrap();
        assert!(matches!(
            dom.remove_child(&root, &div),
            Err(SinkError::NotAChild { .. })
        ));

        dom.append_child(&root, &div).unwrap();
        dom.remove_child(&root, &div).unwrap();
        assert!(dom.children(root).is_empty());
        assert_eq!(dom.parent(div), None);
    }

    #[test]
    fn test_append_moves_node() {
        let mut dom = MemoryDom::new();
        let a = dom.create_container("a");
        let b = dom.create_container("b");
        let child = dom.create_node(NodeKind::Element("i"), &[]).unwrap();
        dom.append_child(&a, &child).unwrap();
        dom.append_child(&b, &child).unwrap();
        assert!(dom.children(a).is_empty());
        assert_eq!(dom.children(b), &[child]);
    }

    #[test]
    fn test_insert_before_sibling() {
        let mut dom = MemoryDom::new();
        let root = dom.create_container("main");
        let b = dom.create_node(NodeKind::Element("b"), &[]).unwrap();
        let p = dom.create_node(NodeKind::Element("p"), &[]).unwrap();
        dom.append_child(&root, &b).unwrap();
        dom.insert_before(&root, &p, &b).unwrap();
        assert_eq!(dom.inner_html(root), "<p></p><b></b>");
        assert!(dom.touched().contains(MutationKinds::INSERT_CHILD));

        // The reference node must already sit under the parent.
        let stray = dom.create_node(NodeKind::Element("i"), &[]).unwrap();
        let other = dom.create_node(NodeKind::Element("u"), &[]).unwrap();
        assert!(matches!(
            dom.insert_before(&root, &stray, &other),
            Err(SinkError::NotAChild { .. })
        ));
    }

    #[test]
    fn test_listeners_dispatch_and_remove() {
        let mut dom = MemoryDom::new();
        let button = dom.create_node(NodeKind::Element("button"), &[]).unwrap();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let listener = Listener::new(move |_| hits_clone.set(hits_clone.get() + 1));

        dom.add_event_binding(&button, "click", &listener).unwrap();
        assert_eq!(dom.dispatch(button, &Event::new("click")), 1);
        assert_eq!(dom.dispatch(button, &Event::new("input")), 0);
        assert_eq!(hits.get(), 1);

        dom.remove_event_binding(&button, "click", &listener).unwrap();
        assert_eq!(dom.listener_count(button, "click"), 0);
        assert_eq!(dom.dispatch(button, &Event::new("click")), 0);
    }

    #[test]
    fn test_rejected_attribute() {
        let mut dom = MemoryDom::new();
        dom.reject_attribute("style");
        let div = dom.create_node(NodeKind::Element("div"), &[]).unwrap();
        let err = dom
            .set_attribute(&div, "style", &PropValue::from("x"))
            .unwrap_err();
        assert!(matches!(err, SinkError::AttributeRejected { .. }));
    }

    #[test]
    fn test_find() {
        let mut dom = MemoryDom::new();
        let root = dom.create_container("main");
        let div = dom.create_node(NodeKind::Element("div"), &[]).unwrap();
        let span = dom.create_node(NodeKind::Element("span"), &[]).unwrap();
        dom.append_child(&div, &span).unwrap();
        dom.append_child(&root, &div).unwrap();
        assert_eq!(dom.find(root, "span"), Some(span));
        assert_eq!(dom.find(root, "p"), None);
    }
}
