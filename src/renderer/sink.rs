//! Mutation sink - the only way the runtime touches the presentation layer.
//!
//! The walker calls [`MutationSink::create_node`] while building a
//! generation (detached nodes are invisible). Everything else is called by
//! the commit phase, after the generation is complete.

use std::fmt;

use thiserror::Error;

use crate::types::{Listener, PropValue};

/// What kind of realized node to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// Element with a tag name.
    Element(&'a str),
    /// Text node; its content arrives as the `nodeValue` attribute.
    Text,
}

/// Failure reported by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The target refused an attribute.
    #[error("attribute `{name}` rejected: {reason}")]
    AttributeRejected {
        /// Attribute name.
        name: String,
        /// Why the target refused it.
        reason: String,
    },

    /// A handle does not refer to a live node.
    #[error("unknown node {0}")]
    UnknownNode(String),

    /// `remove_child` was called with a node that is not a child of `parent`.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Parent handle.
        parent: String,
        /// Child handle.
        child: String,
    },

    /// Any other target-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Capability to create and mutate realized nodes.
pub trait MutationSink {
    /// Handle to a realized node.
    type Node: Clone + fmt::Debug + 'static;

    /// Create a detached node with its initial attributes.
    ///
    /// `attributes` excludes children and event listeners.
    fn create_node(
        &mut self,
        kind: NodeKind<'_>,
        attributes: &[(&str, &PropValue)],
    ) -> Result<Self::Node, SinkError>;

    /// Set (or overwrite) an attribute.
    fn set_attribute(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &PropValue,
    ) -> Result<(), SinkError>;

    /// Clear an attribute.
    fn clear_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), SinkError>;

    /// Register a listener for `event` on `node`.
    fn add_event_binding(
        &mut self,
        node: &Self::Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), SinkError>;

    /// Unregister a listener previously registered for `event` on `node`.
    fn remove_event_binding(
        &mut self,
        node: &Self::Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), SinkError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), SinkError>;

    /// Insert `child` under `parent`, immediately before `before`.
    ///
    /// `before` is always a child of `parent` when the runtime calls this.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        before: &Self::Node,
    ) -> Result<(), SinkError>;

    /// Remove `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), SinkError>;
}
