//! Renderer - the presentation-layer boundary.
//!
//! - [`MutationSink`] - the narrow capability the runtime mutates through
//! - [`MemoryDom`] - an in-memory DOM implementing it, with a mutation log

mod dom;
mod sink;

pub use dom::{MemoryDom, Mutation, MutationKinds, NodeId};
pub use sink::{MutationSink, NodeKind, SinkError};
