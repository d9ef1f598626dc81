//! # spark-fiber
//!
//! Cooperative, interruptible tree reconciliation for Rust.
//!
//! ## Architecture
//!
//! A UI is described as a tree of immutable [`Element`]s. The runtime turns
//! each description into a generation of fibers, diffs it against the last
//! committed generation, and applies the minimal set of changes through a
//! [`MutationSink`]. Work is split into units so a host can interleave it
//! with other work:
//! ```text
//! Element tree → reconcile (per fiber) → work loop (yields) → commit → MutationSink
//! ```
//!
//! Components are plain functions from props to an element. Local state
//! comes from positional hooks ([`use_state`]); updating it schedules a new
//! generation from the committed root.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Element, Props, PropValue, Component, Listener)
//! - [`primitives`] - Element factory and builders
//! - [`engine`] - Fibers, generation arenas, reconciliation, units of work
//! - [`pipeline`] - Scheduler, deadlines, commit, mounting
//! - [`state`] - Hooks
//! - [`renderer`] - Mutation sink trait and the in-memory DOM

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::RuntimeConfig;
pub use error::{FiberError, Result};

pub use engine::{Effect, Fiber, FiberId, FiberKind, FiberTree, InstanceId};

pub use primitives::{create_element, text, Child};

pub use pipeline::{
    render_root, CommitSummary, Deadline, IdleDeadline, IdleHost, ManualClock, ManualDeadline,
    Runtime, SliceHost, StepDeadline, Unbounded, WorkReport,
};

pub use renderer::{MemoryDom, Mutation, MutationKinds, MutationSink, NodeId, NodeKind, SinkError};

pub use state::{is_rendering, try_use_state, use_state, HookCell, StateHandle};
