//! Fiber Engine - generations, reconciliation and units of work.
//!
//! The engine owns the data structures the scheduler drives:
//! - Fiber: one element position in one render (kind, props, node, links)
//! - FiberTree: arena holding one generation; ids are indices
//! - Reconcile: positional diff of a fiber's children against the previous
//!   generation
//! - Work: process one fiber and return the next one in depth-first order
//!
//! # Architecture
//!
//! Fibers are NOT heap objects linked by pointers. They are entries in a
//! per-generation arena, linked by index:
//!
//! ```text
//! generation 2 (work in progress)        generation 1 (current)
//! f0 root ───────── alternate ─────────▶ f0 root
//! f1 div  (UPDATE)  ─ alternate ───────▶ f1 div
//! f2 p    (PLACEMENT)                    f2 span (DELETION)
//! ```
//!
//! A committed generation becomes `current`; the generation before it is
//! dropped as a whole.

mod arena;
mod fiber;
pub(crate) mod reconcile;
pub(crate) mod work;

pub use arena::{Children, DepthFirst, FiberTree};
pub use fiber::{Effect, Fiber, FiberId, FiberKind, InstanceId};
