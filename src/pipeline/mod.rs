//! Render Pipeline
//!
//! Drives generations from "scheduled" to "visible".
//!
//! # Pipeline Architecture
//!
//! ```text
//! render_root / state update → work_loop (units of work, yields) → commit → sink
//! ```
//!
//! ## Data Flow
//!
//! 1. **mount** - `render_root` schedules a generation rooted at the container
//! 2. **scheduler** - performs units of work while the deadline allows
//! 3. **commit** - once the last unit completes, applies the generation in one go
//!
//! ## Key Design Principles
//!
//! - **Interruptible diff**: units of work only create detached nodes
//! - **Atomic commit**: visible mutations happen in a single uninterrupted pass
//! - **Host-driven time**: the runtime never reads a clock, it polls [`Deadline`]s

pub mod commit;
pub mod deadline;
pub mod mount;
pub mod scheduler;

pub use commit::CommitSummary;
pub use deadline::{
    Deadline, IdleDeadline, IdleHost, ManualClock, ManualDeadline, SliceHost, StepDeadline,
    Unbounded,
};
pub use mount::render_root;
pub use scheduler::{Runtime, WorkReport};
