//! Error types.
//!
//! The runtime does no I/O of its own, so the failure surface is small:
//! hook misuse, state updates that cannot be delivered, internal consistency
//! faults found at commit time, and whatever the mutation sink rejects.

use thiserror::Error;

use crate::engine::FiberId;
use crate::renderer::SinkError;

/// Errors surfaced by the reconciler, scheduler and hook store.
#[derive(Debug, Error)]
pub enum FiberError {
    /// A state hook was requested while no component was rendering.
    #[error("state hook requested outside of a component render")]
    HookOutsideRender,

    /// The value stored at a hook position has a different type than requested.
    ///
    /// Hooks are matched by call order, so this means the component called its
    /// hooks in a different order than on the previous render.
    #[error("hook #{index} changed type between renders")]
    HookTypeMismatch {
        /// Position of the offending hook within the component.
        index: usize,
    },

    /// A fiber chain ended without reaching a fiber that owns a realized node.
    #[error("fiber {fiber} has no ancestor with a realized node")]
    MissingHostAncestor {
        /// The fiber whose ancestry is broken.
        fiber: FiberId,
    },

    /// A host or text fiber reached commit without a realized node.
    #[error("fiber {fiber} reached commit without a realized node")]
    MissingNode {
        /// The fiber missing its node.
        fiber: FiberId,
    },

    /// The mutation sink rejected an operation.
    #[error("mutation sink failure: {0}")]
    Sink(#[from] SinkError),

    /// A state update was enqueued while the scheduler was running a unit of work.
    #[error("state update enqueued during render")]
    UpdateDuringRender,

    /// The component that owns the hook is no longer part of the committed tree.
    #[error("state update addressed to an unmounted component")]
    Unmounted,

    /// The runtime that minted the state handle has been dropped.
    #[error("runtime dropped")]
    RuntimeDropped,
}

/// Result alias used throughout the crate.
pub type Result<T, E = FiberError> = std::result::Result<T, E>;
