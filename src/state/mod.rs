//! State Modules - Component-local state.
//!
//! - [`hooks`] - Positional state cells (`use_state`) tied to fiber identity

pub mod hooks;

pub use hooks::{is_rendering, try_use_state, use_state, HookCell, StateHandle};
