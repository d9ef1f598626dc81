//! Fiber - one unit of work in a generation's tree.
//!
//! A fiber mirrors one element position for one render. Structural links
//! (`parent`, `child`, `sibling`) are ids into the fiber's own generation;
//! `alternate` is an id into the previous (committed) generation.
//!
//! ```text
//!   root
//!    │ child
//!    ▼
//!   div ──sibling──▶ p
//!    │ child          ▲
//!    ▼                │ parent
//!   text ─────────────┘ (via div)
//! ```

use std::fmt;
use std::rc::Rc;

use crate::state::HookCell;
use crate::types::{Component, ElementKind, Props};

// =============================================================================
// Ids
// =============================================================================

/// Index of a fiber inside its generation's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(usize);

impl FiberId {
    /// The synthetic root of every generation.
    pub const ROOT: FiberId = FiberId(0);

    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> Self {
        FiberId(index)
    }
}

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Identity of one mounted element position across generations.
///
/// Inherited when a fiber is reused (UPDATE), fresh when placed. State
/// handles address component instances by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Instance of every generation's root.
    pub const ROOT: InstanceId = InstanceId(0);

    pub(crate) fn new(raw: u64) -> Self {
        InstanceId(raw)
    }
}

// =============================================================================
// Effect
// =============================================================================

/// Mutation a fiber requires at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    /// New node: insert it under the nearest realized ancestor.
    Placement,
    /// Same kind as before: patch changed properties in place.
    Update,
    /// Previous-generation fiber with no counterpart: remove its nodes.
    Deletion,
}

// =============================================================================
// Kind
// =============================================================================

/// What a fiber does when it is worked on.
#[derive(Debug, Clone, PartialEq)]
pub enum FiberKind {
    /// Synthetic root owning the container node.
    Root,
    Host(Rc<str>),
    Text,
    Component(Component),
}

impl FiberKind {
    /// Whether an element of `kind` can reuse a fiber of this kind.
    pub fn matches(&self, kind: &ElementKind) -> bool {
        match (self, kind) {
            (FiberKind::Host(a), ElementKind::Host(b)) => a == b,
            (FiberKind::Text, ElementKind::Text) => true,
            (FiberKind::Component(a), ElementKind::Component(b)) => a == b,
            _ => false,
        }
    }

    /// Whether this is a function component (owns no realized node).
    pub fn is_component(&self) -> bool {
        matches!(self, FiberKind::Component(_))
    }
}

impl From<&ElementKind> for FiberKind {
    fn from(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Host(tag) => FiberKind::Host(Rc::clone(tag)),
            ElementKind::Text => FiberKind::Text,
            ElementKind::Component(c) => FiberKind::Component(c.clone()),
        }
    }
}

// =============================================================================
// Fiber
// =============================================================================

/// A work-unit node.
///
/// `N` is the sink's node handle type.
#[derive(Debug)]
pub struct Fiber<N> {
    pub(crate) kind: FiberKind,
    pub(crate) props: Rc<Props>,
    pub(crate) node: Option<N>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: Effect,
    pub(crate) hooks: Vec<HookCell>,
    pub(crate) instance: InstanceId,
}

impl<N> Fiber<N> {
    pub(crate) fn new(
        kind: FiberKind,
        props: Rc<Props>,
        parent: Option<FiberId>,
        instance: InstanceId,
    ) -> Self {
        Self {
            kind,
            props,
            node: None,
            parent,
            child: None,
            sibling: None,
            alternate: None,
            effect: Effect::None,
            hooks: Vec::new(),
            instance,
        }
    }

    pub fn kind(&self) -> &FiberKind {
        &self.kind
    }

    /// Props snapshot for this render.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Realized node, if created (host and text fibers only).
    pub fn node(&self) -> Option<&N> {
        self.node.as_ref()
    }

    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    pub fn child(&self) -> Option<FiberId> {
        self.child
    }

    pub fn sibling(&self) -> Option<FiberId> {
        self.sibling
    }

    /// Same position in the previous generation.
    pub fn alternate(&self) -> Option<FiberId> {
        self.alternate
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// State cells (component fibers only).
    pub fn hooks(&self) -> &[HookCell] {
        &self.hooks
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }
}
