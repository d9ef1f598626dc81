//! Commit Phase - apply a finished generation to the sink.
//!
//! Runs only after every unit of work of a generation has completed, and
//! runs to completion without yielding:
//!
//! 1. Deletions: remove the nodes of every fiber on the deletion list from
//!    their nearest realized ancestor (component fibers contribute the nodes
//!    of their descendants).
//! 2. Depth-first over the new generation: PLACEMENT binds listeners and
//!    inserts the node before its next attached sibling (or appends it),
//!    UPDATE patches the props that changed.
//!
//! The caller swaps `current` afterwards. If the sink fails part way, the
//! [`CommitJournal`] tells the caller which structural changes already
//! reached the sink.

use crate::config::{PropRole, RuntimeConfig};
use crate::engine::{Effect, FiberId, FiberTree};
use crate::error::{FiberError, Result};
use crate::renderer::MutationSink;
use crate::types::Props;

/// What one commit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Render cycle of the committed generation.
    pub generation: u64,
    /// Nodes inserted for PLACEMENT fibers.
    pub placements: usize,
    /// Realized UPDATE fibers examined.
    pub updates: usize,
    /// Fibers on the deletion list.
    pub deletions: usize,
    /// UPDATE fibers whose node received at least one mutation.
    pub changed_nodes: usize,
    pub attributes_set: usize,
    pub attributes_cleared: usize,
    pub listeners_added: usize,
    pub listeners_removed: usize,
    /// `remove_child` calls issued by the deletion pass.
    pub removed_nodes: usize,
}

impl CommitSummary {
    /// Whether the commit sent nothing visible to the sink.
    pub fn is_noop(&self) -> bool {
        self.placements == 0 && self.changed_nodes == 0 && self.removed_nodes == 0
    }
}

/// Structural changes a commit has sent so far.
#[derive(Debug)]
pub(crate) struct CommitJournal<N> {
    /// Deletion-list entries (ids into `current`) whose nodes are gone.
    pub(crate) deleted: Vec<FiberId>,
    /// `(parent, child)` pairs attached by placements.
    pub(crate) attached: Vec<(N, N)>,
}

impl<N> CommitJournal<N> {
    pub(crate) fn new() -> Self {
        Self {
            deleted: Vec::new(),
            attached: Vec::new(),
        }
    }
}

/// Apply `wip` on top of `current`.
///
/// `deletions` are ids into `current`.
pub(crate) fn commit_root<S: MutationSink>(
    sink: &mut S,
    config: &RuntimeConfig,
    wip: &FiberTree<S::Node>,
    current: Option<&FiberTree<S::Node>>,
    deletions: &[FiberId],
    journal: &mut CommitJournal<S::Node>,
) -> Result<CommitSummary> {
    let mut summary = CommitSummary {
        generation: wip.generation(),
        deletions: deletions.len(),
        ..CommitSummary::default()
    };

    if let Some(current) = current {
        for &id in deletions {
            commit_deletion(sink, current, id, &mut summary)?;
            journal.deleted.push(id);
        }
    }

    for id in wip.depth_first() {
        let fiber = &wip[id];
        if fiber.kind().is_component() {
            continue;
        }
        let node = fiber.node().ok_or(FiberError::MissingNode { fiber: id })?;
        match fiber.effect() {
            Effect::Placement => {
                let parent = realized_ancestor(wip, id)?;
                bind_listeners(sink, config, node, fiber.props(), &mut summary)?;
                match wip.host_sibling(id).and_then(|sibling| wip[sibling].node()) {
                    Some(before) => sink.insert_before(parent, node, before)?,
                    None => sink.append_child(parent, node)?,
                }
                journal.attached.push((parent.clone(), node.clone()));
                summary.placements += 1;
            }
            Effect::Update => {
                let old = fiber
                    .alternate()
                    .zip(current)
                    .map(|(alternate, current)| current[alternate].props());
                if let Some(old) = old {
                    summary.updates += 1;
                    if update_node(sink, config, node, old, fiber.props(), &mut summary)? {
                        summary.changed_nodes += 1;
                    }
                }
            }
            Effect::None | Effect::Deletion => {}
        }
    }

    tracing::debug!(
        generation = summary.generation,
        placements = summary.placements,
        updates = summary.updates,
        changed = summary.changed_nodes,
        deletions = summary.deletions,
        "commit"
    );
    Ok(summary)
}

/// Node of the nearest ancestor of `id` that owns one.
fn realized_ancestor<N>(tree: &FiberTree<N>, id: FiberId) -> Result<&N> {
    tree.host_ancestor(id)
        .and_then(|parent| tree[parent].node())
        .ok_or(FiberError::MissingHostAncestor { fiber: id })
}

// =============================================================================
// Deletion
// =============================================================================

fn commit_deletion<S: MutationSink>(
    sink: &mut S,
    current: &FiberTree<S::Node>,
    id: FiberId,
    summary: &mut CommitSummary,
) -> Result<()> {
    let parent = realized_ancestor(current, id)?;
    remove_nodes(sink, current, id, parent, summary)
}

/// Remove the topmost realized nodes at or below `id` from `parent`.
fn remove_nodes<S: MutationSink>(
    sink: &mut S,
    tree: &FiberTree<S::Node>,
    id: FiberId,
    parent: &S::Node,
    summary: &mut CommitSummary,
) -> Result<()> {
    let fiber = &tree[id];
    match fiber.node() {
        Some(node) if !fiber.kind().is_component() => {
            sink.remove_child(parent, node)?;
            summary.removed_nodes += 1;
        }
        _ => {
            for child in tree.children(id) {
                remove_nodes(sink, tree, child, parent, summary)?;
            }
        }
    }
    Ok(())
}

// =============================================================================
// Placement / Update
// =============================================================================

fn bind_listeners<S: MutationSink>(
    sink: &mut S,
    config: &RuntimeConfig,
    node: &S::Node,
    props: &Props,
    summary: &mut CommitSummary,
) -> Result<()> {
    for (name, value) in props.attributes() {
        match config.classify(name, value) {
            PropRole::Listener { event, listener } => {
                sink.add_event_binding(node, &event, listener)?;
                summary.listeners_added += 1;
            }
            PropRole::Ignored => {
                tracing::warn!(prop = name, "property is neither an attribute nor a listener");
            }
            PropRole::Attribute => {}
        }
    }
    Ok(())
}

/// Patch `node` from `old` to `new`. Returns whether anything was sent.
///
/// Order: stale listeners off, stale attributes cleared, attributes set,
/// new listeners on.
fn update_node<S: MutationSink>(
    sink: &mut S,
    config: &RuntimeConfig,
    node: &S::Node,
    old: &Props,
    new: &Props,
    summary: &mut CommitSummary,
) -> Result<bool> {
    let before = *summary;

    for (name, value) in old.attributes() {
        if new.get(name) == Some(value) {
            continue;
        }
        match config.classify(name, value) {
            PropRole::Listener { event, listener } => {
                sink.remove_event_binding(node, &event, listener)?;
                summary.listeners_removed += 1;
            }
            PropRole::Attribute if !is_attribute(config, new, name) => {
                sink.clear_attribute(node, name)?;
                summary.attributes_cleared += 1;
            }
            _ => {}
        }
    }

    for (name, value) in new.attributes() {
        if old.get(name) == Some(value) {
            continue;
        }
        match config.classify(name, value) {
            PropRole::Attribute => {
                sink.set_attribute(node, name, value)?;
                summary.attributes_set += 1;
            }
            PropRole::Listener { .. } => {}
            PropRole::Ignored => {
                tracing::warn!(prop = name, "property is neither an attribute nor a listener");
            }
        }
    }

    for (name, value) in new.attributes() {
        if old.get(name) == Some(value) {
            continue;
        }
        if let PropRole::Listener { event, listener } = config.classify(name, value) {
            sink.add_event_binding(node, &event, listener)?;
            summary.listeners_added += 1;
        }
    }

    Ok(*summary != before)
}

fn is_attribute(config: &RuntimeConfig, props: &Props, name: &str) -> bool {
    props
        .get(name)
        .is_some_and(|value| matches!(config.classify(name, value), PropRole::Attribute))
}
