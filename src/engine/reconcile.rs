//! Reconciler - positional diff of one fiber's children.
//!
//! The new element sequence and the previous generation's child chain are
//! walked in lock-step. Matching is purely positional; there are no keys.
//!
//! ```text
//! elements:  [div]  [span]  [p]
//! old chain:  div ─▶ p
//!             │      │
//!          UPDATE  PLACEMENT(span) + DELETION(p)   PLACEMENT(p)
//! ```

use super::fiber::{Effect, Fiber, FiberId, FiberKind};
use super::work::WorkCx;
use crate::types::Element;

/// Build the new children of `parent` from `elements`.
///
/// Old fibers without a counterpart are marked [`Effect::Deletion`] in the
/// previous generation and queued on the deletion list; they are never linked
/// into the new tree.
pub(crate) fn reconcile_children<N: Clone>(
    cx: &mut WorkCx<'_, N>,
    parent: FiberId,
    elements: &[Element],
) {
    let mut old = match (cx.wip[parent].alternate, cx.current.as_deref()) {
        (Some(alternate), Some(current)) => current[alternate].child,
        _ => None,
    };
    cx.wip[parent].child = None;

    let mut previous: Option<FiberId> = None;
    let mut index = 0;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let mut produced = None;

        // Same kind: keep the realized node and the instance identity.
        let reused = match (element, old, cx.current.as_deref()) {
            (Some(element), Some(old_id), Some(current))
                if current[old_id].kind.matches(element.kind()) =>
            {
                let before = &current[old_id];
                let mut fiber = Fiber::new(
                    before.kind.clone(),
                    element.shared_props(),
                    Some(parent),
                    before.instance,
                );
                fiber.node = before.node.clone();
                fiber.alternate = Some(old_id);
                fiber.effect = Effect::Update;
                produced = Some(cx.wip.allocate(fiber));
                true
            }
            _ => false,
        };

        if !reused {
            if let Some(element) = element {
                let instance = cx.mint_instance();
                let mut fiber = Fiber::new(
                    FiberKind::from(element.kind()),
                    element.shared_props(),
                    Some(parent),
                    instance,
                );
                fiber.effect = Effect::Placement;
                produced = Some(cx.wip.allocate(fiber));
            }
            if let (Some(old_id), Some(current)) = (old, cx.current.as_deref_mut()) {
                current[old_id].effect = Effect::Deletion;
                cx.deletions.push(old_id);
                tracing::trace!(fiber = %old_id, "marked for deletion");
            }
        }

        if let (Some(old_id), Some(current)) = (old, cx.current.as_deref()) {
            old = current[old_id].sibling;
        }

        if let Some(id) = produced {
            match previous {
                Some(prev) => cx.wip[prev].sibling = Some(id),
                None => cx.wip[parent].child = Some(id),
            }
            previous = Some(id);
        }
        index += 1;
    }
}

/// Reconcile a component's single rendered element.
pub(crate) fn reconcile_rendered<N: Clone>(
    cx: &mut WorkCx<'_, N>,
    parent: FiberId,
    rendered: Element,
) {
    reconcile_children(cx, parent, std::slice::from_ref(&rendered));
}
