//! Unit-of-Work Walker - one fiber per step.
//!
//! Each call to [`perform_unit_of_work`] processes a single fiber of the
//! work-in-progress generation and returns the next one in depth-first order.
//! Nothing here touches the visible tree: host fibers get *detached* nodes
//! from the sink, which only the commit phase attaches.

use std::rc::{Rc, Weak};

use super::arena::FiberTree;
use super::fiber::{FiberId, FiberKind, InstanceId};
use super::reconcile::{reconcile_children, reconcile_rendered};
use crate::config::{PropRole, RuntimeConfig};
use crate::error::Result;
use crate::renderer::{MutationSink, NodeKind};
use crate::state::hooks::{render_with_hooks, UpdateQueue};
use crate::types::{Component, PropValue};

/// Everything a unit of work may read or write, borrowed from the scheduler
/// for the duration of one step.
pub(crate) struct WorkCx<'a, N> {
    pub wip: &'a mut FiberTree<N>,
    /// The committed generation, if any. Old fibers with no counterpart are
    /// marked for deletion here.
    pub current: Option<&'a mut FiberTree<N>>,
    pub deletions: &'a mut Vec<FiberId>,
    pub next_instance: &'a mut u64,
    pub config: &'a RuntimeConfig,
    pub queue: Weak<dyn UpdateQueue>,
}

impl<N> WorkCx<'_, N> {
    pub(crate) fn mint_instance(&mut self) -> InstanceId {
        let instance = InstanceId::new(*self.next_instance);
        *self.next_instance += 1;
        instance
    }
}

/// Process `id` and return the next fiber to work on.
pub(crate) fn perform_unit_of_work<S: MutationSink>(
    cx: &mut WorkCx<'_, S::Node>,
    sink: &mut S,
    id: FiberId,
) -> Result<Option<FiberId>> {
    let kind = cx.wip[id].kind.clone();
    tracing::trace!(fiber = %id, ?kind, "unit of work");

    match kind {
        FiberKind::Component(component) => update_component(cx, id, &component),
        FiberKind::Root => {
            let props = Rc::clone(&cx.wip[id].props);
            reconcile_children(cx, id, props.children());
        }
        FiberKind::Host(_) | FiberKind::Text => update_host(cx, sink, id)?,
    }

    Ok(cx.wip.next_in_order(id))
}

/// Render a component against its previous hooks and reconcile the output.
fn update_component<N: Clone>(cx: &mut WorkCx<'_, N>, id: FiberId, component: &Component) {
    let previous = match (cx.wip[id].alternate, cx.current.as_deref()) {
        (Some(alternate), Some(current)) => current[alternate].hooks.clone(),
        _ => Vec::new(),
    };
    let props = Rc::clone(&cx.wip[id].props);
    let instance = cx.wip[id].instance;

    let (rendered, hooks) = render_with_hooks(instance, previous, cx.queue.clone(), || {
        component.render(&props)
    });
    cx.wip[id].hooks = hooks;

    reconcile_rendered(cx, id, rendered);
}

/// Create the fiber's node if it has none yet, then reconcile its children.
fn update_host<S: MutationSink>(
    cx: &mut WorkCx<'_, S::Node>,
    sink: &mut S,
    id: FiberId,
) -> Result<()> {
    if cx.wip[id].node.is_none() {
        let fiber = &cx.wip[id];
        let kind = match &fiber.kind {
            FiberKind::Host(tag) => NodeKind::Element(tag),
            _ => NodeKind::Text,
        };
        let attributes: Vec<(&str, &PropValue)> = fiber
            .props
            .attributes()
            .filter(|(name, value)| matches!(cx.config.classify(name, value), PropRole::Attribute))
            .collect();
        let node = sink.create_node(kind, &attributes)?;
        cx.wip[id].node = Some(node);
    }

    let props = Rc::clone(&cx.wip[id].props);
    reconcile_children(cx, id, props.children());
    Ok(())
}
