//! Fiber Arena - one generation's fibers.
//!
//! Every render cycle builds a fresh `FiberTree`. Fibers are never moved or
//! freed individually: an abandoned or superseded generation is dropped as a
//! whole. Ids are dense indices, the synthetic root is always index 0.
//!
//! Also tracks which fiber hosts each component instance, so state updates
//! can find the committed fiber that owns a hook.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use super::fiber::{Effect, Fiber, FiberId, FiberKind, InstanceId};
use crate::types::Props;

/// One generation of fibers.
#[derive(Debug)]
pub struct FiberTree<N> {
    generation: u64,
    fibers: Vec<Fiber<N>>,
    instances: HashMap<InstanceId, FiberId>,
}

impl<N> FiberTree<N> {
    /// Create a generation whose root owns `container`.
    ///
    /// `alternate` is the previous generation's root, if there is one.
    pub(crate) fn with_root(
        generation: u64,
        container: N,
        props: Rc<Props>,
        alternate: Option<FiberId>,
    ) -> Self {
        let mut root = Fiber::new(FiberKind::Root, props, None, InstanceId::ROOT);
        root.node = Some(container);
        root.alternate = alternate;
        Self {
            generation,
            fibers: vec![root],
            instances: HashMap::new(),
        }
    }

    /// Add a fiber and return its id.
    pub(crate) fn allocate(&mut self, fiber: Fiber<N>) -> FiberId {
        let id = FiberId::from_index(self.fibers.len());
        if fiber.kind.is_component() {
            self.instances.insert(fiber.instance, id);
        }
        self.fibers.push(fiber);
        id
    }

    /// Render cycle number of this generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of fibers, root included.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Always false: a generation has at least its root.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id.index())
    }

    pub fn root(&self) -> &Fiber<N> {
        &self[FiberId::ROOT]
    }

    /// Fiber hosting a component instance in this generation.
    pub fn instance_fiber(&self, instance: InstanceId) -> Option<FiberId> {
        self.instances.get(&instance).copied()
    }

    // -------------------------------------------------------------------------
    // Traversal
    // -------------------------------------------------------------------------

    /// Next fiber in depth-first order: child, else the first sibling found
    /// walking up the ancestors, else `None`.
    pub fn next_in_order(&self, id: FiberId) -> Option<FiberId> {
        if let Some(child) = self[id].child {
            return Some(child);
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(sibling) = self[current].sibling {
                return Some(sibling);
            }
            cursor = self[current].parent;
        }
        None
    }

    /// Children of a fiber, in order.
    pub fn children(&self, id: FiberId) -> Children<'_, N> {
        Children {
            tree: self,
            next: self[id].child,
        }
    }

    /// All fibers below the root, depth-first.
    pub fn depth_first(&self) -> DepthFirst<'_, N> {
        DepthFirst {
            tree: self,
            next: self.root().child,
        }
    }

    /// Nearest ancestor of `id` that owns a realized node.
    ///
    /// Component fibers are skipped; the root always owns the container.
    pub fn host_ancestor(&self, id: FiberId) -> Option<FiberId> {
        let mut cursor = self[id].parent;
        while let Some(current) = cursor {
            if self[current].node.is_some() {
                return Some(current);
            }
            cursor = self[current].parent;
        }
        None
    }

    /// First host fiber after `id`, under the same host ancestor, whose node
    /// is already attached (anything but a PLACEMENT).
    ///
    /// Component fibers are transparent: their children count as siblings of
    /// the component. Returns `None` when `id` belongs at the end.
    pub fn host_sibling(&self, id: FiberId) -> Option<FiberId> {
        let mut cursor = id;
        loop {
            while self[cursor].sibling.is_none() {
                let parent = self[cursor].parent?;
                if !self[parent].kind.is_component() {
                    return None;
                }
                cursor = parent;
            }
            cursor = self[cursor].sibling?;

            while self[cursor].kind.is_component() {
                match self[cursor].child {
                    Some(child) => cursor = child,
                    None => break,
                }
            }
            let fiber = &self[cursor];
            if !fiber.kind.is_component() && fiber.effect != Effect::Placement {
                return Some(cursor);
            }
        }
    }

    /// Cut `id` and its subtree out of the tree.
    ///
    /// The fibers stay in the arena but are no longer reachable, and the
    /// component instances below `id` stop resolving.
    pub(crate) fn unlink(&mut self, id: FiberId) {
        let Some(parent) = self[id].parent else {
            return;
        };
        let next = self[id].sibling.take();
        if self[parent].child == Some(id) {
            self[parent].child = next;
        } else {
            let mut cursor = self[parent].child;
            while let Some(current) = cursor {
                if self[current].sibling == Some(id) {
                    self[current].sibling = next;
                    break;
                }
                cursor = self[current].sibling;
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self[current].kind.is_component() {
                let instance = self[current].instance;
                self.instances.remove(&instance);
            }
            stack.extend(self.children(current));
        }
    }
}

impl<N> Index<FiberId> for FiberTree<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Fiber<N> {
        &self.fibers[id.index()]
    }
}

impl<N> IndexMut<FiberId> for FiberTree<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        &mut self.fibers[id.index()]
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over a fiber's children.
pub struct Children<'a, N> {
    tree: &'a FiberTree<N>,
    next: Option<FiberId>,
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.tree[id].sibling;
        Some(id)
    }
}

/// Depth-first iterator over a generation (root excluded).
pub struct DepthFirst<'a, N> {
    tree: &'a FiberTree<N>,
    next: Option<FiberId>,
}

impl<N> Iterator for DepthFirst<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.tree.next_in_order(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(tree: &mut FiberTree<u32>, tag: &str, parent: FiberId) -> FiberId {
        let fiber = Fiber::new(
            FiberKind::Host(Rc::from(tag)),
            Rc::new(Props::new()),
            Some(parent),
            InstanceId::new(tree.len() as u64),
        );
        tree.allocate(fiber)
    }

    /// root → div → (a → text, b)
    fn sample() -> (FiberTree<u32>, [FiberId; 4]) {
        let mut tree = FiberTree::with_root(1, 0, Rc::new(Props::new()), None);
        let div = host(&mut tree, "div", FiberId::ROOT);
        let a = host(&mut tree, "a", div);
        let text = host(&mut tree, "#text", a);
        let b = host(&mut tree, "b", div);
        tree[FiberId::ROOT].child = Some(div);
        tree[div].child = Some(a);
        tree[a].child = Some(text);
        tree[a].sibling = Some(b);
        (tree, [div, a, text, b])
    }

    #[test]
    fn test_root_owns_container() {
        let (tree, _) = sample();
        assert_eq!(tree.root().node(), Some(&0));
        assert_eq!(tree.generation(), 1);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_depth_first_order() {
        let (tree, [div, a, text, b]) = sample();
        let order: Vec<FiberId> = tree.depth_first().collect();
        assert_eq!(order, vec![div, a, text, b]);
        assert_eq!(tree.next_in_order(b), None);
    }

    #[test]
    fn test_children() {
        let (tree, [div, a, _, b]) = sample();
        let children: Vec<FiberId> = tree.children(div).collect();
        assert_eq!(children, vec![a, b]);
    }

    #[test]
    fn test_host_sibling_skips_placements() {
        let (mut tree, [_, a, text, b]) = sample();
        tree[b].effect = Effect::Update;
        assert_eq!(tree.host_sibling(a), Some(b));
        assert_eq!(tree.host_sibling(text), None);
        assert_eq!(tree.host_sibling(b), None);

        tree[b].effect = Effect::Placement;
        assert_eq!(tree.host_sibling(a), None);
    }

    #[test]
    fn test_host_sibling_through_components() {
        use crate::types::{Component, Element};

        let (mut tree, [div, a, _, b]) = sample();
        // div → (a, Wrap → i, b)
        let wrap = Fiber::new(
            FiberKind::Component(Component::new("Wrap", |_| Element::host("i"))),
            Rc::new(Props::new()),
            Some(div),
            InstanceId::new(40),
        );
        let wrap = tree.allocate(wrap);
        let i = host(&mut tree, "i", wrap);
        tree[a].sibling = Some(wrap);
        tree[wrap].sibling = Some(b);
        tree[wrap].child = Some(i);
        tree[b].effect = Effect::Update;

        tree[i].effect = Effect::Update;
        assert_eq!(tree.host_sibling(a), Some(i));
        // Last child of a component continues after the component.
        assert_eq!(tree.host_sibling(i), Some(b));

        tree[i].effect = Effect::Placement;
        assert_eq!(tree.host_sibling(a), Some(b));
    }

    #[test]
    fn test_unlink_drops_subtree() {
        use crate::types::{Component, Element};

        let (mut tree, [div, a, _, b]) = sample();
        let instance = InstanceId::new(41);
        let wrap = Fiber::new(
            FiberKind::Component(Component::new("Wrap", |_| Element::host("i"))),
            Rc::new(Props::new()),
            Some(a),
            instance,
        );
        let wrap = tree.allocate(wrap);
        tree[a].child = Some(wrap);
        assert_eq!(tree.instance_fiber(instance), Some(wrap));

        tree.unlink(a);
        assert_eq!(tree.children(div).collect::<Vec<_>>(), vec![b]);
        assert_eq!(tree.instance_fiber(instance), None);

        tree.unlink(b);
        assert_eq!(tree[div].child(), None);
    }

    #[test]
    fn test_host_ancestor_skips_nodeless() {
        let (mut tree, [div, a, text, _]) = sample();
        tree[a].node = Some(7);
        assert_eq!(tree.host_ancestor(text), Some(a));
        // div has no node yet, so a's nearest realized ancestor is the root.
        assert_eq!(tree.host_ancestor(a), Some(FiberId::ROOT));
        tree[div].node = Some(3);
        assert_eq!(tree.host_ancestor(a), Some(div));
        assert_eq!(tree.host_ancestor(FiberId::ROOT), None);
    }
}
