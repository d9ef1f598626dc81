//! Property tests for the positional diff: effect counts, deletion
//! completeness, diff minimality and completion-before-visibility.

use proptest::prelude::*;
use spark_fiber::{render_root, Element, MemoryDom, MutationKinds, NodeId, Runtime, StepDeadline};

// ============================================================================
// Generators
// ============================================================================

type Shape = Vec<(&'static str, Option<&'static str>)>;

fn arb_children() -> impl Strategy<Value = Shape> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["a", "b", "p"]),
            prop::option::of(prop::sample::select(vec!["x", "y"])),
        ),
        0..6,
    )
}

fn build(children: &Shape) -> Element {
    Element::host("div").with_children(children.iter().map(|(tag, title)| {
        let element = Element::host(tag);
        match title {
            Some(title) => element.attr("title", *title),
            None => element,
        }
    }))
}

fn mounted(children: &Shape) -> (Runtime<MemoryDom>, NodeId) {
    let mut dom = MemoryDom::new();
    let container = dom.create_container("root");
    let mut runtime = render_root(dom, container, build(children));
    runtime.flush().unwrap();
    (runtime, container)
}

/// Positions where the old and new child have the same tag.
fn matching(old: &Shape, new: &Shape) -> usize {
    old.iter().zip(new).filter(|(o, n)| o.0 == n.0).count()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Effects follow the positional rule and the DOM ends up holding exactly
    /// the new children, in order, each carrying its new attributes.
    #[test]
    fn rerender_matches_positional_rule(old in arb_children(), new in arb_children()) {
        let (mut runtime, container) = mounted(&old);
        runtime.render_root(build(&new));
        let summary = runtime.flush().unwrap().committed.unwrap();

        let same = matching(&old, &new);
        prop_assert_eq!(summary.placements, new.len() - same);
        prop_assert_eq!(summary.deletions, old.len() - same);
        prop_assert_eq!(summary.removed_nodes, old.len() - same);
        // The div itself is always an update.
        prop_assert_eq!(summary.updates, same + 1);

        let div = runtime.sink().find(container, "div").unwrap();
        prop_assert_eq!(runtime.sink().children(div).len(), new.len());

        let expected: Vec<(NodeId, Option<String>)> = runtime.with_current(|current| {
            let current = current.unwrap();
            let div = current.root().child().unwrap();
            current
                .children(div)
                .map(|id| {
                    let fiber = &current[id];
                    (*fiber.node().unwrap(), fiber.props().get("title").map(|v| v.to_string()))
                })
                .collect()
        });
        let order: Vec<NodeId> = expected.iter().map(|(node, _)| *node).collect();
        prop_assert_eq!(runtime.sink().children(div), order.as_slice());
        for (node, title) in expected {
            prop_assert_eq!(runtime.sink().parent(node), Some(div));
            prop_assert_eq!(
                runtime.sink().attribute(node, "title").map(|v| v.to_string()),
                title
            );
        }
    }

    /// Rendering the same description twice sends nothing the second time.
    #[test]
    fn identical_rerender_is_silent(children in arb_children()) {
        let (mut runtime, _) = mounted(&children);
        runtime.sink_mut().take_log();

        runtime.render_root(build(&children));
        let summary = runtime.flush().unwrap().committed.unwrap();
        prop_assert!(summary.is_noop());
        prop_assert!(runtime.sink().log().is_empty());
    }

    /// Stopping anywhere before the last unit leaves the document untouched.
    #[test]
    fn partial_work_is_invisible(children in arb_children(), cut in any::<prop::sample::Index>()) {
        let mut dom = MemoryDom::new();
        let container = dom.create_container("root");
        let mut runtime = render_root(dom, container, build(&children));

        // root + div + one unit per child
        let total = children.len() + 2;
        let report = runtime.work_loop(&StepDeadline::new(cut.index(total))).unwrap();
        prop_assert!(report.committed.is_none());
        prop_assert!(!runtime.sink().touched().intersects(MutationKinds::VISIBLE));
        prop_assert!(runtime.sink().children(container).is_empty());

        let rest = runtime.flush().unwrap();
        prop_assert_eq!(report.units + rest.units, total);
        prop_assert!(rest.committed.is_some());
    }
}
