//! Scheduler - cooperative work loop and the runtime handle.
//!
//! # State
//!
//! ```text
//! current     last committed generation (visible)
//! wip         generation being built (invisible until commit)
//! next_unit   fiber the loop works on next
//! deletions   ids into `current` with no counterpart in `wip`
//! ```
//!
//! Between commits either a WIP generation exists or the scheduler is idle.
//! [`Runtime::work_loop`] performs units until the deadline asks to yield;
//! when the last unit completes it commits in one go and `wip` becomes
//! `current`.
//!
//! # Updates
//!
//! The scheduler state doubles as the update queue behind every
//! [`StateHandle`](crate::StateHandle). An update lands on the hook cell of
//! the committed fiber and restarts rendering from the committed root, which
//! discards any in-flight generation.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::commit::{commit_root, CommitJournal, CommitSummary};
use super::deadline::{Deadline, IdleHost, Unbounded};
use crate::config::RuntimeConfig;
use crate::engine::work::{perform_unit_of_work, WorkCx};
use crate::engine::{Effect, FiberId, FiberTree, InstanceId};
use crate::error::{FiberError, Result};
use crate::renderer::MutationSink;
use crate::state::hooks::{Update, UpdateQueue};
use crate::types::Props;

// =============================================================================
// Scheduler State
// =============================================================================

#[derive(Debug)]
pub(crate) struct SchedulerState<N> {
    pub(crate) container: N,
    pub(crate) current: Option<FiberTree<N>>,
    pub(crate) wip: Option<FiberTree<N>>,
    pub(crate) next_unit: Option<FiberId>,
    pub(crate) deletions: Vec<FiberId>,
    generation: u64,
    pub(crate) next_instance: u64,
}

impl<N: Clone> SchedulerState<N> {
    fn new(container: N) -> Self {
        Self {
            container,
            current: None,
            wip: None,
            next_unit: None,
            deletions: Vec::new(),
            generation: 0,
            // InstanceId 0 belongs to the roots.
            next_instance: 1,
        }
    }

    /// Start a generation rooted at the container, replacing any in-flight one.
    pub(crate) fn begin(&mut self, props: Rc<Props>) {
        self.abandon();
        self.generation += 1;
        let alternate = self.current.as_ref().map(|_| FiberId::ROOT);
        self.wip = Some(FiberTree::with_root(
            self.generation,
            self.container.clone(),
            props,
            alternate,
        ));
        self.next_unit = Some(FiberId::ROOT);
        tracing::debug!(generation = self.generation, "render cycle started");
    }

    /// Drop the in-flight generation and undo its deletion marks.
    pub(crate) fn abandon(&mut self) {
        if self.wip.take().is_some() {
            tracing::trace!(generation = self.generation, "in-flight generation discarded");
        }
        self.next_unit = None;
        if let Some(current) = self.current.as_mut() {
            for &id in &self.deletions {
                current[id].effect = Effect::None;
            }
        }
        self.deletions.clear();
    }

    fn enqueue(&mut self, instance: InstanceId, hook: usize, update: Update) -> Result<()> {
        let current = self.current.as_mut().ok_or(FiberError::Unmounted)?;
        let fiber = current
            .instance_fiber(instance)
            .ok_or(FiberError::Unmounted)?;
        let cell = current[fiber]
            .hooks
            .get_mut(hook)
            .ok_or(FiberError::Unmounted)?;
        cell.enqueue(update);

        let props = Rc::clone(&current.root().props);
        self.begin(props);
        Ok(())
    }
}

impl<N: Clone> UpdateQueue for RefCell<SchedulerState<N>> {
    fn enqueue(&self, instance: InstanceId, hook: usize, update: Update) -> Result<()> {
        let mut state = self
            .try_borrow_mut()
            .map_err(|_| FiberError::UpdateDuringRender)?;
        state.enqueue(instance, hook, update)
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Outcome of one [`Runtime::work_loop`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkReport {
    /// Units of work performed.
    pub units: usize,
    /// Whether the pass stopped because the deadline ran low.
    pub yielded: bool,
    /// Set when the pass finished a generation and committed it.
    pub committed: Option<CommitSummary>,
}

// =============================================================================
// Runtime
// =============================================================================

/// A mounted reconciliation runtime driving one container.
///
/// ```ignore
/// let mut dom = MemoryDom::new();
/// let container = dom.create_container("root");
/// let mut runtime = Runtime::new(dom, container);
/// runtime.render_root(Element::host("div").attr("id", "foo"));
/// runtime.flush()?;
/// ```
pub struct Runtime<S: MutationSink> {
    pub(crate) sink: S,
    pub(crate) state: Rc<RefCell<SchedulerState<S::Node>>>,
    config: RuntimeConfig,
}

impl<S: MutationSink> Runtime<S> {
    /// Create an idle runtime rendering into `container`.
    pub fn new(sink: S, container: S::Node) -> Self {
        Self::with_config(sink, container, RuntimeConfig::default())
    }

    pub fn with_config(sink: S, container: S::Node, config: RuntimeConfig) -> Self {
        Self {
            sink,
            state: Rc::new(RefCell::new(SchedulerState::new(container))),
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Whether there is neither pending work nor an uncommitted generation.
    pub fn is_idle(&self) -> bool {
        let state = self.state.borrow();
        state.wip.is_none() && state.next_unit.is_none()
    }

    /// Number of the most recently started render cycle.
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Inspect the committed generation.
    pub fn with_current<R>(&self, f: impl FnOnce(Option<&FiberTree<S::Node>>) -> R) -> R {
        let state = self.state.borrow();
        f(state.current.as_ref())
    }

    fn queue(&self) -> Weak<dyn UpdateQueue> {
        let queue: Rc<dyn UpdateQueue> = self.state.clone();
        Rc::downgrade(&queue)
    }

    // -------------------------------------------------------------------------
    // Work loop
    // -------------------------------------------------------------------------

    /// Perform units of work until `deadline` has less than the yield
    /// threshold left, then commit if the generation is complete.
    ///
    /// A unit is never interrupted. The deadline is polled before each one,
    /// so an exhausted deadline performs no work at all.
    ///
    /// On error the in-flight generation is discarded. A commit that fails
    /// part way is not rolled back attribute by attribute: nodes it already
    /// removed are dropped from the committed tree and nodes it already
    /// placed are detached again, so later renders diff against what is
    /// actually attached. Attribute and listener patches that reached the
    /// sink before the failure stay applied.
    pub fn work_loop(&mut self, deadline: &impl Deadline) -> Result<WorkReport> {
        let queue = self.queue();
        let mut report = WorkReport::default();

        loop {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            let Some(id) = state.next_unit else { break };
            if deadline.time_remaining() < self.config.yield_threshold {
                report.yielded = true;
                break;
            }
            let Some(wip) = state.wip.as_mut() else {
                state.next_unit = None;
                break;
            };

            let mut cx = WorkCx {
                wip,
                current: state.current.as_mut(),
                deletions: &mut state.deletions,
                next_instance: &mut state.next_instance,
                config: &self.config,
                queue: queue.clone(),
            };
            match perform_unit_of_work(&mut cx, &mut self.sink, id) {
                Ok(next) => state.next_unit = next,
                Err(err) => {
                    state.abandon();
                    tracing::warn!(fiber = %id, %err, "unit of work failed");
                    return Err(err);
                }
            }
            report.units += 1;
        }

        let complete = {
            let state = self.state.borrow();
            state.next_unit.is_none() && state.wip.is_some()
        };
        if complete {
            report.committed = Some(self.commit()?);
        }

        tracing::trace!(units = report.units, yielded = report.yielded, "work loop pass");
        Ok(report)
    }

    fn commit(&mut self) -> Result<CommitSummary> {
        let mut state = self.state.borrow_mut();
        let Some(wip) = state.wip.take() else {
            return Ok(CommitSummary::default());
        };
        let deletions = std::mem::take(&mut state.deletions);
        let mut journal = CommitJournal::new();

        match commit_root(
            &mut self.sink,
            &self.config,
            &wip,
            state.current.as_ref(),
            &deletions,
            &mut journal,
        ) {
            Ok(summary) => {
                state.current = Some(wip);
                Ok(summary)
            }
            Err(err) => {
                tracing::warn!(%err, "commit failed");
                // Keep `current` describing what is attached: nodes already
                // removed leave the tree, nodes already placed are detached.
                if let Some(current) = state.current.as_mut() {
                    for &id in &journal.deleted {
                        current.unlink(id);
                    }
                }
                for (parent, child) in journal.attached.iter().rev() {
                    if let Err(undo) = self.sink.remove_child(parent, child) {
                        tracing::warn!(%undo, "could not detach node placed by failed commit");
                    }
                }
                state.deletions = deletions;
                state.abandon();
                Err(err)
            }
        }
    }

    /// Keep requesting idle periods from `host` and working through them.
    ///
    /// Returns once the host stops handing out periods, or on the first
    /// error. Returns the number of commits performed.
    pub fn run(&mut self, host: &mut impl IdleHost) -> Result<usize> {
        let mut commits = 0;
        while let Some(deadline) = host.request_idle() {
            if self.work_loop(&deadline)?.committed.is_some() {
                commits += 1;
            }
        }
        Ok(commits)
    }

    /// Run all pending work to completion, ignoring time budgets.
    pub fn flush(&mut self) -> Result<WorkReport> {
        self.work_loop(&Unbounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::deadline::{ManualClock, StepDeadline};
    use crate::renderer::{MemoryDom, MutationKinds};
    use crate::types::Element;
    use web_time::Duration;

    fn runtime() -> Runtime<MemoryDom> {
        let mut dom = MemoryDom::new();
        let container = dom.create_container("root");
        Runtime::new(dom, container)
    }

    fn tree() -> Element {
        Element::host("div")
            .child(Element::host("a").child("bar"))
            .child(Element::host("b"))
    }

    #[test]
    fn test_idle_until_rendered() {
        let mut runtime = runtime();
        assert!(runtime.is_idle());
        let report = runtime.flush().unwrap();
        assert_eq!(report, WorkReport::default());
    }

    #[test]
    fn test_yields_when_budget_low() {
        let mut runtime = runtime();
        runtime.render_root(tree());

        let clock = ManualClock::new();
        let report = runtime
            .work_loop(&clock.deadline(Duration::from_micros(500)))
            .unwrap();
        assert_eq!(report.units, 0);
        assert!(report.yielded);
        assert!(runtime.sink().log().is_empty());
    }

    #[test]
    fn test_resumes_across_slices() {
        let mut runtime = runtime();
        runtime.render_root(tree());

        let first = runtime.work_loop(&StepDeadline::new(2)).unwrap();
        assert_eq!(first.units, 2);
        assert!(first.yielded);
        assert!(first.committed.is_none());
        assert!(!runtime.sink().touched().intersects(MutationKinds::VISIBLE));

        let rest = runtime.flush().unwrap();
        // root, div, a, text, b
        assert_eq!(first.units + rest.units, 5);
        assert!(rest.committed.is_some());
        assert!(runtime.is_idle());
    }

    #[test]
    fn test_run_until_host_stops() {
        let mut runtime = runtime();
        runtime.render_root(tree());
        let mut slices = 0;
        let mut host = || {
            slices += 1;
            (slices <= 10).then(|| StepDeadline::new(1))
        };
        let commits = runtime.run(&mut host).unwrap();
        assert_eq!(commits, 1);
        assert!(runtime.is_idle());
    }

    #[test]
    fn test_sink_failure_keeps_current() {
        let mut runtime = runtime();
        runtime.render_root(Element::host("div").attr("id", "one"));
        runtime.flush().unwrap();

        runtime.sink_mut().reject_attribute("id");
        runtime.render_root(Element::host("div").attr("id", "two"));
        let err = runtime.flush().unwrap_err();
        assert!(matches!(err, FiberError::Sink(_)));
        assert!(runtime.is_idle());
        runtime.with_current(|current| {
            let current = current.unwrap();
            let div = current.root().child().unwrap();
            assert_eq!(current[div].props().get("id").and_then(|v| v.as_str()), Some("one"));
        });
    }

    #[test]
    fn test_failed_commit_does_not_block_later_renders() {
        let mut runtime = runtime();
        let container = runtime.state.borrow().container;
        runtime.render_root(
            Element::host("div")
                .child(Element::host("span"))
                .child(Element::host("b").attr("id", "1")),
        );
        runtime.flush().unwrap();

        runtime.sink_mut().reject_attribute("id");
        runtime.render_root(
            Element::host("div")
                .child(Element::host("p"))
                .child(Element::host("b").attr("id", "2")),
        );
        assert!(matches!(runtime.flush(), Err(FiberError::Sink(_))));
        // The span was removed before the failure; the placed p was taken back.
        assert_eq!(runtime.sink().inner_html(container), r#"<div><b id="1"></b></div>"#);

        runtime.render_root(
            Element::host("div")
                .child(Element::host("p"))
                .child(Element::host("b")),
        );
        runtime.flush().unwrap();
        assert_eq!(runtime.sink().inner_html(container), "<div><p></p><b></b></div>");
    }
}
