//! Hook Store - positional state cells owned by component fibers.
//!
//! While a component renders, the walker pushes a render frame holding the
//! hooks of the component's previous version (its `alternate`). Each
//! [`use_state`] call takes the next position:
//!
//! 1. Start from the previous cell at this position (state + pending queue),
//!    or from `initial` if there is none.
//! 2. Fold every pending update, in enqueue order.
//! 3. Append a fresh cell (folded state, empty queue) to the new hook list.
//!
//! Identity is the call position, never a name or a value, so hooks must be
//! called in the same order on every render.
//!
//! # Updates
//!
//! [`StateHandle`] is a token (component instance + hook position + weak
//! link to the scheduler), not a closure over a cell. Enqueuing an update
//! appends to the cell of the committed fiber and restarts rendering from
//! the committed root.
//!
//! ```ignore
//! let counter = Component::new("Counter", |_props| {
//!     let (count, state) = use_state(1);
//!     Element::host("h1")
//!         .on("onClick", move |_| { let _ = state.update(|c| c + 1); })
//!         .child(format!("Count: {count}"))
//! });
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use crate::engine::InstanceId;
use crate::error::{FiberError, Result};

// =============================================================================
// Hook Cells
// =============================================================================

/// Pending state update, type-erased.
///
/// Returns `None` if the stored state is not of the expected type.
pub(crate) type Update = Rc<dyn Fn(&dyn Any) -> Option<Rc<dyn Any>>>;

/// One state cell: the folded state plus updates not yet applied.
///
/// Cloning is cheap (`Rc` bumps), which lets an interrupted render fold the
/// same queue again on its next attempt.
#[derive(Clone)]
pub struct HookCell {
    state: Rc<dyn Any>,
    queue: Vec<Update>,
}

impl HookCell {
    /// Number of updates waiting to be folded on the next render.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Current state, if it has type `T`.
    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }

    pub(crate) fn enqueue(&mut self, update: Update) {
        self.queue.push(update);
    }
}

impl fmt::Debug for HookCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCell")
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Update Queue
// =============================================================================

/// Receiver of state updates (implemented by the scheduler state).
pub(crate) trait UpdateQueue {
    fn enqueue(&self, instance: InstanceId, hook: usize, update: Update) -> Result<()>;
}

/// Handle for updating one state cell.
///
/// Updates are applied on the next render, in the order they were enqueued.
pub struct StateHandle<T> {
    queue: Weak<dyn UpdateQueue>,
    instance: InstanceId,
    hook: usize,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T: 'static> StateHandle<T> {
    /// Enqueue `f(previous)` and schedule a render.
    pub fn update(&self, f: impl Fn(&T) -> T + 'static) -> Result<()> {
        let update: Update = Rc::new(move |state: &dyn Any| {
            state
                .downcast_ref::<T>()
                .map(|value| Rc::new(f(value)) as Rc<dyn Any>)
        });
        self.send(update)
    }

    /// Enqueue a replacement value and schedule a render.
    pub fn set(&self, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.update(move |_| value.clone())
    }

    /// Hook position this handle addresses.
    pub fn position(&self) -> usize {
        self.hook
    }

    fn send(&self, update: Update) -> Result<()> {
        let queue = self.queue.upgrade().ok_or(FiberError::RuntimeDropped)?;
        let result = queue.enqueue(self.instance, self.hook, update);
        if let Err(err) = &result {
            tracing::warn!(instance = ?self.instance, hook = self.hook, %err, "state update rejected");
        }
        result
    }
}

impl<T> Clone for StateHandle<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            instance: self.instance,
            hook: self.hook,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StateHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("instance", &self.instance)
            .field("hook", &self.hook)
            .finish()
    }
}

// =============================================================================
// Render Frames
// =============================================================================

struct RenderFrame {
    instance: InstanceId,
    previous: Vec<HookCell>,
    hooks: Vec<HookCell>,
    queue: Weak<dyn UpdateQueue>,
}

thread_local! {
    /// Frames of the components currently rendering (innermost last).
    static RENDER_STACK: RefCell<Vec<RenderFrame>> = const { RefCell::new(Vec::new()) };
}

/// Pops the frame if the render function unwinds.
struct FrameGuard {
    armed: bool,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.armed {
            RENDER_STACK.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }
}

/// Run a component render with a hook frame installed.
///
/// Returns the render output and the freshly built hook list.
pub(crate) fn render_with_hooks<R>(
    instance: InstanceId,
    previous: Vec<HookCell>,
    queue: Weak<dyn UpdateQueue>,
    render: impl FnOnce() -> R,
) -> (R, Vec<HookCell>) {
    RENDER_STACK.with(|stack| {
        stack.borrow_mut().push(RenderFrame {
            instance,
            previous,
            hooks: Vec::new(),
            queue,
        });
    });
    let mut guard = FrameGuard { armed: true };

    let output = render();

    guard.armed = false;
    let hooks = RENDER_STACK
        .with(|stack| stack.borrow_mut().pop())
        .map(|frame| frame.hooks)
        .unwrap_or_default();
    (output, hooks)
}

/// Whether a component render is in progress on this thread.
pub fn is_rendering() -> bool {
    RENDER_STACK.with(|stack| !stack.borrow().is_empty())
}

// =============================================================================
// use_state
// =============================================================================

/// Request the next state cell of the rendering component.
///
/// Fails with [`FiberError::HookOutsideRender`] when no component is
/// rendering and [`FiberError::HookTypeMismatch`] when the cell at this
/// position holds another type.
pub fn try_use_state<T: Clone + 'static>(initial: T) -> Result<(T, StateHandle<T>)> {
    // Take what we need out of the frame first: folding runs user closures.
    let (index, previous) = RENDER_STACK.with(|stack| {
        let stack = stack.borrow();
        let frame = stack.last().ok_or(FiberError::HookOutsideRender)?;
        let index = frame.hooks.len();
        Ok::<_, FiberError>((index, frame.previous.get(index).cloned()))
    })?;

    let (mut state, queue) = match previous {
        Some(cell) => (cell.state, cell.queue),
        None => (Rc::new(initial) as Rc<dyn Any>, Vec::new()),
    };
    for update in &queue {
        state = update(state.as_ref()).ok_or(FiberError::HookTypeMismatch { index })?;
    }
    let value = state
        .downcast_ref::<T>()
        .cloned()
        .ok_or(FiberError::HookTypeMismatch { index })?;

    RENDER_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let frame = stack.last_mut().ok_or(FiberError::HookOutsideRender)?;
        frame.hooks.push(HookCell {
            state,
            queue: Vec::new(),
        });
        Ok((
            value,
            StateHandle {
                queue: frame.queue.clone(),
                instance: frame.instance,
                hook: index,
                _marker: PhantomData,
            },
        ))
    })
}

/// Request the next state cell of the rendering component.
///
/// # Panics
///
/// Panics when called outside a component render, or when hooks were called
/// in a different order than on the previous render. Use [`try_use_state`]
/// to handle these as errors.
pub fn use_state<T: Clone + 'static>(initial: T) -> (T, StateHandle<T>) {
    match try_use_state(initial) {
        Ok(pair) => pair,
        Err(err) => panic!("use_state: {err}"),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Queue that records what it receives.
    #[derive(Default)]
    struct Recorder {
        received: RefCell<Vec<(InstanceId, usize, Update)>>,
    }

    impl UpdateQueue for Recorder {
        fn enqueue(&self, instance: InstanceId, hook: usize, update: Update) -> Result<()> {
            self.received.borrow_mut().push((instance, hook, update));
            Ok(())
        }
    }

    fn queue_of(recorder: &Rc<Recorder>) -> Weak<dyn UpdateQueue> {
        let queue: Rc<dyn UpdateQueue> = recorder.clone();
        Rc::downgrade(&queue)
    }

    #[test]
    fn test_outside_render() {
        assert!(!is_rendering());
        assert!(matches!(try_use_state(0), Err(FiberError::HookOutsideRender)));
    }

    #[test]
    #[should_panic(expected = "outside of a component render")]
    fn test_use_state_panics_outside_render() {
        let _ = use_state(0);
    }

    #[test]
    fn test_initial_values_by_position() {
        let recorder = Rc::new(Recorder::default());
        let ((a, b), hooks) = render_with_hooks(InstanceId::new(1), Vec::new(), queue_of(&recorder), || {
            assert!(is_rendering());
            let (a, _) = use_state(10);
            let (b, _) = use_state(String::from("x"));
            (a, b)
        });
        assert_eq!(a, 10);
        assert_eq!(b, "x");
        assert_eq!(hooks.len(), 2);
        assert!(!is_rendering());
    }

    #[test]
    fn test_fold_pending_updates_in_order() {
        let recorder = Rc::new(Recorder::default());
        let (handle, hooks) = render_with_hooks(InstanceId::new(1), Vec::new(), queue_of(&recorder), || {
            use_state(1).1
        });

        handle.update(|c: &i32| c + 1).unwrap();
        handle.update(|c: &i32| c * 10).unwrap();

        let mut previous = hooks;
        for (_, hook, update) in recorder.received.borrow_mut().drain(..) {
            previous[hook].enqueue(update);
        }
        assert_eq!(previous[0].pending(), 2);

        let (value, next) = render_with_hooks(InstanceId::new(1), previous, queue_of(&recorder), || {
            use_state(1).0
        });
        assert_eq!(value, 20);
        assert_eq!(next[0].pending(), 0);
        assert_eq!(next[0].state::<i32>(), Some(&20));
    }

    #[test]
    fn test_type_change_is_reported() {
        let recorder = Rc::new(Recorder::default());
        let (_, hooks) = render_with_hooks(InstanceId::new(1), Vec::new(), queue_of(&recorder), || {
            use_state(1u8);
        });
        let (result, _) = render_with_hooks(InstanceId::new(1), hooks, queue_of(&recorder), || {
            try_use_state(String::new()).map(|(v, _)| v)
        });
        assert!(matches!(result, Err(FiberError::HookTypeMismatch { index: 0 })));
    }

    #[test]
    fn test_dropped_queue() {
        let recorder = Rc::new(Recorder::default());
        let (handle, _) = render_with_hooks(InstanceId::new(1), Vec::new(), queue_of(&recorder), || {
            use_state(0).1
        });
        drop(recorder);
        assert!(matches!(handle.set(5), Err(FiberError::RuntimeDropped)));
    }

    #[test]
    fn test_frame_popped_after_panic() {
        let recorder = Rc::new(Recorder::default());
        let queue = queue_of(&recorder);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            render_with_hooks(InstanceId::new(1), Vec::new(), queue, || panic!("boom"))
        }));
        assert!(result.is_err());
        assert!(!is_rendering());
    }
}
