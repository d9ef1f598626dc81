//! Mount API - entry point for rendering an element tree into a container.
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::{render_root, Element, MemoryDom};
//!
//! let mut dom = MemoryDom::new();
//! let container = dom.create_container("root");
//!
//! // Schedule the first generation, then let the host drive it.
//! let mut runtime = render_root(dom, container, Element::host("div").attr("id", "foo"));
//! runtime.run(&mut SliceHost::new(Duration::from_millis(5), 100))?;
//!
//! // Or, in tests, run to completion.
//! runtime.flush()?;
//! ```

use std::rc::Rc;

use super::scheduler::Runtime;
use crate::renderer::MutationSink;
use crate::types::{Element, Props};

impl<S: MutationSink> Runtime<S> {
    /// Schedule a new generation rendering `element` into the container.
    ///
    /// Nothing is sent to the sink here. Any in-flight generation is
    /// discarded; the previous committed tree stays visible until the new
    /// one commits.
    pub fn render_root(&mut self, element: Element) {
        let mut props = Props::new();
        props.push_child(element);
        self.state.borrow_mut().begin(Rc::new(props));
    }
}

/// Create a runtime for `container` and schedule `element` into it.
///
/// The returned runtime has pending work; drive it with
/// [`Runtime::run`], [`Runtime::work_loop`] or [`Runtime::flush`].
pub fn render_root<S: MutationSink>(sink: S, container: S::Node, element: Element) -> Runtime<S> {
    let mut runtime = Runtime::new(sink, container);
    runtime.render_root(element);
    runtime
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MemoryDom;

    #[test]
    fn test_render_root_is_lazy() {
        let mut dom = MemoryDom::new();
        let container = dom.create_container("root");
        let mut runtime = render_root(dom, container, Element::host("div").attr("id", "foo"));

        assert!(!runtime.is_idle());
        assert!(runtime.sink().log().is_empty());

        runtime.flush().unwrap();
        assert_eq!(runtime.sink().inner_html(container), r#"<div id="foo"></div>"#);
        assert_eq!(runtime.generation(), 1);
    }

    #[test]
    fn test_render_root_replaces_pending_generation() {
        let mut dom = MemoryDom::new();
        let container = dom.create_container("root");
        let mut runtime = render_root(dom, container, Element::host("div"));
        runtime.render_root(Element::host("p"));

        runtime.flush().unwrap();
        assert_eq!(runtime.sink().inner_html(container), "<p></p>");
        assert_eq!(runtime.generation(), 2);
    }
}
