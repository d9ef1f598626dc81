//! Element factory and builders.
//!
//! Two ways to describe a tree:
//!
//! ```ignore
//! use spark_fiber::{create_element, Element, Props};
//!
//! // Factory form: anything that is not an Element becomes a text child.
//! let tree = create_element(
//!     "div",
//!     Some(Props::new().with("id", "foo")),
//!     [
//!         create_element("a", None, ["bar".into()]).into(),
//!         create_element("b", None, []).into(),
//!     ],
//! );
//!
//! // Builder form.
//! let tree = Element::host("div")
//!     .attr("id", "foo")
//!     .child(Element::host("a").child("bar"))
//!     .child(Element::host("b"));
//! ```

use std::rc::Rc;

use super::text::text;
use crate::types::{Component, Element, ElementKind, Event, Listener, PropValue, Props};

// =============================================================================
// Child
// =============================================================================

/// A child passed to the factory: either an element or a primitive that is
/// wrapped into a text element.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(Element),
    Text(String),
}

impl Child {
    /// Resolve to an element, wrapping text.
    pub fn into_element(self) -> Element {
        match self {
            Child::Element(element) => element,
            Child::Text(value) => text(value),
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Child::Text(value.to_string())
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Create an element.
///
/// `props` may be `None` (no attributes). Children that are not already
/// elements are wrapped as text elements, in order.
pub fn create_element(
    kind: impl Into<ElementKind>,
    props: Option<Props>,
    children: impl IntoIterator<Item = Child>,
) -> Element {
    let mut props = props.unwrap_or_default();
    for child in children {
        props.push_child(child.into_element());
    }
    Element::new(kind, props)
}

// =============================================================================
// Builders
// =============================================================================

impl Element {
    /// Start a host element with no attributes or children.
    pub fn host(tag: &str) -> Self {
        Element::new(ElementKind::Host(Rc::from(tag)), Props::new())
    }

    /// Set an attribute.
    pub fn attr(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props_mut().set(name, value);
        self
    }

    /// Attach an event listener under a listener-shaped name (`"onClick"`).
    pub fn on(mut self, name: &str, callback: impl Fn(&Event) + 'static) -> Self {
        self.props_mut().set(name, Listener::new(callback));
        self
    }

    /// Attach an already-built listener (keeps its identity across renders).
    pub fn listener(mut self, name: &str, listener: Listener) -> Self {
        self.props_mut().set(name, listener);
        self
    }

    /// Append a child.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.props_mut().push_child(child.into().into_element());
        self
    }

    /// Append several children.
    pub fn with_children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        let props = self.props_mut();
        for child in children {
            props.push_child(child.into().into_element());
        }
        self
    }
}

impl Component {
    /// Element rendering this component with the given props.
    pub fn element(&self, props: Props) -> Element {
        Element::new(self, props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NODE_VALUE;

    #[test]
    fn test_factory_wraps_text() {
        let tree = create_element(
            "div",
            Some(Props::new().with("id", "foo")),
            [
                create_element("a", None, ["bar".into()]).into(),
                create_element("b", None, []).into(),
            ],
        );

        assert_eq!(tree.kind().tag(), Some("div"));
        assert_eq!(tree.props().get("id"), Some(&PropValue::from("foo")));
        assert_eq!(tree.children().len(), 2);

        let a = &tree.children()[0];
        assert_eq!(a.kind().tag(), Some("a"));
        assert_eq!(a.children()[0].kind(), &ElementKind::Text);
        assert_eq!(a.children()[0].props().get(NODE_VALUE), Some(&PropValue::from("bar")));

        assert!(tree.children()[1].children().is_empty());
    }

    #[test]
    fn test_builder_matches_factory() {
        let built = Element::host("div")
            .attr("id", "foo")
            .child(Element::host("a").child("bar"))
            .child(Element::host("b"));
        let made = create_element(
            "div",
            Some(Props::new().with("id", "foo")),
            [
                create_element("a", None, ["bar".into()]).into(),
                create_element("b", None, []).into(),
            ],
        );
        assert_eq!(built, made);
    }

    #[test]
    fn test_numbers_become_text() {
        let tree = Element::host("p").with_children([1, 2]);
        let values: Vec<String> = tree
            .children()
            .iter()
            .map(|c| c.props().get(NODE_VALUE).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_builder_does_not_touch_shared_props() {
        let base = Element::host("div").attr("id", "a");
        let copy = base.clone().attr("id", "b");
        assert_eq!(base.props().get("id"), Some(&PropValue::from("a")));
        assert_eq!(copy.props().get("id"), Some(&PropValue::from("b")));
    }
}
