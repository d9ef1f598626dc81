//! Core types for spark-fiber.
//!
//! These types describe WHAT to render. An [`Element`] is pure data: it never
//! changes after construction, clones cheaply (props are shared behind an
//! `Rc`) and carries no behavior beyond comparison.

use std::fmt;
use std::rc::Rc;

// =============================================================================
// Events
// =============================================================================

/// Event delivered to a [`Listener`] by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name without the listener prefix (`"click"`, `"input"`).
    pub name: String,
    /// Optional payload, e.g. the new value of an input.
    pub value: Option<String>,
}

impl Event {
    /// Create an event with no payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Create an event carrying a value.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Event listener callback.
///
/// Listeners compare by identity: two listeners are equal only when they are
/// the same allocation. A component that builds a fresh closure on every
/// render therefore gets its binding re-registered on every commit.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
    /// Wrap a callback.
    pub fn new(callback: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Property Values
// =============================================================================

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(Rc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Listener(Listener),
}

impl PropValue {
    /// String contents, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer contents, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Listener, if this value is one.
    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            PropValue::Listener(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Int(v) => write!(f, "{v}"),
            PropValue::Float(v) => write!(f, "{v}"),
            PropValue::Bool(v) => write!(f, "{v}"),
            PropValue::Listener(_) => f.write_str("[listener]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for PropValue {
    fn from(value: Rc<str>) -> Self {
        PropValue::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Listener> for PropValue {
    fn from(value: Listener) -> Self {
        PropValue::Listener(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Reserved name of the children entry.
pub const CHILDREN: &str = "children";

/// Property carrying the content of a text element.
pub const NODE_VALUE: &str = "nodeValue";

/// Ordered property map plus the ordered child list.
///
/// Attributes keep insertion order; setting an existing name replaces the
/// value in place. Children are stored apart from the attributes, so the
/// `children` entry is always present (possibly empty) and never shows up
/// as an attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    attributes: Vec<(Rc<str>, PropValue)>,
    children: Vec<Element>,
}

impl Props {
    /// Empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value with the same name.
    ///
    /// The reserved `children` name is ignored; use [`Props::push_child`].
    pub fn set(&mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) {
        let name = name.into();
        if &*name == CHILDREN {
            tracing::warn!("`children` is reserved and cannot be set as an attribute");
            return;
        }
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Builder form of [`Props::set`].
    pub fn with(mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        let index = self.attributes.iter().position(|(n, _)| &**n == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Look up an attribute.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attributes
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v)
    }

    /// Whether an attribute with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attributes in insertion order (children excluded).
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attributes.iter().map(|(n, v)| (&**n, v))
    }

    /// Number of attributes (children excluded).
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Child elements in order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }
}

// =============================================================================
// Components
// =============================================================================

/// Render function of a component.
pub type RenderFn = dyn Fn(&Props) -> Element;

/// A function component.
///
/// Identity is the render function allocation: clones of one `Component`
/// are the same kind, two `Component::new` calls are different kinds even
/// with identical closures. Create components once and clone them into
/// elements.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    /// Create a component from a render function.
    pub fn new(name: impl Into<Rc<str>>, render: impl Fn(&Props) -> Element + 'static) -> Self {
        Self {
            name: name.into(),
            render: Rc::new(render),
        }
    }

    /// Display name (diagnostics only).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the render function.
    pub fn render(&self, props: &Props) -> Element {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

// =============================================================================
// Element
// =============================================================================

/// What an element renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A primitive node of the target (`"div"`, `"span"`).
    Host(Rc<str>),
    /// A text node; its content is the `nodeValue` property.
    Text,
    /// A function component.
    Component(Component),
}

impl ElementKind {
    /// Host tag name, if this is a host kind.
    pub fn tag(&self) -> Option<&str> {
        match self {
            ElementKind::Host(tag) => Some(tag),
            _ => None,
        }
    }

    /// Whether this kind is a function component.
    pub fn is_component(&self) -> bool {
        matches!(self, ElementKind::Component(_))
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        ElementKind::Host(Rc::from(tag))
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        ElementKind::Host(Rc::from(tag))
    }
}

impl From<Component> for ElementKind {
    fn from(component: Component) -> Self {
        ElementKind::Component(component)
    }
}

impl From<&Component> for ElementKind {
    fn from(component: &Component) -> Self {
        ElementKind::Component(component.clone())
    }
}

/// Immutable description of one node of the UI tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    kind: ElementKind,
    props: Rc<Props>,
}

impl Element {
    /// Create an element from a kind and props.
    pub fn new(kind: impl Into<ElementKind>, props: Props) -> Self {
        Self {
            kind: kind.into(),
            props: Rc::new(props),
        }
    }

    /// The element kind.
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// The element props.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Child elements.
    pub fn children(&self) -> &[Element] {
        self.props.children()
    }

    /// Shared handle to the props, for fibers that snapshot them.
    pub(crate) fn shared_props(&self) -> Rc<Props> {
        Rc::clone(&self.props)
    }

    /// Mutable access for builders. Clones only if the props are shared.
    pub(crate) fn props_mut(&mut self) -> &mut Props {
        Rc::make_mut(&mut self.props)
    }
}
