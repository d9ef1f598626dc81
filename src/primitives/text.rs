//! Text primitive.
//!
//! A text node is an element of kind [`ElementKind::Text`] with its content
//! in the `nodeValue` property and no children.

use std::fmt::Display;

use crate::types::{Element, ElementKind, NODE_VALUE, Props};

/// Create a text element.
pub fn text(value: impl Display) -> Element {
    Element::new(
        ElementKind::Text,
        Props::new().with(NODE_VALUE, value.to_string()),
    )
}
