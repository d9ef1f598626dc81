//! UI Primitives - Element building blocks.
//!
//! This module provides the upstream half of the pipeline: functions that
//! produce immutable [`Element`](crate::Element) trees.
//! - [`create_element`] - Factory taking a kind, optional props and children
//! - [`text`] - Text node with a `nodeValue` property
//!
//! Children that are not elements (strings, numbers, booleans) are wrapped as
//! text elements by the factory, so a tree literal reads naturally:
//!
//! ```ignore
//! let tree = Element::host("div")
//!     .attr("id", "foo")
//!     .child(Element::host("a").child("bar"))
//!     .child(Element::host("b"));
//! ```

mod element;
mod text;

pub use element::{create_element, Child};
pub use text::text;
