//! View Primitives - Virtual node building blocks.
//!
//! This module provides what a view function builds its tree from:
//! - [`VNode`] / [`create_vnode`] - Element description (name, attributes, children)
//! - [`Child`] / [`text`] - Child slot, either a nested element or a text leaf
//! - [`Attribute`] / [`EventHandler`] - Resolved attribute values
//!
//! # Attributes
//!
//! Attribute values are tagged when the node is built:
//!
//! ```ignore
//! VNode::new("input")
//!     .attr("class", "input")          // Attribute::Plain
//!     .attr("value", &state.input)     // Attribute::Plain, pushed as live value
//!     .on("input", move |ev| { .. });  // Attribute::Handler under "oninput"
//! ```
//!
//! A view never edits a tree it already returned. Every state change builds
//! a new one and the reconciler works out the difference.

mod types;
mod vnode;

pub use types::*;
pub use vnode::{create_vnode, text, Child, VNode};
