//! Materializer - Build real nodes from a virtual subtree.
//!
//! Used on first paint and whenever the reconciler replaces or appends a
//! slot. Children are collected in an off-tree fragment and attached with a
//! single append, so a subtree shows up all at once or not at all.

use crate::host::Host;
use crate::primitives::{Attribute, Child, VNode};

/// Create real nodes for `child` and everything below it.
///
/// Never reads existing real-tree state.
pub fn materialize<H: Host>(host: &mut H, child: &Child) -> H::Node {
    match child {
        Child::Text(text) => host.create_text(text),
        Child::Element(node) => materialize_element(host, node),
    }
}

pub(crate) fn materialize_element<H: Host>(host: &mut H, node: &VNode) -> H::Node {
    let element = host.create_element(node.node_name());

    for (name, attribute) in node.attributes() {
        match attribute {
            Attribute::Plain(value) => host.set_attribute(&element, name, value),
            Attribute::Handler(handler) => host.add_listener(&element, handler),
        }
    }

    let children = node.child_nodes();
    if !children.is_empty() {
        let fragment = host.create_fragment();
        for child in children {
            let real = materialize(host, child);
            host.append_child(&fragment, &real);
        }
        host.append_child(&element, &fragment);
    }

    element
}

// =============================================================================
// Tests
// =============================================================================
