//! Host - The real display tree the renderer writes to.
//!
//! The renderer never owns platform nodes. It drives a [`Host`], which exposes
//! the primitive capabilities every target has (create, attach, detach,
//! set attributes, bind listeners) over an opaque node handle.
//!
//! - [`memory`] - In-memory arena host with an op log, used by tests and the demo
//! - [`RootLocator`] - How a store finds the container it renders into

pub mod memory;

use std::fmt;

use crate::error::{Result, VdomError};
use crate::primitives::EventHandler;

pub use memory::{dispatch, input, HostOp, MemoryHost, NodeId};

// =============================================================================
// Host Trait
// =============================================================================

/// Primitive operations on a real display tree.
///
/// Calls are assumed infallible for well-formed arguments: handles passed in
/// were produced by the same host and are still alive.
pub trait Host {
    /// Opaque handle to a real node.
    type Node: Clone + PartialEq + fmt::Debug;

    fn create_element(&mut self, node_name: &str) -> Self::Node;

    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Off-tree container whose children move into the parent on append.
    fn create_fragment(&mut self) -> Self::Node;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn replace_child(&mut self, parent: &Self::Node, new_child: &Self::Node, old_child: &Self::Node);

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Current children of `node`, in order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.children(node).into_iter().next()
    }

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// Push the live value property (form control state, not an attribute).
    fn set_value(&mut self, node: &Self::Node, value: &str);

    fn add_listener(&mut self, node: &Self::Node, handler: &EventHandler);

    /// Unregister a listener previously added with the same handler.
    fn remove_listener(&mut self, node: &Self::Node, handler: &EventHandler);

    /// Handlers currently bound on `node`, in binding order.
    fn bound_listeners(&self, node: &Self::Node) -> Vec<EventHandler>;

    /// Every node matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;
}

// =============================================================================
// Root Locator
// =============================================================================

/// Where a store attaches its tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RootLocator<N> {
    /// An existing container node.
    Node(N),
    /// A selector resolved once, at construction.
    Selector(String),
}

impl<N: Clone + PartialEq + fmt::Debug> RootLocator<N> {
    pub fn selector(selector: impl Into<String>) -> Self {
        RootLocator::Selector(selector.into())
    }

    /// Resolve to exactly one node.
    pub fn resolve<H: Host<Node = N>>(self, host: &H) -> Result<N> {
        match self {
            RootLocator::Node(node) => Ok(node),
            RootLocator::Selector(selector) => {
                let mut matches = host.query_selector_all(&selector);
                match matches.len() {
                    0 => Err(VdomError::RootNotFound { selector }),
                    1 => Ok(matches.remove(0)),
                    n => Err(VdomError::AmbiguousRoot {
                        selector,
                        matches: n,
                    }),
                }
            }
        }
    }
}

impl<N> From<&str> for RootLocator<N> {
    fn from(selector: &str) -> Self {
        RootLocator::Selector(selector.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_selector() {
        let mut host = MemoryHost::new();
        let body = host.body();
        let app = host.create_element("div");
        host.set_attribute(&app, "id", "app");
        host.append_child(&body, &app);

        let root = RootLocator::selector("#app").resolve(&host).unwrap();
        assert_eq!(root, app);
    }

    #[test]
    fn test_resolve_missing_and_ambiguous() {
        let mut host = MemoryHost::new();
        let body = host.body();
        for _ in 0..2 {
            let section = host.create_element("section");
            host.append_child(&body, &section);
        }

        assert_eq!(
            RootLocator::selector("#app").resolve(&host),
            Err(VdomError::RootNotFound {
                selector: "#app".into()
            })
        );
        assert_eq!(
            RootLocator::selector("section").resolve(&host),
            Err(VdomError::AmbiguousRoot {
                selector: "section".into(),
                matches: 2
            })
        );
    }

    #[test]
    fn test_resolve_direct_node() {
        let mut host = MemoryHost::new();
        let detached = host.create_element("div");
        assert_eq!(RootLocator::Node(detached).resolve(&host), Ok(detached));
    }
}
