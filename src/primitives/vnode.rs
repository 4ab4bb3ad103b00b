//! Virtual nodes - Immutable description of the UI.
//!
//! A view function returns a fresh tree of [`VNode`]s on every state change.
//! Nothing here mutates an existing tree: the builder methods consume `self`
//! and are only meant for top-down construction.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::primitives::VNode;
//!
//! let view = VNode::new("ul")
//!     .attr("class", "panel")
//!     .child(VNode::new("li").child("first"))
//!     .child(VNode::new("li").child("second"));
//! ```

use crate::error::Result;
use crate::types::Event;

use super::types::{AttrValue, Attribute, EventHandler, HANDLER_PREFIX};

// =============================================================================
// Child
// =============================================================================

/// One slot in a children list: a raw text leaf or a nested element.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Text(String),
    Element(VNode),
}

impl Child {
    pub fn is_text(&self) -> bool {
        matches!(self, Child::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Child::Text(text) => Some(text),
            Child::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&VNode> {
        match self {
            Child::Text(_) => None,
            Child::Element(node) => Some(node),
        }
    }
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Element(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

/// Text leaf.
pub fn text(content: impl Into<String>) -> Child {
    Child::Text(content.into())
}

// =============================================================================
// VNode
// =============================================================================

/// Description of one element: type name, attributes, children.
///
/// Attribute keys are unique and keep their first insertion position.
/// Child order is the identity used by positional diffing.
#[derive(Debug, Clone, PartialEq)]
pub struct VNode {
    node_name: String,
    attributes: Vec<(String, Attribute)>,
    children: Vec<Child>,
}

/// Checked constructor.
///
/// Resolves every attribute against its name. Fails on a string under an
/// `on<Event>` name, a callback under any other name, or an empty name.
pub fn create_vnode<N, A, K, C>(node_name: N, attributes: A, children: C) -> Result<VNode>
where
    N: Into<String>,
    A: IntoIterator<Item = (K, AttrValue)>,
    K: Into<String>,
    C: IntoIterator<Item = Child>,
{
    let mut node = VNode::new(node_name);
    for (name, value) in attributes {
        let name = name.into();
        let attribute = value.resolve(&name)?;
        node.insert_attribute(name, attribute);
    }
    node.children.extend(children);
    Ok(node)
}

impl VNode {
    /// Element with no attributes and no children.
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a plain attribute.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or follows the `on<Event>` handler pattern;
    /// handlers go through [`VNode::on`].
    pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.try_attr(name, AttrValue::Text(value.into()))
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Add a handler for `event`, stored under the `on<event>` attribute name.
    ///
    /// # Panics
    ///
    /// Panics if `event` is not a non-empty word.
    pub fn on(self, event: &str, callback: impl Fn(&Event) + 'static) -> Self {
        let name = format!("{HANDLER_PREFIX}{event}");
        self.try_attr(name, AttrValue::callback(callback))
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Add an already built handler, sharing its callback allocation.
    ///
    /// # Panics
    ///
    /// Panics if the handler's event is not a non-empty word.
    pub fn handler(self, handler: EventHandler) -> Self {
        let name = format!("{HANDLER_PREFIX}{}", handler.event());
        self.try_attr(name, AttrValue::Callback(handler.callback().clone()))
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Fallible form of [`VNode::attr`] / [`VNode::on`].
    pub fn try_attr(mut self, name: impl Into<String>, value: AttrValue) -> Result<Self> {
        let name = name.into();
        let attribute = value.resolve(&name)?;
        self.insert_attribute(name, attribute);
        Ok(self)
    }

    /// Append one child.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children in order.
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    fn insert_attribute(&mut self, name: String, attribute: Attribute) {
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = attribute,
            None => self.attributes.push((name, attribute)),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn attributes(&self) -> &[(String, Attribute)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, attribute)| attribute)
    }

    /// The plain `value` attribute, if any.
    pub fn value(&self) -> Option<&str> {
        self.attribute("value").and_then(Attribute::as_plain)
    }

    /// Plain attributes in insertion order.
    pub fn plain_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|(name, attribute)| Some((name.as_str(), attribute.as_plain()?)))
    }

    /// Handler attributes in insertion order.
    pub fn handlers(&self) -> impl Iterator<Item = &EventHandler> {
        self.attributes
            .iter()
            .filter_map(|(_, attribute)| attribute.as_handler())
    }

    pub fn child_nodes(&self) -> &[Child] {
        &self.children
    }
}

// =============================================================================
// Tests
// =============================================================================
