//! In-memory host - Arena-backed display tree.
//!
//! Nodes live in a flat arena indexed by [`NodeId`]. Removed subtrees are
//! released and their indices go back to a free pool for reuse.
//!
//! Every call that the renderer makes is appended to an op log, which is how
//! tests assert exact mutation counts:
//!
//! ```ignore
//! let mut host = MemoryHost::new();
//! reconcile(&mut host, &root, first.as_ref(), Some(&a), Some(&a), options)?;
//! assert!(host.mutations().is_empty());
//! ```
//!
//! Listeners are fired through [`dispatch`] / [`input`], which take the host
//! by `RefCell` and release the borrow before calling handlers. Handlers are
//! then free to call mutations on a store that shares the same host.

use std::cell::RefCell;
use std::fmt::Write;

use crate::primitives::EventHandler;
use crate::types::Event;

use super::Host;

// =============================================================================
// Node Storage
// =============================================================================

/// Handle to a node in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        value: Option<String>,
        listeners: Vec<EventHandler>,
    },
    Text(String),
    Fragment,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// =============================================================================
// Op Log
// =============================================================================

/// One recorded host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    CreateElement { node: NodeId, name: String },
    CreateText { node: NodeId, text: String },
    CreateFragment { node: NodeId },
    Append { parent: NodeId, child: NodeId },
    Replace { parent: NodeId, new_child: NodeId, old_child: NodeId },
    Remove { parent: NodeId, child: NodeId },
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    SetValue { node: NodeId, value: String },
    AddListener { node: NodeId, event: String },
    RemoveListener { node: NodeId, event: String },
}

impl HostOp {
    /// Creating detached nodes does not change the attached tree.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            HostOp::CreateElement { .. } | HostOp::CreateText { .. } | HostOp::CreateFragment { .. }
        )
    }
}

// =============================================================================
// Memory Host
// =============================================================================

/// Arena display tree with a document root element (`body`).
#[derive(Debug)]
pub struct MemoryHost {
    nodes: Vec<Option<NodeData>>,
    free: Vec<usize>,
    body: NodeId,
    ops: Vec<HostOp>,
    recording: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        let mut host = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            body: NodeId(0),
            ops: Vec::new(),
            recording: true,
        };
        host.body = host.allocate(NodeKind::Element {
            name: "body".to_string(),
            attributes: Vec::new(),
            value: None,
            listeners: Vec::new(),
        });
        host
    }

    /// The document root. Always attached, never released.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a `<div id="...">` under the body, for use as a mount point.
    pub fn mount_point(&mut self, id: &str) -> NodeId {
        let body = self.body;
        let node = self.create_element("div");
        self.set_attribute(&node, "id", id);
        self.append_child(&body, &node);
        self.clear_ops();
        node
    }

    // -------------------------------------------------------------------------
    // Op log
    // -------------------------------------------------------------------------

    /// Every recorded call since the last clear.
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Recorded calls excluding detached node creation.
    pub fn mutations(&self) -> Vec<&HostOp> {
        self.ops.iter().filter(|op| !op.is_creation()).collect()
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Turn the op log on or off (on by default). Long-running hosts that
    /// never read the log should turn it off.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
        if !recording {
            self.ops = Vec::new();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    fn record(&mut self, op: HostOp) {
        if self.recording {
            self.ops.push(op);
        }
    }

    // -------------------------------------------------------------------------
    // Arena
    // -------------------------------------------------------------------------

    fn allocate(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(data);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(data));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Release a detached subtree back to the pool.
    fn release(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        let Some(data) = self.nodes.get_mut(node.0).and_then(Option::take) else {
            return;
        };
        for child in data.children {
            self.release(child);
        }
        self.free.push(node.0);
    }

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }

    /// True if `node` has not been released.
    pub fn contains(&self, node: NodeId) -> bool {
        self.data(node).is_some()
    }

    /// Number of live nodes, body included.
    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).and_then(|data| data.parent)
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else { return };
        if let Some(parent_data) = self.data_mut(parent) {
            parent_data.children.retain(|&child| child != node);
        }
        if let Some(data) = self.data_mut(node) {
            data.parent = None;
        }
    }

    /// Nodes that take `node`'s place when inserted: a fragment contributes
    /// its children and is released, anything else itself.
    fn take_insertable(&mut self, node: NodeId) -> Vec<NodeId> {
        let is_fragment = matches!(self.data(node).map(|d| &d.kind), Some(NodeKind::Fragment));
        if is_fragment {
            let children = self
                .data_mut(node)
                .map(|data| std::mem::take(&mut data.children))
                .unwrap_or_default();
            for &child in &children {
                if let Some(data) = self.data_mut(child) {
                    data.parent = None;
                }
            }
            // An emptied fragment has nothing left to hold.
            self.release(node);
            children
        } else {
            self.detach(node);
            vec![node]
        }
    }

    fn adopt(&mut self, parent: NodeId, nodes: &[NodeId]) {
        for &node in nodes {
            if let Some(data) = self.data_mut(node) {
                data.parent = Some(parent);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Element name, or None for text and fragments.
    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Text of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn attribute_names(&self, node: NodeId) -> Vec<&str> {
        match self.data(node).map(|d| &d.kind) {
            Some(NodeKind::Element { attributes, .. }) => {
                attributes.iter().map(|(key, _)| key.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Live value property.
    pub fn value(&self, node: NodeId) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Element { value, .. } => value.as_deref(),
            _ => None,
        }
    }

    /// Handlers bound on `node` for `event`.
    pub fn listeners(&self, node: NodeId, event: &str) -> Vec<EventHandler> {
        match self.data(node).map(|d| &d.kind) {
            Some(NodeKind::Element { listeners, .. }) => listeners
                .iter()
                .filter(|handler| handler.event() == event)
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        match self.data(node).map(|d| &d.kind) {
            Some(NodeKind::Element { listeners, .. }) => listeners.len(),
            _ => 0,
        }
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.data(node) else { return };
        if let NodeKind::Text(text) = &data.kind {
            out.push_str(text);
        }
        for &child in &data.children {
            self.collect_text(child, out);
        }
    }

    /// Subtree serialized as markup. Handlers are not rendered.
    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.data(node) else { return };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Fragment => {
                for &child in &data.children {
                    self.write_markup(child, out);
                }
            }
            NodeKind::Element { name, attributes, .. } => {
                let _ = write!(out, "<{name}");
                for (key, value) in attributes {
                    let _ = write!(out, " {key}=\"{value}\"");
                }
                out.push('>');
                for &child in &data.children {
                    self.write_markup(child, out);
                }
                let _ = write!(out, "</{name}>");
            }
        }
    }

    /// Elements named `tag` under the body, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.query_selector_all(tag)
    }

    fn walk(&self, node: NodeId, visit: &mut dyn FnMut(NodeId, &NodeData)) {
        let Some(data) = self.data(node) else { return };
        visit(node, data);
        for &child in &data.children {
            self.walk(child, visit);
        }
    }

    /// Set the live value as a user edit would. Not logged.
    fn user_edit(&mut self, node: NodeId, text: &str) -> Option<String> {
        match &mut self.data_mut(node)?.kind {
            NodeKind::Element { value, .. } => {
                *value = Some(text.to_string());
                value.clone()
            }
            _ => None,
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Host Implementation
// =============================================================================

impl Host for MemoryHost {
    type Node = NodeId;

    fn create_element(&mut self, node_name: &str) -> NodeId {
        let node = self.allocate(NodeKind::Element {
            name: node_name.to_string(),
            attributes: Vec::new(),
            value: None,
            listeners: Vec::new(),
        });
        self.record(HostOp::CreateElement {
            node,
            name: node_name.to_string(),
        });
        node
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        let node = self.allocate(NodeKind::Text(text.to_string()));
        self.record(HostOp::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn create_fragment(&mut self) -> NodeId {
        let node = self.allocate(NodeKind::Fragment);
        self.record(HostOp::CreateFragment { node });
        node
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        let nodes = self.take_insertable(*child);
        self.adopt(*parent, &nodes);
        if let Some(data) = self.data_mut(*parent) {
            data.children.extend(nodes);
        }
        self.record(HostOp::Append {
            parent: *parent,
            child: *child,
        });
    }

    fn replace_child(&mut self, parent: &NodeId, new_child: &NodeId, old_child: &NodeId) {
        let nodes = self.take_insertable(*new_child);
        let Some(position) = self
            .data(*parent)
            .and_then(|data| data.children.iter().position(|c| c == old_child))
        else {
            return;
        };
        self.adopt(*parent, &nodes);
        if let Some(data) = self.data_mut(*parent) {
            data.children.splice(position..=position, nodes);
        }
        self.release(*old_child);
        self.record(HostOp::Replace {
            parent: *parent,
            new_child: *new_child,
            old_child: *old_child,
        });
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        if self.parent(*child) != Some(*parent) {
            return;
        }
        self.detach(*child);
        self.release(*child);
        self.record(HostOp::Remove {
            parent: *parent,
            child: *child,
        });
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.data(*node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element {
                attributes,
                value: live,
                ..
            },
            ..
        }) = self.data_mut(*node)
        {
            match attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, slot)) => *slot = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
            // Default value seeds the live value until one is pushed.
            if name == "value" && live.is_none() {
                *live = Some(value.to_string());
            }
        }
        self.record(HostOp::SetAttribute {
            node: *node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.data_mut(*node)
        {
            attributes.retain(|(key, _)| key != name);
        }
        self.record(HostOp::RemoveAttribute {
            node: *node,
            name: name.to_string(),
        });
    }

    fn set_value(&mut self, node: &NodeId, value: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { value: live, .. },
            ..
        }) = self.data_mut(*node)
        {
            *live = Some(value.to_string());
        }
        self.record(HostOp::SetValue {
            node: *node,
            value: value.to_string(),
        });
    }

    fn add_listener(&mut self, node: &NodeId, handler: &EventHandler) {
        if let Some(NodeData {
            kind: NodeKind::Element { listeners, .. },
            ..
        }) = self.data_mut(*node)
        {
            listeners.push(handler.clone());
        }
        self.record(HostOp::AddListener {
            node: *node,
            event: handler.event().to_string(),
        });
    }

    fn remove_listener(&mut self, node: &NodeId, handler: &EventHandler) {
        if let Some(NodeData {
            kind: NodeKind::Element { listeners, .. },
            ..
        }) = self.data_mut(*node)
        {
            if let Some(position) = listeners.iter().position(|bound| bound.same_as(handler)) {
                listeners.remove(position);
            }
        }
        self.record(HostOp::RemoveListener {
            node: *node,
            event: handler.event().to_string(),
        });
    }

    fn bound_listeners(&self, node: &NodeId) -> Vec<EventHandler> {
        match self.data(*node).map(|d| &d.kind) {
            Some(NodeKind::Element { listeners, .. }) => listeners.clone(),
            _ => Vec::new(),
        }
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(self.body, &mut |node, data| {
            let NodeKind::Element { name, attributes, .. } = &data.kind else {
                return;
            };
            let attr = |key: &str| {
                attributes
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.as_str())
            };
            let matched = if let Some(id) = selector.strip_prefix('#') {
                attr("id") == Some(id)
            } else if let Some(class) = selector.strip_prefix('.') {
                attr("class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
            } else {
                name == selector
            };
            if matched {
                found.push(node);
            }
        });
        found
    }
}

// =============================================================================
// Event Dispatch
// =============================================================================

/// Fire `event_name` on `node`. Returns how many handlers ran.
///
/// The host borrow is released before any handler runs.
pub fn dispatch(host: &RefCell<MemoryHost>, node: NodeId, event_name: &str) -> usize {
    let (handlers, value) = {
        let host = host.borrow();
        (
            host.listeners(node, event_name),
            host.value(node).map(str::to_string),
        )
    };
    let event = Event {
        name: event_name.to_string(),
        target: Some(node.index()),
        value,
    };
    for handler in &handlers {
        handler.call(&event);
    }
    handlers.len()
}

/// Simulate a user typing `text` into `node`: set the live value, then
/// fire `input`. Returns how many handlers ran.
pub fn input(host: &RefCell<MemoryHost>, node: NodeId, text: &str) -> usize {
    let edited = host.borrow_mut().user_edit(node, text);
    if edited.is_none() {
        return 0;
    }
    dispatch(host, node, "input")
}

// =============================================================================
// Tests
// =============================================================================
