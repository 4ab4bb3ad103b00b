//! Differential renderer - Reconcile the real tree against a new virtual tree.
//!
//! The DiffRenderer compares the next virtual tree to the previous one and
//! only applies the real-tree mutations needed to make them match.
//!
//! # Algorithm
//!
//! For each positionally aligned slot, depth-first and left to right:
//!
//! 1. Slot was empty: materialize `next` and append it
//! 2. Slot becomes empty: remove the real node
//! 3. Otherwise classify the pair, first match wins:
//!    - [`Diff::Kind`] text vs element: replace
//!    - [`Diff::Text`] text changed: replace
//!    - [`Diff::Node`] element name changed: replace
//!    - [`Diff::Value`] `value` changed: push the live value only
//!    - [`Diff::Attributes`] plain attributes changed: patch attributes only
//!    - [`Diff::None`]: recurse into children
//!
//! Children are matched by index, never by key. Moving an item inside a list
//! shows up as content changes at each affected index.

use std::rc::Rc;

use tracing::trace;

use super::materialize::materialize_element;
use crate::error::{Result, VdomError};
use crate::host::Host;
use crate::primitives::{Child, VNode};
use crate::types::{ListenerPolicy, Patch, ReconcileOptions};

// =============================================================================
// Classification
// =============================================================================

/// How a current/next pair differs. Variants are listed in rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diff {
    /// One side is text, the other an element.
    Kind,
    /// Both text, different strings.
    Text,
    /// Both elements, different node names.
    Node,
    /// Both elements, different `value` attributes.
    Value,
    /// Both elements, plain attributes differ in some other way.
    Attributes,
    /// Equivalent at this level.
    None,
}

impl Diff {
    /// Classify a pair with the ordered, first-match-wins rule set.
    pub fn classify(current: &Child, next: &Child) -> Diff {
        Self::classify_slots(Slot::from(current), Slot::from(next))
    }

    fn classify_slots(current: Slot<'_>, next: Slot<'_>) -> Diff {
        match (current, next) {
            (Slot::Text(a), Slot::Text(b)) => {
                if a != b {
                    Diff::Text
                } else {
                    Diff::None
                }
            }
            (Slot::Element(a), Slot::Element(b)) => {
                if a.node_name() != b.node_name() {
                    Diff::Node
                } else if a.value() != b.value() {
                    Diff::Value
                } else if !a.plain_attributes().eq(b.plain_attributes()) {
                    Diff::Attributes
                } else {
                    Diff::None
                }
            }
            _ => Diff::Kind,
        }
    }

    /// True for the rules that rematerialize the whole slot.
    pub fn replaces(self) -> bool {
        matches!(self, Diff::Kind | Diff::Text | Diff::Node)
    }
}

/// Borrowed view of one side of a slot.
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Text(&'a str),
    Element(&'a VNode),
}

impl<'a> From<&'a Child> for Slot<'a> {
    fn from(child: &'a Child) -> Self {
        match child {
            Child::Text(text) => Slot::Text(text),
            Child::Element(node) => Slot::Element(node),
        }
    }
}

fn materialize_slot<H: Host>(host: &mut H, slot: Slot<'_>) -> H::Node {
    match slot {
        Slot::Text(text) => host.create_text(text),
        Slot::Element(node) => materialize_element(host, node),
    }
}

// =============================================================================
// Reconcile
// =============================================================================

/// Bring the real node in one slot of `parent` in line with `next`.
///
/// `real` is the node currently occupying the slot (None when the slot is
/// empty). Returns what kind of work was done; an empty [`Patch`] means the
/// real tree was not touched.
pub fn reconcile<H: Host>(
    host: &mut H,
    parent: &H::Node,
    real: Option<&H::Node>,
    current: Option<&Child>,
    next: Option<&Child>,
    options: ReconcileOptions,
) -> Result<Patch> {
    reconcile_slot(
        host,
        parent,
        real,
        current.map(Slot::from),
        next.map(Slot::from),
        options,
        0,
    )
}

fn reconcile_slot<H: Host>(
    host: &mut H,
    parent: &H::Node,
    real: Option<&H::Node>,
    current: Option<Slot<'_>>,
    next: Option<Slot<'_>>,
    options: ReconcileOptions,
    index: usize,
) -> Result<Patch> {
    let (current, next) = match (current, next) {
        (None, None) => return Ok(Patch::NONE),
        (None, Some(next)) => {
            let node = materialize_slot(host, next);
            host.append_child(parent, &node);
            return Ok(Patch::APPEND);
        }
        (Some(_), None) => {
            let real = real.ok_or(VdomError::MissingRealNode { index })?;
            host.remove_child(parent, real);
            return Ok(Patch::REMOVE);
        }
        (Some(current), Some(next)) => (current, next),
    };

    let real = real.ok_or(VdomError::MissingRealNode { index })?;
    let diff = Diff::classify_slots(current, next);

    if diff.replaces() {
        trace!(?diff, index, "replacing slot");
        let node = materialize_slot(host, next);
        host.replace_child(parent, &node, real);
        return Ok(Patch::REPLACE);
    }

    // Equal text leaves end here; everything below is element vs element.
    let (Slot::Element(current), Slot::Element(next)) = (current, next) else {
        return Ok(Patch::NONE);
    };

    let mut patch = match options.listener_policy {
        ListenerPolicy::Rebind => rebind_listeners(host, real, next),
        ListenerPolicy::BindOnce => Patch::NONE,
    };

    match diff {
        Diff::Value => {
            host.set_value(real, next.value().unwrap_or_default());
            patch |= Patch::VALUE;
        }
        Diff::Attributes => {
            update_attributes(host, real, current, next);
            patch |= Patch::ATTRIBUTES;
        }
        _ => {
            patch |= reconcile_children(host, real, current, next, options)?;
        }
    }

    Ok(patch)
}

/// Recurse over children, bounded by the longer of the two lists.
///
/// Real slots are captured up front so removals do not shift later indices.
fn reconcile_children<H: Host>(
    host: &mut H,
    real: &H::Node,
    current: &VNode,
    next: &VNode,
    options: ReconcileOptions,
) -> Result<Patch> {
    let slots = host.children(real);
    let current_children = current.child_nodes();
    let next_children = next.child_nodes();
    let bound = current_children.len().max(next_children.len());

    let mut patch = Patch::NONE;
    for index in 0..bound {
        patch |= reconcile_slot(
            host,
            real,
            slots.get(index),
            current_children.get(index).map(Slot::from),
            next_children.get(index).map(Slot::from),
            options,
            index,
        )?;
    }
    Ok(patch)
}

/// Remove plain attributes missing from `next`, then set every plain
/// attribute of `next`. Handlers are never touched here.
fn update_attributes<H: Host>(host: &mut H, real: &H::Node, current: &VNode, next: &VNode) {
    for (name, _) in current.plain_attributes() {
        if next.attribute(name).is_none() {
            host.remove_attribute(real, name);
        }
    }
    for (name, value) in next.plain_attributes() {
        host.set_attribute(real, name, value);
    }
}

/// Make the listeners bound on `real` match `next`'s handlers.
///
/// Works from what the host has bound, not from the previous virtual node:
/// descendants of a value or attribute patch keep older listeners that the
/// previous tree no longer describes. Shared callbacks are left bound.
fn rebind_listeners<H: Host>(host: &mut H, real: &H::Node, next: &VNode) -> Patch {
    let bound = host.bound_listeners(real);
    let mut patch = Patch::NONE;

    for old in &bound {
        if !next.handlers().any(|new| new.same_as(old)) {
            host.remove_listener(real, old);
            patch |= Patch::LISTENERS;
        }
    }
    for new in next.handlers() {
        if !bound.iter().any(|old| old.same_as(new)) {
            host.add_listener(real, new);
            patch |= Patch::LISTENERS;
        }
    }

    patch
}

// =============================================================================
// Diff Renderer
// =============================================================================

/// Renders successive virtual trees into one root container.
///
/// Keeps the previous tree to diff against. The first render (or the first
/// after [`DiffRenderer::invalidate`]) materializes the whole tree.
#[derive(Debug, Default)]
pub struct DiffRenderer {
    previous: Option<Rc<VNode>>,
    options: ReconcileOptions,
}

impl DiffRenderer {
    /// Create a new diff renderer.
    pub fn new(options: ReconcileOptions) -> Self {
        Self {
            previous: None,
            options,
        }
    }

    /// Render `next` under `root`, applying only what changed.
    ///
    /// On success `next` becomes the previous tree. On failure the previous
    /// tree is kept.
    pub fn render<H: Host>(&mut self, host: &mut H, root: &H::Node, next: Rc<VNode>) -> Result<Patch> {
        let patch = match &self.previous {
            None => {
                let node = materialize_element(host, &next);
                host.append_child(root, &node);
                Patch::APPEND
            }
            Some(previous) => {
                let first = host.first_child(root);
                reconcile_slot(
                    host,
                    root,
                    first.as_ref(),
                    Some(Slot::Element(previous.as_ref())),
                    Some(Slot::Element(next.as_ref())),
                    self.options,
                    0,
                )?
            }
        };
        self.previous = Some(next);
        Ok(patch)
    }

    /// Rematerialize `next` from scratch, replacing whatever sits in the
    /// root's first slot.
    pub fn render_full<H: Host>(&mut self, host: &mut H, root: &H::Node, next: Rc<VNode>) -> Patch {
        let node = materialize_element(host, &next);
        let patch = match host.first_child(root) {
            Some(existing) => {
                host.replace_child(root, &node, &existing);
                Patch::REPLACE
            }
            None => {
                host.append_child(root, &node);
                Patch::APPEND
            }
        };
        self.previous = Some(next);
        patch
    }

    /// Forget the previous tree.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Check if we have a previous tree to diff against.
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn previous(&self) -> Option<&Rc<VNode>> {
        self.previous.as_ref()
    }

    pub fn options(&self) -> ReconcileOptions {
        self.options
    }
}

// =============================================================================
// Tests
// =============================================================================
