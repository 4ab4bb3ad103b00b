//! Core types shared by the renderer and the pipeline.
//!
//! - [`Patch`] - bitflags summarizing the real-tree work done by a pass
//! - [`Event`] - what a handler receives when its listener fires
//! - [`ListenerPolicy`] / [`ReconcileOptions`] - reconciler configuration

// =============================================================================
// Patch (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Kinds of real-tree work performed by a reconcile pass.
    ///
    /// Combine with bitwise OR: `Patch::APPEND | Patch::REMOVE`.
    /// An empty patch means the real tree was not touched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Patch: u8 {
        const NONE = 0;
        /// A freshly materialized node was appended to an empty slot.
        const APPEND = 1 << 0;
        /// A real node was removed from a slot that became empty.
        const REMOVE = 1 << 1;
        /// A whole subtree was rematerialized in place.
        const REPLACE = 1 << 2;
        /// A live value property was pushed.
        const VALUE = 1 << 3;
        /// Plain attributes were removed or overwritten.
        const ATTRIBUTES = 1 << 4;
        /// Listeners were unregistered or registered.
        const LISTENERS = 1 << 5;
    }
}

impl Patch {
    /// True if any structural change (append, remove, replace) happened.
    pub fn is_structural(self) -> bool {
        self.intersects(Patch::APPEND | Patch::REMOVE | Patch::REPLACE)
    }
}

// =============================================================================
// Event
// =============================================================================

/// An event delivered to a handler attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Event {
    /// Event name without the `on` prefix (`click`, `input`).
    pub name: String,
    /// Opaque id of the node the listener is bound to, as the host numbers
    /// it. None for synthesized events.
    pub target: Option<usize>,
    /// Live value of the target at dispatch time, if it carries one.
    pub value: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            value: None,
        }
    }

    pub fn with_target(mut self, target: usize) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

// =============================================================================
// Reconciler Configuration
// =============================================================================

/// How handler attributes are treated once a node has been materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerPolicy {
    /// Unregister a listener whose callback changed and register the new one.
    /// Handlers sharing the same callback allocation are left alone.
    #[default]
    Rebind,
    /// Bind listeners once at materialization and never revisit them.
    BindOnce,
}

/// Options for a reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOptions {
    pub listener_policy: ListenerPolicy,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_default_is_empty() {
        assert!(Patch::default().is_empty());
        assert_eq!(Patch::default(), Patch::NONE);
    }

    #[test]
    fn test_patch_structural() {
        assert!(Patch::APPEND.is_structural());
        assert!((Patch::VALUE | Patch::REMOVE).is_structural());
        assert!(!(Patch::VALUE | Patch::ATTRIBUTES | Patch::LISTENERS).is_structural());
    }

    #[test]
    fn test_event_builder() {
        let ev = Event::new("input").with_value("abc");
        assert_eq!(ev.name, "input");
        assert_eq!(ev.target, None);
        assert_eq!(ev.value.as_deref(), Some("abc"));
        assert_eq!(ev.with_target(7).target, Some(7));
    }

    #[test]
    fn test_default_listener_policy() {
        assert_eq!(ReconcileOptions::default().listener_policy, ListenerPolicy::Rebind);
    }
}
