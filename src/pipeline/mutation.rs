//! Mutations - Named, typed state transitions.
//!
//! A mutation is a pure function `(&S, P) -> S` with its own payload type.
//! Registering it with a [`MutationMap`] wraps it in a [`Mutation`] handle
//! that, when called, also hands the new state to the owning store.
//!
//! ```ignore
//! let register = |map: &mut MutationMap<State>| Mutations {
//!     update_input: map.register("updateInput", |s: &State, input: String| State { input, ..s.clone() }),
//!     create_task: map.register("createTask", |s: &State, (): ()| s.with_task()),
//! };
//! ```

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

// =============================================================================
// Transition Sink
// =============================================================================

/// Receiver of transitions: the store that owns the state.
pub(crate) trait Transition<S> {
    fn transition(&self, mutation: &str, next: S);
}

/// Transition function type.
pub type MutationFn<S, P> = Rc<dyn Fn(&S, P) -> S>;

// =============================================================================
// Mutation Handle
// =============================================================================

/// A registered mutation bound to its store.
///
/// Cheap to clone; views capture clones inside handlers.
pub struct Mutation<S, P> {
    name: Rc<str>,
    apply: MutationFn<S, P>,
    store: Weak<dyn Transition<S>>,
}

impl<S, P> Clone for Mutation<S, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            apply: self.apply.clone(),
            store: self.store.clone(),
        }
    }
}

impl<S: Clone, P> Mutation<S, P> {
    /// Run the transition from `state`, hand the result to the store, and
    /// return it.
    ///
    /// `state` is never modified. The store recomputes its next tree and
    /// requests a frame before this returns.
    pub fn call(&self, state: &S, payload: P) -> S {
        let next = (self.apply)(state, payload);
        match self.store.upgrade() {
            Some(store) => store.transition(&self.name, next.clone()),
            None => warn!(mutation = %self.name, "mutation called after its store was dropped"),
        }
        next
    }

    /// The pure transition, without notifying the store.
    pub fn apply(&self, state: &S, payload: P) -> S {
        (self.apply)(state, payload)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S, P> fmt::Debug for Mutation<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation").field("name", &self.name).finish()
    }
}

// =============================================================================
// Mutation Map
// =============================================================================

/// Registry of a store's mutations by name.
///
/// Each entry keeps its payload type; [`MutationMap::get`] only returns a
/// handle when asked for the type it was registered with.
pub struct MutationMap<S> {
    store: Weak<dyn Transition<S>>,
    entries: Vec<(Rc<str>, Rc<dyn Any>)>,
    duplicates: Vec<String>,
}

impl<S: 'static> MutationMap<S> {
    pub(crate) fn new(store: Weak<dyn Transition<S>>) -> Self {
        Self {
            store,
            entries: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    /// Register `f` under `name` and return its handle.
    ///
    /// Registering a name twice is reported by the store constructor.
    pub fn register<P, F>(&mut self, name: &str, f: F) -> Mutation<S, P>
    where
        P: 'static,
        F: Fn(&S, P) -> S + 'static,
    {
        let name: Rc<str> = Rc::from(name);
        let mutation = Mutation {
            name: name.clone(),
            apply: Rc::new(f),
            store: self.store.clone(),
        };
        if self.contains(&name) {
            self.duplicates.push(name.to_string());
        } else {
            self.entries.push((name, Rc::new(mutation.clone())));
        }
        mutation
    }

    /// Typed lookup. None if the name is unknown or `P` is not the payload
    /// type it was registered with.
    pub fn get<P: 'static>(&self, name: &str) -> Option<Mutation<S, P>> {
        self.entries
            .iter()
            .find(|(key, _)| &**key == name)
            .and_then(|(_, entry)| entry.downcast_ref::<Mutation<S, P>>())
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| &**key == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| &**key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn first_duplicate(&self) -> Option<&str> {
        self.duplicates.first().map(String::as_str)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recorder {
        seen: RefCell<Vec<(String, i32)>>,
    }

    impl Transition<i32> for Recorder {
        fn transition(&self, mutation: &str, next: i32) {
            self.seen.borrow_mut().push((mutation.to_string(), next));
        }
    }

    fn recorder() -> Rc<Recorder> {
        Rc::new(Recorder {
            seen: RefCell::new(Vec::new()),
        })
    }

    #[test]
    fn test_call_notifies_store_and_returns_state() {
        let store = recorder();
        let weak: Weak<dyn Transition<i32>> = Rc::downgrade(&store) as Weak<dyn Transition<i32>>;
        let mut map = MutationMap::new(weak);
        let add = map.register("add", |s: &i32, n: i32| s + n);

        let state = 1;
        assert_eq!(add.call(&state, 2), 3);
        assert_eq!(state, 1);
        assert_eq!(*store.seen.borrow(), vec![("add".to_string(), 3)]);
    }

    #[test]
    fn test_apply_is_pure() {
        let store = recorder();
        let weak: Weak<dyn Transition<i32>> = Rc::downgrade(&store) as Weak<dyn Transition<i32>>;
        let mut map = MutationMap::new(weak);
        let double = map.register("double", |s: &i32, (): ()| s * 2);

        assert_eq!(double.apply(&4, ()), 8);
        assert!(store.seen.borrow().is_empty());
    }

    #[test]
    fn test_typed_lookup() {
        let store = recorder();
        let weak: Weak<dyn Transition<i32>> = Rc::downgrade(&store) as Weak<dyn Transition<i32>>;
        let mut map = MutationMap::new(weak);
        map.register("add", |s: &i32, n: i32| s + n);
        map.register("reset", |_: &i32, (): ()| 0);

        assert_eq!(map.names(), vec!["add", "reset"]);
        assert!(map.get::<i32>("add").is_some());
        assert!(map.get::<String>("add").is_none());
        assert!(map.get::<()>("missing").is_none());
        assert_eq!(map.get::<()>("reset").unwrap().call(&7, ()), 0);
    }

    #[test]
    fn test_duplicate_is_recorded() {
        let store = recorder();
        let weak: Weak<dyn Transition<i32>> = Rc::downgrade(&store) as Weak<dyn Transition<i32>>;
        let mut map = MutationMap::new(weak);
        map.register("add", |s: &i32, n: i32| s + n);
        map.register("add", |s: &i32, n: i32| s - n);

        assert_eq!(map.len(), 1);
        assert_eq!(map.first_duplicate(), Some("add"));
    }

    #[test]
    fn test_call_after_store_dropped() {
        let store = recorder();
        let weak: Weak<dyn Transition<i32>> = Rc::downgrade(&store) as Weak<dyn Transition<i32>>;
        let mut map = MutationMap::new(weak);
        let add = map.register("add", |s: &i32, n: i32| s + n);
        drop(store);

        assert_eq!(add.call(&1, 1), 2);
    }
}
