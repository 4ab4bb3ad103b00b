//! Store - Owns application state and keeps the real tree in sync with it.
//!
//! The store is the only writer of state. Every registered mutation goes
//! through it:
//!
//! ```text
//! mutation.call(&state, payload)
//!   → new state replaces the held state
//!   → view(&state, &mutations) computes the next tree
//!   → one frame is requested (no-op if one is already pending)
//! next frame
//!   → DiffRenderer: materialize on first paint, reconcile afterwards
//!   → current := next, revision += 1
//! ```
//!
//! Any number of mutations before a frame produce one pass that renders the
//! newest state.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, error, trace};

use super::mutation::{Mutation, MutationMap, Transition};
use super::scheduler::FrameScheduler;
use crate::error::{Result, VdomError};
use crate::host::{Host, RootLocator};
use crate::primitives::VNode;
use crate::renderer::DiffRenderer;
use crate::types::{Patch, ReconcileOptions};

// =============================================================================
// Options
// =============================================================================

/// Store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreOptions {
    pub reconcile: ReconcileOptions,
}

// =============================================================================
// Store Core
// =============================================================================

struct StoreCore<S, M, H: Host> {
    host: Rc<RefCell<H>>,
    root: H::Node,
    view: Box<dyn Fn(&S, &M) -> VNode>,
    state: RefCell<S>,
    mutations: M,
    registry: MutationMap<S>,
    next: RefCell<Rc<VNode>>,
    renderer: RefCell<DiffRenderer>,
    /// Token of the frame currently requested, if any.
    pending: Cell<Option<u64>>,
    next_token: Cell<u64>,
    scheduler: Rc<dyn FrameScheduler>,
    revision: Signal<u64>,
    self_ref: Weak<Self>,
}

impl<S, M, H> StoreCore<S, M, H>
where
    S: Clone + 'static,
    M: 'static,
    H: Host + 'static,
{
    fn recompute(&self) {
        let tree = {
            let state = self.state.borrow();
            (self.view)(&state, &self.mutations)
        };
        *self.next.borrow_mut() = Rc::new(tree);
    }

    /// Request a frame unless one is already pending.
    fn request_render(&self) {
        if self.pending.get().is_some() {
            trace!("render already pending, request coalesced");
            return;
        }
        let token = self.next_token.get();
        self.next_token.set(token + 1);
        self.pending.set(Some(token));
        trace!(token, "frame requested");

        let weak = self.self_ref.clone();
        self.scheduler.request_frame(Box::new(move || {
            let Some(core) = weak.upgrade() else { return };
            // A synchronous flush may have consumed this token already.
            if core.pending.get() == Some(token) {
                let _ = core.render();
            }
        }));
    }

    /// Synchronize the real tree with the next tree.
    fn render(&self) -> Result<Patch> {
        let next = self.next.borrow().clone();
        let result = {
            let mut host = self.host.borrow_mut();
            self.renderer.borrow_mut().render(&mut *host, &self.root, next)
        };
        self.pending.set(None);

        match result {
            Ok(patch) => {
                let revision = self.revision.get() + 1;
                self.revision.set(revision);
                debug!(revision, ?patch, "synchronized");
                Ok(patch)
            }
            Err(err) => {
                error!(%err, "synchronization failed, keeping current tree");
                Err(err)
            }
        }
    }
}

impl<S, M, H> Transition<S> for StoreCore<S, M, H>
where
    S: Clone + 'static,
    M: 'static,
    H: Host + 'static,
{
    fn transition(&self, mutation: &str, next: S) {
        debug!(mutation, "state transition");
        *self.state.borrow_mut() = next;
        self.recompute();
        self.request_render();
    }
}

// =============================================================================
// Store
// =============================================================================

/// Coordinator for one state value, one view and one root container.
///
/// Cloning a store clones the handle, not the state.
pub struct Store<S, M, H: Host> {
    core: Rc<StoreCore<S, M, H>>,
}

impl<S, M, H: Host> Clone for Store<S, M, H> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<S, M, H> Store<S, M, H>
where
    S: Clone + 'static,
    M: Clone + 'static,
    H: Host + 'static,
{
    /// Create a store and schedule its first paint.
    ///
    /// `register` registers every mutation on the map and returns the
    /// mutations value handed to `view`. Fails if `root` does not resolve to
    /// exactly one node or a mutation name is registered twice.
    pub fn new<V, R>(
        host: Rc<RefCell<H>>,
        root: RootLocator<H::Node>,
        view: V,
        state: S,
        register: R,
        scheduler: Rc<dyn FrameScheduler>,
        options: StoreOptions,
    ) -> Result<Self>
    where
        V: Fn(&S, &M) -> VNode + 'static,
        R: FnOnce(&mut MutationMap<S>) -> M,
    {
        let root = root.resolve(&*host.borrow())?;

        let core = Rc::new_cyclic(|weak: &Weak<StoreCore<S, M, H>>| {
            let sink: Weak<dyn Transition<S>> = weak.clone();
            let mut registry = MutationMap::new(sink);
            let mutations = register(&mut registry);
            let next = Rc::new(view(&state, &mutations));

            StoreCore {
                host,
                root,
                view: Box::new(view),
                state: RefCell::new(state),
                mutations,
                registry,
                next: RefCell::new(next),
                renderer: RefCell::new(DiffRenderer::new(options.reconcile)),
                pending: Cell::new(None),
                next_token: Cell::new(0),
                scheduler,
                revision: signal(0),
                self_ref: weak.clone(),
            }
        });

        if let Some(name) = core.registry.first_duplicate() {
            return Err(VdomError::DuplicateMutation {
                name: name.to_string(),
            });
        }

        debug!(mutations = core.registry.len(), "store created");
        core.request_render();
        Ok(Self { core })
    }

    /// Run a pass now instead of waiting for the frame.
    ///
    /// Consumes the pending frame, if any; its callback becomes a no-op.
    pub fn render_now(&self) -> Result<Patch> {
        self.core.render()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Snapshot of the current state.
    pub fn state(&self) -> S {
        self.core.state.borrow().clone()
    }

    /// The mutations value handed to the view.
    pub fn mutations(&self) -> M {
        self.core.mutations.clone()
    }

    /// Typed lookup of a registered mutation by name.
    pub fn mutation<P: 'static>(&self, name: &str) -> Option<Mutation<S, P>> {
        self.core.registry.get(name)
    }

    pub fn mutation_names(&self) -> Vec<&str> {
        self.core.registry.names()
    }

    pub fn is_render_pending(&self) -> bool {
        self.core.pending.get().is_some()
    }

    /// Completed passes. Bumped after every successful synchronization.
    pub fn revision(&self) -> Signal<u64> {
        self.core.revision.clone()
    }

    /// Tree the real tree currently reflects (None before first paint).
    pub fn current_tree(&self) -> Option<Rc<VNode>> {
        self.core.renderer.borrow().previous().cloned()
    }

    /// Tree the next pass will render.
    pub fn next_tree(&self) -> Rc<VNode> {
        self.core.next.borrow().clone()
    }

    pub fn root(&self) -> H::Node {
        self.core.root.clone()
    }

    pub fn host(&self) -> Rc<RefCell<H>> {
        self.core.host.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
