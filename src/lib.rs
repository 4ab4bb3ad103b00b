//! # spark-vdom
//!
//! Virtual node reconciler and frame-coalesced store for reactive UIs.
//!
//! Revision counters are [spark-signals](https://github.com/RLabs-Inc/spark-signals)
//! signals, so presenters can repaint from an effect.
//!
//! ## Architecture
//!
//! An application describes its view as a tree of immutable [`VNode`]s built
//! from its state. The store owns that state, wraps every mutation, and keeps
//! a real display tree (any [`Host`]) in sync with the latest view:
//!
//! ```text
//! Mutation → Store (state, next tree) → FrameScheduler → DiffRenderer → Host
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Patch, Event, ReconcileOptions)
//! - [`primitives`] - Virtual nodes, attributes, handlers
//! - [`host`] - Real tree capability and the in-memory host
//! - [`renderer`] - Materializer, reconciler, terminal presenter
//! - [`pipeline`] - Mutations, frame scheduling, store

pub mod error;
pub mod host;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use error::{Result, VdomError};
pub use types::*;

pub use primitives::{
    create_vnode, text, AttrValue, Attribute, Child, EventCallback, EventHandler, VNode,
};

pub use host::{dispatch, Host, HostOp, MemoryHost, NodeId, RootLocator};

pub use renderer::{materialize, reconcile, Diff, DiffRenderer, TerminalRenderer};

pub use pipeline::{
    FrameLoop, FrameScheduler, ManualScheduler, Mutation, MutationMap, Store, StoreOptions,
};
