//! State/Render Pipeline
//!
//! This module connects application state to the renderer.
//!
//! # Pipeline Architecture
//!
//! ```text
//! mutation → state → view → next tree → (frame) → DiffRenderer → real tree
//! ```
//!
//! ## Data Flow
//!
//! 1. **mutation** - Pure `(&S, P) -> S`, wrapped so the store sees the result
//! 2. **store** - Replaces state, recomputes the next tree, requests a frame
//! 3. **scheduler** - Runs the single pending pass at the next frame boundary
//!
//! ## Key Design Principles
//!
//! - **Pure transitions**: mutations never touch the real tree or schedule
//! - **Deferred rendering**: only the frame callback mutates the real tree
//! - **Coalescing**: one pending token per store, newest state wins

pub mod mutation;
pub mod scheduler;
pub mod store;

// Re-exports
pub use mutation::{Mutation, MutationFn, MutationMap};
pub use scheduler::{FrameCallback, FrameLoop, FrameScheduler, ManualScheduler, FRAME_INTERVAL};
pub use store::{Store, StoreOptions};
