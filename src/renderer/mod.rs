//! Renderer - Turns virtual trees into real-tree mutations.
//!
//! - [`materialize`] - Build real nodes from scratch (first paint, replace, append)
//! - [`diff`] - Positional reconciler and the [`DiffRenderer`] that drives it
//! - [`terminal`] - crossterm presenter for the in-memory host

pub mod diff;
pub mod materialize;
pub mod terminal;

pub use diff::{reconcile, Diff, DiffRenderer};
pub use materialize::materialize;
pub use terminal::{outline, present, OutlineLine, TerminalRenderer};
