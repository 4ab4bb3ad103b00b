//! Frame scheduling - When deferred synchronization passes run.
//!
//! The store never renders on the caller's turn. It asks a [`FrameScheduler`]
//! for a callback before the next paint and renders from that callback.
//!
//! - [`ManualScheduler`] - Virtual clock: frames run when the caller says so
//! - [`FrameLoop`] - Real clock: frames run on a fixed interval (~60fps)
//!
//! # Example
//!
//! ```ignore
//! let frames = Rc::new(ManualScheduler::new());
//! let store = Store::new(host, "#app".into(), view, state, register, frames.clone(), Default::default())?;
//!
//! add.call(&state, 1);
//! add.call(&state, 2);
//! assert_eq!(frames.run_frame(), 1); // one coalesced pass
//! ```

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Callback run at the next frame boundary.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Default frame interval (~60fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// =============================================================================
// Scheduler Trait
// =============================================================================

/// Capability to run a callback before the next paint.
///
/// There is no cancellation: a requested frame always runs. Callers that
/// want coalescing keep their own pending token.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback);
}

// =============================================================================
// Manual Scheduler
// =============================================================================

/// Scheduler driven by explicit [`ManualScheduler::run_frame`] calls.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Vec<FrameCallback>>,
    frames: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback queued before this call. Callbacks requested while
    /// the frame runs wait for the next frame.
    ///
    /// Returns how many callbacks ran.
    pub fn run_frame(&self) -> usize {
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let count = batch.len();
        for callback in batch {
            callback();
        }
        self.frames.set(self.frames.get() + 1);
        count
    }

    /// Callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        self.queue.borrow_mut().push(callback);
    }
}

// =============================================================================
// Frame Loop
// =============================================================================

/// Fixed-interval frame driver for an event loop.
///
/// Holds the running flag (set to false on quit) the way a mount handle
/// does, and runs queued callbacks once per elapsed interval.
pub struct FrameLoop {
    interval: Duration,
    queue: RefCell<Vec<FrameCallback>>,
    last_frame: Cell<Instant>,
    frames: Cell<u64>,
    running: Arc<AtomicBool>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::with_interval(FRAME_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            queue: RefCell::new(Vec::new()),
            last_frame: Cell::new(Instant::now()),
            frames: Cell::new(0),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the next frame boundary.
    pub fn time_until_next_frame(&self) -> Duration {
        self.interval.saturating_sub(self.last_frame.get().elapsed())
    }

    /// Run queued callbacks if a frame boundary has passed.
    ///
    /// Returns how many callbacks ran.
    pub fn run_due(&self) -> usize {
        if !self.time_until_next_frame().is_zero() {
            return 0;
        }
        self.last_frame.set(Instant::now());
        self.frames.set(self.frames.get() + 1);

        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }

    /// Sleep until the next boundary, then run the frame.
    ///
    /// Returns `false` once the loop has been stopped.
    pub fn tick(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        thread::sleep(self.time_until_next_frame());
        self.run_due();
        self.is_running()
    }

    /// Tick until stopped.
    pub fn run(&self) {
        while self.tick() {}
    }

    /// Check if still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop (sets running to false).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Shared running flag, for stopping from a signal handler or handler closure.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for FrameLoop {
    fn request_frame(&self, callback: FrameCallback) {
        self.queue.borrow_mut().push(callback);
    }
}

// =============================================================================
// Tests
// =============================================================================
