//! Host-clock driven trailing-edge debouncing.
//!
//! The editor never spawns timers. The host calls [`Editor::tick`] from its
//! event loop and each [`Debouncer`] fires once its quiet window has
//! elapsed since the last [`Debouncer::schedule`].
//!
//! [`Editor::tick`]: crate::Editor::tick

use std::cell::Cell;
use std::rc::Rc;

/// Source of millisecond timestamps.
pub trait Clock {
    /// Current time in milliseconds. Must be monotonic enough for
    /// debouncing; the epoch is irrelevant.
    fn now_ms(&self) -> u64;
}

/// Wall clock: `Date.now()` in browsers, `SystemTime` elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
    #[allow(clippy::cast_possible_truncation)] // Timestamps won't exceed u64 for billions of years
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for deterministic tests and replay.
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    /// Create a clock starting at `start_ms`.
    #[must_use]
    pub fn new(start_ms: u64) -> Self {
        Self(Rc::new(Cell::new(start_ms)))
    }

    /// Move time forward.
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get().saturating_add(ms));
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// A trailing-edge debouncer: bursts of `schedule` calls collapse into a
/// single firing one quiet window after the last call.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    deadline: Option<u64>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window.
    #[must_use]
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            deadline: None,
        }
    }

    /// Quiet window in milliseconds.
    #[must_use]
    pub const fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// (Re)arm the debouncer; supersedes any pending deadline.
    pub fn schedule(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.window_ms));
    }

    /// Whether a firing is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Deadline of the pending firing.
    #[must_use]
    pub const fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Drop the pending firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` and disarms if anything is pending, regardless of time.
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
