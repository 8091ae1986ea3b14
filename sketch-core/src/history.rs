//! Snapshot-based undo/redo.
//!
//! Scene mutations schedule a debounced capture. When the capture fires the
//! editor serializes the scene and hands the [`Snapshot`] to
//! [`History::push`]. The top of the undo stack is always the state on
//! screen, so the stack is seeded at startup and never drains below one
//! entry.

use std::collections::VecDeque;

use crate::debounce::Debouncer;
use crate::event::{SceneEvent, SceneObserver};
use crate::snapshot::Snapshot;

/// Default capacity of each stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Default quiet window before a capture, in milliseconds.
pub const DEFAULT_CAPTURE_DEBOUNCE_MS: u64 = 150;

/// Bounded undo and redo stacks of scene snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
    limit: usize,
    restoring: bool,
    capture: Debouncer,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, DEFAULT_CAPTURE_DEBOUNCE_MS)
    }
}

impl History {
    /// Create empty stacks holding at most `limit` entries each.
    ///
    /// A limit of zero is treated as one.
    #[must_use]
    pub fn new(limit: usize, debounce_ms: u64) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
            restoring: false,
            capture: Debouncer::new(debounce_ms),
        }
    }

    /// Reset both stacks to a single baseline snapshot.
    pub fn seed(&mut self, snapshot: Snapshot) {
        self.undo.clear();
        self.redo.clear();
        self.capture.cancel();
        self.undo.push_back(snapshot);
    }

    /// Record a new state.
    ///
    /// Ignored while restoring, and when it equals the current top.
    /// A recorded state invalidates the redo stack.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if self.restoring {
            return false;
        }
        if self.undo.back() == Some(&snapshot) {
            return false;
        }
        tracing::debug!(bytes = snapshot.len(), depth = self.undo.len() + 1, "history capture");
        self.undo.push_back(snapshot);
        Self::trim(&mut self.undo, self.limit);
        self.redo.clear();
        true
    }

    /// Step back. Returns the snapshot to display, or `None` when only the
    /// baseline remains.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.undo.len() <= 1 {
            return None;
        }
        let current = self.undo.pop_back()?;
        self.redo.push_back(current);
        Self::trim(&mut self.redo, self.limit);
        self.undo.back().cloned()
    }

    /// Step forward. `current` is the state on screen before the redo.
    ///
    /// Returns the snapshot to display, or `None` when the redo stack is
    /// empty.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop_back()?;
        if self.undo.back() != Some(&current) {
            self.undo.push_back(current);
        }
        if self.undo.back() != Some(&next) {
            self.undo.push_back(next.clone());
        }
        Self::trim(&mut self.undo, self.limit);
        Some(next)
    }

    fn trim(stack: &mut VecDeque<Snapshot>, limit: usize) {
        while stack.len() > limit {
            stack.pop_front();
        }
    }

    /// Whether [`History::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    /// Whether [`History::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of entries on the undo stack, baseline included.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of entries on the redo stack.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// The most recently recorded state.
    #[must_use]
    pub fn top(&self) -> Option<&Snapshot> {
        self.undo.back()
    }

    /// Maximum entries per stack.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Suppress capture scheduling while a snapshot is being loaded.
    pub fn begin_restore(&mut self) {
        self.restoring = true;
        self.capture.cancel();
    }

    /// Re-enable capture scheduling.
    pub fn end_restore(&mut self) {
        self.restoring = false;
    }

    /// Whether a restore is in progress.
    #[must_use]
    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// Whether a capture is waiting for its quiet window.
    #[must_use]
    pub fn has_pending_capture(&self) -> bool {
        self.capture.is_pending()
    }

    /// Returns `true` once when a scheduled capture is due.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        self.capture.take_due(now_ms)
    }

    /// Returns `true` if a capture was pending, disarming it.
    pub fn take_pending(&mut self) -> bool {
        self.capture.take_pending()
    }
}

impl SceneObserver for History {
    fn on_event(&mut self, event: &SceneEvent, now_ms: u64) {
        if !self.restoring && event.touches_objects() {
            self.capture.schedule(now_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectId;

    fn snap(s: &str) -> Snapshot {
        Snapshot::from_json(s)
    }

    fn seeded() -> History {
        let mut h = History::default();
        h.seed(snap("0"));
        h
    }

    #[test]
    fn test_duplicate_push_is_ignored() {
        let mut h = seeded();
        assert!(h.push(snap("1")));
        assert!(!h.push(snap("1")));
        assert_eq!(h.undo_len(), 2);
    }

    #[test]
    fn test_undo_with_only_baseline_is_noop() {
        let mut h = seeded();
        assert!(!h.can_undo());
        assert!(h.undo().is_none());
        assert_eq!(h.undo_len(), 1);
    }

    #[test]
    fn test_undo_then_redo_restores_exact_state() {
        let mut h = seeded();
        h.push(snap("1"));
        h.push(snap("2"));

        let shown = h.undo().expect("undo");
        assert_eq!(shown, snap("1"));
        assert!(h.can_redo());

        let again = h.redo(shown).expect("redo");
        assert_eq!(again, snap("2"));
        assert_eq!(h.top(), Some(&snap("2")));
        assert_eq!(h.undo_len(), 3);
        assert!(!h.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut h = seeded();
        h.push(snap("1"));
        h.undo();
        assert_eq!(h.redo_len(), 1);
        h.push(snap("x"));
        assert_eq!(h.redo_len(), 0);
    }

    #[test]
    fn test_redo_keeps_diverged_current_state() {
        let mut h = seeded();
        h.push(snap("1"));
        h.undo();
        // A change made inside the quiet window that was never captured.
        let next = h.redo(snap("0-edited")).expect("redo");
        assert_eq!(next, snap("1"));
        assert_eq!(h.undo_len(), 3);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut h = History::new(100, 0);
        h.seed(snap("seed"));
        for i in 0..150 {
            h.push(snap(&i.to_string()));
        }
        assert_eq!(h.undo_len(), 100);
        assert_eq!(h.top(), Some(&snap("149")));
        // Walk back to the oldest survivor.
        let mut last = None;
        while let Some(s) = h.undo() {
            last = Some(s);
        }
        assert_eq!(last, Some(snap("50")));
        assert_eq!(h.redo_len(), 99);
    }

    #[test]
    fn test_push_ignored_while_restoring() {
        let mut h = seeded();
        h.begin_restore();
        assert!(!h.push(snap("1")));
        h.end_restore();
        assert!(h.push(snap("1")));
    }

    #[test]
    fn test_observer_schedules_only_for_object_changes() {
        let mut h = History::new(10, 150);
        h.on_event(&SceneEvent::SelectionChanged, 0);
        h.on_event(&SceneEvent::ViewportChanged, 0);
        assert!(!h.has_pending_capture());

        h.on_event(&SceneEvent::ObjectAdded(ObjectId::new()), 10);
        assert!(!h.take_due(159));
        assert!(h.take_due(160));
    }

    #[test]
    fn test_observer_ignores_events_during_restore() {
        let mut h = History::new(10, 150);
        h.begin_restore();
        h.on_event(&SceneEvent::ObjectAdded(ObjectId::new()), 0);
        h.end_restore();
        assert!(!h.has_pending_capture());
    }
}
