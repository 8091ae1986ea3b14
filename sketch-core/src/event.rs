//! Change notifications emitted by scene and editor mutations.
//!
//! Every mutation site pushes a [`SceneEvent`]; the editor drains them and
//! hands each one to the history, the persister and any registered
//! [`SceneObserver`].

use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// A change to the scene or the editor's view of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "id", rename_all = "snake_case")]
pub enum SceneEvent {
    /// An object was added.
    ObjectAdded(ObjectId),
    /// An object's content or properties changed.
    ObjectModified(ObjectId),
    /// An object was removed.
    ObjectRemoved(ObjectId),
    /// A freehand stroke was completed.
    PathCreated(ObjectId),
    /// The whole scene was replaced (undo, redo, startup restore).
    SceneLoaded,
    /// The canvas background changed.
    BackgroundChanged,
    /// The viewport transform or canvas size changed.
    ViewportChanged,
    /// The selection changed.
    SelectionChanged,
}

impl SceneEvent {
    /// Whether the event changes the serialized scene content.
    #[must_use]
    pub const fn touches_objects(&self) -> bool {
        matches!(
            self,
            Self::ObjectAdded(_)
                | Self::ObjectModified(_)
                | Self::ObjectRemoved(_)
                | Self::PathCreated(_)
        )
    }

    /// Whether the event changes what the editor-state record holds.
    #[must_use]
    pub const fn touches_editor_state(&self) -> bool {
        matches!(self, Self::BackgroundChanged | Self::ViewportChanged)
    }
}

/// Subscriber to scene change notifications.
pub trait SceneObserver {
    /// Called once per event, in emission order, with the host clock time.
    fn on_event(&mut self, event: &SceneEvent, now_ms: u64);
}

impl<F> SceneObserver for F
where
    F: FnMut(&SceneEvent, u64),
{
    fn on_event(&mut self, event: &SceneEvent, now_ms: u64) {
        self(event, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_classification() {
        let id = ObjectId::new();
        assert!(SceneEvent::ObjectAdded(id).touches_objects());
        assert!(SceneEvent::PathCreated(id).touches_objects());
        assert!(!SceneEvent::SceneLoaded.touches_objects());
        assert!(!SceneEvent::SelectionChanged.touches_objects());
        assert!(SceneEvent::ViewportChanged.touches_editor_state());
        assert!(!SceneEvent::ObjectRemoved(id).touches_editor_state());
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |e: &SceneEvent, now: u64| seen.push((*e, now));
            observer.on_event(&SceneEvent::BackgroundChanged, 7);
        }
        assert_eq!(seen, vec![(SceneEvent::BackgroundChanged, 7)]);
    }
}
