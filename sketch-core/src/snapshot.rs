//! Immutable serialized captures of a scene.

use std::fmt;
use std::rc::Rc;

use crate::{CanvasResult, Scene};

/// A serialized, immutable capture of a scene.
///
/// Equality is textual. Clones share the same buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot(Rc<str>);

impl Snapshot {
    /// Serialize the scene as it is now.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn capture(scene: &Scene) -> CanvasResult<Self> {
        Ok(Self(Rc::from(scene.to_json()?)))
    }

    /// Wrap an already serialized scene.
    #[must_use]
    pub fn from_json(json: &str) -> Self {
        Self(Rc::from(json))
    }

    /// Rebuild the scene this snapshot was taken from.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not a valid scene.
    pub fn restore(&self) -> CanvasResult<Scene> {
        Scene::from_json(&self.0)
    }

    /// The serialized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the serialized text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the serialized text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot").field("bytes", &self.0.len()).finish()
    }
}
