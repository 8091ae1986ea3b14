//! Local persistence of the scene and the editor state.
//!
//! Two records live in a [`KeyValueStore`]: the sanitized scene JSON and a
//! small editor-state record holding the viewport transform and background
//! color. Writes are debounced; reads happen once at startup.
//!
//! All failures here are recoverable. The editor logs them and carries on
//! with whatever state it already has.

use serde::{Deserialize, Serialize};

use crate::debounce::Debouncer;
use crate::event::{SceneEvent, SceneObserver};
use crate::sanitize::{sanitize_scene, SanitizeReport};
use crate::scene::Scene;
use crate::storage::KeyValueStore;
use crate::transform::Matrix;
use crate::viewport::Viewport;
use crate::CanvasResult;

/// Default quiet window before a write, in milliseconds.
pub const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 250;

/// Default key of the scene record.
pub const DEFAULT_SCENE_KEY: &str = "sketchpad:scene";

/// Default key of the editor-state record.
pub const DEFAULT_EDITOR_KEY: &str = "sketchpad:editor";

/// Keys the two records are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Scene record key.
    pub scene: String,
    /// Editor-state record key.
    pub editor: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            scene: DEFAULT_SCENE_KEY.to_string(),
            editor: DEFAULT_EDITOR_KEY.to_string(),
        }
    }
}

/// View state persisted next to the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    /// Scene-to-screen transform `[a, b, c, d, e, f]`.
    pub viewport_transform: [f64; 6],
    /// Canvas background color; `None` is transparent.
    pub background_color: Option<String>,
}

/// Editor-state record as read back, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEditorState {
    #[serde(default, alias = "vpt")]
    viewport_transform: Option<serde_json::Value>,
    #[serde(default, alias = "bgColor")]
    background_color: Option<String>,
}

impl StoredEditorState {
    /// The stored transform, if it is exactly six finite numbers.
    fn viewport(&self) -> Option<Matrix> {
        let values = self.viewport_transform.as_ref()?.as_array()?;
        let numbers: Option<Vec<f64>> = values.iter().map(serde_json::Value::as_f64).collect();
        Viewport::matrix_from_slice(&numbers?).ok()
    }
}

/// Everything read back from storage at startup.
#[derive(Debug, Clone)]
pub struct RestoredState {
    /// The sanitized scene.
    pub scene: Scene,
    /// What sanitizing the stored scene changed.
    pub report: SanitizeReport,
    /// Stored viewport transform, if present and valid.
    pub viewport: Option<Matrix>,
    /// Stored background color, if present and not null.
    pub background: Option<String>,
}

/// Debounced writer and startup reader for the two records.
pub struct Persister {
    store: Box<dyn KeyValueStore>,
    keys: StorageKeys,
    scene_save: Debouncer,
    editor_save: Debouncer,
    restoring: bool,
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("keys", &self.keys)
            .field("scene_save", &self.scene_save)
            .field("editor_save", &self.editor_save)
            .field("restoring", &self.restoring)
            .finish_non_exhaustive()
    }
}

impl Persister {
    /// Create a persister writing to `store`.
    #[must_use]
    pub fn new(store: Box<dyn KeyValueStore>, keys: StorageKeys, debounce_ms: u64) -> Self {
        Self {
            store,
            keys,
            scene_save: Debouncer::new(debounce_ms),
            editor_save: Debouncer::new(debounce_ms),
            restoring: false,
        }
    }

    /// Storage keys in use.
    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Write a sanitized copy of `scene` now. Skipped while restoring.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn save_scene(&mut self, scene: &Scene) -> CanvasResult<()> {
        if self.restoring {
            return Ok(());
        }
        let mut copy = scene.clone();
        sanitize_scene(&mut copy);
        let json = copy.to_json()?;
        self.store.set(&self.keys.scene, &json)?;
        tracing::debug!(key = %self.keys.scene, bytes = json.len(), "scene saved");
        Ok(())
    }

    /// Write the editor state now. Skipped while restoring.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn save_editor(&mut self, state: &EditorState) -> CanvasResult<()> {
        if self.restoring {
            return Ok(());
        }
        let json = serde_json::to_string(state)?;
        self.store.set(&self.keys.editor, &json)?;
        tracing::debug!(key = %self.keys.editor, "editor state saved");
        Ok(())
    }

    /// Read both records.
    ///
    /// Returns `Ok(None)` when no scene has been stored. A missing or
    /// malformed editor-state record only drops the view state.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene record cannot be read or parsed.
    pub fn load(&self) -> CanvasResult<Option<RestoredState>> {
        let Some(json) = self.store.get(&self.keys.scene)? else {
            return Ok(None);
        };
        let mut scene = Scene::from_json(&json)?;
        let report = sanitize_scene(&mut scene);

        let editor = match self.store.get(&self.keys.editor) {
            Ok(Some(raw)) => serde_json::from_str::<StoredEditorState>(&raw)
                .map_err(|e| tracing::warn!(error = %e, "ignoring malformed editor state"))
                .unwrap_or_default(),
            Ok(None) => StoredEditorState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "editor state unreadable");
                StoredEditorState::default()
            }
        };

        Ok(Some(RestoredState {
            viewport: editor.viewport(),
            background: editor.background_color,
            scene,
            report,
        }))
    }

    /// Suppress writes while a stored scene is being applied.
    pub fn begin_restore(&mut self) {
        self.restoring = true;
    }

    /// Re-enable writes.
    pub fn end_restore(&mut self) {
        self.restoring = false;
        self.scene_save.cancel();
        self.editor_save.cancel();
    }

    /// Whether a restore is in progress.
    #[must_use]
    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// Whether a write is waiting for its quiet window.
    #[must_use]
    pub fn has_pending_writes(&self) -> bool {
        self.scene_save.is_pending() || self.editor_save.is_pending()
    }

    /// Perform writes whose quiet window has elapsed.
    pub fn poll(&mut self, now_ms: u64, scene: &Scene, state: &EditorState) {
        if self.scene_save.take_due(now_ms) {
            self.save_scene_logged(scene);
        }
        if self.editor_save.take_due(now_ms) {
            self.save_editor_logged(state);
        }
    }

    /// Perform every pending write immediately.
    pub fn flush(&mut self, scene: &Scene, state: &EditorState) {
        if self.scene_save.take_pending() {
            self.save_scene_logged(scene);
        }
        if self.editor_save.take_pending() {
            self.save_editor_logged(state);
        }
    }

    pub(crate) fn save_scene_logged(&mut self, scene: &Scene) {
        if let Err(e) = self.save_scene(scene) {
            tracing::warn!(error = %e, "failed to persist scene");
        }
    }

    fn save_editor_logged(&mut self, state: &EditorState) {
        if let Err(e) = self.save_editor(state) {
            tracing::warn!(error = %e, "failed to persist editor state");
        }
    }
}

impl SceneObserver for Persister {
    fn on_event(&mut self, event: &SceneEvent, now_ms: u64) {
        if self.restoring {
            return;
        }
        if event.touches_objects() || matches!(event, SceneEvent::SceneLoaded) {
            self.scene_save.schedule(now_ms);
        }
        if event.touches_editor_state() {
            self.editor_save.schedule(now_ms);
        }
    }
}
