//! The editor: one scene, one viewport and everything that reacts to them.
//!
//! [`Editor`] owns the scene and routes each queued [`SceneEvent`] to the
//! history, the persister and any subscribed observers. Nothing here runs on
//! its own; the host calls [`Editor::tick`] from its event loop so debounced
//! captures and writes fire once their quiet window has passed.

use crate::actions::{self, FontFamily, FontSize, Layering};
use crate::config::EditorConfig;
use crate::debounce::Clock;
use crate::element::{ObjectId, TextAlign};
use crate::event::{SceneEvent, SceneObserver};
use crate::history::History;
use crate::import::ImageImport;
use crate::persist::{EditorState, Persister};
use crate::sanitize::SanitizeReport;
use crate::scene::Scene;
use crate::shortcuts::{EditorAction, ShortcutMap};
use crate::snapshot::Snapshot;
use crate::storage::KeyValueStore;
use crate::theme::{Theme, ThemePreference};
use crate::tools::{StrokeStyle, Tool, ToolController, ToolSettings};
use crate::transform::{Matrix, Point};
use crate::viewport::Viewport;
use crate::CanvasResult;

/// What [`Editor::init`] found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A stored scene was applied.
    Restored {
        /// Objects in the restored scene.
        objects: usize,
        /// What sanitizing the stored scene changed.
        report: SanitizeReport,
    },
    /// Nothing was stored; the editor starts empty.
    Fresh,
    /// The stored scene could not be read and was left untouched.
    Failed,
}

/// A drawing editor bound to a store and a clock.
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    viewport: Viewport,
    tools: ToolController,
    history: History,
    persister: Persister,
    clock: Box<dyn Clock>,
    observers: Vec<Box<dyn SceneObserver>>,
    theme: Theme,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("objects", &self.scene.len())
            .field("tool", &self.tools.tool())
            .field("theme", &self.theme)
            .field("history", &self.history)
            .field("persister", &self.persister)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Create an editor. Call [`Editor::init`] before handing it input.
    ///
    /// A `System` theme preference resolves to light until the host reports
    /// its scheme through [`Editor::set_theme`].
    #[must_use]
    pub fn new(config: EditorConfig, store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let theme = config.theme.resolve(Theme::Light);
        let scene = Scene::new(Some(theme.default_background().to_string()));
        let viewport = Viewport::new(config.canvas_width, config.canvas_height);
        let tools = ToolController::new(config.tool_defaults.clone());
        let history = History::new(config.history_limit, config.history_debounce_ms);
        let persister = Persister::new(
            store,
            config.storage_keys.clone(),
            config.persist_debounce_ms,
        );
        Self {
            config,
            scene,
            viewport,
            tools,
            history,
            persister,
            clock,
            observers: Vec::new(),
            theme,
        }
    }

    /// Restore persisted state and seed the history with the result.
    ///
    /// Storage writes and history captures are suppressed while the stored
    /// scene is applied. When the stored scene is unreadable the editor
    /// keeps its empty scene and does not overwrite the stored record.
    pub fn init(&mut self) -> InitOutcome {
        self.dispatch();
        self.persister.begin_restore();
        self.history.begin_restore();

        let outcome = match self.persister.load() {
            Ok(Some(restored)) => {
                self.scene.replace_with(restored.scene);
                if let Some(matrix) = restored.viewport {
                    if let Err(e) = self.viewport.set_transform(matrix) {
                        tracing::warn!(error = %e, "ignoring stored viewport");
                    }
                }
                if restored.background.is_some() {
                    self.scene.set_background(restored.background);
                }
                self.tools.apply_selectability(&mut self.scene);
                InitOutcome::Restored {
                    objects: self.scene.len(),
                    report: restored.report,
                }
            }
            Ok(None) => InitOutcome::Fresh,
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore stored scene");
                InitOutcome::Failed
            }
        };

        self.dispatch();
        self.history.end_restore();
        self.persister.end_restore();

        if outcome != InitOutcome::Failed {
            self.persister.save_scene_logged(&self.scene);
        }
        match Snapshot::capture(&self.scene) {
            Ok(snapshot) => self.history.seed(snapshot),
            Err(e) => tracing::warn!(error = %e, "failed to seed history"),
        }

        match &outcome {
            InitOutcome::Restored { objects, report } => {
                tracing::info!(objects, clean = report.is_clean(), "scene restored");
            }
            InitOutcome::Fresh => tracing::info!("no stored scene"),
            InitOutcome::Failed => {}
        }
        outcome
    }

    /// Run debounced work whose quiet window has elapsed.
    ///
    /// Deferred while a pointer gesture is in progress, so a drag produces a
    /// single history entry when it ends.
    pub fn tick(&mut self) {
        self.dispatch();
        if self.tools.is_gesture_active() {
            return;
        }
        let now = self.clock.now_ms();
        if self.history.take_due(now) {
            self.capture();
        }
        let state = self.editor_state();
        self.persister.poll(now, &self.scene, &state);
    }

    /// Run every pending capture and write immediately.
    pub fn flush(&mut self) {
        self.dispatch();
        if self.history.take_pending() {
            self.capture();
        }
        let state = self.editor_state();
        self.persister.flush(&self.scene, &state);
    }

    /// Register an observer for every subsequent scene event.
    pub fn subscribe(&mut self, observer: Box<dyn SceneObserver>) {
        self.observers.push(observer);
    }

    fn dispatch(&mut self) {
        let events = self.scene.drain_events();
        if events.is_empty() {
            return;
        }
        let now = self.clock.now_ms();
        for event in &events {
            self.history.on_event(event, now);
            self.persister.on_event(event, now);
            for observer in &mut self.observers {
                observer.on_event(event, now);
            }
        }
    }

    fn capture(&mut self) {
        match Snapshot::capture(&self.scene) {
            Ok(snapshot) => {
                if self.history.push(snapshot) {
                    tracing::debug!(depth = self.history.undo_len(), "history captured");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to capture history"),
        }
    }

    fn notify_viewport(&mut self) {
        self.scene.notify(SceneEvent::ViewportChanged);
        self.dispatch();
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Step back one snapshot. Returns `false` at the baseline.
    pub fn undo(&mut self) -> bool {
        self.dispatch();
        if self.history.take_pending() {
            self.capture();
        }
        match self.history.undo() {
            Some(snapshot) => self.restore_snapshot(&snapshot),
            None => false,
        }
    }

    /// Step forward one snapshot. Returns `false` when nothing was undone.
    pub fn redo(&mut self) -> bool {
        self.dispatch();
        if self.history.take_pending() {
            self.capture();
        }
        if !self.history.can_redo() {
            return false;
        }
        let current = match Snapshot::capture(&self.scene) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "failed to capture before redo");
                return false;
            }
        };
        match self.history.redo(current) {
            Some(snapshot) => self.restore_snapshot(&snapshot),
            None => false,
        }
    }

    fn restore_snapshot(&mut self, snapshot: &Snapshot) -> bool {
        let scene = match snapshot.restore() {
            Ok(scene) => scene,
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore snapshot");
                return false;
            }
        };
        self.history.begin_restore();
        self.scene.replace_with(scene);
        self.tools.apply_selectability(&mut self.scene);
        self.dispatch();
        self.history.end_restore();
        tracing::debug!(objects = self.scene.len(), "snapshot restored");
        true
    }

    /// Whether [`Editor::undo`] would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`Editor::redo`] would change anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Pointer pressed at a screen position.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.tools
            .pointer_down(&mut self.scene, &self.viewport, Point::new(x, y));
        self.dispatch();
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.tools
            .pointer_move(&mut self.scene, &mut self.viewport, Point::new(x, y));
        self.dispatch();
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.tools.pointer_up(&mut self.scene);
        self.dispatch();
    }

    /// Handle a key press. Returns the action performed, if any.
    pub fn key_down(&mut self, key: &str, ctrl: bool, shift: bool, meta: bool) -> Option<EditorAction> {
        let action = ShortcutMap::resolve(key, ctrl, shift, meta)?;
        self.perform(action);
        Some(action)
    }

    /// Run an editor action.
    pub fn perform(&mut self, action: EditorAction) {
        match action {
            EditorAction::Undo => {
                self.undo();
            }
            EditorAction::Redo => {
                self.redo();
            }
            EditorAction::SelectAll => {
                self.select_all();
            }
            EditorAction::ZoomIn => self.zoom_in(),
            EditorAction::ZoomOut => self.zoom_out(),
            EditorAction::ResetZoom => self.reset_zoom(),
            EditorAction::FitContent => self.fit_content(),
            EditorAction::SetTool(tool) => self.set_tool(tool),
        }
    }

    /// Switch the active tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.set_tool(tool, &mut self.scene);
        self.dispatch();
    }

    // -----------------------------------------------------------------------
    // Canvas
    // -----------------------------------------------------------------------

    /// Set the canvas background color; `None` is transparent.
    pub fn set_background(&mut self, color: Option<String>) {
        self.scene.set_background(color);
        self.dispatch();
    }

    /// Apply a theme preference, resetting the background to its default.
    pub fn set_theme(&mut self, preference: ThemePreference, system: Theme) {
        self.config.theme = preference;
        self.theme = preference.resolve(system);
        self.set_background(Some(self.theme.default_background().to_string()));
    }

    /// Remove every object and reset the viewport.
    pub fn reset_canvas(&mut self) {
        self.scene.clear();
        self.viewport.reset();
        self.scene.notify(SceneEvent::ViewportChanged);
        self.dispatch();
    }

    /// Resize the canvas in screen pixels.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        self.notify_viewport();
    }

    /// One zoom step in, about the canvas center.
    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in(&self.config.zoom);
        self.notify_viewport();
    }

    /// One zoom step out, about the canvas center.
    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out(&self.config.zoom);
        self.notify_viewport();
    }

    /// Back to 100% with no pan.
    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
        self.notify_viewport();
    }

    /// Zoom and pan so all content is visible.
    pub fn fit_content(&mut self) {
        let bounds = self.scene.content_bounds();
        self.viewport.fit_content(bounds, &self.config.zoom);
        self.notify_viewport();
    }

    /// Zoom about a screen point, clamped to the configured range.
    pub fn zoom_to_point(&mut self, x: f64, y: f64, zoom: f64) {
        let zoom = zoom.clamp(self.config.zoom.min, self.config.zoom.max);
        self.viewport.zoom_to_point(Point::new(x, y), zoom);
        self.notify_viewport();
    }

    /// Replace the viewport transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not invertible.
    pub fn set_viewport_transform(&mut self, transform: Matrix) -> CanvasResult<()> {
        self.viewport.set_transform(transform)?;
        self.notify_viewport();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Select every visible object, switching to the select tool.
    pub fn select_all(&mut self) -> usize {
        self.tools.set_tool(Tool::Select, &mut self.scene);
        let count = self.scene.select_all_visible();
        self.dispatch();
        count
    }

    /// Select one object, switching to the select tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn select(&mut self, id: ObjectId) -> CanvasResult<()> {
        self.tools.set_tool(Tool::Select, &mut self.scene);
        let result = self.scene.select_only(id);
        self.dispatch();
        result
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        self.scene.deselect_all();
        self.dispatch();
    }

    /// Place an image centered in the view and select it.
    pub fn import_image(&mut self, image: ImageImport) -> ObjectId {
        let object = image.place(&self.viewport);
        let id = self.scene.add(object);
        self.tools.set_tool(Tool::Select, &mut self.scene);
        self.scene.replace_selection(id);
        self.dispatch();
        id
    }

    /// Replace a text object's content.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or is not text.
    pub fn edit_text(&mut self, id: ObjectId, content: &str) -> CanvasResult<()> {
        let result = actions::edit_text(&mut self.scene, id, content);
        self.dispatch();
        result
    }

    /// Remove the selection.
    pub fn delete_selected(&mut self) -> usize {
        let removed = actions::delete_selected(&mut self.scene);
        self.dispatch();
        removed
    }

    /// Duplicate the selection with the configured offset.
    pub fn duplicate_selected(&mut self) -> Vec<ObjectId> {
        let ids = actions::duplicate_selected(&mut self.scene, self.config.duplicate_offset);
        self.dispatch();
        ids
    }

    /// Reorder the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected object vanished mid-operation.
    pub fn layer_selected(&mut self, op: Layering) -> CanvasResult<usize> {
        let result = actions::layer_selected(&mut self.scene, op);
        self.dispatch();
        result
    }

    /// Set the fill of the selection and of new shapes.
    pub fn set_fill(&mut self, color: &str) -> usize {
        let n = actions::set_fill(&mut self.scene, self.tools.settings_mut(), color);
        self.dispatch();
        n
    }

    /// Set the stroke of the selection and of new shapes.
    pub fn set_stroke(&mut self, color: &str) -> usize {
        let n = actions::set_stroke(&mut self.scene, self.tools.settings_mut(), color);
        self.dispatch();
        n
    }

    /// Set the stroke width of the selection and of new shapes.
    pub fn set_stroke_width(&mut self, width: f64) -> usize {
        let n = actions::set_stroke_width(&mut self.scene, self.tools.settings_mut(), width);
        self.dispatch();
        n
    }

    /// Set the opacity of the selection and of new shapes.
    pub fn set_opacity(&mut self, opacity: f64) -> usize {
        let n = actions::set_opacity(&mut self.scene, self.tools.settings_mut(), opacity);
        self.dispatch();
        n
    }

    /// Set the corner radius of selected rectangles and of new ones.
    pub fn set_corner_radius(&mut self, radius: f64) -> usize {
        let n = actions::set_corner_radius(&mut self.scene, self.tools.settings_mut(), radius);
        self.dispatch();
        n
    }

    /// Set the dash pattern of the selection and of new shapes.
    pub fn set_stroke_style(&mut self, style: StrokeStyle) -> usize {
        let n = actions::set_stroke_style(&mut self.scene, self.tools.settings_mut(), style);
        self.dispatch();
        n
    }

    /// Set the font family of selected text.
    pub fn set_font_family(&mut self, family: FontFamily) -> usize {
        let n = actions::set_font_family(&mut self.scene, family);
        self.dispatch();
        n
    }

    /// Set the font size of selected text.
    pub fn set_font_size(&mut self, size: FontSize) -> usize {
        let n = actions::set_font_size(&mut self.scene, size);
        self.dispatch();
        n
    }

    /// Set the alignment of selected text.
    pub fn set_text_align(&mut self, align: TextAlign) -> usize {
        let n = actions::set_text_align(&mut self.scene, align);
        self.dispatch();
        n
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The viewport.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    /// Defaults applied to new shapes.
    #[must_use]
    pub fn tool_settings(&self) -> &ToolSettings {
        self.tools.settings()
    }

    /// Whether a pointer gesture is in progress.
    #[must_use]
    pub fn is_gesture_active(&self) -> bool {
        self.tools.is_gesture_active()
    }

    /// Points of the stroke being drawn, for overlay rendering.
    #[must_use]
    pub fn freehand_preview(&self) -> Option<&[Point]> {
        self.tools.freehand_preview()
    }

    /// The undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The persister.
    #[must_use]
    pub fn persister(&self) -> &Persister {
        &self.persister
    }

    /// The resolved theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The view state that is persisted next to the scene.
    #[must_use]
    pub fn editor_state(&self) -> EditorState {
        EditorState {
            viewport_transform: self.viewport.transform().0,
            background_color: self.scene.background.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::debounce::ManualClock;
    use crate::element::ObjectKind;
    use crate::storage::MemoryStore;

    fn editor_with(store: &MemoryStore, clock: &ManualClock) -> Editor {
        let mut editor = Editor::new(
            EditorConfig::default(),
            Box::new(store.clone()),
            Box::new(clock.clone()),
        );
        editor.init();
        editor
    }

    fn draw_rect(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
        editor.set_tool(Tool::Rect);
        editor.pointer_down(from.0, from.1);
        editor.pointer_move(to.0, to.1);
        editor.pointer_up();
    }

    #[test]
    fn test_fresh_init_seeds_history_and_storage() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = Editor::new(
            EditorConfig::default(),
            Box::new(store.clone()),
            Box::new(clock.clone()),
        );
        assert_eq!(editor.init(), InitOutcome::Fresh);
        assert_eq!(editor.history().undo_len(), 1);
        assert!(!editor.can_undo());
        assert!(store.get("sketchpad:scene").expect("get").is_some());
    }

    #[test]
    fn test_draw_then_undo_redo() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);

        draw_rect(&mut editor, (10.0, 10.0), (60.0, 40.0));
        assert_eq!(editor.scene().len(), 1);
        assert_eq!(editor.tool(), Tool::Select);

        clock.advance(150);
        editor.tick();
        assert_eq!(editor.history().undo_len(), 2);

        assert!(editor.undo());
        assert!(editor.scene().is_empty());
        assert!(editor.can_redo());

        assert!(editor.redo());
        assert_eq!(editor.scene().len(), 1);
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_undo_flushes_pending_capture() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);

        draw_rect(&mut editor, (0.0, 0.0), (20.0, 20.0));
        clock.advance(10);
        // still inside the quiet window
        assert!(editor.undo());
        assert!(editor.scene().is_empty());
        assert!(editor.redo());
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn test_capture_waits_for_gesture_end() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);

        editor.set_tool(Tool::Rect);
        editor.pointer_down(0.0, 0.0);
        editor.pointer_move(30.0, 30.0);
        clock.advance(500);
        editor.tick();
        assert_eq!(editor.history().undo_len(), 1);

        editor.pointer_up();
        clock.advance(150);
        editor.tick();
        assert_eq!(editor.history().undo_len(), 2);
    }

    #[test]
    fn test_writes_are_debounced() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);
        let seeded = store.get("sketchpad:scene").expect("get");

        draw_rect(&mut editor, (0.0, 0.0), (20.0, 20.0));
        clock.advance(200);
        editor.tick();
        assert_eq!(store.get("sketchpad:scene").expect("get"), seeded);

        clock.advance(50);
        editor.tick();
        let saved = store.get("sketchpad:scene").expect("get").expect("scene");
        assert_eq!(Scene::from_json(&saved).expect("parse").len(), 1);
    }

    #[test]
    fn test_restart_restores_scene_and_view() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        {
            let mut editor = editor_with(&store, &clock);
            draw_rect(&mut editor, (0.0, 0.0), (20.0, 20.0));
            editor.zoom_in();
            editor.set_background(Some("#f5faff".to_string()));
            editor.flush();
        }

        let mut editor = Editor::new(
            EditorConfig::default(),
            Box::new(store.clone()),
            Box::new(clock.clone()),
        );
        match editor.init() {
            InitOutcome::Restored { objects, report } => {
                assert_eq!(objects, 1);
                assert!(report.is_clean());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!((editor.viewport().zoom() - 1.2).abs() < 1e-12);
        assert_eq!(editor.scene().background.as_deref(), Some("#f5faff"));
        assert!(!editor.can_undo());
        assert!(!editor.persister().has_pending_writes());
    }

    #[test]
    fn test_unreadable_scene_is_not_overwritten() {
        let mut store = MemoryStore::new();
        store.set("sketchpad:scene", "{not json").expect("set");
        let clock = ManualClock::new(0);
        let mut editor = Editor::new(
            EditorConfig::default(),
            Box::new(store.clone()),
            Box::new(clock),
        );
        assert_eq!(editor.init(), InitOutcome::Failed);
        assert!(editor.scene().is_empty());
        assert_eq!(
            store.get("sketchpad:scene").expect("get").as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_storage_failure_leaves_editor_usable() {
        let store = MemoryStore::with_quota(8);
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);

        draw_rect(&mut editor, (0.0, 0.0), (20.0, 20.0));
        clock.advance(300);
        editor.tick();
        assert_eq!(editor.scene().len(), 1);
        assert!(editor.undo());
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn test_shortcuts_drive_editor() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);

        assert_eq!(
            editor.key_down("r", false, false, false),
            Some(EditorAction::SetTool(Tool::Rect))
        );
        assert_eq!(editor.tool(), Tool::Rect);
        editor.key_down("=", true, false, false);
        assert!((editor.viewport().zoom() - 1.2).abs() < 1e-12);
        editor.key_down("0", false, false, true);
        assert!((editor.viewport().zoom() - 1.0).abs() < 1e-12);
        assert_eq!(editor.key_down("q", false, false, false), None);
    }

    #[test]
    fn test_theme_switch_resets_background() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);

        editor.set_background(Some("#fffce8".to_string()));
        editor.set_theme(ThemePreference::System, Theme::Dark);
        assert_eq!(editor.theme(), Theme::Dark);
        assert_eq!(editor.scene().background.as_deref(), Some("#020618"));
    }

    #[test]
    fn test_observers_see_events() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.subscribe(Box::new(move |e: &SceneEvent, _: u64| {
            sink.borrow_mut().push(*e);
        }));

        draw_rect(&mut editor, (0.0, 0.0), (20.0, 20.0));
        let events = seen.borrow();
        assert!(matches!(events.first(), Some(SceneEvent::ObjectAdded(_))));
        assert!(events.iter().any(|e| matches!(e, SceneEvent::ObjectModified(_))));
    }

    #[test]
    fn test_import_selects_image() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);
        editor.set_tool(Tool::Image);

        let id = editor.import_image(ImageImport::embedded("data:,", 10.0, 10.0));
        assert_eq!(editor.tool(), Tool::Select);
        assert_eq!(editor.scene().selected_ids(), &[id]);
        assert!(matches!(
            editor.scene().get(id).map(|o| &o.kind),
            Some(ObjectKind::Image { .. })
        ));
    }

    #[test]
    fn test_reset_canvas() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let mut editor = editor_with(&store, &clock);
        draw_rect(&mut editor, (0.0, 0.0), (20.0, 20.0));
        clock.advance(150);
        editor.tick();
        editor.zoom_in();

        editor.reset_canvas();
        assert!(editor.scene().is_empty());
        assert_eq!(editor.viewport().transform(), Matrix::default());
        clock.advance(150);
        editor.tick();
        assert!(editor.undo());
        assert_eq!(editor.scene().len(), 1);
    }
}
