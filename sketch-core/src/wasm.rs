//! WebAssembly bindings for sketch-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! The host drives [`WasmEditor::tick`] from `requestAnimationFrame` or a
//! timer and redraws from [`WasmEditor::get_scene_json`].

use wasm_bindgen::prelude::*;

use crate::actions::{FontFamily, FontSize};
use crate::debounce::{Clock, SystemClock};
use crate::element::{ObjectId, TextAlign};
use crate::import::ImageImport;
use crate::storage::{KeyValueStore, LocalStorage, MemoryStore};
use crate::theme::{Theme, ThemePreference};
use crate::tools::{StrokeStyle, Tool};
use crate::{Editor, EditorConfig};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor backed by `window.localStorage` and restore it.
    ///
    /// Falls back to an in-memory store when local storage is unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error string if `config_json` is not a valid config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmEditor, String> {
        let config = parse_config(config_json.as_deref())?;
        let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to in-memory storage");
                Box::new(MemoryStore::new())
            }
        };
        Ok(Self::with_store(config, store, Box::new(SystemClock)))
    }

    /// Run due debounced work.
    pub fn tick(&mut self) {
        self.editor.tick();
    }

    /// Run all pending work now; call from `pagehide`.
    pub fn flush(&mut self) {
        self.editor.flush();
    }

    /// Pointer pressed at canvas pixel coordinates.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.editor.pointer_down(x, y);
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.editor.pointer_move(x, y);
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.editor.pointer_up();
    }

    /// Handle a `keydown`. Returns `true` if the host should call
    /// `preventDefault`.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, ctrl: bool, shift: bool, meta: bool) -> bool {
        self.editor.key_down(key, ctrl, shift, meta).is_some()
    }

    /// Step back in history.
    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    /// Step forward in history.
    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Switch tools by name.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown tool.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> Result<(), String> {
        let tool: Tool = name.parse().map_err(|e: crate::CanvasError| e.to_string())?;
        self.editor.set_tool(tool);
        Ok(())
    }

    /// Name of the active tool.
    #[must_use]
    pub fn tool(&self) -> String {
        self.editor.tool().to_string()
    }

    /// CSS cursor for the active tool.
    #[must_use]
    pub fn cursor(&self) -> String {
        self.editor.tool().cursor().to_string()
    }

    /// Set the canvas background; `undefined` is transparent.
    #[wasm_bindgen(js_name = setBackground)]
    pub fn set_background(&mut self, color: Option<String>) {
        self.editor.set_background(color);
    }

    /// Apply `"light"`, `"dark"` or `"system"`.
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&mut self, preference: &str, system_dark: bool) {
        let preference = match preference {
            "light" => ThemePreference::Light,
            "dark" => ThemePreference::Dark,
            _ => ThemePreference::System,
        };
        let system = if system_dark { Theme::Dark } else { Theme::Light };
        self.editor.set_theme(preference, system);
    }

    /// Zoom in one step.
    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) {
        self.editor.zoom_in();
    }

    /// Zoom out one step.
    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) {
        self.editor.zoom_out();
    }

    /// Back to 100%.
    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&mut self) {
        self.editor.reset_zoom();
    }

    /// Fit all content in view.
    #[wasm_bindgen(js_name = fitContent)]
    pub fn fit_content(&mut self) {
        self.editor.fit_content();
    }

    /// Wheel zoom about a canvas point.
    #[wasm_bindgen(js_name = zoomToPoint)]
    pub fn zoom_to_point(&mut self, x: f64, y: f64, zoom: f64) {
        self.editor.zoom_to_point(x, y, zoom);
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.editor.viewport().zoom()
    }

    /// Resize the canvas.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.editor.resize(width, height);
    }

    /// Clear the canvas and view.
    #[wasm_bindgen(js_name = resetCanvas)]
    pub fn reset_canvas(&mut self) {
        self.editor.reset_canvas();
    }

    /// The scene as JSON.
    #[wasm_bindgen(js_name = getSceneJson)]
    #[must_use]
    pub fn get_scene_json(&self) -> String {
        self.editor.scene().to_json().unwrap_or_default()
    }

    /// The viewport transform `[a, b, c, d, e, f]`.
    #[wasm_bindgen(js_name = getViewportTransform)]
    #[must_use]
    pub fn get_viewport_transform(&self) -> Vec<f64> {
        self.editor.viewport().transform().0.to_vec()
    }

    /// IDs of the selected objects.
    #[wasm_bindgen(js_name = getSelection)]
    #[must_use]
    pub fn get_selection(&self) -> Vec<String> {
        self.editor
            .scene()
            .selected_ids()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Points of the stroke in progress as `[x0, y0, x1, y1, ...]`.
    #[wasm_bindgen(js_name = getFreehandPreview)]
    #[must_use]
    pub fn get_freehand_preview(&self) -> Vec<f64> {
        self.editor
            .freehand_preview()
            .map(|points| points.iter().flat_map(|p| [p.x, p.y]).collect())
            .unwrap_or_default()
    }

    /// Place an image. Returns its ID.
    #[wasm_bindgen(js_name = importImage)]
    pub fn import_image(&mut self, src: String, data_url: Option<String>, width: f64, height: f64) -> String {
        let id = self.editor.import_image(ImageImport {
            src,
            data_url,
            width,
            height,
        });
        id.to_string()
    }

    /// Replace a text object's content.
    ///
    /// # Errors
    ///
    /// Returns an error string if the ID is malformed or not a text object.
    #[wasm_bindgen(js_name = editText)]
    pub fn edit_text(&mut self, id: &str, content: &str) -> Result<(), String> {
        let id = ObjectId::parse(id).map_err(|e| e.to_string())?;
        self.editor.edit_text(id, content).map_err(|e| e.to_string())
    }

    /// Delete the selection.
    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> usize {
        self.editor.delete_selected()
    }

    /// Duplicate the selection.
    #[wasm_bindgen(js_name = duplicateSelected)]
    pub fn duplicate_selected(&mut self) -> usize {
        self.editor.duplicate_selected().len()
    }

    /// Select everything visible.
    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) -> usize {
        self.editor.select_all()
    }

    /// Set the fill color.
    #[wasm_bindgen(js_name = setFill)]
    pub fn set_fill(&mut self, color: &str) {
        self.editor.set_fill(color);
    }

    /// Set the stroke color.
    #[wasm_bindgen(js_name = setStroke)]
    pub fn set_stroke(&mut self, color: &str) {
        self.editor.set_stroke(color);
    }

    /// Set the stroke width.
    #[wasm_bindgen(js_name = setStrokeWidth)]
    pub fn set_stroke_width(&mut self, width: f64) {
        self.editor.set_stroke_width(width);
    }

    /// Set the opacity.
    #[wasm_bindgen(js_name = setOpacity)]
    pub fn set_opacity(&mut self, opacity: f64) {
        self.editor.set_opacity(opacity);
    }

    /// Set the rectangle corner radius.
    #[wasm_bindgen(js_name = setCornerRadius)]
    pub fn set_corner_radius(&mut self, radius: f64) {
        self.editor.set_corner_radius(radius);
    }

    /// Set `"solid"`, `"dashed"` or `"dotted"`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown style.
    #[wasm_bindgen(js_name = setStrokeStyle)]
    pub fn set_stroke_style(&mut self, style: &str) -> Result<(), String> {
        let style: StrokeStyle = style.parse().map_err(|e: crate::CanvasError| e.to_string())?;
        self.editor.set_stroke_style(style);
        Ok(())
    }

    /// Set `"hand"`, `"normal"` or `"code"`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown family.
    #[wasm_bindgen(js_name = setFontFamily)]
    pub fn set_font_family(&mut self, family: &str) -> Result<(), String> {
        let family: FontFamily = family.parse().map_err(|e: crate::CanvasError| e.to_string())?;
        self.editor.set_font_family(family);
        Ok(())
    }

    /// Set `"sm"`, `"md"`, `"lg"` or `"xl"`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown size.
    #[wasm_bindgen(js_name = setFontSize)]
    pub fn set_font_size(&mut self, size: &str) -> Result<(), String> {
        let size: FontSize = size.parse().map_err(|e: crate::CanvasError| e.to_string())?;
        self.editor.set_font_size(size);
        Ok(())
    }

    /// Set `"left"`, `"center"` or `"right"`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown alignment.
    #[wasm_bindgen(js_name = setTextAlign)]
    pub fn set_text_align(&mut self, align: &str) -> Result<(), String> {
        let align = match align {
            "left" => TextAlign::Left,
            "center" => TextAlign::Center,
            "right" => TextAlign::Right,
            other => return Err(format!("unknown text alignment: {other}")),
        };
        self.editor.set_text_align(align);
        Ok(())
    }
}

impl WasmEditor {
    fn with_store(config: EditorConfig, store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let mut editor = Editor::new(config, store, clock);
        editor.init();
        Self { editor }
    }
}

fn parse_config(json: Option<&str>) -> Result<EditorConfig, String> {
    match json {
        Some(json) => EditorConfig::from_json(json).map_err(|e| e.to_string()),
        None => Ok(EditorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::ManualClock;

    fn editor() -> WasmEditor {
        WasmEditor::with_store(
            EditorConfig::default(),
            Box::new(MemoryStore::new()),
            Box::new(ManualClock::new(0)),
        )
    }

    #[test]
    fn set_tool_by_name() {
        let mut editor = editor();
        assert!(editor.set_tool("circle").is_ok());
        assert_eq!(editor.tool(), "circle");
        assert!(editor.set_tool("lasso").is_err());
    }

    #[test]
    fn scene_json_is_valid() {
        let editor = editor();
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(&editor.get_scene_json());
        assert!(parsed.is_ok());
    }

    #[test]
    fn config_json_is_validated() {
        assert!(parse_config(None).is_ok());
        assert!(parse_config(Some(r#"{"history_limit":5}"#)).is_ok());
        assert!(parse_config(Some("{")).is_err());
    }

    #[test]
    fn edit_text_rejects_bad_id() {
        let mut editor = editor();
        assert!(editor.edit_text("nope", "hi").is_err());
    }

    #[test]
    fn viewport_transform_has_six_entries() {
        let mut editor = editor();
        editor.zoom_in();
        let m = editor.get_viewport_transform();
        assert_eq!(m.len(), 6);
        assert!((m[0] - 1.2).abs() < 1e-12);
    }
}
