//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::history::{DEFAULT_CAPTURE_DEBOUNCE_MS, DEFAULT_HISTORY_LIMIT};
use crate::persist::{StorageKeys, DEFAULT_PERSIST_DEBOUNCE_MS};
use crate::theme::ThemePreference;
use crate::tools::ToolSettings;
use crate::viewport::ZoomSettings;
use crate::CanvasResult;

/// Offset of the first duplicate from its source.
pub const DEFAULT_DUPLICATE_OFFSET: f64 = 20.0;

/// Tunables for an [`Editor`](crate::Editor).
///
/// Every field has a default, so a partial JSON object is a valid config.
///
/// ```
/// use sketch_core::EditorConfig;
///
/// let config = EditorConfig::from_json(r#"{ "history_limit": 20 }"#).unwrap();
/// assert_eq!(config.history_limit, 20);
/// assert_eq!(config.history_debounce_ms, 150);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum snapshots per history stack.
    pub history_limit: usize,
    /// Quiet window before a history capture.
    pub history_debounce_ms: u64,
    /// Quiet window before a storage write.
    pub persist_debounce_ms: u64,
    /// Storage keys.
    pub storage_keys: StorageKeys,
    /// Zoom stepping and fitting.
    pub zoom: ZoomSettings,
    /// Offset of the first duplicate.
    pub duplicate_offset: f64,
    /// Initial canvas width in screen pixels.
    pub canvas_width: f64,
    /// Initial canvas height in screen pixels.
    pub canvas_height: f64,
    /// Requested theme.
    pub theme: ThemePreference,
    /// Drawing defaults.
    pub tool_defaults: ToolSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_debounce_ms: DEFAULT_CAPTURE_DEBOUNCE_MS,
            persist_debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
            storage_keys: StorageKeys::default(),
            zoom: ZoomSettings::default(),
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            canvas_width: 800.0,
            canvas_height: 600.0,
            theme: ThemePreference::System,
            tool_defaults: ToolSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong
    /// type.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
