//! # Sketchpad Core
//!
//! Editor logic for an infinite drawing canvas: shapes, freehand strokes,
//! text and images on a pannable, zoomable surface. Compiles to WASM.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Editor                     │
//! ├─────────────────────────────────────────────┤
//! │  Scene           │  Input                   │
//! │  - Objects       │  - Tools & gestures      │
//! │  - Selection     │  - Shortcuts             │
//! │  - Events ───────┼──► observers             │
//! ├─────────────────────────────────────────────┤
//! │  History         │  Persistence             │
//! │  - Snapshots     │  - Sanitized scene       │
//! │  - Undo / redo   │  - Viewport, background  │
//! │      debounced by the host clock (tick)     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ```
//! use sketch_core::{Editor, EditorConfig, ManualClock, MemoryStore, Tool};
//!
//! let clock = ManualClock::new(0);
//! let mut editor = Editor::new(
//!     EditorConfig::default(),
//!     Box::new(MemoryStore::new()),
//!     Box::new(clock.clone()),
//! );
//! editor.init();
//!
//! editor.set_tool(Tool::Rect);
//! editor.pointer_down(10.0, 10.0);
//! editor.pointer_move(110.0, 60.0);
//! editor.pointer_up();
//!
//! clock.advance(150);
//! editor.tick();
//! assert!(editor.undo());
//! assert!(editor.scene().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod config;
pub mod debounce;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod history;
pub mod import;
pub mod persist;
pub mod sanitize;
pub mod scene;
pub mod shortcuts;
pub mod snapshot;
pub mod storage;
pub mod theme;
pub mod tools;
pub mod transform;
pub mod viewport;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use actions::{FontFamily, FontSize, Layering};
pub use config::EditorConfig;
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
pub use editor::{Editor, InitOutcome};
pub use element::{Bounds, ObjectId, ObjectKind, ObjectProps, Origin, Paint, SceneObject, TextAlign};
pub use error::{CanvasError, CanvasResult, StorageError, StorageResult};
pub use event::{SceneEvent, SceneObserver};
pub use history::History;
pub use import::ImageImport;
pub use persist::{EditorState, Persister, RestoredState, StorageKeys};
pub use sanitize::{sanitize_scene, SanitizeReport};
pub use scene::{BackgroundImage, Scene};
pub use shortcuts::{EditorAction, ShortcutMap};
pub use snapshot::Snapshot;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use theme::{Theme, ThemePreference};
pub use tools::{StrokeStyle, Tool, ToolController, ToolSettings};
pub use transform::{Matrix, Point};
pub use viewport::{Viewport, ZoomSettings};

#[cfg(feature = "wasm")]
pub use storage::LocalStorage;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
