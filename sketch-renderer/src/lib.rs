//! # Sketchpad Renderer
//!
//! Turns a [`sketch_core::Scene`] seen through a [`sketch_core::Viewport`]
//! into SVG, and with the `export` feature into PNG or JPEG files.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Scene     │──►│ SVG (svg.rs)│──►│ resvg/usvg   │──►│ PNG/JPEG │
//! │ Viewport  │   │             │   │ tiny-skia    │   │ (image)  │
//! └───────────┘   └─────────────┘   └──────────────┘   └──────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod image;
pub mod svg;

#[cfg(feature = "export")]
pub mod export;

pub use error::{RenderError, RenderResult};
pub use crate::image::{import_from_bytes, import_from_data_url};
pub use svg::{escape_xml, render_scene_svg};

#[cfg(feature = "export")]
pub use export::{ExportConfig, ExportFormat, Exported, SceneExporter};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
