//! Scene export to image formats.
//!
//! Renders the visible canvas to PNG, JPEG or SVG using an SVG intermediate
//! representation and the resvg/tiny-skia rasterization pipeline.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use sketch_core::theme::DEFAULT_LIGHT_BG;
use sketch_core::{Scene, Theme, Viewport};

use crate::error::{RenderError, RenderResult};
use crate::svg::render_scene_svg;

/// Default output scale relative to the on-screen canvas.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Default download name, without extension.
pub const DEFAULT_EXPORT_NAME: &str = "canvas";

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG vector graphics (returns the SVG XML string as UTF-8 bytes).
    Svg,
}

impl ExportFormat {
    /// File extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Svg => "svg",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            other => Err(RenderError::Export(format!("unsupported format: {other}"))),
        }
    }
}

/// Configuration for scene export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output scale relative to the canvas size.
    pub multiplier: f64,
    /// Fill behind the scene; `None` exports a transparent background.
    pub background: Option<String>,
    /// JPEG quality 1-100.
    pub jpeg_quality: u8,
    /// File name without extension.
    pub name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
            background: Some(DEFAULT_LIGHT_BG.to_string()),
            jpeg_quality: 92,
            name: DEFAULT_EXPORT_NAME.to_string(),
        }
    }
}

impl ExportConfig {
    /// Defaults with the theme's canvas background.
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        Self {
            background: Some(theme.default_background().to_string()),
            ..Self::default()
        }
    }

    /// Same config with a transparent background.
    #[must_use]
    pub fn transparent(mut self) -> Self {
        self.background = None;
        self
    }

    /// Background actually painted for `format`.
    ///
    /// JPEG has no alpha channel, so a transparent request falls back to the
    /// light default.
    #[must_use]
    pub fn effective_background(&self, format: ExportFormat) -> Option<&str> {
        match (format, self.background.as_deref()) {
            (ExportFormat::Jpeg, None) => Some(DEFAULT_LIGHT_BG),
            (_, bg) => bg,
        }
    }
}

/// An encoded export.
#[derive(Debug, Clone)]
pub struct Exported {
    /// Output format.
    pub format: ExportFormat,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Suggested download name, `name.extension`.
    pub file_name: String,
}

impl Exported {
    /// The bytes as a `data:` URL.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Exports the visible canvas to image formats.
///
/// The scene's own background is not used; the config decides the fill so
/// the export can differ from what is on screen.
pub struct SceneExporter {
    config: ExportConfig,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export the canvas to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be rendered or encoded.
    pub fn export(
        &self,
        scene: &Scene,
        viewport: &Viewport,
        format: ExportFormat,
    ) -> RenderResult<Exported> {
        let svg = self.render_to_svg(scene, viewport, format);
        let (bytes, width, height) = match format {
            ExportFormat::Svg => {
                let (w, h) = self.output_dimensions(viewport);
                (svg.into_bytes(), w, h)
            }
            ExportFormat::Png => {
                let pixmap = rasterize_svg(&svg)?;
                let png = pixmap
                    .encode_png()
                    .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
                (png, pixmap.width(), pixmap.height())
            }
            ExportFormat::Jpeg => {
                let pixmap = rasterize_svg(&svg)?;
                let bg = self
                    .config
                    .effective_background(format)
                    .and_then(parse_hex_color)
                    .unwrap_or([255, 255, 255]);
                let jpeg = self.encode_jpeg(&pixmap, bg)?;
                (jpeg, pixmap.width(), pixmap.height())
            }
        };
        tracing::debug!(%format, width, height, bytes = bytes.len(), "canvas exported");
        Ok(Exported {
            format,
            bytes,
            width,
            height,
            file_name: format!("{}.{}", self.config.name, format.extension()),
        })
    }

    /// Export a PNG preview as a data URL.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn preview_data_url(&self, scene: &Scene, viewport: &Viewport) -> RenderResult<String> {
        Ok(self.export(scene, viewport, ExportFormat::Png)?.data_url())
    }

    /// The SVG document for `format`, with that format's background.
    #[must_use]
    pub fn render_to_svg(&self, scene: &Scene, viewport: &Viewport, format: ExportFormat) -> String {
        render_scene_svg(
            scene,
            viewport,
            self.config.effective_background(format),
            self.config.multiplier,
        )
    }

    /// Output dimensions (width, height) in pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_dimensions(&self, viewport: &Viewport) -> (u32, u32) {
        let m = self.config.multiplier;
        let w = (viewport.width().max(1.0) * m).round().max(1.0) as u32;
        let h = (viewport.height().max(1.0) * m).round().max(1.0) as u32;
        (w, h)
    }

    /// Flatten onto `bg` and encode. Pixmap data is premultiplied.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_jpeg(&self, pixmap: &tiny_skia::Pixmap, bg: [u8; 3]) -> RenderResult<Vec<u8>> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for channel in 0..3 {
                let v = f32::from(bg[channel]).mul_add(inv, f32::from(pixel[channel]));
                rgb.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;
        Ok(buf.into_inner())
    }
}

/// Rasterize an SVG string to a tiny-skia Pixmap.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rasterize_svg(svg: &str) -> RenderResult<tiny_skia::Pixmap> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

    let px_w = tree.size().width().round() as u32;
    let px_h = tree.size().height().round() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap)
}

/// Parse `#rgb` or `#rrggbb`.
fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => Some([
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        ]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_never_transparent() {
        let config = ExportConfig::default().transparent();
        assert_eq!(config.effective_background(ExportFormat::Png), None);
        assert_eq!(config.effective_background(ExportFormat::Jpeg), Some("#ffffff"));
    }

    #[test]
    fn test_theme_background() {
        let config = ExportConfig::for_theme(Theme::Dark);
        assert_eq!(config.effective_background(ExportFormat::Jpeg), Some("#020618"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JPG".parse::<ExportFormat>().ok(), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::Png.to_string(), "png");
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_hex_color("#020618"), Some([2, 6, 24]));
        assert_eq!(parse_hex_color("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("white"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_svg_export_dimensions() {
        let exporter = SceneExporter::with_defaults();
        let out = exporter
            .export(&Scene::default(), &Viewport::new(120.0, 80.0), ExportFormat::Svg)
            .expect("svg");
        assert_eq!((out.width, out.height), (240, 160));
        assert_eq!(out.file_name, "canvas.svg");
        let text = String::from_utf8(out.bytes).expect("utf8");
        assert!(text.contains("width=\"240\""));
    }

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let exporter = SceneExporter::with_defaults();
        let out = exporter
            .export(&Scene::default(), &Viewport::new(50.0, 40.0), ExportFormat::Png)
            .expect("png");

        // PNG magic bytes: \x89PNG
        assert_eq!(&out.bytes[0..4], &[137, 80, 78, 71]);
        assert_eq!((out.width, out.height), (100, 80));
        assert!(out.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_jpeg_export_produces_valid_bytes() {
        let exporter = SceneExporter::new(ExportConfig::default().transparent());
        let out = exporter
            .export(&Scene::default(), &Viewport::new(20.0, 20.0), ExportFormat::Jpeg)
            .expect("jpeg");

        // JPEG magic bytes: FFD8
        assert_eq!(out.bytes[0], 0xFF);
        assert_eq!(out.bytes[1], 0xD8);
        assert_eq!(out.file_name, "canvas.jpeg");
    }
}
