//! Image probing for imports.
//!
//! Decodes embedded images just far enough to learn their natural size, so
//! the editor can place them.

use base64::Engine;
use sketch_core::ImageImport;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF.
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else if data.starts_with(b"GIF8") {
            Self::Gif
        } else {
            Self::Unknown
        }
    }

    /// MIME type for a data URL.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Natural pixel size of encoded image bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn image_dimensions(bytes: &[u8]) -> RenderResult<(u32, u32)> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RenderError::Image(e.to_string()))?;
    reader
        .into_dimensions()
        .map_err(|e| RenderError::Image(format!("Failed to decode image: {e}")))
}

/// Split a base64 data URL into its decoded bytes.
///
/// # Errors
///
/// Returns an error if the URL is not a base64 data URL.
pub fn decode_data_url(url: &str) -> RenderResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Image("Not a data URL".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Image("Invalid data URL: missing comma".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(RenderError::Image("Only base64 data URLs are supported".to_string()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| RenderError::Image(format!("Failed to decode base64: {e}")))
}

/// Build an import from encoded bytes, embedding them as a data URL.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn import_from_bytes(bytes: &[u8]) -> RenderResult<ImageImport> {
    let (width, height) = image_dimensions(bytes)?;
    let mime = ImageFormat::from_magic_bytes(bytes).mime();
    let data_url = format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    );
    Ok(ImageImport::embedded(data_url, f64::from(width), f64::from(height)))
}

/// Build an import shown through `src` and persisted as `data_url`.
///
/// `src` may be an ephemeral `blob:` URL for the same image.
///
/// # Errors
///
/// Returns an error if `data_url` does not hold a decodable image.
pub fn import_from_data_url(src: &str, data_url: &str) -> RenderResult<ImageImport> {
    let bytes = decode_data_url(data_url)?;
    let (width, height) = image_dimensions(&bytes)?;
    Ok(ImageImport {
        src: src.to_string(),
        data_url: Some(data_url.to_string()),
        width: f64::from(width),
        height: f64::from(height),
    })
}
