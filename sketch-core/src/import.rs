//! Placing imported images.

use serde::{Deserialize, Serialize};

use crate::element::{ObjectKind, ObjectProps, SceneObject};
use crate::viewport::Viewport;

/// Largest share of the visible region a freshly imported image covers.
const FIT_FRACTION: f64 = 0.8;

/// An image ready to be placed, with its natural size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageImport {
    /// Source shown on screen; may be an ephemeral `blob:` URL.
    pub src: String,
    /// Embedded copy kept for persistence.
    #[serde(default, rename = "dataURL")]
    pub data_url: Option<String>,
    /// Natural width in pixels.
    pub width: f64,
    /// Natural height in pixels.
    pub height: f64,
}

impl ImageImport {
    /// An import whose source is already an embedded data URL.
    #[must_use]
    pub fn embedded(data_url: impl Into<String>, width: f64, height: f64) -> Self {
        let data_url = data_url.into();
        Self {
            src: data_url.clone(),
            data_url: Some(data_url),
            width,
            height,
        }
    }

    /// Build the scene object centered in the viewport.
    ///
    /// Images larger than the visible region are scaled down to 80% of it;
    /// smaller ones keep their natural size.
    #[must_use]
    pub fn place(self, viewport: &Viewport) -> SceneObject {
        let iw = if self.width > 0.0 { self.width } else { 1.0 };
        let ih = if self.height > 0.0 { self.height } else { 1.0 };
        let (view_w, view_h) = viewport.visible_scene_size();
        let scale = ((view_w / iw).min(view_h / ih) * FIT_FRACTION).min(1.0);
        let center = viewport.scene_center();

        let props = ObjectProps {
            left: center.x - iw * scale / 2.0,
            top: center.y - ih * scale / 2.0,
            scale_x: scale,
            scale_y: scale,
            stroke_width: 0.0,
            ..ObjectProps::default()
        };
        SceneObject::new(ObjectKind::Image {
            src: self.src,
            data_url: self.data_url,
            width: iw,
            height: ih,
        })
        .with_props(props)
    }
}
