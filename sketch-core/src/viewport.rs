//! Pan and zoom.
//!
//! The viewport transform maps scene coordinates to screen coordinates.
//! Zoom is uniform, so `a == d` and `b == c == 0` for every transform the
//! editor produces; stored transforms from elsewhere are accepted as long
//! as they are finite and invertible.

use serde::{Deserialize, Serialize};

use crate::element::Bounds;
use crate::transform::{Matrix, Point};
use crate::{CanvasError, CanvasResult};

/// Zoom behaviour knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    /// Multiplier applied by one zoom-in step.
    pub step: f64,
    /// Smallest zoom reachable by stepping.
    pub min: f64,
    /// Largest zoom reachable by stepping or fitting.
    pub max: f64,
    /// Screen-space margin kept around content when fitting.
    pub fit_padding: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            step: 1.2,
            min: 0.1,
            max: 5.0,
            fit_padding: 40.0,
        }
    }
}

/// The visible window onto the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    transform: Matrix,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Create an identity viewport for a canvas of the given screen size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            transform: Matrix::IDENTITY,
            width,
            height,
        }
    }

    /// Current scene-to-screen transform.
    #[must_use]
    pub fn transform(&self) -> Matrix {
        self.transform
    }

    /// Replace the transform.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidViewport`] if the matrix is not finite
    /// or not invertible; the current transform is kept.
    pub fn set_transform(&mut self, transform: Matrix) -> CanvasResult<()> {
        if !transform.is_valid() {
            return Err(CanvasError::InvalidViewport(format!("{:?}", transform.0)));
        }
        self.transform = transform;
        Ok(())
    }

    /// Build a transform from a stored `[a, b, c, d, e, f]` array.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidViewport`] unless the slice holds
    /// exactly six finite numbers.
    pub fn matrix_from_slice(values: &[f64]) -> CanvasResult<Matrix> {
        let array: [f64; 6] = values.try_into().map_err(|_| {
            CanvasError::InvalidViewport(format!("expected 6 entries, got {}", values.len()))
        })?;
        let matrix = Matrix(array);
        if !matrix.is_finite() {
            return Err(CanvasError::InvalidViewport(format!("{array:?}")));
        }
        Ok(matrix)
    }

    /// Canvas width in screen pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Canvas height in screen pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Change the canvas size. The transform is unchanged.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.transform.0[0]
    }

    /// Zoom so that the scene point under `screen` stays under it.
    pub fn zoom_to_point(&mut self, screen: Point, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 {
            return;
        }
        let scene = self.to_scene(screen);
        let m = &mut self.transform.0;
        m[0] = zoom;
        m[3] = zoom;
        let moved = self.transform.apply(scene);
        self.transform.0[4] += screen.x - moved.x;
        self.transform.0[5] += screen.y - moved.y;
    }

    /// Zoom about the screen origin.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom_to_point(Point::default(), zoom);
    }

    /// Translate by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform.0[4] += dx;
        self.transform.0[5] += dy;
    }

    /// Map a screen point into scene coordinates.
    #[must_use]
    pub fn to_scene(&self, screen: Point) -> Point {
        self.transform
            .invert()
            .map_or(screen, |inverse| inverse.apply(screen))
    }

    /// Map a scene point onto the screen.
    #[must_use]
    pub fn to_screen(&self, scene: Point) -> Point {
        self.transform.apply(scene)
    }

    /// Middle of the canvas in screen coordinates.
    #[must_use]
    pub fn screen_center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Scene point shown in the middle of the canvas.
    #[must_use]
    pub fn scene_center(&self) -> Point {
        self.to_scene(self.screen_center())
    }

    /// Size of the visible scene region.
    #[must_use]
    pub fn visible_scene_size(&self) -> (f64, f64) {
        let zoom = self.zoom();
        (self.width / zoom, self.height / zoom)
    }

    /// One zoom step in, about the canvas center.
    pub fn zoom_in(&mut self, settings: &ZoomSettings) {
        let next = (self.zoom() * settings.step).min(settings.max);
        self.zoom_to_point(self.screen_center(), next);
    }

    /// One zoom step out, about the canvas center.
    pub fn zoom_out(&mut self, settings: &ZoomSettings) {
        let next = (self.zoom() / settings.step).max(settings.min);
        self.zoom_to_point(self.screen_center(), next);
    }

    /// Back to the identity transform.
    pub fn reset(&mut self) {
        self.transform = Matrix::IDENTITY;
    }

    /// Center `content` on the canvas at the largest zoom that fits inside
    /// the padding, capped at the maximum zoom. No content resets.
    pub fn fit_content(&mut self, content: Option<Bounds>, settings: &ZoomSettings) {
        let Some(bounds) = content else {
            self.reset();
            return;
        };
        let avail_w = self.width - settings.fit_padding * 2.0;
        let avail_h = self.height - settings.fit_padding * 2.0;
        let zoom = (avail_w / bounds.width)
            .min(avail_h / bounds.height)
            .min(settings.max);
        // A canvas smaller than its padding would yield zero or negative zoom.
        let zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            settings.min
        };
        let center = bounds.center();
        self.transform = Matrix([
            zoom,
            0.0,
            0.0,
            zoom,
            self.width / 2.0 - center.x * zoom,
            self.height / 2.0 - center.y * zoom,
        ]);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
