//! Scene objects - the building blocks of drawings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transform::{Matrix, Point};

/// Prefix of in-memory object URLs that do not survive a reload.
pub const EPHEMERAL_PREFIX: &str = "blob:";

/// Prefix of self-contained embedded data URLs.
pub const EMBEDDED_PREFIX: &str = "data:";

/// Line height multiplier for text layout.
pub const TEXT_LINE_HEIGHT: f64 = 1.16;

/// Average glyph advance as a fraction of the font size.
const TEXT_GLYPH_WIDTH: f64 = 0.6;

/// Unique identifier for a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an image reference is a temporary in-memory URL.
#[must_use]
pub fn is_ephemeral(src: &str) -> bool {
    src.starts_with(EPHEMERAL_PREFIX)
}

/// Whether an image reference is an embedded data URL.
#[must_use]
pub fn is_embedded(src: &str) -> bool {
    src.starts_with(EMBEDDED_PREFIX)
}

/// How an object's interior or outline is painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Paint {
    /// A CSS color string (`#rrggbb`, `transparent`, ...).
    Color(String),
    /// A repeating image pattern.
    Pattern {
        /// Image source URI of the pattern tile.
        source: String,
    },
}

impl Paint {
    /// Shorthand for a solid color.
    #[must_use]
    pub fn color(value: impl Into<String>) -> Self {
        Self::Color(value.into())
    }

    /// The color string, if this is a solid color.
    #[must_use]
    pub fn as_color(&self) -> Option<&str> {
        match self {
            Self::Color(c) => Some(c),
            Self::Pattern { .. } => None,
        }
    }
}

/// Which point of the object `left`/`top` refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// `left`/`top` is the top-left corner of the local box.
    #[default]
    TopLeft,
    /// `left`/`top` is the center of the local box.
    Center,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center each line.
    Center,
    /// Align to the right edge.
    Right,
}

/// The type of content an object contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ObjectKind {
    /// An axis-aligned rectangle with optional rounded corners.
    Rect {
        /// Width in local units.
        width: f64,
        /// Height in local units.
        height: f64,
        /// Horizontal corner radius.
        rx: f64,
        /// Vertical corner radius.
        ry: f64,
    },

    /// A circle.
    Circle {
        /// Radius in local units.
        radius: f64,
    },

    /// An isosceles triangle pointing up.
    Triangle {
        /// Base width.
        width: f64,
        /// Height.
        height: f64,
    },

    /// A straight line segment.
    Line {
        /// Start X.
        x1: f64,
        /// Start Y.
        y1: f64,
        /// End X.
        x2: f64,
        /// End Y.
        y2: f64,
    },

    /// A freehand polyline.
    Path {
        /// Sampled pointer positions.
        points: Vec<Point>,
    },

    /// Editable text.
    #[serde(rename = "i-text")]
    Text {
        /// Text content; lines separated by `\n`.
        text: String,
        /// Font size in pixels.
        font_size: f64,
        /// CSS font family list.
        font_family: String,
        /// Line alignment.
        text_align: TextAlign,
    },

    /// A raster image.
    Image {
        /// Image source URI.
        src: String,
        /// Embedded copy of the image, kept so ephemeral sources can be
        /// replaced before persisting.
        #[serde(default, rename = "dataURL", skip_serializing_if = "Option::is_none")]
        data_url: Option<String>,
        /// Natural width in pixels.
        width: f64,
        /// Natural height in pixels.
        height: f64,
    },

    /// A container for other objects, in the group's local frame.
    Group {
        /// Child objects, back to front.
        objects: Vec<SceneObject>,
    },
}

impl ObjectKind {
    /// Short type name, matching the serialized tag.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Rect { .. } => "rect",
            Self::Circle { .. } => "circle",
            Self::Triangle { .. } => "triangle",
            Self::Line { .. } => "line",
            Self::Path { .. } => "path",
            Self::Text { .. } => "i-text",
            Self::Image { .. } => "image",
            Self::Group { .. } => "group",
        }
    }

    /// Whether this is a text object.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

const fn default_one() -> f64 {
    1.0
}

const fn default_true() -> bool {
    true
}

/// Presentation properties shared by every object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProps {
    /// X position of the origin point.
    #[serde(default)]
    pub left: f64,
    /// Y position of the origin point.
    #[serde(default)]
    pub top: f64,
    /// Horizontal scale factor.
    #[serde(default = "default_one")]
    pub scale_x: f64,
    /// Vertical scale factor.
    #[serde(default = "default_one")]
    pub scale_y: f64,
    /// Rotation in degrees around the origin point.
    #[serde(default)]
    pub angle: f64,
    /// Opacity from 0.0 to 1.0.
    #[serde(default = "default_one")]
    pub opacity: f64,
    /// Interior paint.
    #[serde(default)]
    pub fill: Option<Paint>,
    /// Outline paint.
    #[serde(default)]
    pub stroke: Option<Paint>,
    /// Outline width.
    #[serde(default)]
    pub stroke_width: f64,
    /// Dash pattern for the outline; `None` is solid.
    #[serde(default)]
    pub stroke_dash_array: Option<Vec<f64>>,
    /// What `left`/`top` refer to.
    #[serde(default)]
    pub origin: Origin,
    /// Whether the object is drawn.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Whether the object can be picked by the select tool.
    ///
    /// Depends on the active tool, so it is not part of snapshots.
    #[serde(skip, default = "default_true")]
    pub selectable: bool,
}

impl Default for ObjectProps {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            opacity: 1.0,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            stroke_dash_array: None,
            origin: Origin::TopLeft,
            visible: true,
            selectable: true,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Smallest box containing all `points`, or `None` for no points.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            left: min_x,
            top: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Grow the box by `amount` on every side.
    #[must_use]
    pub fn outset(&self, amount: f64) -> Self {
        Self {
            left: self.left - amount,
            top: self.top - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    /// The four corners, clockwise from top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right(), self.top),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left, self.bottom()),
        ]
    }

    /// Whether the point lies inside or on the edge.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}

/// A drawable object with content and presentation properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Object content.
    pub kind: ObjectKind,
    /// Position, paint and visibility.
    #[serde(default)]
    pub props: ObjectProps,
}

impl SceneObject {
    /// Create a new object with default properties.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            props: ObjectProps::default(),
        }
    }

    /// Set the properties.
    #[must_use]
    pub fn with_props(mut self, props: ObjectProps) -> Self {
        self.props = props;
        self
    }

    /// Set the origin position.
    #[must_use]
    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.props.left = left;
        self.props.top = top;
        self
    }

    /// Whether this is an image whose source would not survive a reload.
    #[must_use]
    pub fn has_ephemeral_source(&self) -> bool {
        matches!(&self.kind, ObjectKind::Image { src, .. } if is_ephemeral(src))
    }

    /// Local-to-parent matrix: translate to the origin, rotate, then scale.
    #[must_use]
    pub fn matrix(&self) -> Matrix {
        let p = &self.props;
        Matrix::translate(p.left, p.top)
            .multiply(&Matrix::rotate_degrees(p.angle))
            .multiply(&Matrix::scale(p.scale_x, p.scale_y))
    }

    /// Offset of the local box's top-left corner from the origin point.
    #[must_use]
    pub fn origin_offset(&self) -> Point {
        match self.props.origin {
            Origin::TopLeft => Point::default(),
            Origin::Center => {
                let (w, h) = self.intrinsic_size();
                Point::new(-w / 2.0, -h / 2.0)
            }
        }
    }

    /// Width and height of the content box, before scale and rotation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match &self.kind {
            ObjectKind::Rect { width, height, .. }
            | ObjectKind::Triangle { width, height }
            | ObjectKind::Image { width, height, .. } => (*width, *height),
            ObjectKind::Circle { radius } => (radius * 2.0, radius * 2.0),
            ObjectKind::Text {
                text, font_size, ..
            } => {
                let lines = text.split('\n').count().max(1) as f64;
                let longest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0) as f64;
                (
                    longest * font_size * TEXT_GLYPH_WIDTH,
                    lines * font_size * TEXT_LINE_HEIGHT,
                )
            }
            ObjectKind::Line { .. } | ObjectKind::Path { .. } | ObjectKind::Group { .. } => self
                .local_bounds()
                .map_or((0.0, 0.0), |b| (b.width, b.height)),
        }
    }

    /// Content box in the object's local frame, before stroke outset.
    fn local_bounds(&self) -> Option<Bounds> {
        match &self.kind {
            ObjectKind::Line { x1, y1, x2, y2 } => {
                Bounds::from_points([Point::new(*x1, *y1), Point::new(*x2, *y2)])
            }
            ObjectKind::Path { points } => Bounds::from_points(points.iter().copied()),
            ObjectKind::Group { objects } => objects
                .iter()
                .filter(|o| o.props.visible)
                .map(SceneObject::bounding_rect)
                .reduce(|a, b| a.union(&b)),
            _ => {
                let (w, h) = self.intrinsic_size();
                let o = self.origin_offset();
                Some(Bounds {
                    left: o.x,
                    top: o.y,
                    width: w,
                    height: h,
                })
            }
        }
    }

    /// Axis-aligned bounds in the parent frame, including stroke width,
    /// scale and rotation.
    #[must_use]
    pub fn bounding_rect(&self) -> Bounds {
        let local = self.local_bounds().unwrap_or_default();
        let stroked = if self.kind.is_text() || matches!(self.kind, ObjectKind::Group { .. }) {
            local
        } else {
            local.outset(self.props.stroke_width / 2.0)
        };
        let m = self.matrix();
        Bounds::from_points(stroked.corners().map(|c| m.apply(c))).unwrap_or_default()
    }

    /// Whether a parent-frame point falls inside the object's bounds.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        self.bounding_rect().contains(p)
    }

    /// Deep copy with fresh IDs, including group children.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = ObjectId::new();
        if let ObjectKind::Group { objects } = &mut copy.kind {
            *objects = objects.iter().map(SceneObject::duplicate).collect();
        }
        copy
    }
}
