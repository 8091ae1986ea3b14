//! Drawing tools and pointer gestures.
//!
//! A [`ToolController`] owns the active [`Tool`], the drawing defaults used
//! for new objects, and the gesture in progress. Pointer positions arrive in
//! screen coordinates and are mapped through the viewport.
//!
//! Live updates during a drag go through [`Scene::get_mut`] and stay silent.
//! The final state of a gesture is announced once on release, so history
//! captures finished shapes rather than every intermediate size.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::{ObjectKind, ObjectProps, Origin, Paint, SceneObject, TextAlign};
use crate::event::SceneEvent;
use crate::scene::Scene;
use crate::transform::Point;
use crate::viewport::Viewport;
use crate::{CanvasError, ObjectId};

/// Text placed by the text tool.
pub const DEFAULT_TEXT: &str = "Text";

/// Font size of text placed by the text tool.
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// Width and height of an arrow head.
pub const ARROW_HEAD_SIZE: f64 = 12.0;

/// The active tool determines how pointer input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pick and move objects.
    #[default]
    Select,
    /// Drag the viewport.
    Pan,
    /// Freehand pencil.
    Free,
    /// Rectangle.
    Rect,
    /// Circle.
    Circle,
    /// Triangle.
    Triangle,
    /// Straight line.
    Line,
    /// Line with an arrow head.
    Arrow,
    /// Click to place text.
    Text,
    /// Image picker; placement happens through image import.
    Image,
}

impl Tool {
    /// Every tool, in toolbar order.
    pub const ALL: [Self; 10] = [
        Self::Select,
        Self::Pan,
        Self::Free,
        Self::Rect,
        Self::Circle,
        Self::Triangle,
        Self::Line,
        Self::Arrow,
        Self::Text,
        Self::Image,
    ];

    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Pan => "pan",
            Self::Free => "free",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    /// Whether the tool stays active after a gesture completes.
    #[must_use]
    pub const fn is_sticky(self) -> bool {
        matches!(self, Self::Pan | Self::Free)
    }

    /// CSS cursor the host should show.
    #[must_use]
    pub const fn cursor(self) -> &'static str {
        match self {
            Self::Pan => "grab",
            Self::Free => "crosshair",
            _ => "default",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| CanvasError::InvalidOperation(format!("unknown tool: {s}")))
    }
}

/// Outline dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Long dashes.
    Dashed,
    /// Short dots.
    Dotted,
}

impl StrokeStyle {
    /// Dash pattern, `None` for solid.
    #[must_use]
    pub fn dash(self) -> Option<Vec<f64>> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some(vec![6.0, 4.0]),
            Self::Dotted => Some(vec![2.0, 4.0]),
        }
    }

    /// Classify an existing dash pattern.
    #[must_use]
    pub fn from_dash(dash: Option<&[f64]>) -> Self {
        match dash {
            None | Some([]) => Self::Solid,
            Some([first, ..]) if *first >= 4.0 => Self::Dashed,
            Some(_) => Self::Dotted,
        }
    }
}

impl FromStr for StrokeStyle {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            _ => Err(CanvasError::InvalidOperation(format!("unknown stroke style: {s}"))),
        }
    }
}

/// Defaults applied to newly drawn objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Interior color.
    pub fill: String,
    /// Outline color; also the text and arrow head color.
    pub stroke: String,
    /// Outline width.
    pub stroke_width: f64,
    /// Opacity from 0.0 to 1.0.
    pub opacity: f64,
    /// Rectangle corner radius.
    pub corner_radius: f64,
    /// Outline dash style.
    pub stroke_style: StrokeStyle,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            fill: "transparent".to_string(),
            stroke: "#f68c00".to_string(),
            stroke_width: 1.0,
            opacity: 1.0,
            corner_radius: 0.0,
            stroke_style: StrokeStyle::Solid,
        }
    }
}

impl ToolSettings {
    fn shape_props(&self, left: f64, top: f64) -> ObjectProps {
        ObjectProps {
            left,
            top,
            opacity: self.opacity,
            fill: Some(Paint::color(&self.fill)),
            stroke: Some(Paint::color(&self.stroke)),
            stroke_width: self.stroke_width,
            stroke_dash_array: self.stroke_style.dash(),
            selectable: false,
            ..ObjectProps::default()
        }
    }

    fn line_props(&self) -> ObjectProps {
        ObjectProps {
            opacity: self.opacity,
            fill: None,
            stroke: Some(Paint::color(&self.stroke)),
            stroke_width: self.stroke_width,
            stroke_dash_array: self.stroke_style.dash(),
            selectable: false,
            ..ObjectProps::default()
        }
    }
}

/// Gesture in progress between pointer down and pointer up.
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Panning {
        last: Point,
    },
    Moving {
        last: Point,
        moved: bool,
    },
    Shape {
        id: ObjectId,
        start: Point,
    },
    Line {
        id: ObjectId,
        head: Option<ObjectId>,
        start: Point,
    },
    Freehand {
        points: Vec<Point>,
    },
}

/// Active tool, drawing defaults and gesture state.
#[derive(Debug, Clone)]
pub struct ToolController {
    tool: Tool,
    settings: ToolSettings,
    gesture: Gesture,
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new(ToolSettings::default())
    }
}

impl ToolController {
    /// Start on the select tool.
    #[must_use]
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            tool: Tool::Select,
            settings,
            gesture: Gesture::Idle,
        }
    }

    /// The active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Drawing defaults.
    #[must_use]
    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Mutable drawing defaults.
    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    /// Whether a pointer gesture is in progress.
    #[must_use]
    pub fn is_gesture_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Points of the freehand stroke being drawn, for live preview.
    #[must_use]
    pub fn freehand_preview(&self) -> Option<&[Point]> {
        match &self.gesture {
            Gesture::Freehand { points } => Some(points),
            _ => None,
        }
    }

    /// Switch tools. Objects are pickable only under the select tool.
    pub fn set_tool(&mut self, tool: Tool, scene: &mut Scene) {
        if tool != Tool::Select {
            scene.deselect_all();
        }
        self.tool = tool;
        scene.set_all_selectable(tool == Tool::Select);
    }

    /// Re-apply the active tool's selectability after a scene reload.
    pub fn apply_selectability(&self, scene: &mut Scene) {
        scene.set_all_selectable(self.tool == Tool::Select);
    }

    /// Begin a gesture at a screen position.
    pub fn pointer_down(&mut self, scene: &mut Scene, viewport: &Viewport, screen: Point) {
        let p = viewport.to_scene(screen);
        self.gesture = match self.tool {
            Tool::Select => Self::begin_select(scene, p),
            Tool::Pan => Gesture::Panning { last: screen },
            Tool::Free => Gesture::Freehand { points: vec![p] },
            Tool::Rect => {
                let id = scene.add(SceneObject::new(ObjectKind::Rect {
                    width: 0.0,
                    height: 0.0,
                    rx: self.settings.corner_radius,
                    ry: self.settings.corner_radius,
                })
                .with_props(self.settings.shape_props(p.x, p.y)));
                Gesture::Shape { id, start: p }
            }
            Tool::Circle => {
                let mut props = self.settings.shape_props(p.x, p.y);
                props.origin = Origin::Center;
                let id = scene.add(
                    SceneObject::new(ObjectKind::Circle { radius: 0.0 }).with_props(props),
                );
                Gesture::Shape { id, start: p }
            }
            Tool::Triangle => {
                let id = scene.add(
                    SceneObject::new(ObjectKind::Triangle {
                        width: 0.0,
                        height: 0.0,
                    })
                    .with_props(self.settings.shape_props(p.x, p.y)),
                );
                Gesture::Shape { id, start: p }
            }
            Tool::Line | Tool::Arrow => self.begin_line(scene, p),
            Tool::Text => {
                self.place_text(scene, p);
                Gesture::Idle
            }
            Tool::Image => Gesture::Idle,
        };
    }

    fn begin_select(scene: &mut Scene, p: Point) -> Gesture {
        match scene.object_at(p) {
            Some(hit) => {
                if !scene.is_selected(hit) {
                    scene.replace_selection(hit);
                }
                Gesture::Moving {
                    last: p,
                    moved: false,
                }
            }
            None => {
                scene.deselect_all();
                Gesture::Idle
            }
        }
    }

    fn begin_line(&self, scene: &mut Scene, p: Point) -> Gesture {
        let id = scene.add(
            SceneObject::new(ObjectKind::Line {
                x1: p.x,
                y1: p.y,
                x2: p.x,
                y2: p.y,
            })
            .with_props(self.settings.line_props()),
        );
        let head = (self.tool == Tool::Arrow).then(|| {
            let props = ObjectProps {
                left: p.x,
                top: p.y,
                origin: Origin::Center,
                opacity: self.settings.opacity,
                fill: Some(Paint::color(&self.settings.stroke)),
                stroke: None,
                stroke_width: 0.0,
                selectable: false,
                ..ObjectProps::default()
            };
            scene.add(
                SceneObject::new(ObjectKind::Triangle {
                    width: ARROW_HEAD_SIZE,
                    height: ARROW_HEAD_SIZE,
                })
                .with_props(props),
            )
        });
        Gesture::Line { id, head, start: p }
    }

    fn place_text(&mut self, scene: &mut Scene, p: Point) {
        let props = ObjectProps {
            left: p.x,
            top: p.y,
            opacity: self.settings.opacity,
            // Stroke color keeps text visible over the transparent default fill.
            fill: Some(Paint::color(&self.settings.stroke)),
            stroke: None,
            stroke_width: 0.0,
            ..ObjectProps::default()
        };
        let id = scene.add(
            SceneObject::new(ObjectKind::Text {
                text: DEFAULT_TEXT.to_string(),
                font_size: DEFAULT_FONT_SIZE,
                font_family: crate::actions::FontFamily::Normal.css().to_string(),
                text_align: TextAlign::Left,
            })
            .with_props(props),
        );
        self.set_tool(Tool::Select, scene);
        scene.replace_selection(id);
    }

    /// Continue the gesture. Returns `true` if the viewport moved.
    pub fn pointer_move(&mut self, scene: &mut Scene, viewport: &mut Viewport, screen: Point) -> bool {
        let p = viewport.to_scene(screen);
        match &mut self.gesture {
            Gesture::Idle => false,
            Gesture::Panning { last } => {
                viewport.pan_by(screen.x - last.x, screen.y - last.y);
                *last = screen;
                true
            }
            Gesture::Moving { last, moved } => {
                let (dx, dy) = (p.x - last.x, p.y - last.y);
                let ids = scene.selected_ids().to_vec();
                for id in ids {
                    if let Some(object) = scene.get_mut(id) {
                        object.props.left += dx;
                        object.props.top += dy;
                    }
                }
                *last = p;
                *moved = true;
                false
            }
            Gesture::Shape { id, start } => {
                if let Some(object) = scene.get_mut(*id) {
                    resize_shape(object, *start, p);
                }
                false
            }
            Gesture::Line { id, head, start } => {
                if let Some(ObjectKind::Line { x2, y2, .. }) =
                    scene.get_mut(*id).map(|o| &mut o.kind)
                {
                    *x2 = p.x;
                    *y2 = p.y;
                }
                if let Some(head) = head.and_then(|h| scene.get_mut(h)) {
                    head.props.left = p.x;
                    head.props.top = p.y;
                    // The triangle points up at angle 0; turn it to face along the line.
                    head.props.angle = (p.y - start.y).atan2(p.x - start.x).to_degrees() + 90.0;
                }
                false
            }
            Gesture::Freehand { points } => {
                points.push(p);
                false
            }
        }
    }

    /// Finish the gesture and announce its result.
    pub fn pointer_up(&mut self, scene: &mut Scene) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => return,
            Gesture::Panning { .. } => scene.notify(SceneEvent::ViewportChanged),
            Gesture::Moving { moved, .. } => {
                if moved {
                    for id in scene.selected_ids().to_vec() {
                        scene.notify(SceneEvent::ObjectModified(id));
                    }
                }
            }
            Gesture::Shape { id, .. } | Gesture::Line { id, head: None, .. } => {
                if let Some(object) = scene.get_mut(id) {
                    object.props.selectable = true;
                    scene.notify(SceneEvent::ObjectModified(id));
                    scene.replace_selection(id);
                }
            }
            Gesture::Line {
                id,
                head: Some(head),
                ..
            } => Self::finish_arrow(scene, id, head),
            Gesture::Freehand { points } => self.finish_freehand(scene, points),
        }
        if !self.tool.is_sticky() {
            self.set_tool(Tool::Select, scene);
        }
    }

    fn finish_arrow(scene: &mut Scene, line: ObjectId, head: ObjectId) {
        let (Ok(mut line), Ok(mut head)) = (scene.remove(line), scene.remove(head)) else {
            return;
        };
        line.props.selectable = true;
        head.props.selectable = true;
        let mut group = SceneObject::new(ObjectKind::Group {
            objects: vec![line, head],
        });
        group.props.stroke_width = 0.0;
        group.props.opacity = 1.0;
        let id = scene.add(group);
        scene.replace_selection(id);
    }

    fn finish_freehand(&self, scene: &mut Scene, points: Vec<Point>) {
        let Some(first) = points.first().copied() else {
            return;
        };
        let local = points
            .iter()
            .map(|p| Point::new(p.x - first.x, p.y - first.y))
            .collect();
        let props = ObjectProps {
            left: first.x,
            top: first.y,
            fill: None,
            stroke: Some(Paint::color(&self.settings.stroke)),
            stroke_width: self.settings.stroke_width.max(1.0),
            selectable: self.tool == Tool::Select,
            ..ObjectProps::default()
        };
        let id = scene.add(SceneObject::new(ObjectKind::Path { points: local }).with_props(props));
        scene.notify(SceneEvent::PathCreated(id));
    }
}

/// Fit a shape to the drag from `start` to `p`.
fn resize_shape(object: &mut SceneObject, start: Point, p: Point) {
    match &mut object.kind {
        ObjectKind::Rect { width, height, .. } | ObjectKind::Triangle { width, height } => {
            *width = (p.x - start.x).abs();
            *height = (p.y - start.y).abs();
            object.props.left = p.x.min(start.x);
            object.props.top = p.y.min(start.y);
        }
        ObjectKind::Circle { radius } => {
            *radius = start.distance(p) / 2.0;
            object.props.left = (start.x + p.x) / 2.0;
            object.props.top = (start.y + p.y) / 2.0;
        }
        _ => {}
    }
}
