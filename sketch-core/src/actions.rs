//! Operations on the current selection.
//!
//! Property setters apply to every selected object that supports the
//! property and also become the default for newly drawn objects.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::{ObjectKind, Paint, SceneObject, TextAlign};
use crate::scene::Scene;
use crate::tools::{StrokeStyle, ToolSettings};
use crate::{CanvasError, CanvasResult, ObjectId};

/// Text font family presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Hand-drawn look.
    Hand,
    /// System sans-serif.
    #[default]
    Normal,
    /// Monospace.
    Code,
}

impl FontFamily {
    /// CSS font-family list.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Hand => r#""Comic Sans MS", "Comic Sans", cursive"#,
            Self::Normal => {
                r#"system-ui, -apple-system, Segoe UI, Roboto, Inter, "Helvetica Neue", Arial, "Noto Sans", "Apple Color Emoji", "Segoe UI Emoji", sans-serif"#
            }
            Self::Code => {
                r#"ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", "Courier New", monospace"#
            }
        }
    }
}

impl FromStr for FontFamily {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hand" => Ok(Self::Hand),
            "normal" => Ok(Self::Normal),
            "code" => Ok(Self::Code),
            _ => Err(CanvasError::InvalidOperation(format!("unknown font family: {s}"))),
        }
    }
}

/// Text size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    /// 14px.
    Sm,
    /// 18px.
    #[default]
    Md,
    /// 24px.
    Lg,
    /// 32px.
    Xl,
}

impl FontSize {
    /// Size in pixels.
    #[must_use]
    pub const fn px(self) -> f64 {
        match self {
            Self::Sm => 14.0,
            Self::Md => 18.0,
            Self::Lg => 24.0,
            Self::Xl => 32.0,
        }
    }
}

impl FromStr for FontSize {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sm" => Ok(Self::Sm),
            "md" => Ok(Self::Md),
            "lg" => Ok(Self::Lg),
            "xl" => Ok(Self::Xl),
            _ => Err(CanvasError::InvalidOperation(format!("unknown font size: {s}"))),
        }
    }
}

/// Stacking moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layering {
    /// One step up.
    BringForward,
    /// One step down.
    SendBackward,
    /// To the top.
    BringToFront,
    /// To the bottom.
    SendToBack,
}

/// Apply `f` to every selected object accepted by `filter`.
fn for_each_selected<P, F>(scene: &mut Scene, filter: P, mut f: F) -> usize
where
    P: Fn(&SceneObject) -> bool,
    F: FnMut(&mut SceneObject),
{
    let ids: Vec<ObjectId> = scene
        .selected_objects()
        .filter(|o| filter(o))
        .map(|o| o.id)
        .collect();
    for &id in &ids {
        // ids were collected from live objects
        let _ = scene.modify(id, &mut f);
    }
    ids.len()
}

fn not_text(o: &SceneObject) -> bool {
    !o.kind.is_text()
}

fn any(_: &SceneObject) -> bool {
    true
}

fn text_only(o: &SceneObject) -> bool {
    o.kind.is_text()
}

/// Remove every selected object. Returns how many were removed.
pub fn delete_selected(scene: &mut Scene) -> usize {
    let ids = scene.selected_ids().to_vec();
    let removed = ids.into_iter().filter(|&id| scene.remove(id).is_ok()).count();
    scene.deselect_all();
    removed
}

/// Clone every selected object, offsetting the `i`-th clone by
/// `offset + i * 5`. The clones become the selection.
pub fn duplicate_selected(scene: &mut Scene, offset: f64) -> Vec<ObjectId> {
    let clones: Vec<SceneObject> = scene
        .selected_objects()
        .enumerate()
        .map(|(idx, object)| {
            #[allow(clippy::cast_precision_loss)]
            let shift = offset + idx as f64 * 5.0;
            let mut copy = object.duplicate();
            copy.props.left += shift;
            copy.props.top += shift;
            copy
        })
        .collect();
    if clones.is_empty() {
        return Vec::new();
    }
    scene.deselect_all();
    let ids: Vec<ObjectId> = clones.into_iter().map(|c| scene.add(c)).collect();
    for &id in &ids {
        let _ = scene.select(id);
    }
    ids
}

/// Reorder every selected object.
///
/// # Errors
///
/// Returns an error if a selected object vanished mid-operation.
pub fn layer_selected(scene: &mut Scene, op: Layering) -> CanvasResult<usize> {
    let ids = scene.selected_ids().to_vec();
    let mut moved = 0;
    for id in ids {
        let changed = match op {
            Layering::BringForward => scene.bring_forward(id)?,
            Layering::SendBackward => scene.send_backward(id)?,
            Layering::BringToFront => scene.bring_to_front(id)?,
            Layering::SendToBack => scene.send_to_back(id)?,
        };
        moved += usize::from(changed);
    }
    Ok(moved)
}

/// Set the interior color. Text keeps its fill, which is its ink color.
pub fn set_fill(scene: &mut Scene, defaults: &mut ToolSettings, color: &str) -> usize {
    defaults.fill = color.to_string();
    for_each_selected(scene, not_text, |o| o.props.fill = Some(Paint::color(color)))
}

/// Set the outline color.
pub fn set_stroke(scene: &mut Scene, defaults: &mut ToolSettings, color: &str) -> usize {
    defaults.stroke = color.to_string();
    for_each_selected(scene, any, |o| o.props.stroke = Some(Paint::color(color)))
}

/// Set the outline width on non-text objects.
pub fn set_stroke_width(scene: &mut Scene, defaults: &mut ToolSettings, width: f64) -> usize {
    defaults.stroke_width = width;
    for_each_selected(scene, not_text, |o| o.props.stroke_width = width)
}

/// Set opacity, clamped to `0.0..=1.0`.
pub fn set_opacity(scene: &mut Scene, defaults: &mut ToolSettings, opacity: f64) -> usize {
    let opacity = opacity.clamp(0.0, 1.0);
    defaults.opacity = opacity;
    for_each_selected(scene, any, |o| o.props.opacity = opacity)
}

/// Set the corner radius of selected rectangles.
pub fn set_corner_radius(scene: &mut Scene, defaults: &mut ToolSettings, radius: f64) -> usize {
    defaults.corner_radius = radius;
    for_each_selected(
        scene,
        |o| matches!(o.kind, ObjectKind::Rect { .. }),
        |o| {
            if let ObjectKind::Rect { rx, ry, .. } = &mut o.kind {
                *rx = radius;
                *ry = radius;
            }
        },
    )
}

/// Set the dash style on non-text objects.
pub fn set_stroke_style(scene: &mut Scene, defaults: &mut ToolSettings, style: StrokeStyle) -> usize {
    defaults.stroke_style = style;
    for_each_selected(scene, not_text, |o| o.props.stroke_dash_array = style.dash())
}

fn update_text<F>(scene: &mut Scene, mut f: F) -> usize
where
    F: FnMut(&mut f64, &mut String, &mut TextAlign),
{
    for_each_selected(scene, text_only, |o| {
        if let ObjectKind::Text {
            font_size,
            font_family,
            text_align,
            ..
        } = &mut o.kind
        {
            f(font_size, font_family, text_align);
        }
    })
}

/// Set the font family of selected text.
pub fn set_font_family(scene: &mut Scene, family: FontFamily) -> usize {
    update_text(scene, |_, f, _| *f = family.css().to_string())
}

/// Set the font size of selected text.
pub fn set_font_size(scene: &mut Scene, size: FontSize) -> usize {
    update_text(scene, |s, _, _| *s = size.px())
}

/// Set the alignment of selected text.
pub fn set_text_align(scene: &mut Scene, align: TextAlign) -> usize {
    update_text(scene, |_, _, a| *a = align)
}

/// Replace the content of a text object.
///
/// # Errors
///
/// Returns an error if the object is missing or is not text.
pub fn edit_text(scene: &mut Scene, id: ObjectId, content: &str) -> CanvasResult<()> {
    let is_text = scene
        .get(id)
        .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))?
        .kind
        .is_text();
    if !is_text {
        return Err(CanvasError::InvalidOperation(format!("{id} is not text")));
    }
    scene.modify(id, |o| {
        if let ObjectKind::Text { text, .. } = &mut o.kind {
            *text = content.to_string();
        }
    })
}
