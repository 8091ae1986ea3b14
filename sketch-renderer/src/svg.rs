//! Scene to SVG conversion.
//!
//! The SVG document covers the canvas as seen through the viewport: the
//! viewport matrix wraps the whole scene and each object carries its own
//! transform. This is the intermediate form for raster export.

use std::fmt::Write;

use sketch_core::element::TEXT_LINE_HEIGHT;
use sketch_core::{Matrix, ObjectKind, Paint, Scene, SceneObject, TextAlign, Viewport};

/// Build an SVG document of the visible canvas.
///
/// `background` fills the canvas when it is a color other than
/// `transparent`. Output pixel size is the canvas size times `multiplier`;
/// the view box stays in canvas pixels.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_scene_svg(
    scene: &Scene,
    viewport: &Viewport,
    background: Option<&str>,
    multiplier: f64,
) -> String {
    let view_w = viewport.width().max(1.0);
    let view_h = viewport.height().max(1.0);
    let out_w = (view_w * multiplier).round().max(1.0) as u32;
    let out_h = (view_h * multiplier).round().max(1.0) as u32;

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
    );

    if let Some(color) = background.filter(|c| !is_transparent(c)) {
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(color)
        );
    }

    let _ = write!(svg, "<g transform=\"{}\">", matrix_attr(&viewport.transform()));
    if let Some(image) = &scene.background_image {
        let _ = write!(
            svg,
            "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" href=\"{}\"/>",
            image.width,
            image.height,
            escape_xml(&image.src)
        );
    }
    for object in scene.objects() {
        render_object(&mut svg, object);
    }
    svg.push_str("</g></svg>");
    svg
}

fn render_object(svg: &mut String, object: &SceneObject) {
    let p = &object.props;
    if !p.visible {
        return;
    }
    let _ = write!(svg, "<g transform=\"{}\"", matrix_attr(&object.matrix()));
    if p.opacity < 1.0 {
        let _ = write!(svg, " opacity=\"{}\"", p.opacity.clamp(0.0, 1.0));
    }
    svg.push('>');

    let o = object.origin_offset();
    match &object.kind {
        ObjectKind::Rect {
            width,
            height,
            rx,
            ry,
        } => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\" rx=\"{rx}\" ry=\"{ry}\"",
                o.x, o.y,
            );
            paint_attrs(svg, object, true);
            svg.push_str("/>");
        }
        ObjectKind::Circle { radius } => {
            let _ = write!(
                svg,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{radius}\"",
                o.x + radius,
                o.y + radius,
            );
            paint_attrs(svg, object, true);
            svg.push_str("/>");
        }
        ObjectKind::Triangle { width, height } => {
            let _ = write!(
                svg,
                "<polygon points=\"{},{} {},{} {},{}\"",
                o.x + width / 2.0,
                o.y,
                o.x + width,
                o.y + height,
                o.x,
                o.y + height,
            );
            paint_attrs(svg, object, true);
            svg.push_str("/>");
        }
        ObjectKind::Line { x1, y1, x2, y2 } => {
            let _ = write!(
                svg,
                "<line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\""
            );
            paint_attrs(svg, object, false);
            svg.push_str("/>");
        }
        ObjectKind::Path { points } => {
            let mut d = String::new();
            for (i, pt) in points.iter().enumerate() {
                let _ = write!(d, "{}{} {} ", if i == 0 { 'M' } else { 'L' }, pt.x, pt.y);
            }
            let _ = write!(
                svg,
                "<path d=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"",
                d.trim_end()
            );
            paint_attrs(svg, object, false);
            svg.push_str("/>");
        }
        ObjectKind::Text {
            text,
            font_size,
            font_family,
            text_align,
        } => {
            let (w, _) = object.intrinsic_size();
            let (x, anchor) = match text_align {
                TextAlign::Left => (o.x, "start"),
                TextAlign::Center => (o.x + w / 2.0, "middle"),
                TextAlign::Right => (o.x + w, "end"),
            };
            let _ = write!(
                svg,
                "<text font-size=\"{font_size}\" font-family=\"{}\" text-anchor=\"{anchor}\"",
                escape_xml(font_family),
            );
            paint_attrs(svg, object, true);
            svg.push('>');
            let line_height = font_size * TEXT_LINE_HEIGHT;
            for (i, line) in text.split('\n').enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let y = o.y + line_height * i as f64 + font_size;
                let _ = write!(svg, "<tspan x=\"{x}\" y=\"{y}\">{}</tspan>", escape_xml(line));
            }
            svg.push_str("</text>");
        }
        ObjectKind::Image {
            src, width, height, ..
        } => {
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
                o.x,
                o.y,
                escape_xml(src),
            );
        }
        ObjectKind::Group { objects } => {
            for child in objects {
                render_object(svg, child);
            }
        }
    }
    svg.push_str("</g>");
}

/// Fill, stroke and dash attributes. Open shapes never fill.
fn paint_attrs(svg: &mut String, object: &SceneObject, closed: bool) {
    let p = &object.props;
    let fill = if closed { paint_value(p.fill.as_ref()) } else { "none".to_string() };
    let _ = write!(svg, " fill=\"{fill}\"");

    let stroke = paint_value(p.stroke.as_ref());
    if stroke != "none" && p.stroke_width > 0.0 {
        let _ = write!(svg, " stroke=\"{stroke}\" stroke-width=\"{}\"", p.stroke_width);
        if let Some(dash) = p.stroke_dash_array.as_deref().filter(|d| !d.is_empty()) {
            let values: Vec<String> = dash.iter().map(ToString::to_string).collect();
            let _ = write!(svg, " stroke-dasharray=\"{}\"", values.join(" "));
        }
    }
}

/// Patterns have no SVG counterpart here and are skipped.
fn paint_value(paint: Option<&Paint>) -> String {
    match paint.and_then(Paint::as_color) {
        Some(color) if !is_transparent(color) => escape_xml(color),
        _ => "none".to_string(),
    }
}

fn is_transparent(color: &str) -> bool {
    color.is_empty() || color.eq_ignore_ascii_case("transparent")
}

fn matrix_attr(m: &Matrix) -> String {
    let [a, b, c, d, e, f] = m.0;
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

/// Escape special XML characters.
#[must_use]
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_core::{ObjectProps, Origin, Point};

    fn rect() -> SceneObject {
        SceneObject::new(ObjectKind::Rect {
            width: 40.0,
            height: 20.0,
            rx: 4.0,
            ry: 4.0,
        })
        .with_props(ObjectProps {
            left: 10.0,
            top: 10.0,
            fill: Some(Paint::color("transparent")),
            stroke: Some(Paint::color("#1e1e1e")),
            stroke_width: 2.0,
            stroke_dash_array: Some(vec![6.0, 4.0]),
            ..ObjectProps::default()
        })
    }

    #[test]
    fn test_document_size_follows_multiplier() {
        let svg = render_scene_svg(&Scene::default(), &Viewport::new(100.0, 50.0), None, 2.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"200\""));
        assert!(svg.contains("height=\"100\""));
        assert!(svg.contains("viewBox=\"0 0 100 50\""));
    }

    #[test]
    fn test_background_rect_only_when_opaque() {
        let vp = Viewport::new(10.0, 10.0);
        let scene = Scene::default();
        assert!(render_scene_svg(&scene, &vp, Some("#020618"), 1.0).contains("fill=\"#020618\""));
        assert!(!render_scene_svg(&scene, &vp, Some("transparent"), 1.0).contains("<rect"));
        assert!(!render_scene_svg(&scene, &vp, None, 1.0).contains("<rect"));
    }

    #[test]
    fn test_rect_paint_and_dash() {
        let mut scene = Scene::default();
        scene.add(rect());
        let svg = render_scene_svg(&scene, &Viewport::new(100.0, 100.0), None, 1.0);
        assert!(svg.contains("rx=\"4\""));
        assert!(svg.contains("fill=\"none\""));
        assert!(svg.contains("stroke=\"#1e1e1e\" stroke-width=\"2\""));
        assert!(svg.contains("stroke-dasharray=\"6 4\""));
        assert!(svg.contains("matrix(1 0 0 1 10 10)"));
    }

    #[test]
    fn test_viewport_wraps_scene() {
        let mut vp = Viewport::new(100.0, 100.0);
        vp.set_zoom(2.0);
        let svg = render_scene_svg(&Scene::default(), &vp, None, 1.0);
        assert!(svg.contains("<g transform=\"matrix(2 0 0 2 0 0)\">"));
    }

    #[test]
    fn test_centered_circle() {
        let mut scene = Scene::default();
        scene.add(
            SceneObject::new(ObjectKind::Circle { radius: 5.0 }).with_props(ObjectProps {
                origin: Origin::Center,
                left: 50.0,
                top: 50.0,
                ..ObjectProps::default()
            }),
        );
        let svg = render_scene_svg(&scene, &Viewport::new(100.0, 100.0), None, 1.0);
        assert!(svg.contains("<circle cx=\"0\" cy=\"0\" r=\"5\""));
    }

    #[test]
    fn test_path_and_text() {
        let mut scene = Scene::default();
        scene.add(SceneObject::new(ObjectKind::Path {
            points: vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)],
        }));
        scene.add(
            SceneObject::new(ObjectKind::Text {
                text: "a < b\nc".to_string(),
                font_size: 20.0,
                font_family: "Inter, sans-serif".to_string(),
                text_align: TextAlign::Center,
            })
            .with_props(ObjectProps {
                fill: Some(Paint::color("#f68c00")),
                ..ObjectProps::default()
            }),
        );
        let svg = render_scene_svg(&scene, &Viewport::new(100.0, 100.0), None, 1.0);
        assert!(svg.contains("d=\"M0 0 L3 4\""));
        assert!(svg.contains("a &lt; b"));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert_eq!(svg.matches("<tspan").count(), 2);
    }

    #[test]
    fn test_hidden_objects_are_skipped() {
        let mut scene = Scene::default();
        let mut hidden = rect();
        hidden.props.visible = false;
        scene.add(hidden);
        let svg = render_scene_svg(&scene, &Viewport::new(100.0, 100.0), None, 1.0);
        assert!(!svg.contains("<rect x="));
    }

    #[test]
    fn test_xml_escaping() {
        assert_eq!(escape_xml("A < B & \"C\""), "A &lt; B &amp; &quot;C&quot;");
    }
}
