//! Stripping of references that do not survive a reload.
//!
//! Images dropped or pasted into the editor are first shown through
//! in-memory `blob:` URLs. Those die with the page, so before a scene is
//! written to storage (and again after it is read back) every such
//! reference is replaced by the embedded copy or removed.

use crate::element::{is_embedded, is_ephemeral, ObjectKind, Paint, SceneObject};
use crate::scene::Scene;

/// What a sanitization pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Image sources swapped for their embedded copy.
    pub replaced: usize,
    /// Images removed for lack of a durable copy.
    pub dropped: usize,
    /// Fill or stroke patterns cleared.
    pub cleared_paints: usize,
    /// Whether the background image was swapped or removed.
    pub background_changed: bool,
}

impl SanitizeReport {
    /// Whether the pass left the scene untouched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Remove ephemeral references from a scene in place.
///
/// Does not queue change notifications; the caller decides whether the
/// rewrite is observable.
pub fn sanitize_scene(scene: &mut Scene) -> SanitizeReport {
    let mut report = SanitizeReport::default();

    let objects = sanitize_objects(scene.take_objects(), &mut report);
    scene.restore_objects(objects);

    if let Some(image) = scene.background_image.take() {
        if image.is_ephemeral() {
            report.background_changed = true;
            scene.background_image = image.embedded_fallback().map(|data| {
                let mut image = image.clone();
                image.src = data.to_string();
                image
            });
        } else {
            scene.background_image = Some(image);
        }
    }

    if !report.is_clean() {
        tracing::debug!(?report, "sanitized ephemeral references");
    }
    report
}

fn sanitize_objects(objects: Vec<SceneObject>, report: &mut SanitizeReport) -> Vec<SceneObject> {
    objects
        .into_iter()
        .filter_map(|object| sanitize_object(object, report))
        .collect()
}

fn sanitize_object(mut object: SceneObject, report: &mut SanitizeReport) -> Option<SceneObject> {
    match &mut object.kind {
        ObjectKind::Image { src, data_url, .. } => {
            if let Some(data) = data_url.as_deref().filter(|d| is_embedded(d)) {
                if src.as_str() != data {
                    *src = data.to_string();
                    report.replaced += 1;
                }
            } else if is_ephemeral(src) {
                report.dropped += 1;
                return None;
            }
        }
        ObjectKind::Group { objects } => {
            *objects = sanitize_objects(std::mem::take(objects), report);
        }
        _ => {}
    }

    for paint in [&mut object.props.fill, &mut object.props.stroke] {
        if matches!(paint, Some(Paint::Pattern { source }) if is_ephemeral(source)) {
            *paint = None;
            report.cleared_paints += 1;
        }
    }

    Some(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::BackgroundImage;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn image(src: &str, data_url: Option<&str>) -> SceneObject {
        SceneObject::new(ObjectKind::Image {
            src: src.to_string(),
            data_url: data_url.map(str::to_string),
            width: 10.0,
            height: 10.0,
        })
    }

    fn image_src(object: &SceneObject) -> &str {
        match &object.kind {
            ObjectKind::Image { src, .. } => src,
            _ => panic!("expected image"),
        }
    }

    #[test]
    fn test_blob_with_fallback_is_replaced() {
        let mut scene = Scene::new(None);
        scene.add(image("blob:http://localhost/1", Some(PNG)));
        let report = sanitize_scene(&mut scene);
        assert_eq!(report.replaced, 1);
        assert_eq!(image_src(&scene.objects()[0]), PNG);
    }

    #[test]
    fn test_blob_without_fallback_is_dropped() {
        let mut scene = Scene::new(None);
        scene.add(image("blob:http://localhost/1", None));
        scene.add(image("https://example.com/a.png", None));
        let report = sanitize_scene(&mut scene);
        assert_eq!(report.dropped, 1);
        assert_eq!(scene.len(), 1);
        assert_eq!(image_src(&scene.objects()[0]), "https://example.com/a.png");
    }

    #[test]
    fn test_non_data_fallback_is_not_trusted() {
        let mut scene = Scene::new(None);
        scene.add(image("blob:x", Some("blob:y")));
        assert_eq!(sanitize_scene(&mut scene).dropped, 1);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_recurses_into_groups() {
        let mut scene = Scene::new(None);
        let group = SceneObject::new(ObjectKind::Group {
            objects: vec![image("blob:gone", None), image("blob:kept", Some(PNG))],
        });
        scene.add(group);
        let report = sanitize_scene(&mut scene);
        assert_eq!((report.dropped, report.replaced), (1, 1));
        match &scene.objects()[0].kind {
            ObjectKind::Group { objects } => {
                assert_eq!(objects.len(), 1);
                assert_eq!(image_src(&objects[0]), PNG);
            }
            _ => panic!("expected group"),
        }
    }

    #[test]
    fn test_blob_patterns_are_cleared() {
        let mut scene = Scene::new(None);
        let mut rect = SceneObject::new(ObjectKind::Circle { radius: 4.0 });
        rect.props.fill = Some(Paint::Pattern {
            source: "blob:tile".to_string(),
        });
        rect.props.stroke = Some(Paint::color("#000000"));
        scene.add(rect);
        let report = sanitize_scene(&mut scene);
        assert_eq!(report.cleared_paints, 1);
        let props = &scene.objects()[0].props;
        assert!(props.fill.is_none());
        assert_eq!(props.stroke, Some(Paint::color("#000000")));
    }

    #[test]
    fn test_background_image_fallback_or_removal() {
        let mut scene = Scene::new(None);
        scene.background_image = Some(BackgroundImage {
            src: "blob:bg".to_string(),
            data_url: Some(PNG.to_string()),
            width: 100.0,
            height: 100.0,
        });
        assert!(sanitize_scene(&mut scene).background_changed);
        assert_eq!(scene.background_image.as_ref().map(|b| b.src.as_str()), Some(PNG));

        scene.background_image = Some(BackgroundImage {
            src: "blob:bg".to_string(),
            data_url: None,
            width: 1.0,
            height: 1.0,
        });
        sanitize_scene(&mut scene);
        assert!(scene.background_image.is_none());
    }

    #[test]
    fn test_clean_scene_is_untouched_and_silent() {
        let mut scene = Scene::new(Some("#ffffff".to_string()));
        scene.add(image(PNG, Some(PNG)));
        scene.drain_events();
        let before = scene.clone();
        assert!(sanitize_scene(&mut scene).is_clean());
        assert_eq!(scene, before);
        assert!(scene.drain_events().is_empty());
    }
}
