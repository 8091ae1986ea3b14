//! Scene graph for managing drawable objects.
//!
//! Objects are kept in stacking order, back to front. Every mutation queues
//! a [`SceneEvent`] that the owner drains with [`Scene::drain_events`].

use serde::{Deserialize, Serialize};

use crate::element::{is_embedded, is_ephemeral, Bounds, ObjectId, SceneObject};
use crate::event::SceneEvent;
use crate::transform::Point;
use crate::{CanvasError, CanvasResult};

/// An image painted behind every object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    /// Image source URI.
    pub src: String,
    /// Embedded copy of the image.
    #[serde(default, rename = "dataURL", skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    /// Width in scene units.
    pub width: f64,
    /// Height in scene units.
    pub height: f64,
}

impl BackgroundImage {
    /// Whether the source would not survive a reload.
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        is_ephemeral(&self.src)
    }

    /// The embedded fallback, if it is a real data URL.
    #[must_use]
    pub fn embedded_fallback(&self) -> Option<&str> {
        self.data_url.as_deref().filter(|d| is_embedded(d))
    }
}

/// A scene containing all drawable objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Serialization format version.
    #[serde(default = "Scene::format_version")]
    version: u32,
    /// Objects in stacking order, back to front.
    #[serde(default)]
    objects: Vec<SceneObject>,
    /// Canvas background color; `None` is transparent.
    #[serde(default)]
    pub background: Option<String>,
    /// Optional background image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<BackgroundImage>,
    /// Currently selected object IDs.
    #[serde(skip)]
    selected: Vec<ObjectId>,
    /// Change notifications not yet drained.
    #[serde(skip)]
    events: Vec<SceneEvent>,
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.objects == other.objects
            && self.background == other.background
            && self.background_image == other.background_image
    }
}

impl Scene {
    /// Current serialization format version.
    pub const VERSION: u32 = 1;

    const fn format_version() -> u32 {
        Self::VERSION
    }

    /// Create an empty scene with the given background.
    #[must_use]
    pub fn new(background: Option<String>) -> Self {
        Self {
            version: Self::VERSION,
            background,
            ..Self::default()
        }
    }

    /// Push a change notification for the owner to drain.
    pub fn notify(&mut self, event: SceneEvent) {
        self.events.push(event);
    }

    /// Take all pending change notifications, in emission order.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add an object on top of the stack.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        self.notify(SceneEvent::ObjectAdded(id));
        id
    }

    /// Remove an object from the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn remove(&mut self, id: ObjectId) -> CanvasResult<SceneObject> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))?;
        let object = self.objects.remove(idx);
        if self.selected.contains(&id) {
            self.selected.retain(|&sid| sid != id);
            self.notify(SceneEvent::SelectionChanged);
        }
        self.notify(SceneEvent::ObjectRemoved(id));
        Ok(object)
    }

    /// Mutate an object in place and announce the change.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn modify<F, R>(&mut self, id: ObjectId, f: F) -> CanvasResult<R>
    where
        F: FnOnce(&mut SceneObject) -> R,
    {
        let object = self
            .get_mut(id)
            .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))?;
        let result = f(object);
        self.notify(SceneEvent::ObjectModified(id));
        Ok(result)
    }

    /// Get an object by ID.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Get a mutable reference to an object without announcing a change.
    ///
    /// Used for transient updates (live drawing); callers announce the
    /// final state with [`Scene::notify`].
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// All objects, back to front.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Mutable access to all objects without announcing a change.
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    /// Stack position of an object.
    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Number of objects in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object.
    pub fn clear(&mut self) {
        let ids: Vec<_> = self.objects.iter().map(|o| o.id).collect();
        self.objects.clear();
        if !self.selected.is_empty() {
            self.selected.clear();
            self.notify(SceneEvent::SelectionChanged);
        }
        for id in ids {
            self.notify(SceneEvent::ObjectRemoved(id));
        }
    }

    /// Replace the content with another scene, keeping pending events.
    ///
    /// Selection is cleared and [`SceneEvent::SceneLoaded`] is queued,
    /// followed by [`SceneEvent::BackgroundChanged`] when the incoming
    /// background differs.
    pub fn replace_with(&mut self, other: Scene) {
        let background_changed = self.background != other.background
            || self.background_image != other.background_image;
        self.version = other.version;
        self.objects = other.objects;
        self.background = other.background;
        self.background_image = other.background_image;
        self.selected.clear();
        self.notify(SceneEvent::SceneLoaded);
        if background_changed {
            self.notify(SceneEvent::BackgroundChanged);
        }
    }

    /// Set the background color.
    pub fn set_background(&mut self, color: Option<String>) {
        if self.background != color {
            self.background = color;
            self.notify(SceneEvent::BackgroundChanged);
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Add an object to the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn select(&mut self, id: ObjectId) -> CanvasResult<()> {
        if self.get(id).is_none() {
            return Err(CanvasError::ObjectNotFound(id.to_string()));
        }
        if !self.selected.contains(&id) {
            self.selected.push(id);
            self.notify(SceneEvent::SelectionChanged);
        }
        Ok(())
    }

    /// Make `id` the only selected object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn select_only(&mut self, id: ObjectId) -> CanvasResult<()> {
        if self.replace_selection(id) {
            Ok(())
        } else {
            Err(CanvasError::ObjectNotFound(id.to_string()))
        }
    }

    /// Make `id` the only selected object if it is in the scene.
    ///
    /// Returns `false`, leaving the selection untouched, for unknown ids.
    pub fn replace_selection(&mut self, id: ObjectId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.selected != [id] {
            self.selected = vec![id];
            self.notify(SceneEvent::SelectionChanged);
        }
        true
    }

    /// Select every visible object.
    pub fn select_all_visible(&mut self) -> usize {
        let ids: Vec<_> = self
            .objects
            .iter()
            .filter(|o| o.props.visible)
            .map(|o| o.id)
            .collect();
        if ids != self.selected {
            self.selected = ids;
            self.notify(SceneEvent::SelectionChanged);
        }
        self.selected.len()
    }

    /// Deselect all objects.
    pub fn deselect_all(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.notify(SceneEvent::SelectionChanged);
        }
    }

    /// Currently selected IDs, in selection order.
    #[must_use]
    pub fn selected_ids(&self) -> &[ObjectId] {
        &self.selected
    }

    /// Currently selected objects, in selection order.
    pub fn selected_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.selected.iter().filter_map(|id| self.get(*id))
    }

    /// Whether an object is selected.
    #[must_use]
    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selected.contains(&id)
    }

    // -----------------------------------------------------------------------
    // Layering
    // -----------------------------------------------------------------------

    fn move_to(&mut self, id: ObjectId, target: usize) -> CanvasResult<bool> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))?;
        if idx == target {
            return Ok(false);
        }
        let object = self.objects.remove(idx);
        self.objects.insert(target, object);
        self.notify(SceneEvent::ObjectModified(id));
        Ok(true)
    }

    /// Move an object one step towards the front.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn bring_forward(&mut self, id: ObjectId) -> CanvasResult<bool> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))?;
        let target = (idx + 1).min(self.objects.len() - 1);
        self.move_to(id, target)
    }

    /// Move an object one step towards the back.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn send_backward(&mut self, id: ObjectId) -> CanvasResult<bool> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))?;
        self.move_to(id, idx.saturating_sub(1))
    }

    /// Move an object to the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn bring_to_front(&mut self, id: ObjectId) -> CanvasResult<bool> {
        let last = self.objects.len().saturating_sub(1);
        self.move_to(id, last)
    }

    /// Move an object to the bottom of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn send_to_back(&mut self, id: ObjectId) -> CanvasResult<bool> {
        self.move_to(id, 0)
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// Find the topmost selectable, visible object at a scene point.
    #[must_use]
    pub fn object_at(&self, p: Point) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.props.visible && o.props.selectable && o.contains_point(p))
            .map(|o| o.id)
    }

    /// Union of the bounds of every visible object.
    #[must_use]
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.objects
            .iter()
            .filter(|o| o.props.visible)
            .map(SceneObject::bounding_rect)
            .reduce(|a, b| a.union(&b))
    }

    /// Set whether every object can be picked.
    pub fn set_all_selectable(&mut self, selectable: bool) {
        for object in &mut self.objects {
            object.props.selectable = selectable;
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json).map_err(CanvasError::Serialization)
    }

    /// Take ownership of the object list, leaving the scene empty and
    /// without announcing a change.
    pub(crate) fn take_objects(&mut self) -> Vec<SceneObject> {
        std::mem::take(&mut self.objects)
    }

    /// Put back an object list taken with [`Scene::take_objects`].
    pub(crate) fn restore_objects(&mut self, objects: Vec<SceneObject>) {
        self.objects = objects;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ObjectKind, Paint};

    fn rect_at(x: f64, y: f64) -> SceneObject {
        SceneObject::new(ObjectKind::Rect {
            width: 50.0,
            height: 40.0,
            rx: 0.0,
            ry: 0.0,
        })
        .at(x, y)
    }

    fn ids(scene: &Scene) -> Vec<ObjectId> {
        scene.objects().iter().map(|o| o.id).collect()
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new(None);
        assert!(scene.is_empty());

        let id = scene.add(rect_at(0.0, 0.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.get(id).is_some());

        scene.remove(id).expect("should remove");
        assert!(scene.is_empty());
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::ObjectAdded(id), SceneEvent::ObjectRemoved(id)]
        );
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_remove_missing_fails() {
        let mut scene = Scene::new(None);
        assert!(matches!(
            scene.remove(ObjectId::new()),
            Err(CanvasError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_modify_announces_change() {
        let mut scene = Scene::new(None);
        let id = scene.add(rect_at(0.0, 0.0));
        scene.drain_events();
        scene
            .modify(id, |o| o.props.fill = Some(Paint::color("#ff0000")))
            .expect("modify");
        assert_eq!(scene.drain_events(), vec![SceneEvent::ObjectModified(id)]);
    }

    #[test]
    fn test_object_at_prefers_topmost() {
        let mut scene = Scene::new(None);
        let bottom = scene.add(rect_at(0.0, 0.0));
        let top = scene.add(rect_at(10.0, 10.0));
        assert_eq!(scene.object_at(Point::new(20.0, 20.0)), Some(top));
        assert_eq!(scene.object_at(Point::new(5.0, 5.0)), Some(bottom));
        assert_eq!(scene.object_at(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_layering() {
        let mut scene = Scene::new(None);
        let a = scene.add(rect_at(0.0, 0.0));
        let b = scene.add(rect_at(0.0, 0.0));
        let c = scene.add(rect_at(0.0, 0.0));

        scene.bring_forward(a).expect("forward");
        assert_eq!(ids(&scene), vec![b, a, c]);
        scene.bring_to_front(b).expect("front");
        assert_eq!(ids(&scene), vec![a, c, b]);
        scene.send_to_back(b).expect("back");
        assert_eq!(ids(&scene), vec![b, a, c]);
        scene.send_backward(c).expect("backward");
        assert_eq!(ids(&scene), vec![b, c, a]);
        assert!(!scene.send_to_back(b).expect("no-op"));
    }

    #[test]
    fn test_selection_and_removal() {
        let mut scene = Scene::new(None);
        let a = scene.add(rect_at(0.0, 0.0));
        let b = scene.add(rect_at(0.0, 0.0));
        assert_eq!(scene.select_all_visible(), 2);
        scene.remove(a).expect("remove");
        assert_eq!(scene.selected_ids(), &[b]);
        scene.deselect_all();
        assert!(scene.selected_ids().is_empty());
    }

    #[test]
    fn test_selection_not_serialized() {
        let mut scene = Scene::new(Some("#ffffff".to_string()));
        let id = scene.add(rect_at(0.0, 0.0));
        scene.select(id).expect("select");
        let restored = Scene::from_json(&scene.to_json().expect("json")).expect("parse");
        assert!(restored.selected_ids().is_empty());
        assert_eq!(restored, scene);
    }

    #[test]
    fn test_content_bounds_skips_hidden() {
        let mut scene = Scene::new(None);
        scene.add(rect_at(0.0, 0.0));
        let mut hidden = rect_at(1000.0, 1000.0);
        hidden.props.visible = false;
        scene.add(hidden);
        let bounds = scene.content_bounds().expect("bounds");
        assert!(bounds.right() < 100.0);
    }

    #[test]
    fn test_background_change_only_when_different() {
        let mut scene = Scene::new(Some("#ffffff".to_string()));
        scene.set_background(Some("#ffffff".to_string()));
        assert!(scene.drain_events().is_empty());
        scene.set_background(None);
        assert_eq!(scene.drain_events(), vec![SceneEvent::BackgroundChanged]);
    }

    #[test]
    fn test_replace_selection_ignores_unknown_ids() {
        let mut scene = Scene::new(None);
        let a = scene.add(rect_at(0.0, 0.0));
        let b = scene.add(rect_at(50.0, 0.0));
        assert!(scene.replace_selection(a));
        scene.drain_events();

        assert!(!scene.replace_selection(ObjectId::new()));
        assert_eq!(scene.selected_ids(), &[a]);
        assert!(scene.drain_events().is_empty());

        assert!(scene.replace_selection(b));
        assert_eq!(scene.selected_ids(), &[b]);
        assert!(scene.select_only(ObjectId::new()).is_err());
    }

    #[test]
    fn test_replace_with_reports_background_change() {
        let mut scene = Scene::new(Some("#000000".to_string()));
        scene.replace_with(Scene::new(Some("#000000".to_string())));
        assert_eq!(scene.drain_events(), vec![SceneEvent::SceneLoaded]);

        scene.replace_with(Scene::new(Some("#ffffff".to_string())));
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::SceneLoaded, SceneEvent::BackgroundChanged]
        );
        assert_eq!(scene.background.as_deref(), Some("#ffffff"));
    }
}
