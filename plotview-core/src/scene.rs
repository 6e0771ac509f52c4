/// Scene source: the ordered list of objects a view shows
use nalgebra::Matrix4;

use crate::attribute::{Attribute, Color};
use crate::controller::ViewController;
use crate::geometry::{Bounds, Drawable, Geometry};

/// A drawable with an optional color override and local frame
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub drawable: Drawable,
    pub color: Option<Attribute>,
    /// Local-to-world placement, pushed as a user level while drawing
    pub frame: Option<Matrix4<f64>>,
}

impl SceneObject {
    pub fn new(drawable: impl Into<Drawable>) -> Self {
        Self {
            drawable: drawable.into(),
            color: None,
            frame: None,
        }
    }

    pub fn with_color(mut self, color: Color, priority: u32) -> Self {
        self.color = Some(Attribute::new(color, priority));
        self
    }

    pub fn with_frame(mut self, frame: Matrix4<f64>) -> Self {
        self.frame = Some(frame);
        self
    }
}

impl Geometry for SceneObject {
    fn draw(&self, view: &mut ViewController) {
        if let Some(frame) = &self.frame {
            view.push_transform(frame);
        }
        if let Some(attribute) = self.color {
            view.push_color(attribute.color, attribute.priority);
        }

        self.drawable.draw(view);

        if self.color.is_some() {
            view.pop_attribute();
        }
        if self.frame.is_some() {
            view.pop_transform();
        }
    }

    fn extend_bounds(&self, bounds: &mut Bounds) {
        let mut local = Bounds::empty();
        self.drawable.extend_bounds(&mut local);

        match &self.frame {
            Some(frame) => bounds.union(&local.transformed(frame)),
            None => bounds.union(&local),
        }
    }
}

/// Ordered collection of scene objects.
///
/// Every mutation bumps [`revision`](Self::revision) so a view can tell
/// that its cached draw list is stale.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    revision: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, object: SceneObject) {
        self.objects.push(object);
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.revision += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Combined extent of every object; empty for an empty scene.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        self.extend_bounds(&mut bounds);
        bounds
    }
}

impl Geometry for Scene {
    fn draw(&self, view: &mut ViewController) {
        for object in &self.objects {
            object.draw(view);
        }
    }

    fn extend_bounds(&self, bounds: &mut Bounds) {
        for object in &self.objects {
            object.extend_bounds(bounds);
        }
    }
}

impl FromIterator<SceneObject> for Scene {
    fn from_iter<I: IntoIterator<Item = SceneObject>>(iter: I) -> Self {
        let mut scene = Scene::new();
        for object in iter {
            scene.append(object);
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Plot};
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_revision_tracks_changes() {
        let mut scene = Scene::new();
        let start = scene.revision();

        scene.append(SceneObject::new(Plot::axes(1.0)));
        assert!(scene.revision() > start);

        let after_append = scene.revision();
        scene.clear();
        assert!(scene.revision() > after_append);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_bounds_respect_object_frames() {
        let scene: Scene = [
            SceneObject::new(Mesh::cube(2.0)),
            SceneObject::new(Mesh::cube(2.0))
                .with_frame(Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0))),
        ]
        .into_iter()
        .collect();

        let bounds = scene.bounds();
        assert_eq!(scene.len(), 2);
        assert_eq!(bounds.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Point3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn test_empty_scene_has_empty_bounds() {
        assert!(Scene::new().bounds().is_empty());
    }
}
