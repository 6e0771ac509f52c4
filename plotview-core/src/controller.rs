/// View controller: transform stack, camera points and the drawing context
use log::debug;
use nalgebra::{Matrix4, Point2, Point3, Vector2};

use crate::attribute::{AttributeStack, Color};
use crate::backend::{DrawList, RenderBackend};
use crate::config::ViewerConfig;
use crate::fit::FitMode;
use crate::geometry::Geometry;
use crate::scene::Scene;
use crate::stack::{Level, TransformStack};
use crate::transform::Transform;
use crate::viewport::Viewport;

/// Eye position after a transform reset
pub const DEFAULT_EYE: Point3<f64> = Point3::new(0.0, 0.0, 0.0);
/// Target position after a transform reset, one unit down the view axis
pub const DEFAULT_TARGET: Point3<f64> = Point3::new(0.0, 0.0, -1.0);

/// Camera and transform state of one view.
///
/// Also the drawing context handed to [`Geometry::draw`]: drawables issue
/// primitives in their own coordinates and the controller maps them
/// through the current top of the stack.
///
/// Single-threaded and owned by the view it drives: gestures only mark
/// state dirty or edit the stack, and all recomputation happens in
/// [`paint`](Self::paint).
#[derive(Debug, Clone)]
pub struct ViewController {
    pub(crate) stack: TransformStack,
    /// Eye and target as stored, relative to the parallel projection level
    pub(crate) eye: Point3<f64>,
    pub(crate) target: Point3<f64>,
    attributes: AttributeStack,
    viewport: Viewport,
    pending_fit: Option<FitMode>,
    rebuild: bool,
    scene_revision: Option<u64>,
    draw_list: DrawList,
}

impl ViewController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            stack: TransformStack::new(&viewport.display_unit),
            eye: DEFAULT_EYE,
            target: DEFAULT_TARGET,
            attributes: AttributeStack::new(),
            viewport,
            pending_fit: None,
            rebuild: true,
            scene_revision: None,
            draw_list: DrawList::new(),
        }
    }

    pub fn from_config(origin: Point2<i32>, size: Vector2<i32>, config: &ViewerConfig) -> Self {
        Self::new(Viewport::new(origin, size, &config.display))
    }

    pub fn stack(&self) -> &TransformStack {
        &self.stack
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn attributes(&self) -> &AttributeStack {
        &self.attributes
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn pending_fit(&self) -> Option<FitMode> {
        self.pending_fit
    }

    pub fn needs_rebuild(&self) -> bool {
        self.rebuild
    }

    /// Regenerate the draw list on the next paint (the model changed).
    pub fn redraw(&mut self) {
        self.rebuild = true;
    }

    /// Place the camera for `mode` on the next paint.
    pub fn request_fit(&mut self, mode: FitMode) {
        self.pending_fit = Some(mode);
        self.rebuild = true;
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.viewport.resize(width, height);
        self.rebuild = true;
        debug!("viewport resized to {width}x{height}");
    }

    /// Replace the physical display description (density, flips).
    pub fn set_display(&mut self, config: &ViewerConfig) {
        self.viewport.set_display(&config.display);
        self.rebuild = true;
    }

    /// Paint one frame of `scene` into `backend`.
    ///
    /// The scene is only asked to draw again when the draw list is stale:
    /// after [`redraw`](Self::redraw), a resize, a fit request, or a change
    /// of the scene's revision. Pan, zoom and rotate take effect through
    /// the replay alone.
    pub fn paint(&mut self, scene: &Scene, backend: &mut dyn RenderBackend) {
        if self.scene_revision != Some(scene.revision()) {
            self.rebuild = true;
        }

        if self.rebuild {
            self.rebuild_draw_list(scene);
        }

        backend.clear();
        let base = *self.stack.reserved(Level::ParallelProjection);
        self.draw_list.replay(&base, backend);
    }

    fn rebuild_draw_list(&mut self, scene: &Scene) {
        self.rebuild = false;
        self.scene_revision = Some(scene.revision());
        self.draw_list.clear();

        let device = Transform::scaling(&self.viewport.display_unit);
        self.stack
            .edit_level(Level::DeviceMmToDevice.index(), device);
        self.attributes.reset();

        if let Some(mode) = self.pending_fit.take() {
            self.fit(mode, &scene.bounds());
        }

        scene.draw(self);
        debug!(
            "rebuilt draw list: {} objects, {} commands",
            scene.len(),
            self.draw_list.len()
        );
    }

    /// Compose a transient frame onto the top of the stack.
    pub fn push_transform(&mut self, trafo: &Matrix4<f64>) {
        self.stack.push(trafo);
    }

    /// Push a frame measured in device millimeters whose origin sits where
    /// `center` is currently displayed. Geometry drawn in it keeps its
    /// physical size regardless of zoom.
    pub fn push_device_mm_transform(&mut self, center: &Point3<f64>) {
        let device = *self.stack.reserved(Level::DeviceMmToDevice);
        let middle = self
            .stack
            .relative_to(Level::DeviceMmToDevice.index())
            .transform_point(center);
        let trafo = Transform::invert(self.stack.top())
            * device
            * Transform::translation(&middle.coords);

        self.stack.push(&trafo);
    }

    pub fn pop_transform(&mut self) {
        self.stack.pop();
    }

    /// Reinitialize the reserved levels, drop user levels, and put the eye
    /// and target back to their defaults.
    pub fn reset_transforms(&mut self) {
        self.stack.reset(&self.viewport.display_unit);
        self.eye = DEFAULT_EYE;
        self.target = DEFAULT_TARGET;
    }

    pub fn push_color(&mut self, color: Color, priority: u32) {
        self.attributes.push_color(color, priority);
    }

    pub fn pop_attribute(&mut self) {
        self.attributes.pop();
    }

    pub fn reset_attributes(&mut self) {
        self.attributes.reset();
    }

    /// Hand a changed color to the draw list, once per change.
    pub fn apply_attributes(&mut self) {
        if let Some(color) = self.attributes.take_pending() {
            self.draw_list.set_color(color);
        }
    }

    fn to_base(&self) -> Matrix4<f64> {
        self.stack
            .relative_to(Level::ParallelProjection.index())
    }

    pub fn draw_point(&mut self, point: &Point3<f64>) {
        let to_base = self.to_base();
        self.apply_attributes();
        self.draw_list.point(to_base.transform_point(point));
    }

    pub fn draw_line(&mut self, start: &Point3<f64>, end: &Point3<f64>) {
        let to_base = self.to_base();
        self.apply_attributes();
        self.draw_list.line(
            to_base.transform_point(start),
            to_base.transform_point(end),
        );
    }

    pub fn draw_triangle(&mut self, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) {
        let to_base = self.to_base();
        self.apply_attributes();
        self.draw_list.triangle(
            to_base.transform_point(a),
            to_base.transform_point(b),
            to_base.transform_point(c),
        );
    }

    /// Point of the current top frame displayed at `display_point`, on the
    /// device plane z = 0.
    pub fn display_to_model(&self, display_point: &Point2<f64>) -> Point3<f64> {
        let inverse = Transform::invert(self.stack.top());
        inverse.transform_point(&Point3::new(display_point.x, display_point.y, 0.0))
    }

    /// Device pixel `model_point` is displayed at.
    pub fn model_to_display(&self, model_point: &Point3<f64>) -> Point2<i32> {
        let device = self.stack.top().transform_point(model_point);
        Point2::new(device.x.round() as i32, device.y.round() as i32)
    }
}
