/// Interactive view manipulation on the world to device-mm level
use log::{debug, trace};
use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::controller::ViewController;
use crate::stack::Level;
use crate::transform::{RotationState, Transform, EPSILON};

const GESTURE_LEVEL: usize = Level::WorldToDeviceMm.index();

impl ViewController {
    /// Translate the view by `vector`, given in the current top frame.
    pub fn shift_on_display(&mut self, vector: &Vector3<f64>) {
        let local = self.stack.relative_to(GESTURE_LEVEL);
        let delta = local.transform_vector(vector);
        let shifted = self.stack.level(GESTURE_LEVEL) * Transform::translation(&delta);

        self.stack.edit_level(GESTURE_LEVEL, shifted);
        trace!("shift on display by {delta:?}");
    }

    /// Scale the view per axis about the origin of the current top frame.
    ///
    /// Ignored when any factor is zero (or not finite), which would make
    /// the stack singular.
    pub fn scale_on_display(&mut self, factors: &Vector3<f64>) {
        if !factors.iter().all(|f| f.is_finite() && f.abs() > EPSILON) {
            debug!("ignoring degenerate display scale {factors:?}");
            return;
        }

        let local = self.stack.relative_to(GESTURE_LEVEL);
        let origin = local.transform_point(&Point3::origin()).coords;
        let scaled = self.stack.level(GESTURE_LEVEL)
            * Transform::translation(&origin)
            * Transform::scaling(factors)
            * Transform::translation(&-origin);

        self.stack.edit_level(GESTURE_LEVEL, scaled);
    }

    pub fn scale_on_display_uniform(&mut self, factor: f64) {
        self.scale_on_display(&Vector3::repeat(factor));
    }

    /// Rotate the view about `center` (in the current top frame), with the
    /// rotation axes taken in device millimeters.
    pub fn rotate_on_display(&mut self, center: &Point3<f64>, rotation: &RotationState) {
        if rotation.is_zero() {
            return;
        }

        let sub = *self.stack.level(GESTURE_LEVEL - 1);
        let sub_inverse = Transform::invert(&sub);
        let middle = (sub_inverse * self.stack.top()).transform_point(center).coords;

        let turn = sub
            * Transform::translation(&middle)
            * Transform::rotation(rotation)
            * Transform::translation(&-middle)
            * sub_inverse;
        let rotated = turn * self.stack.level(GESTURE_LEVEL);

        self.stack.edit_level(GESTURE_LEVEL, rotated);
        trace!("rotate on display by {rotation:?}");
    }

    /// Zoom so the device rectangle spanned by `corner` and `opposite`
    /// fills the viewport.
    ///
    /// The factor is the whole number of times the rectangle fits into the
    /// viewport along its tighter axis. A rectangle without area is ignored.
    pub fn zoom_rect(&mut self, corner: &Point2<i32>, opposite: &Point2<i32>) {
        let min = corner.inf(opposite);
        let max = corner.sup(opposite);
        let extent: Vector2<i32> = max - min;

        if extent.x == 0 || extent.y == 0 {
            debug!("ignoring zoom to empty rectangle {min:?} {max:?}");
            return;
        }

        let factor = (self.viewport().width() / extent.x).min(self.viewport().height() / extent.y);
        let centre = Point2::new(
            f64::from(min.x + max.x) / 2.0,
            f64::from(min.y + max.y) / 2.0,
        );

        debug!("zoom to rectangle {min:?} {max:?}, factor {factor}");
        self.zoom_about(&centre, f64::from(factor));
    }

    /// Scale by `factor` about the device point `centre`, then bring that
    /// point to the middle of the viewport.
    pub fn zoom_about(&mut self, centre: &Point2<f64>, factor: f64) {
        let zoom_centre = self.display_to_model(centre);
        self.shift_on_display(&zoom_centre.coords);
        self.scale_on_display_uniform(factor);

        let device_centre = self.display_to_model(&self.viewport().center());
        self.shift_on_display(&(device_centre - zoom_centre));
    }

    /// Pan so the content under `from` ends up under `to`.
    pub fn shift(&mut self, from: &Point2<i32>, to: &Point2<i32>) {
        let from = self.display_to_model(&from.cast());
        let to = self.display_to_model(&to.cast());
        self.shift_on_display(&(to - from));
    }

    /// Trackball rotation about the target point for a drag from `from`
    /// to `to`.
    ///
    /// The trackball radius is the on-screen distance between the eye and
    /// the target, so the gesture does nothing while the view looks
    /// straight down the eye to target axis.
    pub fn arc_rotate(&mut self, from: &Point2<i32>, to: &Point2<i32>) {
        let target = self.target_point();
        let eye_on_display = self.model_to_display(&self.eye_point());
        let target_on_display = self.model_to_display(&target);
        let radius = (eye_on_display - target_on_display).cast::<f64>().norm();

        if let Some(turn) = arc_turn(&target_on_display.cast(), radius, from, to) {
            self.rotate_on_display(&target, &turn);
        }
    }
}

/// Rotation for a trackball drag from `from` to `to` around the device
/// point `target`, with the trackball `radius` in pixels. Angles are in
/// radians.
///
/// Vertical motion turns about X and horizontal motion about Y, both
/// weighted by how much the drag moved towards or away from the target.
/// Motion around the target twists about Z, fully at the trackball rim and
/// fading out towards its center. `None` when the radius or the drag is
/// too short to mean anything.
pub fn arc_turn(
    target: &Point2<f64>,
    radius: f64,
    from: &Point2<i32>,
    to: &Point2<i32>,
) -> Option<RotationState> {
    let from: Point2<f64> = from.cast();
    let to: Point2<f64> = to.cast();

    let diff = to - from;
    let delta = diff.norm();
    if radius <= EPSILON || delta <= EPSILON {
        return None;
    }

    let local_from = from - target;
    let local_to = to - target;
    let d_from = local_from.norm();
    let d_to = local_to.norm();

    let factor = (d_from - d_to).abs() / delta;
    let x_turn = diff.y * factor / radius;
    let y_turn = diff.x * factor / radius;

    let mut z_turn = 0.0;
    let denominator = 2.0 * d_from * d_to;
    if denominator > EPSILON {
        let cos = ((d_from * d_from + d_to * d_to - delta * delta) / denominator).clamp(-1.0, 1.0);
        z_turn = cos.acos() * ((d_from + d_to) / (2.0 * radius)).min(1.0);

        let orientation = local_from.x * local_to.y - local_from.y * local_to.x;
        if orientation > 0.0 {
            z_turn = -z_turn;
        }
    }

    Some(RotationState::new(x_turn, y_turn, z_turn))
}
