/// Placing the camera so a bounding box fills the viewport
use log::debug;
use nalgebra::{Point3, Vector2, Vector3};

use crate::controller::ViewController;
use crate::geometry::Bounds;
use crate::transform::EPSILON;

/// How [`ViewController::fit`] orients the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Keep the current camera direction and rotation.
    Generic,
    /// Look down the Z axis from above.
    XyPlane,
    /// Look along +Y from the front.
    XzPlane,
    /// Look down the X axis from the +X side.
    YzPlane,
}

/// Eye and target chosen for a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPlacement {
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
}

/// Camera for `mode` on the normalized `bounds`. `direction` is the
/// current eye to target direction and only matters for
/// [`FitMode::Generic`].
pub fn place_camera(mode: FitMode, bounds: &Bounds, direction: &Vector3<f64>) -> CameraPlacement {
    let center = bounds.center();
    let size = bounds.size();
    let (min, max) = (bounds.min, bounds.max);

    match mode {
        FitMode::Generic => {
            let direction = direction.try_normalize(EPSILON).unwrap_or(-Vector3::z());
            let mut eye = center - direction;

            let axis = dominant_axis(&direction);
            let step = direction[axis];
            // back the eye out until it sits one unit outside the box
            let length = if step < 0.0 {
                if eye[axis] <= max[axis] {
                    (max[axis] - eye[axis]) / step - 1.0
                } else {
                    0.0
                }
            } else if eye[axis] >= min[axis] {
                (min[axis] - eye[axis]) / step - 1.0
            } else {
                0.0
            };
            eye += direction * length;

            CameraPlacement {
                eye,
                target: center,
            }
        }
        FitMode::XyPlane => {
            let mut target = center;
            if size.z == 0.0 {
                target.z -= 1.0;
            }
            CameraPlacement {
                eye: Point3::new(center.x, center.y, max.z),
                target,
            }
        }
        FitMode::XzPlane => {
            let mut target = center;
            if size.y == 0.0 {
                target.y += 1.0;
            }
            CameraPlacement {
                eye: Point3::new(center.x, min.y, center.z),
                target,
            }
        }
        FitMode::YzPlane => {
            let mut target = center;
            if size.x == 0.0 {
                target.x -= 1.0;
            }
            CameraPlacement {
                eye: Point3::new(max.x, center.y, center.z),
                target,
            }
        }
    }
}

/// Axis along which `direction` is largest; ties fall through to Y.
fn dominant_axis(direction: &Vector3<f64>) -> usize {
    let abs = direction.abs();

    if abs.x > abs.y && abs.x > abs.z {
        0
    } else if abs.z > abs.y {
        2
    } else {
        1
    }
}

/// Uniform scale taking `model` extents (view space) into `view` extents.
///
/// Axes along which the model is flat do not constrain the scale; with no
/// constraining axis at all the scale is 1.
pub fn fit_scale(view: &Vector2<f64>, model: &Vector2<f64>) -> f64 {
    let ratio = |view: f64, model: f64| (model > EPSILON).then(|| view / model);

    match (ratio(view.x, model.x), ratio(view.y, model.y)) {
        (Some(x), Some(y)) => x.min(y),
        (Some(ratio), None) | (None, Some(ratio)) => ratio,
        (None, None) => 1.0,
    }
}

/// Width and height of `points` in the XY plane.
fn extent_xy(points: impl IntoIterator<Item = Point3<f64>>) -> Vector2<f64> {
    let bounds = Bounds::from_points(&points.into_iter().collect::<Vec<_>>());
    if bounds.is_empty() {
        Vector2::zeros()
    } else {
        bounds.size().xy()
    }
}

impl ViewController {
    /// Place the camera so `bounds` fills the viewport.
    ///
    /// Axis-plane fits start from reset transforms and attributes. `Generic`
    /// keeps whatever rotation the gestures left on the view and only moves
    /// the eye along the current camera direction.
    pub fn fit(&mut self, mode: FitMode, bounds: &Bounds) {
        let bounds = bounds.normalized();
        let direction = self.target_point() - self.eye_point();

        if mode != FitMode::Generic {
            self.reset_transforms();
            self.reset_attributes();
        }

        let placement = place_camera(mode, &bounds, &direction);
        self.set_eye_point(&placement.eye);
        self.set_target_point(&placement.target);

        let top = *self.stack.top();
        let model_extent = extent_xy(bounds.corners().map(|corner| top.transform_point(&corner)));
        let view_extent = Vector2::new(
            f64::from(self.viewport().width()),
            f64::from(self.viewport().height()),
        );

        let scale = fit_scale(&view_extent, &model_extent);
        debug!(
            "fit {mode:?}: eye {:?}, target {:?}, scale {scale}",
            placement.eye, placement.target
        );

        let centre = self.display_to_model(&self.viewport().center());
        self.shift_on_display(&centre.coords);
        self.scale_on_display_uniform(scale);
        self.shift_on_display(&-placement.eye.coords);

        self.centre_on_display(&bounds);
    }

    /// Shift the device-space box of `bounds` to the middle of the viewport.
    /// Only moves anything when a kept rotation tilts the eye off the
    /// target's view ray.
    fn centre_on_display(&mut self, bounds: &Bounds) {
        let top = *self.stack.top();
        let placed = Bounds::from_points(&bounds.corners().map(|corner| top.transform_point(&corner)));

        let from = self.display_to_model(&placed.center().xy());
        let to = self.display_to_model(&self.viewport().center());
        self.shift_on_display(&(to - from));
    }
}
