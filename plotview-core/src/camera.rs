/// Eye and target points of the parallel projection
use log::debug;
use nalgebra::{Matrix4, Point3};

use crate::controller::ViewController;
use crate::stack::Level;
use crate::transform::Transform;

impl ViewController {
    /// Move the eye to `point`, given in the current top frame.
    pub fn set_eye_point(&mut self, point: &Point3<f64>) {
        self.eye = self.to_camera_frame(point);
        self.update_parallel_projection();
        debug!("eye point set to {:?}", self.eye);
    }

    /// Eye point expressed in the current top frame.
    pub fn eye_point(&self) -> Point3<f64> {
        self.from_camera_frame(&self.eye)
    }

    /// Move the target to `point`, given in the current top frame.
    pub fn set_target_point(&mut self, point: &Point3<f64>) {
        self.target = self.to_camera_frame(point);
        self.update_parallel_projection();
        debug!("target point set to {:?}", self.target);
    }

    /// Target point expressed in the current top frame.
    pub fn target_point(&self) -> Point3<f64> {
        self.from_camera_frame(&self.target)
    }

    /// Top frame to the frame eye and target are stored in.
    fn to_camera_frame(&self, point: &Point3<f64>) -> Point3<f64> {
        if self.stack.has_user_levels() {
            self.stack
                .relative_to(Level::ParallelProjection.index())
                .transform_point(point)
        } else {
            *point
        }
    }

    fn from_camera_frame(&self, point: &Point3<f64>) -> Point3<f64> {
        if self.stack.has_user_levels() {
            let to_top: Matrix4<f64> = Transform::invert(self.stack.top())
                * self.stack.reserved(Level::ParallelProjection);
            to_top.transform_point(point)
        } else {
            *point
        }
    }

    fn update_parallel_projection(&mut self) {
        let central = *self.stack.reserved(Level::CentralProjection);
        let projection = central * Transform::look_at(&self.eye, &self.target);

        self.stack
            .edit_level(Level::ParallelProjection.index(), projection);
    }
}

#[cfg(test)]
mod tests {
    use crate::controller::ViewController;
    use crate::stack::Level;
    use crate::viewport::Viewport;
    use nalgebra::{Matrix4, Point3, Vector3};

    fn controller() -> ViewController {
        ViewController::new(Viewport::with_size(100, 100))
    }

    #[test]
    fn test_eye_and_target_round_trip() {
        let mut view = controller();
        view.set_eye_point(&Point3::new(0.0, 0.0, 10.0));
        view.set_target_point(&Point3::new(1.0, 2.0, 3.0));

        assert_eq!(view.eye_point(), Point3::new(0.0, 0.0, 10.0));
        assert_eq!(view.target_point(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_target_is_displayed_on_view_axis() {
        let mut view = controller();
        view.set_eye_point(&Point3::new(5.0, 5.0, 10.0));
        view.set_target_point(&Point3::new(5.0, 5.0, 0.0));

        let top = view.stack().top();
        let eye = top.transform_point(&Point3::new(5.0, 5.0, 10.0));
        let target = top.transform_point(&Point3::new(5.0, 5.0, 0.0));

        assert!(eye.coords.xy().norm() < 1e-9);
        assert!(target.coords.xy().norm() < 1e-9);
        assert!(target.z < eye.z);
    }

    #[test]
    fn test_points_in_user_frame_are_stored_relative_to_it() {
        let mut view = controller();
        view.push_transform(&Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)));

        view.set_eye_point(&Point3::new(0.0, 0.0, 5.0));
        view.set_target_point(&Point3::origin());

        let eye = view.eye_point();
        let target = view.target_point();
        assert!((eye - Point3::new(0.0, 0.0, 5.0)).norm() < 1e-9);
        assert!(target.coords.norm() < 1e-9);

        view.pop_transform();
        assert!((view.target_point() - Point3::new(10.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_coincident_points_give_identity_look_at() {
        let mut view = controller();
        view.set_eye_point(&Point3::new(1.0, 1.0, 1.0));
        view.set_target_point(&Point3::new(1.0, 1.0, 1.0));

        assert_eq!(
            view.stack().reserved(Level::ParallelProjection),
            view.stack().reserved(Level::CentralProjection)
        );
    }

    #[test]
    fn test_points_survive_balanced_push_pop() {
        let mut view = controller();
        view.set_eye_point(&Point3::new(3.0, -4.0, 6.0));
        view.set_target_point(&Point3::new(1.0, 1.0, 0.0));

        let outer = Matrix4::new_translation(&Vector3::new(10.0, 0.0, -2.0))
            * Matrix4::new_scaling(2.0);
        let inner = Matrix4::new_rotation(Vector3::new(0.0, 0.0, 0.7));

        view.push_transform(&outer);
        let (eye, target) = (view.eye_point(), view.target_point());

        view.push_transform(&inner);
        view.pop_transform();
        assert!((view.eye_point() - eye).norm() < 1e-9);
        assert!((view.target_point() - target).norm() < 1e-9);

        view.pop_transform();
        assert!((view.eye_point() - Point3::new(3.0, -4.0, 6.0)).norm() < 1e-9);
        assert!((view.target_point() - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-9);
    }
}
