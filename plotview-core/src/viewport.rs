/// Device-space viewport bounds and physical display scaling
use nalgebra::{Point2, Vector2, Vector3};

use crate::config::DisplayConfig;

/// The integer device-pixel rectangle the view is drawn into, and the
/// scale from physical millimeters to device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub display_min: Point2<i32>,
    pub display_max: Point2<i32>,
    /// Pixels per millimeter, negated on flipped axes; `z` is always 1.
    pub display_unit: Vector3<f64>,
}

impl Viewport {
    pub fn new(origin: Point2<i32>, size: Vector2<i32>, display: &DisplayConfig) -> Self {
        Self {
            display_min: origin,
            display_max: origin + size,
            display_unit: display_unit(display),
        }
    }

    /// Viewport with one pixel per millimeter and device Y pointing down.
    pub fn with_size(width: i32, height: i32) -> Self {
        Self::new(
            Point2::origin(),
            Vector2::new(width, height),
            &DisplayConfig::default(),
        )
    }

    /// Keep the origin, take the new size.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.display_max = self.display_min + Vector2::new(width, height);
    }

    /// Physical density or axis orientation changed (e.g. the window moved
    /// to another monitor).
    pub fn set_display(&mut self, display: &DisplayConfig) {
        self.display_unit = display_unit(display);
    }

    pub fn width(&self) -> i32 {
        self.display_max.x - self.display_min.x
    }

    pub fn height(&self) -> i32 {
        self.display_max.y - self.display_min.y
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            f64::from(self.display_min.x + self.display_max.x) / 2.0,
            f64::from(self.display_min.y + self.display_max.y) / 2.0,
        )
    }
}

fn display_unit(display: &DisplayConfig) -> Vector3<f64> {
    let density = |value: f64| if value > 0.0 { value } else { 1.0 };
    let sign = |flip: bool| if flip { -1.0 } else { 1.0 };

    Vector3::new(
        density(display.pixels_per_mm[0]) * sign(display.flip_x),
        density(display.pixels_per_mm[1]) * sign(display.flip_y),
        1.0,
    )
}
