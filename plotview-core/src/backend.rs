/// Rendering backend contract and the compiled draw list
use nalgebra::{Matrix4, Point3, Vector3};

use crate::attribute::Color;
use crate::transform::EPSILON;

/// Immediate-mode sink for device-space primitives.
pub trait RenderBackend {
    /// Start a new frame.
    fn clear(&mut self);

    fn set_color(&mut self, color: Color);

    fn draw_point(&mut self, point: &Point3<f64>, normal: &Vector3<f64>);

    fn draw_line(&mut self, start: &Point3<f64>, end: &Point3<f64>, normal: &Vector3<f64>);

    fn draw_triangle(
        &mut self,
        a: &Point3<f64>,
        b: &Point3<f64>,
        c: &Point3<f64>,
        normal: &Vector3<f64>,
    );
}

/// Unit normal of a device-space triangle, facing the viewer (`z >= 0`).
/// Degenerate triangles get `+Z`.
pub fn flat_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    let normal = (b - a).cross(&(c - a));
    let length = normal.norm();

    let normal = if length > EPSILON {
        normal / length
    } else {
        Vector3::z()
    };

    if normal.z < 0.0 {
        -normal
    } else {
        normal
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Color(Color),
    Point(Point3<f64>),
    Line(Point3<f64>, Point3<f64>),
    Triangle([Point3<f64>; 3]),
}

/// Cached translation of the scene into primitives, kept in base space
/// (relative to the parallel projection level) so pans, zooms and
/// rotations replay it without asking the scene to draw again.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<Command>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn set_color(&mut self, color: Color) {
        self.commands.push(Command::Color(color));
    }

    pub fn point(&mut self, point: Point3<f64>) {
        self.commands.push(Command::Point(point));
    }

    pub fn line(&mut self, start: Point3<f64>, end: Point3<f64>) {
        self.commands.push(Command::Line(start, end));
    }

    pub fn triangle(&mut self, a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) {
        self.commands.push(Command::Triangle([a, b, c]));
    }

    /// Send every cached primitive to `backend`, mapped through `base`.
    pub fn replay(&self, base: &Matrix4<f64>, backend: &mut dyn RenderBackend) {
        let up = Vector3::z();

        for command in &self.commands {
            match command {
                Command::Color(color) => backend.set_color(*color),
                Command::Point(p) => backend.draw_point(&base.transform_point(p), &up),
                Command::Line(start, end) => backend.draw_line(
                    &base.transform_point(start),
                    &base.transform_point(end),
                    &up,
                ),
                Command::Triangle([a, b, c]) => {
                    let a = base.transform_point(a);
                    let b = base.transform_point(b);
                    let c = base.transform_point(c);
                    let normal = flat_normal(&a, &b, &c);
                    backend.draw_triangle(&a, &b, &c, &normal);
                }
            }
        }
    }
}

/// What a [`RecordingBackend`] saw.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Color(Color),
    Point {
        at: Point3<f64>,
        normal: Vector3<f64>,
    },
    Line {
        start: Point3<f64>,
        end: Point3<f64>,
        normal: Vector3<f64>,
    },
    Triangle {
        vertices: [Point3<f64>; 3],
        normal: Vector3<f64>,
    },
}

/// Backend that keeps the primitives of the last frame, for headless use
/// and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    pub frames: usize,
    pub primitives: Vec<Primitive>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every device-space vertex drawn this frame.
    pub fn vertices(&self) -> Vec<Point3<f64>> {
        self.primitives
            .iter()
            .flat_map(|primitive| match primitive {
                Primitive::Color(_) => Vec::new(),
                Primitive::Point { at, .. } => vec![*at],
                Primitive::Line { start, end, .. } => vec![*start, *end],
                Primitive::Triangle { vertices, .. } => vertices.to_vec(),
            })
            .collect()
    }

    pub fn colors(&self) -> Vec<Color> {
        self.primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Color(color) => Some(*color),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn clear(&mut self) {
        self.frames += 1;
        self.primitives.clear();
    }

    fn set_color(&mut self, color: Color) {
        self.primitives.push(Primitive::Color(color));
    }

    fn draw_point(&mut self, point: &Point3<f64>, normal: &Vector3<f64>) {
        self.primitives.push(Primitive::Point {
            at: *point,
            normal: *normal,
        });
    }

    fn draw_line(&mut self, start: &Point3<f64>, end: &Point3<f64>, normal: &Vector3<f64>) {
        self.primitives.push(Primitive::Line {
            start: *start,
            end: *end,
            normal: *normal,
        });
    }

    fn draw_triangle(
        &mut self,
        a: &Point3<f64>,
        b: &Point3<f64>,
        c: &Point3<f64>,
        normal: &Vector3<f64>,
    ) {
        self.primitives.push(Primitive::Triangle {
            vertices: [*a, *b, *c],
            normal: *normal,
        });
    }
}
