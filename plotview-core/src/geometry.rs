/// Drawable geometry kinds and their bounding volumes
use nalgebra::{Matrix4, Point3, Vector3};

use crate::controller::ViewController;

/// Axis-aligned bounding box.
///
/// Starts out empty (`min` above `max` on every axis) and grows with
/// [`extend`](Self::extend).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(-f64::MAX, -f64::MAX, -f64::MAX),
        }
    }

    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bounds = Self::empty();
        for point in points {
            bounds.extend(point);
        }
        bounds
    }

    pub fn extend(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn union(&mut self, other: &Bounds) {
        if !other.is_empty() {
            self.extend(&other.min);
            self.extend(&other.max);
        }
    }

    /// True when no point has been added on any axis.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Copy in which every axis without extent collapses to 0, so the
    /// box is never inverted.
    pub fn normalized(&self) -> Self {
        let mut bounds = *self;
        for axis in 0..3 {
            if bounds.min[axis] > bounds.max[axis] {
                bounds.min[axis] = 0.0;
                bounds.max[axis] = 0.0;
            }
        }
        bounds
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Bounds of this box after mapping it through `trafo`.
    pub fn transformed(&self, trafo: &Matrix4<f64>) -> Self {
        if self.is_empty() {
            return *self;
        }
        let corners = self.corners().map(|corner| trafo.transform_point(&corner));
        Self::from_points(corners.iter())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

/// What the view needs from anything it can show.
pub trait Geometry {
    /// Issue primitives, in local coordinates, through the view.
    fn draw(&self, view: &mut ViewController);

    /// Grow `bounds` by this geometry's local extent.
    fn extend_bounds(&self, bounds: &mut Bounds);
}

/// Isolated points
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    pub points: Vec<Point3<f64>>,
}

impl PointSet {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }
}

impl Geometry for PointSet {
    fn draw(&self, view: &mut ViewController) {
        for point in &self.points {
            view.draw_point(point);
        }
    }

    fn extend_bounds(&self, bounds: &mut Bounds) {
        for point in &self.points {
            bounds.extend(point);
        }
    }
}

/// One pen instruction of a [`Plot`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotCommand {
    /// Lift the pen and move to a point
    Move(Point3<f64>),
    /// Draw a line from the current pen position
    Draw(Point3<f64>),
    /// Mark an isolated point; the pen position is unchanged
    Point(Point3<f64>),
}

impl PlotCommand {
    pub fn point(&self) -> &Point3<f64> {
        match self {
            PlotCommand::Move(p) | PlotCommand::Draw(p) | PlotCommand::Point(p) => p,
        }
    }
}

/// Wire-frame vector list
#[derive(Debug, Clone, Default)]
pub struct Plot {
    pub commands: Vec<PlotCommand>,
}

impl Plot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, point: Point3<f64>) -> Self {
        self.commands.push(PlotCommand::Move(point));
        self
    }

    pub fn line_to(mut self, point: Point3<f64>) -> Self {
        self.commands.push(PlotCommand::Draw(point));
        self
    }

    pub fn point(mut self, point: Point3<f64>) -> Self {
        self.commands.push(PlotCommand::Point(point));
        self
    }

    /// Closed polyline through `points`
    pub fn polygon(points: &[Point3<f64>]) -> Self {
        let mut plot = Self::new();
        if let Some((first, rest)) = points.split_first() {
            plot = plot.move_to(*first);
            for point in rest {
                plot = plot.line_to(*point);
            }
            plot = plot.line_to(*first);
        }
        plot
    }

    /// The three positive coordinate axes from the origin
    pub fn axes(length: f64) -> Self {
        let origin = Point3::origin();
        Self::new()
            .move_to(origin)
            .line_to(Point3::new(length, 0.0, 0.0))
            .move_to(origin)
            .line_to(Point3::new(0.0, length, 0.0))
            .move_to(origin)
            .line_to(Point3::new(0.0, 0.0, length))
    }
}

impl Geometry for Plot {
    fn draw(&self, view: &mut ViewController) {
        let mut pen = Point3::origin();

        for command in &self.commands {
            match command {
                PlotCommand::Move(p) => pen = *p,
                PlotCommand::Draw(p) => {
                    view.draw_line(&pen, p);
                    pen = *p;
                }
                PlotCommand::Point(p) => view.draw_point(p),
            }
        }
    }

    fn extend_bounds(&self, bounds: &mut Bounds) {
        for command in &self.commands {
            bounds.extend(command.point());
        }
    }
}

/// A triangle face defined by three corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Face normal from the winding order, `None` for degenerate faces
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a)).try_normalize(f64::EPSILON)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Axis-aligned cube centered on the origin, outward winding
    pub fn cube(size: f64) -> Self {
        let h = size / 2.0;
        let corner = |x: f64, y: f64, z: f64| Point3::new(x * h, y * h, z * h);
        let mut mesh = Self::with_capacity(12);

        // each face as (a, b, c, d) counter-clockwise seen from outside
        let faces = [
            [(-1., -1., 1.), (1., -1., 1.), (1., 1., 1.), (-1., 1., 1.)],
            [(-1., -1., -1.), (-1., 1., -1.), (1., 1., -1.), (1., -1., -1.)],
            [(-1., 1., -1.), (-1., 1., 1.), (1., 1., 1.), (1., 1., -1.)],
            [(-1., -1., -1.), (1., -1., -1.), (1., -1., 1.), (-1., -1., 1.)],
            [(1., -1., -1.), (1., 1., -1.), (1., 1., 1.), (1., -1., 1.)],
            [(-1., -1., -1.), (-1., -1., 1.), (-1., 1., 1.), (-1., 1., -1.)],
        ];

        for face in faces {
            let [a, b, c, d] = face.map(|(x, y, z)| corner(x, y, z));
            mesh.add_triangle(Triangle::new(a, b, c));
            mesh.add_triangle(Triangle::new(a, c, d));
        }

        mesh
    }
}

impl Geometry for Mesh {
    fn draw(&self, view: &mut ViewController) {
        for triangle in &self.triangles {
            let [a, b, c] = &triangle.vertices;
            view.draw_triangle(a, b, c);
        }
    }

    fn extend_bounds(&self, bounds: &mut Bounds) {
        for triangle in &self.triangles {
            for vertex in &triangle.vertices {
                bounds.extend(vertex);
            }
        }
    }
}

/// The closed set of geometry kinds a scene is made of
#[derive(Debug, Clone)]
pub enum Drawable {
    Points(PointSet),
    Plot(Plot),
    Mesh(Mesh),
}

impl Geometry for Drawable {
    fn draw(&self, view: &mut ViewController) {
        match self {
            Drawable::Points(points) => points.draw(view),
            Drawable::Plot(plot) => plot.draw(view),
            Drawable::Mesh(mesh) => mesh.draw(view),
        }
    }

    fn extend_bounds(&self, bounds: &mut Bounds) {
        match self {
            Drawable::Points(points) => points.extend_bounds(bounds),
            Drawable::Plot(plot) => plot.extend_bounds(bounds),
            Drawable::Mesh(mesh) => mesh.extend_bounds(bounds),
        }
    }
}

impl From<PointSet> for Drawable {
    fn from(points: PointSet) -> Self {
        Drawable::Points(points)
    }
}

impl From<Plot> for Drawable {
    fn from(plot: Plot) -> Self {
        Drawable::Plot(plot)
    }
}

impl From<Mesh> for Drawable {
    fn from(mesh: Mesh) -> Self {
        Drawable::Mesh(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds_normalize_to_origin() {
        let bounds = Bounds::empty();
        assert!(bounds.is_empty());

        let normalized = bounds.normalized();
        assert_eq!(normalized.min, Point3::origin());
        assert_eq!(normalized.max, Point3::origin());
    }

    #[test]
    fn test_bounds_extend_and_union() {
        let mut bounds = Bounds::empty();
        bounds.extend(&Point3::new(1.0, -2.0, 3.0));
        bounds.extend(&Point3::new(-1.0, 4.0, 3.0));

        let mut other = Bounds::empty();
        other.extend(&Point3::new(0.0, 0.0, -5.0));
        bounds.union(&other);
        bounds.union(&Bounds::empty());

        assert_eq!(bounds.min, Point3::new(-1.0, -2.0, -5.0));
        assert_eq!(bounds.max, Point3::new(1.0, 4.0, 3.0));
        assert_eq!(bounds.center(), Point3::new(0.0, 1.0, -1.0));
        assert_eq!(bounds.size(), Vector3::new(2.0, 6.0, 8.0));
    }

    #[test]
    fn test_transformed_bounds() {
        let bounds = Bounds::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let trafo = Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0))
            * Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));

        let moved = bounds.transformed(&trafo);
        assert_eq!(moved.min, Point3::new(3.0, -1.0, -1.0));
        assert_eq!(moved.max, Point3::new(7.0, 1.0, 1.0));
        assert!(Bounds::empty().transformed(&trafo).is_empty());
    }

    #[test]
    fn test_cube_mesh() {
        let mesh = Mesh::cube(2.0);
        assert_eq!(mesh.triangles.len(), 12);

        let mut bounds = Bounds::empty();
        mesh.extend_bounds(&mut bounds);
        assert_eq!(bounds.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));

        // every face points away from the center
        for triangle in &mesh.triangles {
            let normal = triangle.normal().unwrap();
            let centroid = triangle.vertices.iter().fold(Vector3::zeros(), |acc, v| acc + v.coords) / 3.0;
            assert!(normal.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_plot_bounds_include_moves() {
        let plot = Plot::axes(3.0).point(Point3::new(-1.0, 0.0, 0.0));
        let mut bounds = Bounds::empty();
        plot.extend_bounds(&mut bounds);

        assert_eq!(bounds.min, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_polygon_is_closed() {
        let square = Plot::polygon(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]);
        assert_eq!(square.commands.len(), 4);
        assert_eq!(square.commands[3], PlotCommand::Draw(Point3::origin()));
        assert!(Plot::polygon(&[]).commands.is_empty());
    }
}
