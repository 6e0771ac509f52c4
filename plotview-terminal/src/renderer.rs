/// ASCII rasterizer backend for terminal rendering
use crossterm::{
    cursor::MoveTo,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Point3, Vector3};
use plotview_core::{Color, RenderBackend};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const POINT_GLYPH: char = 'o';

/// Render backend that rasterizes device-space primitives into a grid of
/// terminal cells, one cell per device pixel.
///
/// Larger device Z is nearer to the viewer.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f64>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    color: Color,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f64::NEG_INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::BLACK; size],
            color: Color::BLACK,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Character at cell (`x`, `y`), `None` outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    fn plot(&mut self, x: f64, y: f64, depth: f64, character: char) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = y * self.width + x;
        if depth >= self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = self.color;
        }
    }

    /// Write the frame to `writer`, row by row.
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;

        for y in 0..self.height {
            writer.queue(MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = terminal_color(self.color_buffer[idx]);
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderBackend for AsciiRenderer {
    fn clear(&mut self) {
        self.depth_buffer.fill(f64::NEG_INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::BLACK);
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_point(&mut self, point: &Point3<f64>, _normal: &Vector3<f64>) {
        self.plot(point.x, point.y, point.z, POINT_GLYPH);
    }

    fn draw_line(&mut self, start: &Point3<f64>, end: &Point3<f64>, _normal: &Vector3<f64>) {
        let character = line_glyph(end.x - start.x, end.y - start.y);
        let Some((start, end)) = clip_segment(start, end, self.width as f64, self.height as f64)
        else {
            return;
        };

        let delta = end - start;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0);
        if !steps.is_finite() {
            return;
        }

        // DDA: one sample per cell along the major axis
        let count = steps as usize;
        for i in 0..=count {
            let p = start + delta * (i as f64 / steps);
            self.plot(p.x, p.y, p.z, character);
        }
    }

    fn draw_triangle(
        &mut self,
        a: &Point3<f64>,
        b: &Point3<f64>,
        c: &Point3<f64>,
        normal: &Vector3<f64>,
    ) {
        // lit from the viewer; faces seen edge-on still show as '.'
        let brightness = normal.z.clamp(0.0, 1.0);
        let last = LUMINOSITY_RAMP.len() - 1;
        let char_index = ((brightness * last as f64).round() as usize).clamp(1, last);
        let character = LUMINOSITY_RAMP[char_index];

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0);
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.width as f64 - 1.0);
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0);
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.height as f64 - 1.0);
        if !(min_x <= max_x && min_y <= max_y) {
            return;
        }

        for y in min_y as usize..=max_y as usize {
            for x in min_x as usize..=max_x as usize {
                let px = x as f64 + 0.5;
                let py = y as f64 + 0.5;

                if let Some((w0, w1, w2)) = barycentric(a, b, c, px, py) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * a.z + w1 * b.z + w2 * c.z;
                        self.plot(px, py, depth, character);
                    }
                }
            }
        }
    }
}

/// Slope-dependent glyph for a line with device direction (`dx`, `dy`).
/// Device Y grows downwards.
fn line_glyph(dx: f64, dy: f64) -> char {
    if dx.abs() >= 2.0 * dy.abs() {
        '-'
    } else if dy.abs() >= 2.0 * dx.abs() {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Clip a segment to the `width` x `height` cell grid (Liang-Barsky).
fn clip_segment(
    start: &Point3<f64>,
    end: &Point3<f64>,
    width: f64,
    height: f64,
) -> Option<(Point3<f64>, Point3<f64>)> {
    let delta = end - start;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-delta.x, start.x),
        (delta.x, width - start.x),
        (-delta.y, start.y),
        (delta.y, height - start.y),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }

    Some((start + delta * t0, start + delta * t1))
}

/// Black is the engine's default color; map it to the terminal's default
/// foreground so it stays visible on dark backgrounds.
fn terminal_color(color: Color) -> TermColor {
    if color == Color::BLACK {
        TermColor::Reset
    } else {
        TermColor::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

/// Calculate barycentric coordinates of (`px`, `py`) in a triangle
fn barycentric(
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
    px: f64,
    py: f64,
) -> Option<(f64, f64, f64)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-9 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (px - v2.x) + (v2.x - v1.x) * (py - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (px - v2.x) + (v0.x - v2.x) * (py - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_glyphs() {
        assert_eq!(line_glyph(10.0, 1.0), '-');
        assert_eq!(line_glyph(0.0, -5.0), '|');
        assert_eq!(line_glyph(3.0, 3.0), '\\');
        assert_eq!(line_glyph(3.0, -3.0), '/');
    }

    #[test]
    fn test_horizontal_line_fills_cells() {
        let mut renderer = AsciiRenderer::new(10, 3);
        renderer.draw_line(
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(6.0, 1.0, 0.0),
            &Vector3::z(),
        );

        for x in 1..=6 {
            assert_eq!(renderer.cell(x, 1), Some('-'));
        }
        assert_eq!(renderer.cell(0, 1), Some(' '));
        assert_eq!(renderer.cell(7, 1), Some(' '));
    }

    #[test]
    fn test_clip_segment() {
        let (a, b) = clip_segment(
            &Point3::new(-1e12, 2.0, 0.0),
            &Point3::new(1e12, 2.0, 0.0),
            10.0,
            5.0,
        )
        .unwrap();
        assert!(a.x.abs() < 1e-3 && (b.x - 10.0).abs() < 1e-3);

        let missed = clip_segment(&Point3::new(0.0, -4.0, 0.0), &Point3::new(9.0, -1.0, 0.0), 10.0, 5.0);
        assert!(missed.is_none());
    }

    #[test]
    fn test_nearer_primitive_wins() {
        let mut renderer = AsciiRenderer::new(4, 4);
        renderer.draw_point(&Point3::new(1.5, 1.5, -10.0), &Vector3::z());
        renderer.draw_line(
            &Point3::new(0.0, 1.5, -20.0),
            &Point3::new(3.0, 1.5, -20.0),
            &Vector3::z(),
        );

        assert_eq!(renderer.cell(1, 1), Some(POINT_GLYPH));
        assert_eq!(renderer.cell(0, 1), Some('-'));
    }

    #[test]
    fn test_triangle_shading_and_clear() {
        let mut renderer = AsciiRenderer::new(8, 8);
        renderer.draw_triangle(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(8.0, 0.0, 0.0),
            &Point3::new(0.0, 8.0, 0.0),
            &Vector3::z(),
        );
        assert_eq!(renderer.cell(1, 1), Some('@'));
        assert_eq!(renderer.cell(7, 7), Some(' '));

        renderer.clear();
        assert_eq!(renderer.cell(1, 1), Some(' '));
    }

    #[test]
    fn test_offscreen_primitives_are_clipped() {
        let mut renderer = AsciiRenderer::new(4, 4);
        renderer.draw_point(&Point3::new(-3.0, 2.0, 0.0), &Vector3::z());
        renderer.draw_line(
            &Point3::new(-10.0, -10.0, 0.0),
            &Point3::new(20.0, -10.0, 0.0),
            &Vector3::z(),
        );
        renderer.draw_triangle(
            &Point3::new(10.0, 10.0, 0.0),
            &Point3::new(20.0, 10.0, 0.0),
            &Point3::new(10.0, 20.0, 0.0),
            &Vector3::z(),
        );

        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(renderer.cell(x, y), Some(' '));
            }
        }
    }

    #[test]
    fn test_present_writes_every_row() {
        let mut renderer = AsciiRenderer::new(3, 2);
        renderer.set_color(Color::RED);
        renderer.draw_point(&Point3::new(1.0, 1.0, 0.0), &Vector3::z());

        let mut out = Vec::new();
        renderer.present(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('o'));
        assert_eq!(terminal_color(Color::BLACK), TermColor::Reset);
    }
}
