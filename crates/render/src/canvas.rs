//! Immediate-mode 2D drawing surface.
//!
//! Coordinates are in pixels, `x` to the right and `y` down, with the pixel
//! `[x, y]` covering `[x, x + 1) x [y, y + 1)`.
use crate::rgb::{Color, Image};

pub type Point = [f64; 2];

pub trait Canvas {
    fn size(&self) -> [u32; 2];
    fn clear(&mut self, color: Color);
    /// Draws `image` into the rectangle `dst`; `uv[0]` lands on `dst[0]` and
    /// `uv[1]` on `dst[1]`. UVs outside `0..1` leave the canvas untouched.
    fn image(&mut self, image: &Image, dst: [Point; 2], uv: [Point; 2]);
    fn polygon(&mut self, points: &[Point], color: Color);
    fn line(&mut self, from: Point, to: Point, width: f64, color: Color);
    fn disc(&mut self, center: Point, radius: f64, color: Color);
    fn text(&mut self, at: Point, text: &str, color: Color);
}

/// Strokes the closed outline of `points`.
pub fn outline(canvas: &mut dyn Canvas, points: &[Point], width: f64, color: Color) {
    for (i, &p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        canvas.line(p, q, width, color);
    }
}

pub fn polyline(canvas: &mut dyn Canvas, points: &[Point], width: f64, color: Color) {
    for pair in points.windows(2) {
        canvas.line(pair[0], pair[1], width, color);
    }
}

/// Software rasteriser. Text needs a font and is left to the shell.
impl Canvas for Image {
    fn size(&self) -> [u32; 2] {
        self.dim()
    }

    fn clear(&mut self, color: Color) {
        self.fill(color)
    }

    fn image(&mut self, image: &Image, dst: [Point; 2], uv: [Point; 2]) {
        let [w, h] = self.dim();
        let [iw, ih] = image.dim();
        let [x0, x1] = sorted(dst[0][0], dst[1][0]);
        let [y0, y1] = sorted(dst[0][1], dst[1][1]);
        if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 || iw == 0 || ih == 0 {
            return;
        }
        let (dx, dy) = (dst[1][0] - dst[0][0], dst[1][1] - dst[0][1]);
        let [cols, rows] = [pixel_span(x0, x1, w), pixel_span(y0, y1, h)];
        for py in rows {
            let fy = (py as f64 + 0.5 - dst[0][1]) / dy;
            let v = uv[0][1] + (uv[1][1] - uv[0][1]) * fy;
            let Some(iy) = texel(v, ih) else { continue };
            let row = self.row_mut(py);
            for px in cols.clone() {
                let fx = (px as f64 + 0.5 - dst[0][0]) / dx;
                let u = uv[0][0] + (uv[1][0] - uv[0][0]) * fx;
                if let Some(ix) = texel(u, iw) {
                    row[px as usize] = image[[ix, iy]];
                }
            }
        }
    }

    fn polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }
        let [w, h] = self.dim();
        let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[1]), hi.max(p[1]))
        });
        let mut crossings = Vec::new();
        for py in pixel_span(lo, hi, h) {
            let yc = py as f64 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a[1] <= yc) != (b[1] <= yc) {
                    let t = (yc - a[1]) / (b[1] - a[1]);
                    crossings.push(a[0] + (b[0] - a[0]) * t);
                }
            }
            crossings.sort_by(f64::total_cmp);
            let row = self.row_mut(py);
            for span in crossings.chunks_exact(2) {
                for px in pixel_span(span[0], span[1], w) {
                    row[px as usize] = color;
                }
            }
        }
    }

    fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        let (dx, dy) = (to[0] - from[0], to[1] - from[1]);
        let len = dx.hypot(dy);
        let half = width.max(1.0) / 2.0;
        if len < 1e-9 {
            self.disc(from, half, color);
            return;
        }
        let (nx, ny) = (-dy / len * half, dx / len * half);
        let quad = [
            [from[0] + nx, from[1] + ny],
            [to[0] + nx, to[1] + ny],
            [to[0] - nx, to[1] - ny],
            [from[0] - nx, from[1] - ny],
        ];
        self.polygon(&quad, color);
    }

    fn disc(&mut self, center: Point, radius: f64, color: Color) {
        let [w, h] = self.dim();
        let r2 = radius * radius;
        let cols = pixel_span(center[0] - radius, center[0] + radius, w);
        for py in pixel_span(center[1] - radius, center[1] + radius, h) {
            let dy = py as f64 + 0.5 - center[1];
            let row = self.row_mut(py);
            for px in cols.clone() {
                let dx = px as f64 + 0.5 - center[0];
                if dx * dx + dy * dy <= r2 {
                    row[px as usize] = color;
                }
            }
        }
    }

    fn text(&mut self, _at: Point, _text: &str, _color: Color) {}
}

/// Pixels whose centres fall in `[lo, hi)`, clipped to `0..n`.
fn pixel_span(lo: f64, hi: f64, n: u32) -> std::ops::Range<u32> {
    if !(lo.is_finite() && hi.is_finite()) {
        return 0..0;
    }
    let first = (lo - 0.5).ceil().clamp(0.0, n as f64) as u32;
    let last = (hi - 0.5).ceil().clamp(0.0, n as f64) as u32;
    first..last.max(first)
}

fn texel(u: f64, n: u32) -> Option<u32> {
    let i = (u * n as f64).floor();
    if !(0.0 <= i && i < n as f64) {
        return None;
    }
    Some(i as u32)
}

fn sorted(a: f64, b: f64) -> [f64; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    Image { image_dim: [u32; 2], dst: [Point; 2], uv: [Point; 2] },
    Polygon { points: Vec<Point>, color: Color },
    Line { from: Point, to: Point, width: f64, color: Color },
    Disc { center: Point, radius: f64, color: Color },
    Text { at: Point, text: String, color: Color },
}

/// A canvas that records what is drawn, for shells that render with their
/// own backend, and for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    size: [u32; 2],
    pub cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(size: [u32; 2]) -> DrawList {
        DrawList { size, cmds: Vec::new() }
    }

    /// Replays the recording onto another canvas. Image commands need the
    /// image back, since only its size is recorded.
    pub fn replay(&self, canvas: &mut dyn Canvas, images: &dyn Fn([u32; 2]) -> Option<Image>) {
        for cmd in &self.cmds {
            match cmd {
                DrawCmd::Clear(color) => canvas.clear(*color),
                DrawCmd::Image { image_dim, dst, uv } => {
                    if let Some(image) = images(*image_dim) {
                        canvas.image(&image, *dst, *uv)
                    }
                }
                DrawCmd::Polygon { points, color } => canvas.polygon(points, *color),
                DrawCmd::Line { from, to, width, color } => canvas.line(*from, *to, *width, *color),
                DrawCmd::Disc { center, radius, color } => canvas.disc(*center, *radius, *color),
                DrawCmd::Text { at, text, color } => canvas.text(*at, text, *color),
            }
        }
    }
}

impl Canvas for DrawList {
    fn size(&self) -> [u32; 2] {
        self.size
    }
    fn clear(&mut self, color: Color) {
        self.cmds.push(DrawCmd::Clear(color))
    }
    fn image(&mut self, image: &Image, dst: [Point; 2], uv: [Point; 2]) {
        self.cmds.push(DrawCmd::Image { image_dim: image.dim(), dst, uv })
    }
    fn polygon(&mut self, points: &[Point], color: Color) {
        self.cmds.push(DrawCmd::Polygon { points: points.to_vec(), color })
    }
    fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        self.cmds.push(DrawCmd::Line { from, to, width, color })
    }
    fn disc(&mut self, center: Point, radius: f64, color: Color) {
        self.cmds.push(DrawCmd::Disc { center, radius, color })
    }
    fn text(&mut self, at: Point, text: &str, color: Color) {
        self.cmds.push(DrawCmd::Text { at, text: text.to_string(), color })
    }
}

/// Mirrors everything horizontally across the canvas. Used to draw into
/// textures whose `x` runs the opposite way to the minimap's.
pub(crate) struct MirrorX<'a> {
    pub(crate) inner: &'a mut dyn Canvas,
}

impl MirrorX<'_> {
    fn flip(&self, p: Point) -> Point {
        [self.inner.size()[0] as f64 - p[0], p[1]]
    }
}

impl Canvas for MirrorX<'_> {
    fn size(&self) -> [u32; 2] {
        self.inner.size()
    }
    fn clear(&mut self, color: Color) {
        self.inner.clear(color)
    }
    fn image(&mut self, image: &Image, dst: [Point; 2], uv: [Point; 2]) {
        let dst = [self.flip(dst[0]), self.flip(dst[1])];
        self.inner.image(image, dst, uv)
    }
    fn polygon(&mut self, points: &[Point], color: Color) {
        let points: Vec<Point> = points.iter().map(|&p| self.flip(p)).collect();
        self.inner.polygon(&points, color)
    }
    fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        let (from, to) = (self.flip(from), self.flip(to));
        self.inner.line(from, to, width, color)
    }
    fn disc(&mut self, center: Point, radius: f64, color: Color) {
        let center = self.flip(center);
        self.inner.disc(center, radius, color)
    }
    fn text(&mut self, at: Point, text: &str, color: Color) {
        let at = self.flip(at);
        self.inner.text(at, text, color)
    }
}
