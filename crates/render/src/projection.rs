use geom::{xz, Xz};

use crate::{
    canvas::{Canvas, Point},
    Style,
};

/// World units between grid lines.
pub const GRID_SPACING: f64 = 50.0;

/// World to minimap mapping. Map `x` runs against world `x`, map `y` runs
/// with world `z`:
///
/// ```text
/// map_x = Wx - (wx - cx) * s
/// map_y = Wy + (wz - cz) * s
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// World point shown at `widget_center`.
    pub center: Xz,
    /// Pixels per world unit.
    pub scale: f64,
    pub widget_center: Point,
}

impl Projection {
    pub fn for_widget(center: Xz, scale: f64, size: [u32; 2]) -> Projection {
        Projection { center, scale, widget_center: [size[0] as f64 / 2.0, size[1] as f64 / 2.0] }
    }

    pub fn world_to_map(&self, p: Xz) -> Point {
        let [wx, wy] = self.widget_center;
        [wx - (p.x - self.center.x) * self.scale, wy + (p.z - self.center.z) * self.scale]
    }

    pub fn map_to_world(&self, m: Point) -> Xz {
        let [wx, wy] = self.widget_center;
        xz(self.center.x - (m[0] - wx) / self.scale, self.center.z + (m[1] - wy) / self.scale)
    }

    /// World-space bounding box `(min, max)` of a widget of `size` pixels.
    pub fn visible_world(&self, size: [u32; 2]) -> (Xz, Xz) {
        let a = self.map_to_world([0.0, 0.0]);
        let b = self.map_to_world([size[0] as f64, size[1] as f64]);
        (xz(a.x.min(b.x), a.z.min(b.z)), xz(a.x.max(b.x), a.z.max(b.z)))
    }
}

/// Grid lines at every multiple of [`GRID_SPACING`] that falls on the canvas.
pub fn draw_grid(canvas: &mut dyn Canvas, proj: &Projection, style: &Style) {
    let size = canvas.size();
    let [w, h] = [size[0] as f64, size[1] as f64];
    let (lo, hi) = proj.visible_world(size);
    for x in multiples(lo.x, hi.x) {
        let mx = proj.world_to_map(xz(x, proj.center.z))[0];
        canvas.line([mx, 0.0], [mx, h], 1.0, style.grid);
    }
    for z in multiples(lo.z, hi.z) {
        let my = proj.world_to_map(xz(proj.center.x, z))[1];
        canvas.line([0.0, my], [w, my], 1.0, style.grid);
    }
}

fn multiples(lo: f64, hi: f64) -> impl Iterator<Item = f64> {
    let first = (lo / GRID_SPACING).ceil() as i64;
    let last = (hi / GRID_SPACING).floor() as i64;
    (first..=last).map(|k| k as f64 * GRID_SPACING)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::canvas::{DrawCmd, DrawList};

    #[test]
    fn map_x_runs_against_world_x() {
        let proj = Projection::for_widget(xz(10.0, 20.0), 2.0, [100, 60]);
        assert_eq!(proj.world_to_map(xz(10.0, 20.0)), [50.0, 30.0]);
        assert_eq!(proj.world_to_map(xz(15.0, 20.0)), [40.0, 30.0]);
        assert_eq!(proj.world_to_map(xz(10.0, 25.0)), [50.0, 40.0]);
    }

    #[test]
    fn projection_round_trips() {
        let proj = Projection::for_widget(xz(-3.5, 7.25), 0.37, [640, 480]);
        for p in [xz(0.0, 0.0), xz(123.4, -56.7), xz(-1e4, 3e3)] {
            let back = proj.map_to_world(proj.world_to_map(p));
            assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
            assert_abs_diff_eq!(back.z, p.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn grid_lines_every_fifty_units() {
        let proj = Projection::for_widget(xz(0.0, 0.0), 1.0, [200, 100]);
        let mut list = DrawList::new([200, 100]);
        draw_grid(&mut list, &proj, &Style::default());
        let lines: Vec<_> = list
            .cmds
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        // x in {-100, -50, 0, 50, 100}, z in {-50, 0, 50}
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], ([200.0, 0.0], [200.0, 100.0]));
        assert_eq!(lines[5], ([0.0, 0.0], [200.0, 0.0]));
    }
}
