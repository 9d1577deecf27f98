//! Top-down footprints of the scene's static elements.
use std::collections::BTreeSet;

use geom::{rotate_x, rotate_y, rotate_z, v64, xz, Xz, EPSILON};
use scene::{Building, Cylinder, Scene};
use track::Track;

use crate::{
    canvas::{outline, polyline, Canvas, Point},
    rgb::Color,
    Projection, Style,
};

/// Corners of the building's base rectangle, `w` along its local `x` and `d`
/// along its local `z`, turned by its absolute yaw.
pub fn building_corners(b: &Building) -> [Xz; 4] {
    let (hw, hd) = (b.width / 2.0, b.depth / 2.0);
    let yaw = b.placement.ry_deg.to_radians();
    [v64(-hw, 0.0, -hd), v64(hw, 0.0, -hd), v64(hw, 0.0, hd), v64(-hw, 0.0, hd)]
        .map(|c| (b.placement.pos + rotate_y(c, yaw)).xz())
}

/// Axis of the cylinder, from its base towards its top, after the Y, X, Z
/// rotation sequence.
pub fn cylinder_axis(c: &Cylinder) -> v64 {
    let p = &c.placement;
    let v = rotate_z(v64::Y, p.rz_deg.to_radians());
    let v = rotate_x(v, p.rx_deg.to_radians());
    rotate_y(v, p.ry_deg.to_radians())
}

/// Outline of what a cylinder covers on the ground. Upright cylinders are
/// circles; tilted ones become a `2 * radius` wide rectangle along the
/// ground projection of their axis.
pub fn cylinder_footprint(c: &Cylinder, circle_segments: usize) -> Vec<Xz> {
    let base = c.placement.pos.xz();
    let axis = cylinder_axis(c).horizontal() * c.height;
    let tilted = c.placement.rx_deg != 0.0 || c.placement.rz_deg != 0.0;
    if !tilted || axis.norm() < EPSILON {
        return circle(base, c.radius, circle_segments);
    }
    let side = v64(axis.z, 0.0, -axis.x).to_unit() * c.radius;
    let b = base.with_y(0.0);
    [b + side, b + axis + side, b + axis - side, b - side].map(v64::xz).to_vec()
}

pub fn circle(center: Xz, radius: f64, segments: usize) -> Vec<Xz> {
    let n = segments.max(3);
    (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            xz(center.x + radius * a.cos(), center.z + radius * a.sin())
        })
        .collect()
}

/// Buildings, cylinders, spheres and trees. Elements whose source line is in
/// `highlight` get the highlight colour and a thick outline.
pub fn draw_elements(
    canvas: &mut dyn Canvas,
    proj: &Projection,
    scene: &Scene,
    highlight: &BTreeSet<u32>,
    style: &Style,
) {
    let project =
        |pts: &[Xz]| -> Vec<Point> { pts.iter().map(|&p| proj.world_to_map(p)).collect() };
    for b in &scene.buildings {
        let pts = project(&building_corners(b)[..]);
        shape(canvas, &pts, style.building, highlight.contains(&b.line), style);
    }
    for c in &scene.cylinders {
        let pts = project(&cylinder_footprint(c, style.circle_segments));
        shape(canvas, &pts, style.cylinder, highlight.contains(&c.line), style);
    }
    for s in &scene.spheres {
        let center = proj.world_to_map(s.placement.pos.xz());
        let r = s.radius * proj.scale;
        if highlight.contains(&s.line) {
            canvas.disc(center, r + style.highlight_stroke / 2.0, style.highlight);
        } else {
            canvas.disc(center, r, style.sphere);
        }
    }
    for t in &scene.trees {
        let center = proj.world_to_map(t.pos.xz());
        if highlight.contains(&t.line) {
            canvas.disc(center, style.tree_radius + style.highlight_stroke / 2.0, style.highlight);
        } else {
            canvas.disc(center, style.tree_radius, style.tree);
        }
    }
}

fn shape(canvas: &mut dyn Canvas, pts: &[Point], color: Color, highlighted: bool, style: &Style) {
    if highlighted {
        canvas.polygon(pts, style.highlight);
        outline(canvas, pts, style.highlight_stroke, style.highlight);
    } else {
        canvas.polygon(pts, color);
    }
}

/// Every segment as a line strip through its samples.
pub fn draw_track(
    canvas: &mut dyn Canvas,
    proj: &Projection,
    track: &Track,
    highlight: &BTreeSet<u32>,
    style: &Style,
) {
    for segment in track.segments() {
        let pts: Vec<Point> = segment.points.iter().map(|p| proj.world_to_map(p.xz())).collect();
        if highlight.contains(&segment.line) {
            polyline(canvas, &pts, style.highlight_stroke, style.highlight);
        } else {
            polyline(canvas, &pts, style.stroke, style.track);
        }
    }
}
