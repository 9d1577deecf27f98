//! The simulator's corner minimap, following the tram.
use std::collections::BTreeSet;

use geom::{Pose, Xz};
use scene::Scene;

use crate::{
    canvas::{outline, Canvas, Point},
    rgb::Image,
    BakedMinimap, MinimapView, Projection, Style, ViewLimits,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    /// Side of the square overlay, in pixels.
    pub size: u32,
    /// World units shown across the overlay.
    pub range: f64,
    /// Gap to the top-right corner of the screen, in pixels.
    pub margin: f64,
}

impl Default for Overlay {
    fn default() -> Overlay {
        Overlay { size: 200, range: 200.0, margin: 10.0 }
    }
}

impl Overlay {
    /// Screen rectangle `[top_left, bottom_right]` of the overlay.
    pub fn rect(&self, screen: [u32; 2]) -> [Point; 2] {
        let side = self.size as f64;
        let right = screen[0] as f64 - self.margin;
        [[right - side, self.margin], [right, self.margin + side]]
    }

    /// Projection of the overlay on screen, centred on `tram`.
    pub fn projection(&self, screen: [u32; 2], tram: Xz) -> Projection {
        let [a, b] = self.rect(screen);
        let widget_center = [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0];
        Projection { center: tram, scale: self.size as f64 / self.range, widget_center }
    }

    /// Draws the window of `baked` around the tram, or the scene itself when
    /// there is no bake.
    pub fn draw(
        &self,
        canvas: &mut dyn Canvas,
        scene: &Scene,
        baked: Option<&BakedMinimap>,
        tram: Pose,
        style: &Style,
    ) {
        let screen = canvas.size();
        let rect = self.rect(screen);
        let proj = self.projection(screen, tram.pos.xz());
        let [a, b] = rect;
        let corners = [a, [b[0], a[1]], b, [a[0], b[1]]];
        canvas.polygon(&corners, style.background);
        match baked {
            Some(baked) => {
                let [tw, th] = baked.image.dim();
                let uv = rect.map(|p| {
                    let [tx, ty] = baked.world_to_texel(proj.map_to_world(p));
                    [tx / tw as f64, ty / th as f64]
                });
                canvas.image(&baked.image, rect, uv);
            }
            None => {
                let mut image = Image::new([self.size, self.size], style.background);
                let limits = ViewLimits {
                    min_range: self.range,
                    max_range: self.range,
                    ..ViewLimits::default()
                };
                let view = MinimapView::new(tram.pos.xz(), self.range, limits);
                view.render(&mut image, scene, &BTreeSet::new(), style);
                canvas.image(&image, rect, [[0.0, 0.0], [1.0, 1.0]]);
            }
        }
        outline(canvas, &corners, 1.0, style.grid);

        // Triangle pointing along the heading.
        let len = style.tram_marker / proj.scale;
        let (p, dir, left) = (tram.pos, tram.dir() * len, tram.left() * len);
        let marker = [p + dir, p - dir * 0.5 + left * 0.5, p - dir * 0.5 - left * 0.5]
            .map(|it| proj.world_to_map(it.xz()));
        canvas.polygon(&marker, style.tram);
    }
}
