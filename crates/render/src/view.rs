//! Interactive minimap drawn from the scene every frame.
use std::collections::BTreeSet;

use geom::{v64, xz, Xz};
use scene::{Map, Scene};
use track::SegmentKind;

use crate::{
    canvas::{Canvas, Point},
    elements, projection,
    rgb::Image,
    Projection, Style,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLimits {
    /// Smallest range, in world units.
    pub min_range: f64,
    pub max_range: f64,
    /// Range multiplier per zoom step.
    pub zoom_factor: f64,
}

impl Default for ViewLimits {
    fn default() -> ViewLimits {
        ViewLimits { min_range: 10.0, max_range: 10_000.0, zoom_factor: 1.2 }
    }
}

/// View state of the editor's minimap: what is centred, how much is visible,
/// and the background texture for the current `map`.
#[derive(Debug)]
pub struct MinimapView {
    pub center: Xz,
    range: f64,
    limits: ViewLimits,
    background: Option<LoadedBackground>,
}

#[derive(Debug)]
struct LoadedBackground {
    filename: String,
    image: Option<Image>,
}

impl MinimapView {
    pub fn new(center: Xz, range: f64, limits: ViewLimits) -> MinimapView {
        let range = range.clamp(limits.min_range, limits.max_range);
        MinimapView { center, range, limits, background: None }
    }

    /// World units across the shorter side of the widget.
    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn set_range(&mut self, range: f64) {
        self.range = range.clamp(self.limits.min_range, self.limits.max_range);
    }

    /// Pixels per world unit for a widget of `size` pixels.
    pub fn scale(&self, size: [u32; 2]) -> f64 {
        let short = size[0].min(size[1]).max(1) as f64;
        short / self.range
    }

    pub fn projection(&self, size: [u32; 2]) -> Projection {
        Projection::for_widget(self.center, self.scale(size), size)
    }

    /// Drag by `delta` pixels; the world point under the cursor follows it.
    pub fn pan(&mut self, delta: Point, size: [u32; 2]) {
        let s = self.scale(size);
        self.center = xz(self.center.x + delta[0] / s, self.center.z - delta[1] / s);
    }

    /// One wheel notch per step: positive steps zoom in.
    pub fn zoom(&mut self, steps: i32) {
        self.set_range(self.range * self.limits.zoom_factor.powi(-steps));
    }

    /// Loads or drops the background when the scene's `map` file changed.
    /// A failed load is remembered so it is not retried every frame.
    pub fn sync_background(
        &mut self,
        map: Option<&Map>,
        load: &mut dyn FnMut(&str) -> Option<Image>,
    ) {
        let wanted = map.map(|it| it.filename.as_str());
        let loaded = self.background.as_ref().map(|it| it.filename.as_str());
        if wanted == loaded {
            return;
        }
        self.background = wanted.map(|filename| {
            log::debug!("minimap background {filename}");
            LoadedBackground { filename: filename.to_string(), image: load(filename) }
        });
    }

    pub fn background(&self) -> Option<&Image> {
        self.background.as_ref()?.image.as_ref()
    }

    pub fn render(
        &self,
        canvas: &mut dyn Canvas,
        scene: &Scene,
        highlight: &BTreeSet<u32>,
        style: &Style,
    ) {
        let size = canvas.size();
        let proj = self.projection(size);
        canvas.clear(style.background);
        if let (Some(map), Some(image)) = (&scene.map, self.background()) {
            let uv = background_uv(&proj, map, image.dim(), size);
            canvas.image(image, [[0.0, 0.0], [size[0] as f64, size[1] as f64]], uv);
        }
        projection::draw_grid(canvas, &proj, style);
        elements::draw_elements(canvas, &proj, scene, highlight, style);
        elements::draw_track(canvas, &proj, &scene.track, highlight, style);
        if !scene.track.segments().is_empty() {
            let start = scene.track.start().pos;
            marker(canvas, &proj, start, format!("start y={:.1}", start.y), style);
        }
        for segment in scene.track.segments() {
            let label = match segment.kind {
                SegmentKind::Straight { length, .. } => format!("S {length:.1}"),
                SegmentKind::Curve { angle_deg, .. } => format!("C {angle_deg:.1}"),
            };
            let end = segment.end.pos;
            marker(canvas, &proj, end, format!("{label} y={:.1}", end.y), style);
        }

        let [cx, cy] = proj.widget_center;
        let arm = 6.0;
        canvas.line([cx - arm, cy], [cx + arm, cy], 1.0, style.crosshair);
        canvas.line([cx, cy - arm], [cx, cy + arm], 1.0, style.crosshair);
        let status =
            format!("({:.1}, {:.1}) range {:.1}", self.center.x, self.center.z, self.range);
        canvas.text([4.0, 4.0], &status, style.label);
    }
}

/// UVs of the background image under the widget's corners.
fn marker(canvas: &mut dyn Canvas, proj: &Projection, pos: v64, label: String, style: &Style) {
    let at = proj.world_to_map(pos.xz());
    canvas.disc(at, style.marker_radius, style.marker);
    canvas.text([at[0] + style.marker_radius + 2.0, at[1]], &label, style.label);
}

fn background_uv(proj: &Projection, map: &Map, image: [u32; 2], size: [u32; 2]) -> [Point; 2] {
    let image_proj = Projection::for_widget(map.world_center, 1.0 / map.world_scale, image);
    let [iw, ih] = [image[0] as f64, image[1] as f64];
    let corner = |p: Point| {
        let [px, py] = image_proj.world_to_map(proj.map_to_world(p));
        [px / iw, py / ih]
    };
    [corner([0.0, 0.0]), corner([size[0] as f64, size[1] as f64])]
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        canvas::{DrawCmd, DrawList},
        rgb::Color,
    };

    fn view() -> MinimapView {
        MinimapView::new(xz(0.0, 0.0), 100.0, ViewLimits::default())
    }

    #[test]
    fn scale_uses_the_shorter_side() {
        let v = view();
        assert_eq!(v.scale([400, 200]), 2.0);
        assert_eq!(v.scale([200, 400]), 2.0);
    }

    #[test]
    fn pan_keeps_the_grabbed_point_under_the_cursor() {
        let size = [200, 200];
        let mut v = view();
        let grabbed = [50.0, 120.0];
        let before = v.projection(size).map_to_world(grabbed);
        v.pan([30.0, -10.0], size);
        // Two pixels per unit: x moves with the drag because map x is flipped.
        assert_eq!(v.center, xz(15.0, 5.0));
        let after = v.projection(size).map_to_world([80.0, 110.0]);
        assert_abs_diff_eq!(before.x, after.x, epsilon = 1e-9);
        assert_abs_diff_eq!(before.z, after.z, epsilon = 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut v = view();
        v.zoom(1);
        assert_abs_diff_eq!(v.range(), 100.0 / 1.2, epsilon = 1e-9);
        v.zoom(-2);
        assert_abs_diff_eq!(v.range(), 120.0, epsilon = 1e-9);
        v.zoom(100);
        assert_eq!(v.range(), 10.0);
        v.zoom(-1000);
        assert_eq!(v.range(), 10_000.0);
    }

    #[test]
    fn background_follows_the_map_command() {
        let mut v = view();
        let mut loads = Vec::new();
        let mut load = |name: &str| {
            loads.push(name.to_string());
            Some(Image::new([2, 2], Color::new_white()))
        };
        let a = Scene::parse("map a.png 0 0 1\n").scene;
        let b = Scene::parse("map b.png 0 0 1\n").scene;
        v.sync_background(a.map.as_ref(), &mut load);
        v.sync_background(a.map.as_ref(), &mut load);
        assert!(v.background().is_some());
        v.sync_background(b.map.as_ref(), &mut load);
        v.sync_background(None, &mut load);
        assert!(v.background().is_none());
        assert_eq!(loads, ["a.png", "b.png"]);
    }

    #[test]
    fn background_uv_covers_the_visible_world() {
        // 100x100 image at 2 world units per pixel covers -100..100.
        let map = Scene::parse("map m.png 0 0 2\n").scene.map.unwrap();
        let v = MinimapView::new(xz(50.0, 0.0), 100.0, ViewLimits::default());
        let size = [100, 100];
        let uv = background_uv(&v.projection(size), &map, [100, 100], size);
        // Left edge shows world x = 100, right edge x = 0.
        assert_abs_diff_eq!(uv[0][0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(uv[1][0], 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(uv[0][1], 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(uv[1][1], 0.75, epsilon = 1e-9);
    }

    #[test]
    fn highlight_changes_only_the_highlighted_record() {
        let text = "\
map m.png 0 0 1
straight 20
building 10 0 0 0 0 0 4 4 4
sphere -10 0 5 2
cylinder 0 0 10 0 0 0 1 3

tree 5 0 5 4
tree -5 0 5 4
";
        let scene = Scene::parse(text).scene;
        assert_eq!(scene.trees[0].line, 7);
        let style = Style::default();
        let draw = |highlight: &[u32]| {
            let mut list = DrawList::new([300, 200]);
            let highlight = highlight.iter().copied().collect();
            view().render(&mut list, &scene, &highlight, &style);
            list.cmds
        };
        let plain = draw(&[]);
        let lit = draw(&[7]);
        assert_eq!(plain.len(), lit.len());
        let changed: Vec<(&DrawCmd, &DrawCmd)> =
            plain.iter().zip(&lit).filter(|(a, b)| a != b).collect();
        assert_eq!(changed.len(), 1);
        match changed[0].1 {
            DrawCmd::Disc { color, .. } => assert_eq!(*color, style.highlight),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn segments_get_labelled_markers() {
        let scene = Scene::parse("straight 10\ncurve 20 -45 50\n").scene;
        let mut list = DrawList::new([200, 200]);
        view().render(&mut list, &scene, &BTreeSet::new(), &Style::default());
        let labels: Vec<&str> = list
            .cmds
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            ["start y=0.0", "S 10.0 y=0.0", "C -45.0 y=0.8", "(0.0, 0.0) range 100.0"]
        );

        let markers = list.cmds.iter().filter(|cmd| {
            matches!(cmd, DrawCmd::Disc { color, .. } if *color == Style::default().marker)
        });
        assert_eq!(markers.count(), 3);
    }
}
