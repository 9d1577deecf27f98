//! Pre-rendering the static scene into a texture at one texel per world unit.
use std::collections::BTreeSet;

use geom::{xz, Xz, EPSILON};
use scene::Scene;

use crate::{
    canvas::{Canvas, MirrorX, Point},
    elements, projection,
    rgb::Image,
    Projection, Style,
};

/// Largest baked texture side, in texels.
pub const MAX_BAKE_SIZE: u32 = 16384;

#[derive(Debug, displaydoc::Display)]
pub enum BakeError {
    /// scene has no `map` command
    NoMap,
    /// map scale {0} is not positive
    InvalidScale(f64),
    /// cannot allocate a {0}x{1} texel bake target
    TargetSize(u32, u32),
}

impl std::error::Error for BakeError {}

/// Background image of the map, or the pixel size to assume when it could
/// not be loaded.
#[derive(Debug, Clone, Copy)]
pub enum Background<'a> {
    Image(&'a Image),
    Missing([u32; 2]),
}

impl Background<'_> {
    fn dim(&self) -> [u32; 2] {
        match self {
            Background::Image(image) => image.dim(),
            Background::Missing(dim) => *dim,
        }
    }
}

/// The whole static scene rendered once.
///
/// Texel `[0, 0]` is the world corner with the smallest `x` and `z`; texel
/// `x` grows with world `x` and texel `y` with world `z`.
#[derive(Debug, Clone)]
pub struct BakedMinimap {
    pub image: Image,
    /// World point at the middle of the texture.
    pub center: Xz,
}

impl BakedMinimap {
    pub fn world_to_texel(&self, p: Xz) -> Point {
        let [w, h] = self.image.dim();
        [w as f64 / 2.0 + (p.x - self.center.x), h as f64 / 2.0 + (p.z - self.center.z)]
    }

    pub fn texel_to_world(&self, t: Point) -> Xz {
        let [w, h] = self.image.dim();
        xz(self.center.x + t[0] - w as f64 / 2.0, self.center.z + t[1] - h as f64 / 2.0)
    }

    /// Minimap projection used while baking, before the x flip.
    pub fn projection(&self) -> Projection {
        Projection::for_widget(self.center, 1.0, self.image.dim())
    }

    /// World rectangle `(min, max)` covered by the texture.
    pub fn world_bounds(&self) -> (Xz, Xz) {
        let [w, h] = self.image.dim();
        (self.texel_to_world([0.0, 0.0]), self.texel_to_world([w as f64, h as f64]))
    }
}

/// Renders the background and every static element of `scene`.
pub fn bake(
    scene: &Scene,
    background: Background<'_>,
    style: &Style,
) -> Result<BakedMinimap, BakeError> {
    let map = scene.map.as_ref().ok_or(BakeError::NoMap)?;
    if !(map.world_scale > EPSILON) {
        return Err(BakeError::InvalidScale(map.world_scale));
    }
    let [wp, hp] = background.dim();
    let target = [
        (wp as f64 * map.world_scale).round(),
        (hp as f64 * map.world_scale).round(),
    ];
    let limit = MAX_BAKE_SIZE as f64;
    if !(1.0 <= target[0] && target[0] <= limit && 1.0 <= target[1] && target[1] <= limit) {
        let [w, h] = target.map(|it| it.clamp(0.0, u32::MAX as f64) as u32);
        return Err(BakeError::TargetSize(w, h));
    }
    let size = [target[0] as u32, target[1] as u32];

    let image = Image::new(size, style.background);
    let mut baked = BakedMinimap { image, center: map.world_center };
    let proj = baked.projection();
    let mut canvas = MirrorX { inner: &mut baked.image };
    if let Background::Image(image) = background {
        let full = [[0.0, 0.0], [size[0] as f64, size[1] as f64]];
        canvas.image(image, full, [[0.0, 0.0], [1.0, 1.0]]);
    }
    let none = BTreeSet::new();
    projection::draw_grid(&mut canvas, &proj, style);
    elements::draw_elements(&mut canvas, &proj, scene, &none, style);
    elements::draw_track(&mut canvas, &proj, &scene.track, &none, style);
    log::info!("baked minimap {}x{} centred at {}", size[0], size[1], map.world_center);
    Ok(baked)
}
