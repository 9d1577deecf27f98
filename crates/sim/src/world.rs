//! What the 3D world renderer gets handed for a scene.
use geom::v64;
use scene::{Placement, Scene, Texturing, UvMode};

use crate::textures::{TextureCache, TextureId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box { width: f64, depth: f64, height: f64 },
    Cylinder { radius: f64, height: f64 },
    Sphere { radius: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uv {
    pub offset: [f64; 2],
    pub angle_deg: f64,
    pub mode: UvMode,
    /// World units per texture repetition, used when tiling.
    pub scale: [f64; 2],
}

/// A placed object, ready to draw: absolute pose, Euler angles applied Y,
/// then X, then Z, and the resolved texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub line: u32,
    pub pos: v64,
    pub rx_deg: f64,
    pub ry_deg: f64,
    pub rz_deg: f64,
    pub shape: Shape,
    /// `None` draws a solid tint.
    pub texture: Option<TextureId>,
    pub alpha_test: bool,
    pub uv: Uv,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeInstance {
    pub line: u32,
    pub pos: v64,
    pub height: f64,
}

/// Track polyline plus the strips laid along it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackMesh {
    pub points: Vec<v64>,
    pub tangents: Vec<v64>,
    pub rails: [Vec<v64>; 2],
    pub ballast: [Vec<v64>; 2],
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    pub instances: Vec<Instance>,
    pub trees: Vec<TreeInstance>,
    pub track: TrackMesh,
}

pub fn batch(scene: &Scene, textures: &mut TextureCache) -> Batch {
    let mut res = Batch::default();
    let mut instance = |line: u32, p: &Placement, shape: Shape, t: &Texturing| {
        let texture = t.texture.as_deref().and_then(|name| textures.get(name));
        Instance {
            line,
            pos: p.pos,
            rx_deg: p.rx_deg,
            ry_deg: p.ry_deg,
            rz_deg: p.rz_deg,
            shape,
            texture: texture.map(|it| it.id),
            alpha_test: texture.is_some_and(|it| it.has_alpha),
            uv: Uv {
                offset: [t.u_offset, t.v_offset],
                angle_deg: t.angle_deg,
                mode: t.uv_mode,
                scale: [t.u_scale, t.v_scale],
            },
        }
    };
    for b in &scene.buildings {
        let shape = Shape::Box { width: b.width, depth: b.depth, height: b.height };
        res.instances.push(instance(b.line, &b.placement, shape, &b.texturing));
    }
    for c in &scene.cylinders {
        let shape = Shape::Cylinder { radius: c.radius, height: c.height };
        res.instances.push(instance(c.line, &c.placement, shape, &c.texturing));
    }
    for s in &scene.spheres {
        let shape = Shape::Sphere { radius: s.radius };
        res.instances.push(instance(s.line, &s.placement, shape, &s.texturing));
    }
    res.trees = scene
        .trees
        .iter()
        .map(|t| TreeInstance { line: t.line, pos: t.pos, height: t.height })
        .collect();
    let track = &scene.track;
    res.track = TrackMesh {
        points: track.points().to_vec(),
        tangents: track.tangents().to_vec(),
        rails: track.rails(),
        ballast: track.ballast(),
    };
    res
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn placements_become_instances() {
        let scene = Scene::parse(
            "\
start 0 0 0 90
straight 10
building 2 1 3 0 15 0 4 5 6 missing.png 0.5 0 0 0 2 2
cylinder 0 0 0 90 0 0 1 3
tree 0 0 1 7
",
        )
        .scene;
        let mut textures = TextureCache::new(std::env::temp_dir().join("tramsim_world_none"));
        let batch = batch(&scene, &mut textures);

        assert_eq!(batch.instances.len(), 2);
        let b = &batch.instances[0];
        assert_eq!(b.line, 3);
        assert_eq!(b.shape, Shape::Box { width: 4.0, depth: 5.0, height: 6.0 });
        assert_abs_diff_eq!(b.pos.x, 13.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.ry_deg, -165.0, epsilon = 1e-9);
        // The texture could not be loaded: solid tint, UVs kept.
        assert_eq!(b.texture, None);
        assert_eq!(b.uv.mode, UvMode::Tile);
        assert_eq!(b.uv.offset, [0.5, 0.0]);
        assert_eq!(batch.instances[1].rx_deg, 90.0);

        assert_eq!(batch.trees.len(), 1);
        assert_abs_diff_eq!(batch.trees[0].pos.x, 11.0, epsilon = 1e-9);
        assert_eq!(batch.track.points.len(), batch.track.rails[0].len());
        assert_eq!(batch.track.ballast[1].len(), 11);
    }
}
