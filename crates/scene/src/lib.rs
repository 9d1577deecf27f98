//! In-memory scene: the track plus everything placed around it.
//!
//! Scenes are read from a line-oriented text format, one command per line:
//!
//! ```text
//! map       <file> <cx> <cz> <scale_world_per_pixel>
//! start     <x> <y> <z> <angle_deg>
//! straight  <length> [gradient_permille]
//! curve     <radius> <angle_deg> [gradient_permille]
//! building  <rel_x> <rel_y> <rel_z> <rx> <rel_ry> <rz> <w> <d> <h> [texturing]
//! cylinder  <rel_x> <rel_y> <rel_z> <rx> <rel_ry> <rz> <radius> <height> [texturing]
//! sphere    <rel_x> <rel_y> <rel_z> <radius> [texturing]
//! tree      <rel_x> <rel_y> <rel_z> <height>
//! ```
//!
//! where `[texturing]` is `[tex] [uOff] [vOff] [tAng] [uvMode] [uScale] [vScale]`.
//! Placements are relative to the head of the track at the point where they
//! appear in the file.
mod parse;
mod unparse;

use std::{fs, io, path::Path, path::PathBuf};

use geom::{v64, Pose, Xz};
use track::{BuildErrorKind, Track, TrackBuilder};

pub use crate::parse::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub track: Track,
    pub map: Option<Map>,
    pub start: Option<Start>,
    pub buildings: Vec<Building>,
    pub cylinders: Vec<Cylinder>,
    pub spheres: Vec<Sphere>,
    pub trees: Vec<Tree>,
}

/// Background image of the minimap and where it sits in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub filename: String,
    pub world_center: Xz,
    /// World units per background pixel, always positive.
    pub world_scale: f64,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Start {
    pub position: v64,
    pub angle_deg: f64,
    pub line: u32,
}

/// Pose of a placed object as written in the scene file, relative to the
/// track head.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Relative {
    pub offset: v64,
    pub rx_deg: f64,
    pub ry_deg: f64,
    pub rz_deg: f64,
}

/// Absolute world pose of a placed object. Rotations apply Y, then X, then Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub pos: v64,
    pub rx_deg: f64,
    pub ry_deg: f64,
    pub rz_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UvMode {
    /// Repeat every `u_scale` x `v_scale` world units.
    Tile,
    /// Stretch once across each face.
    #[default]
    Stretch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texturing {
    pub texture: Option<String>,
    pub u_offset: f64,
    pub v_offset: f64,
    pub angle_deg: f64,
    pub uv_mode: UvMode,
    pub u_scale: f64,
    pub v_scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub line: u32,
    pub relative: Relative,
    pub placement: Placement,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub texturing: Texturing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    pub line: u32,
    pub relative: Relative,
    pub placement: Placement,
    pub radius: f64,
    pub height: f64,
    pub texturing: Texturing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub line: u32,
    pub relative: Relative,
    pub placement: Placement,
    pub radius: f64,
    pub texturing: Texturing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tree {
    pub line: u32,
    pub offset: v64,
    pub pos: v64,
    pub height: f64,
}

/// A freshly parsed scene together with everything that was skipped.
#[derive(Debug)]
pub struct Parsed {
    pub scene: Scene,
    pub warnings: Vec<ParseError>,
}

/// cannot read scene file {path:?}: {source}
#[derive(Debug, displaydoc::Display)]
pub struct SceneLoadError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Default for Texturing {
    fn default() -> Texturing {
        Texturing {
            texture: None,
            u_offset: 0.0,
            v_offset: 0.0,
            angle_deg: 0.0,
            uv_mode: UvMode::default(),
            u_scale: 1.0,
            v_scale: 1.0,
        }
    }
}

impl Relative {
    /// Places this relative pose against the track head `origin`.
    ///
    /// The absolute yaw carries a fixed -90 degree bias; existing scene files
    /// depend on it.
    pub fn place(&self, origin: Pose) -> Placement {
        Placement {
            pos: origin.to_world(self.offset),
            rx_deg: self.rx_deg,
            ry_deg: (-origin.heading).to_degrees() + self.ry_deg - 90.0,
            rz_deg: self.rz_deg,
        }
    }
}

impl Scene {
    pub fn parse(input: &str) -> Parsed {
        parse::parse(input, TrackBuilder::new(Pose::default()))
    }

    /// Parses with a sample spacing other than [`track::SEGMENT_LENGTH`].
    pub fn parse_with(input: &str, segment_length: f64) -> Result<Parsed, BuildErrorKind> {
        let track = TrackBuilder::new(Pose::default()).with_segment_length(segment_length)?;
        Ok(parse::parse(input, track))
    }

    pub fn load(path: &Path) -> Result<Parsed, SceneLoadError> {
        let text = fs::read_to_string(path)
            .map_err(|source| SceneLoadError { path: path.to_path_buf(), source })?;
        let res = Scene::parse(&text);
        log::info!(
            "loaded {}: {} segments, {} objects, {} warnings",
            path.display(),
            res.scene.track.segments().len(),
            res.scene.object_count(),
            res.warnings.len()
        );
        Ok(res)
    }

    /// Writes the scene back in the text format, every command on the line
    /// it was read from.
    pub fn unparse(&self) -> String {
        unparse::unparse(self)
    }

    pub fn start_pose(&self) -> Pose {
        self.track.start()
    }

    pub fn object_count(&self) -> usize {
        self.buildings.len() + self.cylinders.len() + self.spheres.len() + self.trees.len()
    }
}
