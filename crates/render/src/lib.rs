//! Minimap rendering: the software raster, the shared world to map
//! projection, the baked texture and the two live views built on it.
pub mod canvas;
pub mod rgb;

mod bake;
mod elements;
mod overlay;
mod projection;
mod style;
mod view;

pub use crate::{
    bake::{bake, Background, BakeError, BakedMinimap, MAX_BAKE_SIZE},
    canvas::{Canvas, DrawCmd, DrawList},
    elements::{building_corners, cylinder_axis, cylinder_footprint},
    overlay::Overlay,
    projection::{draw_grid, Projection, GRID_SPACING},
    style::Style,
    view::{MinimapView, ViewLimits},
};
