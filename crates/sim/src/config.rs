use std::{path::PathBuf, time::Duration};

use render::{Overlay, Style};
use tram::TramConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub scene_path: PathBuf,
    pub loop_track: bool,
    /// How often the scene file's modification time is checked.
    pub poll_interval: Duration,
    /// Background size, in pixels, assumed when the map image cannot be
    /// loaded.
    pub fallback_map_size: [u32; 2],
    pub tram: TramConfig,
    pub style: Style,
    pub overlay: Overlay,
}

impl Config {
    pub fn new(scene_path: impl Into<PathBuf>) -> Config {
        Config {
            scene_path: scene_path.into(),
            loop_track: true,
            poll_interval: Duration::from_secs(1),
            fallback_map_size: [512, 512],
            tram: TramConfig::default(),
            style: Style::default(),
            overlay: Overlay::default(),
        }
    }

    /// Directory textures and the map image are looked up in.
    pub fn asset_dir(&self) -> PathBuf {
        asset_dir(&self.scene_path)
    }
}

pub(crate) fn asset_dir(scene_path: &std::path::Path) -> PathBuf {
    match scene_path.parent() {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from("."),
    }
}
