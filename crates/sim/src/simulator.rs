use std::time::Instant;

use geom::Pose;
use render::{Background, BakedMinimap, Canvas, ViewLimits};
use scene::{ParseError, Scene, SceneLoadError};
use tram::{CabPose, Tram};

use crate::{
    config::Config,
    textures::{self, TextureCache},
    watcher::SceneWatcher,
    world::{self, Batch},
};

/// Runtime toggles of the simulator window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `G`: show or hide the ground.
    Ground,
    /// `L`: loop around the track or stop at its ends.
    Loop,
    /// `TAB`: grab or release the mouse.
    GrabMouse,
    /// `R`: reload the scene file now.
    Reload,
    /// `M`: show or hide the minimap.
    Minimap,
    /// `ESC`
    Quit,
}

/// Input sampled once per frame.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pub accelerate: bool,
    pub brake: bool,
    pub reverse: bool,
    pub keys: Vec<Key>,
    /// Wheel notches; positive zooms the minimap in.
    pub wheel: i32,
}

/// Everything one running simulation owns: the scene, its textures and
/// baked minimap, and the tram on it.
#[derive(Debug)]
pub struct Simulator {
    config: Config,
    scene: Scene,
    warnings: Vec<ParseError>,
    textures: TextureCache,
    baked: Option<BakedMinimap>,
    watcher: SceneWatcher,
    tram: Tram,
    pose: CabPose,
    show_ground: bool,
    mouse_grabbed: bool,
    show_minimap: bool,
    quit: bool,
}

impl Simulator {
    pub fn load(config: Config) -> Result<Simulator, SceneLoadError> {
        let parsed = Scene::load(&config.scene_path)?;
        let watcher = SceneWatcher::new(&config.scene_path, config.poll_interval);
        let textures = TextureCache::new(config.asset_dir());
        let tram = Tram::new(config.tram, config.loop_track);
        let pose = tram.pose(&parsed.scene.track);
        let mut res = Simulator {
            config,
            scene: parsed.scene,
            warnings: parsed.warnings,
            textures,
            baked: None,
            watcher,
            tram,
            pose,
            show_ground: true,
            mouse_grabbed: false,
            show_minimap: true,
            quit: false,
        };
        res.baked = bake_minimap(&res.scene, &res.config);
        Ok(res)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
    pub fn warnings(&self) -> &[ParseError] {
        &self.warnings
    }
    pub fn tram(&self) -> &Tram {
        &self.tram
    }
    pub fn pose(&self) -> CabPose {
        self.pose
    }
    pub fn baked(&self) -> Option<&BakedMinimap> {
        self.baked.as_ref()
    }
    pub fn textures(&mut self) -> &mut TextureCache {
        &mut self.textures
    }
    pub fn show_ground(&self) -> bool {
        self.show_ground
    }
    pub fn mouse_grabbed(&self) -> bool {
        self.mouse_grabbed
    }
    pub fn show_minimap(&self) -> bool {
        self.show_minimap
    }
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Reads the scene file again. On failure the current scene, its textures
    /// and its bake stay in place.
    pub fn reload(&mut self) -> Result<(), SceneLoadError> {
        let parsed = match Scene::load(&self.config.scene_path) {
            Ok(it) => it,
            Err(err) => {
                log::error!("{err}, keeping the current scene");
                return Err(err);
            }
        };
        self.watcher.mark_seen();
        self.scene = parsed.scene;
        self.warnings = parsed.warnings;
        self.textures.clear();
        self.baked = bake_minimap(&self.scene, &self.config);
        self.pose = self.tram.update(&self.scene.track, 0.0);
        Ok(())
    }

    /// Reloads when the watcher saw the file change.
    pub fn poll_reload(&mut self, now: Instant) -> Option<Result<(), SceneLoadError>> {
        if !self.watcher.poll(now) {
            return None;
        }
        log::info!("{} changed, reloading", self.config.scene_path.display());
        Some(self.reload())
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Ground => self.show_ground = !self.show_ground,
            Key::Loop => {
                let looping = !self.tram.looping();
                self.tram.set_looping(looping);
                log::info!("looping {}", if looping { "on" } else { "off" });
            }
            Key::GrabMouse => self.mouse_grabbed = !self.mouse_grabbed,
            Key::Reload => {
                // Errors are logged and the old scene kept.
                let _ = self.reload();
            }
            Key::Minimap => self.show_minimap = !self.show_minimap,
            Key::Quit => self.quit = true,
        }
    }

    /// One frame: input, then the tram, then the pose the world is drawn
    /// from.
    pub fn frame(&mut self, input: &Input, dt: f64) -> CabPose {
        for &key in &input.keys {
            self.handle_key(key);
        }
        if input.wheel != 0 {
            let limits = ViewLimits::default();
            let overlay = &mut self.config.overlay;
            overlay.range = (overlay.range * limits.zoom_factor.powi(-input.wheel))
                .clamp(limits.min_range, limits.max_range);
        }
        self.tram.set_accelerating(input.accelerate);
        self.tram.set_braking(input.brake);
        self.tram.set_reverse(input.reverse);
        self.pose = self.tram.update(&self.scene.track, dt);
        self.pose
    }

    pub fn world_batch(&mut self) -> Batch {
        world::batch(&self.scene, &mut self.textures)
    }

    /// The corner minimap, unless hidden.
    pub fn draw_minimap(&self, canvas: &mut dyn Canvas) {
        if !self.show_minimap {
            return;
        }
        let tram = Pose::new(self.pose.position, self.pose.yaw_deg.to_radians());
        let Config { overlay, style, .. } = &self.config;
        overlay.draw(canvas, &self.scene, self.baked.as_ref(), tram, style);
    }
}

/// Bakes the minimap of `scene`, if it has a map. Problems are logged and
/// leave the overlay drawing the scene directly.
pub fn bake_minimap(scene: &Scene, config: &Config) -> Option<BakedMinimap> {
    let map = scene.map.as_ref()?;
    let image = match textures::load_image(&config.asset_dir().join(&map.filename)) {
        Ok(it) => Some(it),
        Err(err) => {
            log::warn!("{err}, using a flat background");
            None
        }
    };
    let background = match &image {
        Some(image) => Background::Image(image),
        None => Background::Missing(config.fallback_map_size),
    };
    match render::bake(scene, background, &config.style) {
        Ok(it) => Some(it),
        Err(err) => {
            log::warn!("minimap bake failed: {err}");
            None
        }
    }
}
