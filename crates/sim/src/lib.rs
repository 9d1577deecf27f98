//! The simulator and the scene editor, as context objects a windowing shell
//! drives frame by frame.
mod config;
mod editor;
mod simulator;
mod textures;
mod watcher;

pub mod world;

pub use crate::{
    config::Config,
    editor::{Editor, SceneSaveError},
    simulator::{bake_minimap, Input, Key, Simulator},
    textures::{load_image, ResourceError, Texture, TextureCache, TextureId},
    watcher::SceneWatcher,
};
