//! Image files referenced by the scene, loaded once per filename.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use render::rgb::{Color, Image};

/// cannot load image {path:?}: {source}
#[derive(Debug, displaydoc::Display)]
pub struct ResourceError {
    pub path: PathBuf,
    pub source: image::ImageError,
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone)]
pub struct Texture {
    pub id: TextureId,
    /// Some texel is not fully opaque, so the renderer should alpha test.
    pub has_alpha: bool,
    pub image: Image,
}

/// One entry per filename for the lifetime of a scene. Failed loads are
/// remembered as `None` so they are reported once.
#[derive(Debug)]
pub struct TextureCache {
    dir: PathBuf,
    entries: HashMap<String, Option<Texture>>,
    next_id: u32,
}

impl TextureCache {
    pub fn new(dir: impl Into<PathBuf>) -> TextureCache {
        TextureCache { dir: dir.into(), entries: HashMap::new(), next_id: 1 }
    }

    pub fn get(&mut self, filename: &str) -> Option<&Texture> {
        if !self.entries.contains_key(filename) {
            let path = self.dir.join(filename);
            let entry = match load(&path) {
                Ok((image, has_alpha)) => {
                    let id = TextureId(self.next_id);
                    self.next_id += 1;
                    log::debug!("texture {filename}: {id:?}, alpha: {has_alpha}");
                    Some(Texture { id, has_alpha, image })
                }
                Err(err) => {
                    log::warn!("{err}, using a flat colour");
                    None
                }
            };
            self.entries.insert(filename.to_string(), entry);
        }
        self.entries.get(filename)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every texture; ids are not reused.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Loads an image, dropping its alpha channel.
pub fn load_image(path: &Path) -> Result<Image, ResourceError> {
    load(path).map(|(image, _)| image)
}

fn load(path: &Path) -> Result<(Image, bool), ResourceError> {
    let rgba = image::open(path)
        .map_err(|source| ResourceError { path: path.to_path_buf(), source })?
        .to_rgba8();
    let mut has_alpha = false;
    let buf = rgba
        .pixels()
        .map(|&image::Rgba([r, g, b, a])| {
            has_alpha |= a < u8::MAX;
            Color::new(r, g, b)
        })
        .collect();
    let image = Image::from_raw([rgba.width(), rgba.height()], buf)
        .ok_or_else(|| ResourceError { path: path.to_path_buf(), source: dimension_error() })?;
    Ok((image, has_alpha))
}

fn dimension_error() -> image::ImageError {
    image::ImageError::Parameter(image::error::ParameterError::from_kind(
        image::error::ParameterErrorKind::DimensionMismatch,
    ))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tramsim_textures_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn detects_alpha_by_scanning() {
        let dir = dir("alpha");
        let mut opaque = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        opaque.save(dir.join("opaque.png")).unwrap();
        opaque.put_pixel(1, 1, image::Rgba([0, 0, 0, 254]));
        opaque.save(dir.join("leaves.png")).unwrap();

        let mut cache = TextureCache::new(&dir);
        let a = cache.get("opaque.png").unwrap().clone();
        assert!(!a.has_alpha);
        assert_eq!(a.image[[0, 0]], Color::new(10, 20, 30));
        let b = cache.get("leaves.png").unwrap().clone();
        assert!(b.has_alpha);
        assert_ne!(a.id, b.id);
        // Same handle on the second lookup.
        assert_eq!(cache.get("opaque.png").unwrap().id, a.id);
        assert_eq!(cache.len(), 2);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failures_are_cached() {
        let dir = dir("missing");
        let mut cache = TextureCache::new(&dir);
        assert!(cache.get("nope.png").is_none());
        assert_eq!(cache.len(), 1);
        image::RgbaImage::new(1, 1).save(dir.join("nope.png")).unwrap();
        assert!(cache.get("nope.png").is_none());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("nope.png").is_some());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_error_names_the_file() {
        let err = load_image(Path::new("/nonexistent/map.png")).unwrap_err();
        assert!(err.to_string().starts_with("cannot load image \"/nonexistent/map.png\""));
    }
}
