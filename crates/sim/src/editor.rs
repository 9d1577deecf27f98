//! Scene editing: the file as a table of lines, re-parsed on every change,
//! with a live minimap preview.
use std::{
    collections::BTreeSet,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use geom::Xz;
use render::{Canvas, MinimapView, Style, ViewLimits};
use scene::{Parsed, ParseError, Scene, SceneLoadError};

use crate::{config, textures};

/// cannot save scene file {path:?}: {source}
#[derive(Debug, displaydoc::Display)]
pub struct SceneSaveError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl std::error::Error for SceneSaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug)]
pub struct Editor {
    path: PathBuf,
    lines: Vec<String>,
    parsed: Parsed,
    highlight: BTreeSet<u32>,
    pub view: MinimapView,
    dirty: bool,
    bake_stale: bool,
}

impl Editor {
    pub fn open(path: &Path, limits: ViewLimits) -> Result<Editor, SceneLoadError> {
        let text = fs::read_to_string(path)
            .map_err(|source| SceneLoadError { path: path.to_path_buf(), source })?;
        Ok(Editor::with_text(path, &text, limits))
    }

    pub fn with_text(path: &Path, text: &str, limits: ViewLimits) -> Editor {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let parsed = Scene::parse(text);
        let center = view_center(&parsed.scene);
        Editor {
            path: path.to_path_buf(),
            lines,
            parsed,
            highlight: BTreeSet::new(),
            view: MinimapView::new(center, 200.0, limits),
            dirty: false,
            bake_stale: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
    pub fn scene(&self) -> &Scene {
        &self.parsed.scene
    }
    pub fn warnings(&self) -> &[ParseError] {
        &self.parsed.warnings
    }
    /// Warnings for one 1-based line, for showing next to its row.
    pub fn warnings_at(&self, line: u32) -> impl Iterator<Item = &ParseError> {
        self.parsed.warnings.iter().filter(move |it| it.line == line)
    }
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn text(&self) -> String {
        let mut res = self.lines.join("\n");
        res.push('\n');
        res
    }

    /// Replaces row `row` (0-based); a row one past the end appends.
    /// Returns `false` if `row` is out of range.
    pub fn set_line(&mut self, row: usize, text: &str) -> bool {
        match row.cmp(&self.lines.len()) {
            std::cmp::Ordering::Less => self.lines[row] = text.to_string(),
            std::cmp::Ordering::Equal => self.lines.push(text.to_string()),
            std::cmp::Ordering::Greater => return false,
        }
        self.changed();
        true
    }

    pub fn insert_line(&mut self, row: usize, text: &str) -> bool {
        if row > self.lines.len() {
            return false;
        }
        self.lines.insert(row, text.to_string());
        self.changed();
        true
    }

    pub fn remove_line(&mut self, row: usize) -> Option<String> {
        if row >= self.lines.len() {
            return None;
        }
        let res = self.lines.remove(row);
        self.changed();
        Some(res)
    }

    fn changed(&mut self) {
        self.parsed = Scene::parse(&self.text());
        self.dirty = true;
        self.bake_stale = true;
    }

    /// Writes the whole file through a temporary next to it, so a failed
    /// save leaves the previous file intact.
    pub fn save(&mut self) -> Result<(), SceneSaveError> {
        atomic_write(&self.path, self.text().as_bytes())
            .map_err(|source| SceneSaveError { path: self.path.clone(), source })?;
        log::info!("saved {}", self.path.display());
        self.dirty = false;
        self.bake_stale = true;
        Ok(())
    }

    /// Source lines to draw highlighted, 1-based.
    pub fn set_highlight(&mut self, lines: impl IntoIterator<Item = u32>) {
        self.highlight = lines.into_iter().collect();
    }
    pub fn highlight(&self) -> &BTreeSet<u32> {
        &self.highlight
    }

    /// Whether a baked minimap made from this scene is out of date. Reading
    /// the flag resets it.
    pub fn take_bake_stale(&mut self) -> bool {
        std::mem::take(&mut self.bake_stale)
    }

    /// Picks up a changed `map` file name.
    pub fn sync_background(&mut self) {
        let dir = config::asset_dir(&self.path);
        self.view.sync_background(self.parsed.scene.map.as_ref(), &mut |filename: &str| {
            match textures::load_image(&dir.join(filename)) {
                Ok(it) => Some(it),
                Err(err) => {
                    log::warn!("{err}");
                    None
                }
            }
        });
    }

    pub fn render(&self, canvas: &mut dyn Canvas, style: &Style) {
        self.view.render(canvas, &self.parsed.scene, &self.highlight, style);
    }
}

/// Centre of the map if there is one, the track start otherwise.
fn view_center(scene: &Scene) -> Xz {
    match &scene.map {
        Some(map) => map.world_center,
        None => scene.start_pose().pos.xz(),
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let res = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));
    if res.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    res
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tramsim_editor_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn editing_a_row_reparses() {
        let path = Path::new("scene.txt");
        let text = "straight 10\ntree 0 0 0 5\n";
        let mut editor = Editor::with_text(path, text, ViewLimits::default());
        assert_abs_diff_eq!(editor.scene().track.total_length(), 10.0, epsilon = 1e-9);
        assert!(editor.set_line(0, "straight 25"));
        assert_abs_diff_eq!(editor.scene().track.total_length(), 25.0, epsilon = 1e-9);
        assert!(editor.is_dirty());
        assert!(editor.take_bake_stale());
        assert!(!editor.take_bake_stale());

        assert!(editor.set_line(2, "bogus"));
        assert_eq!(editor.warnings_at(3).count(), 1);
        assert!(!editor.set_line(9, "tree 0 0 0 1"));
        assert_eq!(editor.remove_line(2).as_deref(), Some("bogus"));
        assert!(editor.warnings().is_empty());

        assert!(editor.insert_line(0, "start 0 0 0 90"));
        assert_eq!(editor.scene().trees[0].line, 3);
        assert_eq!(editor.text(), "start 0 0 0 90\nstraight 25\ntree 0 0 0 5\n");
    }

    #[test]
    fn save_replaces_the_file() {
        let dir = dir("save");
        let path = dir.join("scene.txt");
        fs::write(&path, "straight 10\n").unwrap();
        let mut editor = Editor::open(&path, ViewLimits::default()).unwrap();
        editor.set_line(1, "curve 20 45");
        editor.save().unwrap();
        assert!(!editor.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "straight 10\ncurve 20 45\n");
        assert!(!dir.join("scene.txt.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_into_a_missing_directory_fails() {
        let path = Path::new("/nonexistent/dir/scene.txt");
        let mut editor = Editor::with_text(path, "straight 1\n", ViewLimits::default());
        let err = editor.save().unwrap_err();
        assert!(err.to_string().starts_with("cannot save scene file"));
    }

    #[test]
    fn failed_save_removes_the_temporary() {
        let dir = dir("save_fail");
        let path = dir.join("scene.txt");
        fs::create_dir(&path).unwrap();
        let mut editor = Editor::with_text(&path, "straight 1\n", ViewLimits::default());
        editor.set_line(1, "straight 2");
        assert!(editor.save().is_err());
        assert!(editor.is_dirty());
        assert!(!dir.join("scene.txt.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn view_starts_on_the_map() {
        let editor =
            Editor::with_text(Path::new("s.txt"), "map m.png 40 -20 1\n", ViewLimits::default());
        assert_eq!(editor.view.center, geom::xz(40.0, -20.0));
    }
}
