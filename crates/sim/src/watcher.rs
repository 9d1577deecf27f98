use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant, SystemTime},
};

/// Notices edits to the scene file by polling its modification time, at most
/// once per `interval`.
#[derive(Debug)]
pub struct SceneWatcher {
    path: PathBuf,
    interval: Duration,
    last_check: Option<Instant>,
    seen: Option<SystemTime>,
}

impl SceneWatcher {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> SceneWatcher {
        let path = path.into();
        let seen = mtime(&path);
        SceneWatcher { path, interval, last_check: None, seen }
    }

    /// Takes the file's current state as already handled.
    pub fn mark_seen(&mut self) {
        self.seen = mtime(&self.path);
    }

    /// Whether the file changed since it was last seen. Checks the disk only
    /// when `interval` has passed since the previous check.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_check {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_check = Some(now);
        let current = mtime(&self.path);
        if current == self.seen || current.is_none() {
            return false;
        }
        self.seen = current;
        true
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|it| it.modified()).ok()
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    #[test]
    fn reports_each_change_once() {
        let dir = std::env::temp_dir().join("tramsim_watcher");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.txt");
        fs::write(&path, "straight 10\n").unwrap();
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        File::options().write(true).open(&path).unwrap().set_modified(t0).unwrap();

        let second = Duration::from_secs(1);
        let mut watcher = SceneWatcher::new(&path, second);
        let now = Instant::now();
        assert!(!watcher.poll(now));

        File::options().write(true).open(&path).unwrap().set_modified(t0 + second).unwrap();
        // Too soon after the last check.
        assert!(!watcher.poll(now + second / 2));
        assert!(watcher.poll(now + second));
        assert!(!watcher.poll(now + second * 2));

        // Deleting the file is not a change; the scene stays as it is.
        fs::remove_file(&path).unwrap();
        assert!(!watcher.poll(now + second * 3));
        let _ = fs::remove_dir_all(&dir);
    }
}
