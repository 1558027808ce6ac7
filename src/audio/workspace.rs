//! Per-run temporary directory for intermediate clips.
//!
//! Every assembly run gets its own `run-*` directory under the configured
//! temp root, so concurrent runs never share clip names. The directory is
//! removed when the run closes or its [`RunWorkspace`] is dropped.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

const RUN_PREFIX: &str = "run-";

pub struct RunWorkspace {
    dir: TempDir,
}

impl RunWorkspace {
    pub fn create(temp_root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(temp_root)?;
        let dir = tempfile::Builder::new().prefix(RUN_PREFIX).tempdir_in(temp_root)?;
        log::debug!("audio: run workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory and every clip in it.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

/// Delete `run-*` directories under `temp_root` last modified more than
/// `max_age` ago. Returns how many were removed.
///
/// Runs that crashed before cleaning up are left behind as such
/// directories; live runs are younger than `max_age` and untouched.
pub fn sweep_stale_runs(temp_root: &Path, max_age: Duration) -> usize {
    let entries = match std::fs::read_dir(temp_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return 0,
        Err(e) => {
            log::warn!("audio: cannot list {}: {e}", temp_root.display());
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_run = entry.file_name().to_string_lossy().starts_with(RUN_PREFIX);
        if !is_run || !path.is_dir() {
            continue;
        }

        let stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age >= max_age);
        if !stale {
            continue;
        }

        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                log::info!("audio: removed stale run {}", path.display());
                removed += 1;
            }
            Err(e) => log::warn!("audio: cannot remove {}: {e}", path.display()),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn workspace_is_removed_on_close() {
        let root = tempdir().unwrap();
        let ws = RunWorkspace::create(&root.path().join("temp")).unwrap();
        let path = ws.path().to_path_buf();
        std::fs::write(ws.file("clip.mp3"), b"x").unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("run-"));
        ws.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_workspaces_are_distinct() {
        let root = tempdir().unwrap();
        let a = RunWorkspace::create(root.path()).unwrap();
        let b = RunWorkspace::create(root.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn sweep_removes_only_stale_run_dirs() {
        let root = tempdir().unwrap();
        std::fs::create_dir(root.path().join("run-old")).unwrap();
        std::fs::create_dir(root.path().join("keep")).unwrap();

        assert_eq!(sweep_stale_runs(root.path(), Duration::from_secs(3600)), 0);
        assert_eq!(sweep_stale_runs(root.path(), Duration::ZERO), 1);
        assert!(!root.path().join("run-old").exists());
        assert!(root.path().join("keep").exists());
    }

    #[test]
    fn sweep_of_missing_root_is_noop() {
        assert_eq!(sweep_stale_runs(Path::new("/nonexistent/temp"), Duration::ZERO), 0);
    }
}
