//! Row-scoped scratch files.
//!
//! A [`RowWorkspace`] names the downloaded input and the transcoded output of
//! one sheet row. Both files are removed when the workspace is dropped, so
//! every exit path of a row's processing (success, stage failure, early
//! return) leaves nothing behind.

use std::io;
use std::path::{Path, PathBuf};

/// Scratch file paths for one row, deleted on drop.
///
/// # Example
///
/// ```no_run
/// use sheetcast_av::RowWorkspace;
///
/// let ws = RowWorkspace::new(std::env::temp_dir().as_path(), 7).unwrap();
/// assert!(ws.input().ends_with("in_7.mp4"));
/// // ... download into ws.input(), transcode into ws.output() ...
/// drop(ws); // both files are gone
/// ```
#[derive(Debug)]
pub struct RowWorkspace {
    row: usize,
    input_path: PathBuf,
    output_path: PathBuf,
}

impl RowWorkspace {
    /// Create the workspace for sheet row `row` under `root`.
    ///
    /// Creates `root` if needed. Leftovers from an earlier run that was
    /// killed mid-row are removed so the new attempt starts clean.
    pub fn new(root: &Path, row: usize) -> sheetcast_core::Result<Self> {
        std::fs::create_dir_all(root)?;

        let ws = Self {
            row,
            input_path: root.join(format!("in_{row}.mp4")),
            output_path: root.join(format!("out_{row}.mp4")),
        };
        ws.remove_files();
        Ok(ws)
    }

    /// Where the downloaded source is written.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Where the transcoded file is written.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Best-effort removal of both files; errors are logged and dropped.
    fn remove_files(&self) {
        for path in [&self.input_path, &self.output_path] {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::trace!(row = self.row, "removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::debug!(row = self.row, "could not remove {}: {e}", path.display())
                }
            }
        }
    }
}

impl Drop for RowWorkspace {
    fn drop(&mut self) {
        self.remove_files();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn paths_are_keyed_by_row() {
        let dir = tempfile::tempdir().unwrap();
        let ws = RowWorkspace::new(dir.path(), 12).unwrap();
        assert_eq!(ws.input(), dir.path().join("in_12.mp4"));
        assert_eq!(ws.output(), dir.path().join("out_12.mp4"));
    }

    #[test]
    fn drop_removes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let ws = RowWorkspace::new(dir.path(), 3).unwrap();
        fs::write(ws.input(), b"source").unwrap();
        fs::write(ws.output(), b"encoded").unwrap();
        let (input, output) = (ws.input().to_path_buf(), ws.output().to_path_buf());

        drop(ws);
        assert!(!input.exists());
        assert!(!output.exists());
    }

    #[test]
    fn drop_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let ws = RowWorkspace::new(dir.path(), 4).unwrap();
        fs::write(ws.input(), b"source").unwrap();
        // Output never produced, e.g. transcode failed.
        drop(ws);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn new_clears_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("in_5.mp4"), b"stale").unwrap();
        fs::write(dir.path().join("out_5.mp4"), b"stale").unwrap();

        let ws = RowWorkspace::new(dir.path(), 5).unwrap();
        assert!(!ws.input().exists());
        assert!(!ws.output().exists());
    }

    #[test]
    fn new_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested/work");
        let ws = RowWorkspace::new(&root, 1).unwrap();
        assert!(root.is_dir());
        assert!(ws.input().starts_with(&root));
    }

    #[test]
    fn other_rows_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("in_9.mp4");
        fs::write(&other, b"keep").unwrap();

        drop(RowWorkspace::new(dir.path(), 8).unwrap());
        assert!(other.exists());
    }
}
