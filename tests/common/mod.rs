//! Shared test harness for pipeline integration tests.
//!
//! Provides in-memory fakes for every transport adapter and a
//! [`TestHarness`] that wires them into a [`PipelineContext`] with a private
//! scratch directory.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sheetcast::adapters::{Publisher, SheetStore, SourceStorage, Transcoder};
use sheetcast::pipeline::{BatchDriver, PipelineContext, RowProcessor};
use sheetcast_core::{Error, Result, Row};

// ---------------------------------------------------------------------------
// Sheet
// ---------------------------------------------------------------------------

/// A sheet held in memory. Records every write in order.
#[derive(Default)]
pub struct MemorySheet {
    grid: Mutex<Vec<Vec<String>>>,
    writes: Mutex<Vec<(usize, usize, String)>>,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl MemorySheet {
    pub fn new(rows: &[&[&str]]) -> Self {
        let grid = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Self {
            grid: Mutex::new(grid),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self) {
        *self.fail_reads.lock().unwrap() = true;
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    /// Cell at 1-based (row, column), `""` if never set.
    pub fn cell(&self, row: usize, column: usize) -> String {
        self.grid
            .lock()
            .unwrap()
            .get(row - 1)
            .and_then(|r| r.get(column - 1))
            .cloned()
            .unwrap_or_default()
    }

    pub fn writes(&self) -> Vec<(usize, usize, String)> {
        self.writes.lock().unwrap().clone()
    }

    /// Values written to one cell, in order.
    pub fn history(&self, row: usize, column: usize) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter(|(r, c, _)| *r == row && *c == column)
            .map(|(_, _, v)| v)
            .collect()
    }

    /// Rows that received at least one write.
    pub fn touched_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.writes().into_iter().map(|(r, _, _)| r).collect();
        rows.dedup();
        rows
    }
}

#[async_trait::async_trait]
impl SheetStore for MemorySheet {
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>> {
        if *self.fail_reads.lock().unwrap() {
            return Err(Error::sheet("read rejected (401 Unauthorized)"));
        }
        Ok(self.grid.lock().unwrap().clone())
    }

    async fn write_cell(&self, row: usize, column: usize, value: &str) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(Error::sheet("connection reset"));
        }
        let mut grid = self.grid.lock().unwrap();
        if grid.len() < row {
            grid.resize(row, Vec::new());
        }
        let cells = &mut grid[row - 1];
        if cells.len() < column {
            cells.resize(column, String::new());
        }
        cells[column - 1] = value.to_string();
        self.writes
            .lock()
            .unwrap()
            .push((row, column, value.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Writes a small payload for any identifier not marked as failing.
#[derive(Default)]
pub struct FakeStorage {
    failing: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn fail_for(&self, identifier: &str) {
        self.failing.lock().unwrap().insert(identifier.to_string());
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SourceStorage for FakeStorage {
    async fn fetch(&self, identifier: &str, dest: &Path) -> Result<u64> {
        self.fetched.lock().unwrap().push(identifier.to_string());
        if self.failing.lock().unwrap().contains(identifier) {
            // Leave a partial file behind, like an interrupted download.
            std::fs::write(dest, b"partial")?;
            return Err(Error::http("drive", format!("download of {identifier} failed (404 Not Found)")));
        }
        let payload = format!("source:{identifier}");
        std::fs::write(dest, &payload)?;
        Ok(payload.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Transcoder
// ---------------------------------------------------------------------------

/// Copies input to output, or fails with a configurable message.
#[derive(Default)]
pub struct FakeTranscoder {
    failure: Mutex<Option<String>>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeTranscoder {
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));
        assert!(input.exists(), "transcode called before the download landed");
        if let Some(ref message) = *self.failure.lock().unwrap() {
            std::fs::write(output, b"half-written")?;
            return Err(Error::tool("ffmpeg", message.clone()));
        }
        std::fs::copy(input, output)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Hands out sequential URLs, or fails every upload.
#[derive(Default)]
pub struct FakePublisher {
    fail: Mutex<bool>,
    url_base: Mutex<Option<String>>,
    uploads: Mutex<Vec<PathBuf>>,
}

impl FakePublisher {
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Serve URLs under `base`, e.g. a token-bearing file endpoint.
    pub fn serve_from(&self, base: impl Into<String>) {
        *self.url_base.lock().unwrap() = Some(base.into());
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Publisher for FakePublisher {
    async fn upload(&self, path: &Path) -> Result<String> {
        assert!(path.exists(), "upload called without a transcoded file");
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(path.to_path_buf());
        if *self.fail.lock().unwrap() {
            return Err(Error::Upload("Telegram rejected every upload method: {\"ok\":false}".into()));
        }
        let base = self
            .url_base
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "https://files.example".to_string());
        Ok(format!("{base}/video_{}.mp4", uploads.len()))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub const HEADER: &[&str] = &[
    "file_id", "folder", "path", "drive_url", "tg_old", "status", "final_url",
];

/// Fakes wired into a [`PipelineContext`] with a private work directory.
pub struct TestHarness {
    pub sheet: Arc<MemorySheet>,
    pub storage: Arc<FakeStorage>,
    pub transcoder: Arc<FakeTranscoder>,
    pub publisher: Arc<FakePublisher>,
    pub ctx: PipelineContext,
    pub work_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Body rows only; the header row is prepended.
    pub fn with_rows(body: &[&[&str]]) -> Self {
        let mut rows: Vec<&[&str]> = vec![HEADER];
        rows.extend_from_slice(body);

        let sheet = Arc::new(MemorySheet::new(&rows));
        let storage = Arc::new(FakeStorage::default());
        let transcoder = Arc::new(FakeTranscoder::default());
        let publisher = Arc::new(FakePublisher::default());
        let work_dir = tempfile::tempdir().expect("failed to create work dir");

        let ctx = PipelineContext {
            sheet: sheet.clone(),
            storage: storage.clone(),
            transcoder: transcoder.clone(),
            publisher: publisher.clone(),
            work_dir: work_dir.path().to_path_buf(),
        };

        Self {
            sheet,
            storage,
            transcoder,
            publisher,
            ctx,
            work_dir,
        }
    }

    /// A driver with no pacing delay.
    pub fn driver(&self) -> BatchDriver<'_> {
        self.driver_with_pacing(Duration::ZERO)
    }

    pub fn driver_with_pacing(&self, pacing: Duration) -> BatchDriver<'_> {
        BatchDriver::new(&self.ctx, pacing)
    }

    pub fn processor(&self) -> RowProcessor<'_> {
        RowProcessor::new(&self.ctx)
    }

    /// Build the padded [`Row`] for a 1-based sheet position from the
    /// current sheet contents.
    pub async fn row(&self, position: usize) -> Row {
        let rows = self.sheet.read_all_rows().await.unwrap();
        Row::new(position, rows[position - 1].clone())
    }

    /// Files left in the work directory.
    pub fn leftover_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.work_dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}
