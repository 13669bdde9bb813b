//! The row-state pipeline controller.
//!
//! [`RowProcessor`] drives a single row through
//! `DOWNLOADING -> TRANSCODING -> UPLOADING -> DONE`, persisting each status
//! before the stage's work starts. [`BatchDriver`] walks a snapshot of the
//! sheet in position order and applies the processor under a per-run quota.

pub mod batch;
pub mod row;

pub use batch::{BatchDriver, BatchReport, PlannedRow};
pub use row::{RowOutcome, RowProcessor};

use std::path::PathBuf;
use std::sync::Arc;

use sheetcast_core::config::Config;
use sheetcast_core::{Error, Result};

use crate::adapters::{
    DriveStorage, FfmpegTranscoder, GoogleSheetsClient, Publisher, SheetStore, SourceStorage,
    TelegramPublisher, Transcoder,
};

/// The service clients a run holds for its whole duration.
///
/// Built once at process start and passed to the controller explicitly.
#[derive(Clone)]
pub struct PipelineContext {
    pub sheet: Arc<dyn SheetStore>,
    pub storage: Arc<dyn SourceStorage>,
    pub transcoder: Arc<dyn Transcoder>,
    pub publisher: Arc<dyn Publisher>,
    /// Directory for the per-row scratch files.
    pub work_dir: PathBuf,
}

impl PipelineContext {
    /// Construct the production adapters from a validated [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config
            .google
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("a Google access token is required".into()))?;

        let transcoder =
            FfmpegTranscoder::discover(&config.tools, config.transcode.clone());
        // Surface a missing binary at startup; rows would fail one by one otherwise.
        if let Err(e) = transcoder.tools().require("ffmpeg") {
            tracing::warn!("{e}");
        }

        Ok(Self {
            sheet: Arc::new(GoogleSheetsClient::new(&config.sheet, token.clone())),
            storage: Arc::new(DriveStorage::new(&config.google, token)),
            transcoder: Arc::new(transcoder),
            publisher: Arc::new(TelegramPublisher::new(&config.telegram)),
            work_dir: config.batch.work_dir.clone(),
        })
    }
}
