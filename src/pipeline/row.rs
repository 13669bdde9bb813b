//! Per-row state machine.

use sheetcast_av::RowWorkspace;
use sheetcast_core::row::{RESULT_URL_COLUMN, STATUS_COLUMN};
use sheetcast_core::{Error, Row, Stage, Status};

use super::PipelineContext;

/// How a row's processing ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row already has a result URL; nothing was written.
    Skipped,
    /// No identifier in any source column; `NO_IDENTIFIER` was written.
    NoIdentifier,
    /// Uploaded; the URL is in the result column.
    Done { url: String },
    /// A stage failed; the `ERROR: <message>` status was written.
    Failed { stage: Stage, status: Status },
}

impl RowOutcome {
    /// Whether the row counts toward the per-run quota.
    pub fn attempted(&self) -> bool {
        !matches!(self, RowOutcome::Skipped)
    }
}

/// A stage error, tagged with the stage that raised it.
#[derive(Debug)]
struct StageFailure {
    stage: Stage,
    error: Error,
}

fn at(stage: Stage) -> impl FnOnce(Error) -> StageFailure {
    move |error| StageFailure { stage, error }
}

/// Drives one row through its stages against the context's collaborators.
pub struct RowProcessor<'a> {
    ctx: &'a PipelineContext,
}

impl<'a> RowProcessor<'a> {
    pub fn new(ctx: &'a PipelineContext) -> Self {
        Self { ctx }
    }

    /// Process one row to a terminal state.
    ///
    /// Never returns an error: every failure is persisted into the row's
    /// status cell (or logged, if the sheet itself is unreachable) and
    /// reported through [`RowOutcome::Failed`].
    pub async fn process(&self, row: &Row) -> RowOutcome {
        let position = row.position();

        if row.is_done() {
            tracing::debug!(row = position, "already has a result URL, skipping");
            return RowOutcome::Skipped;
        }

        let Some(identifier) = row.identifier() else {
            tracing::info!(row = position, "no source identifier");
            self.persist(position, &Status::NoIdentifier).await;
            return RowOutcome::NoIdentifier;
        };

        tracing::info!(row = position, identifier = %identifier, "processing");

        match self.run_stages(position, &identifier).await {
            Ok(url) => {
                self.persist(position, &Status::Done).await;
                // The URL embeds the bot token; it goes to the sheet only.
                tracing::info!(row = position, "done");
                RowOutcome::Done { url }
            }
            Err(StageFailure { stage, error }) => {
                tracing::error!(row = position, stage = %stage, "{error}");
                let status = Status::error(error.to_string());
                self.persist(position, &status).await;
                RowOutcome::Failed { stage, status }
            }
        }
    }

    /// Download, transcode, upload and record the URL.
    ///
    /// The workspace lives for the duration of this call, so its files are
    /// removed on every return path.
    async fn run_stages(&self, position: usize, identifier: &str) -> Result<String, StageFailure> {
        self.enter(position, Stage::Downloading).await?;
        let workspace =
            RowWorkspace::new(&self.ctx.work_dir, position).map_err(at(Stage::Downloading))?;
        let bytes = self
            .ctx
            .storage
            .fetch(identifier, workspace.input())
            .await
            .map_err(at(Stage::Downloading))?;
        tracing::debug!(row = position, bytes, "source downloaded");

        self.enter(position, Stage::Transcoding).await?;
        self.ctx
            .transcoder
            .transcode(workspace.input(), workspace.output())
            .await
            .map_err(at(Stage::Transcoding))?;

        self.enter(position, Stage::Uploading).await?;
        let url = self
            .ctx
            .publisher
            .upload(workspace.output())
            .await
            .map_err(at(Stage::Uploading))?;

        self.ctx
            .sheet
            .write_cell(position, RESULT_URL_COLUMN, &url)
            .await
            .map_err(at(Stage::Uploading))?;

        Ok(url)
    }

    /// Persist the stage's status before its work begins.
    async fn enter(&self, position: usize, stage: Stage) -> Result<(), StageFailure> {
        tracing::debug!(row = position, stage = %stage, "entering stage");
        self.ctx
            .sheet
            .write_cell(position, STATUS_COLUMN, &stage.status().to_string())
            .await
            .map_err(at(stage))
    }

    /// Write a terminal status. A failed write cannot be recorded anywhere
    /// else, so it is logged and the row moves on.
    async fn persist(&self, position: usize, status: &Status) {
        if let Err(e) = self
            .ctx
            .sheet
            .write_cell(position, STATUS_COLUMN, &status.to_string())
            .await
        {
            tracing::warn!(row = position, status = %status, "failed to write status: {e}");
        }
    }
}
