//! Batch driver: snapshot, order, quota and pacing.

use std::time::Duration;

use sheetcast_core::{Result, Row, Status};

use super::row::{RowOutcome, RowProcessor};
use super::PipelineContext;

/// Counts of what a run did, for the end-of-run log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Rows handed to the processor (skipped ones included).
    pub scanned: usize,
    pub skipped: usize,
    pub done: usize,
    pub failed: usize,
    pub no_identifier: usize,
}

impl BatchReport {
    /// Rows that count toward the quota.
    pub fn attempted(&self) -> usize {
        self.done + self.failed + self.no_identifier
    }

    fn record(&mut self, outcome: &RowOutcome) {
        self.scanned += 1;
        match outcome {
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::NoIdentifier => self.no_identifier += 1,
            RowOutcome::Done { .. } => self.done += 1,
            RowOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// A row a dry run found within the quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRow {
    pub position: usize,
    /// `None` means the row would be marked `NO_IDENTIFIER`.
    pub identifier: Option<String>,
    /// Status left by an earlier run, if any.
    pub last_status: Option<Status>,
}

/// Walks the sheet in position order and processes rows under a quota.
pub struct BatchDriver<'a> {
    ctx: &'a PipelineContext,
    pacing: Duration,
}

impl<'a> BatchDriver<'a> {
    pub fn new(ctx: &'a PipelineContext, pacing: Duration) -> Self {
        Self { ctx, pacing }
    }

    /// Read the sheet body once. Row 1 is the header; body rows keep their
    /// 1-based sheet position and are padded to the full layout width.
    pub async fn snapshot(&self) -> Result<Vec<Row>> {
        let rows = self.ctx.sheet.read_all_rows().await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .skip(1)
            .map(|(index, cells)| Row::new(index + 1, cells))
            .collect())
    }

    /// Process rows until `max_rows` have been attempted or the snapshot is
    /// exhausted.
    ///
    /// Only a failure to read the sheet is returned as an error; row
    /// failures are recorded in the sheet and counted in the report.
    pub async fn run(&self, max_rows: usize) -> Result<BatchReport> {
        let rows = self.snapshot().await?;
        tracing::info!(rows = rows.len(), max_rows, "sheet snapshot taken");

        let processor = RowProcessor::new(self.ctx);
        let mut report = BatchReport::default();

        for row in &rows {
            if report.attempted() >= max_rows {
                tracing::info!(max_rows, "row quota reached");
                break;
            }

            let outcome = processor.process(row).await;
            report.record(&outcome);

            tokio::time::sleep(self.pacing).await;
        }

        tracing::info!(
            scanned = report.scanned,
            skipped = report.skipped,
            done = report.done,
            failed = report.failed,
            no_identifier = report.no_identifier,
            "batch finished"
        );
        Ok(report)
    }

    /// List the rows a run with this quota would attempt, without writing
    /// anything or calling any transport.
    pub async fn plan(&self, max_rows: usize) -> Result<Vec<PlannedRow>> {
        Ok(self
            .snapshot()
            .await?
            .into_iter()
            .filter(|row| !row.is_done())
            .take(max_rows)
            .map(|row| PlannedRow {
                position: row.position(),
                identifier: row.identifier(),
                last_status: Status::parse(row.status()),
            })
            .collect())
    }
}
