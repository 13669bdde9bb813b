//! Transport adapters: the external collaborators the row controller calls.
//!
//! Each collaborator is a trait so the pipeline can be driven against the
//! real services or against in-memory fakes. Every call is awaited to
//! completion before the controller moves on.

pub mod drive;
pub mod ffmpeg;
pub mod sheets;
pub mod telegram;

pub use drive::DriveStorage;
pub use ffmpeg::FfmpegTranscoder;
pub use sheets::GoogleSheetsClient;
pub use telegram::TelegramPublisher;

use std::path::Path;

use sheetcast_core::Result;

/// The spreadsheet acting as work queue and status ledger.
#[async_trait::async_trait]
pub trait SheetStore: Send + Sync {
    /// Every row of the sheet in order, header included, cells as stored.
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>>;

    /// Write a single cell. `row` and `column` are 1-based.
    async fn write_cell(&self, row: usize, column: usize, value: &str) -> Result<()>;
}

/// Where the source videos live.
#[async_trait::async_trait]
pub trait SourceStorage: Send + Sync {
    /// Stream the file named by `identifier` into `dest`, returning the
    /// number of bytes written.
    async fn fetch(&self, identifier: &str, dest: &Path) -> Result<u64>;
}

/// Converts a downloaded source into the publishable format.
#[async_trait::async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()>;
}

/// The messaging platform the result is published to.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Upload `path` and return a durable public URL for it.
    async fn upload(&self, path: &Path) -> Result<String>;
}

/// Read an error response body for inclusion in a message.
async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .map(|body| body.trim().to_string())
        .unwrap_or_default()
}

/// Build an HTTP client with a whole-request timeout.
fn http_client(timeout: std::time::Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client with timeout: {}", e);
            reqwest::Client::new()
        })
}
