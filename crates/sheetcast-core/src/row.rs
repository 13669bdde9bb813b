//! Positional row model and the status labels persisted into it.
//!
//! The sheet has no row ids: a row is identified by its 1-based position in
//! the sheet, and its cells are addressed by fixed 1-based column numbers.

use std::fmt;

use crate::identifier::extract;

/// Column A: primary source reference (bare id or link).
pub const SOURCE_REF_A: usize = 1;
/// Column D: alternate source reference, tried when column A yields nothing.
pub const SOURCE_REF_C: usize = 4;
/// Column F: status label, written only by the controller.
pub const STATUS_COLUMN: usize = 6;
/// Column G: final public URL; non-empty means the row is finished.
pub const RESULT_URL_COLUMN: usize = 7;

/// Columns tried for an identifier, in order. First hit wins.
pub const IDENTIFIER_COLUMNS: [usize; 2] = [SOURCE_REF_A, SOURCE_REF_C];

/// Number of cells every row is padded to.
pub const ROW_WIDTH: usize = RESULT_URL_COLUMN;

/// Maximum number of characters of an error message kept in a status cell.
pub const ERROR_MESSAGE_LIMIT: usize = 250;

const ERROR_PREFIX: &str = "ERROR: ";

/// One row of the sheet body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    position: usize,
    cells: Vec<String>,
}

impl Row {
    /// Build a row at the given 1-based sheet position.
    ///
    /// Short (ragged) rows are padded with empty cells up to [`ROW_WIDTH`].
    pub fn new(position: usize, mut cells: Vec<String>) -> Self {
        if cells.len() < ROW_WIDTH {
            cells.resize(ROW_WIDTH, String::new());
        }
        Self { position, cells }
    }

    /// The 1-based sheet row number.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Cell value at a 1-based column, or `""` when out of range.
    pub fn cell(&self, column: usize) -> &str {
        column
            .checked_sub(1)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn status(&self) -> &str {
        self.cell(STATUS_COLUMN)
    }

    pub fn result_url(&self) -> &str {
        self.cell(RESULT_URL_COLUMN)
    }

    /// A row with a result URL is finished and must never be touched again.
    pub fn is_done(&self) -> bool {
        !self.result_url().trim().is_empty()
    }

    /// Resolve the source identifier from [`IDENTIFIER_COLUMNS`] in order.
    pub fn identifier(&self) -> Option<String> {
        IDENTIFIER_COLUMNS
            .iter()
            .find_map(|&column| extract(self.cell(column)))
    }
}

/// A unit of work inside a row's processing, each preceded by a status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Downloading,
    Transcoding,
    Uploading,
}

impl Stage {
    /// The status persisted just before this stage runs.
    pub fn status(self) -> Status {
        match self {
            Stage::Downloading => Status::Downloading,
            Stage::Transcoding => Status::Transcoding,
            Stage::Uploading => Status::Uploading,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Downloading => "download",
            Stage::Transcoding => "transcode",
            Stage::Uploading => "upload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The label stored in a row's status cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Downloading,
    Transcoding,
    Uploading,
    Done,
    NoIdentifier,
    /// Terminal failure; the message is already truncated.
    Error(String),
}

impl Status {
    /// Build an [`Status::Error`], truncating the message to
    /// [`ERROR_MESSAGE_LIMIT`] characters.
    pub fn error(message: impl AsRef<str>) -> Self {
        Status::Error(bounded_error_message(message.as_ref()))
    }

    /// Parse a cell value back into a status. Unknown text yields `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        match label {
            "DOWNLOADING" => Some(Status::Downloading),
            "TRANSCODING" => Some(Status::Transcoding),
            "UPLOADING" => Some(Status::Uploading),
            "DONE" => Some(Status::Done),
            "NO_IDENTIFIER" => Some(Status::NoIdentifier),
            _ => label
                .strip_prefix(ERROR_PREFIX)
                .map(|msg| Status::Error(msg.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Downloading => f.write_str("DOWNLOADING"),
            Status::Transcoding => f.write_str("TRANSCODING"),
            Status::Uploading => f.write_str("UPLOADING"),
            Status::Done => f.write_str("DONE"),
            Status::NoIdentifier => f.write_str("NO_IDENTIFIER"),
            Status::Error(msg) => write!(f, "{ERROR_PREFIX}{msg}"),
        }
    }
}

/// Cut an error message to at most [`ERROR_MESSAGE_LIMIT`] characters so it
/// fits comfortably in a spreadsheet cell.
fn bounded_error_message(message: &str) -> String {
    truncate_chars(message, ERROR_MESSAGE_LIMIT).to_string()
}

/// Cut `s` to at most `max` characters without splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
