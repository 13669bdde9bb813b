//! Unified error type for the sheetcast pipeline.
//!
//! Every adapter funnels its failures into [`Error`]. The row controller
//! renders an error with `Display` when it persists an `ERROR:` status, so
//! messages are kept short and name the service or tool that failed.

/// Unified error type covering all failure modes in sheetcast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration is missing a required value or failed to parse.
    #[error("Config error: {0}")]
    Config(String),

    /// The spreadsheet store rejected a read or a write.
    #[error("Sheet error: {message}")]
    Sheet {
        /// Human-readable error description.
        message: String,
    },

    /// An HTTP service (Drive, Telegram, ...) returned an error or could not
    /// be reached.
    #[error("HTTP error [{service}]: {message}")]
    Http {
        /// Name of the remote service.
        service: String,
        /// Human-readable error description.
        message: String,
    },

    /// An external tool (ffmpeg) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The messaging platform refused the upload on every path.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::Sheet`].
    pub fn sheet(message: impl Into<String>) -> Self {
        Error::Sheet {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Http`].
    pub fn http(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Http {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
