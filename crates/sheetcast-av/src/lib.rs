//! # sheetcast-av
//!
//! Video processing and external tool management for the sheetcast
//! pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache the path to
//!   ffmpeg, honouring a configured override.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Row workspaces** ([`RowWorkspace`]) -- per-row scratch file paths that
//!   are removed on drop, whatever happened to the row.
//! - **Transcoding** ([`transcode_web_mp4`]) -- H.264/AAC-LC MP4 with
//!   `+faststart` for progressive playback.

pub mod command;
pub mod tools;
pub mod transcode;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use transcode::{transcode_web_mp4, web_mp4_args};
pub use workspace::RowWorkspace;
