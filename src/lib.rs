//! sheetcast - spreadsheet-driven batch transcoder
//!
//! This library crate exposes the pipeline controller and the transport
//! adapters so the binary and the integration tests share one code path.

pub mod adapters;
pub mod pipeline;
