//! sheetcast-core: shared types, errors, and configuration.
//!
//! This crate is the foundational dependency for the other sheetcast crates.
//! It defines the positional [`Row`] model and the [`Status`] labels the
//! controller persists, the source [`identifier`] extractor, a unified error
//! type, and the application [`config::Config`].

pub mod config;
pub mod error;
pub mod identifier;
pub mod row;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use identifier::extract;
pub use row::{Row, Stage, Status, ERROR_MESSAGE_LIMIT};
