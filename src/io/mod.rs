//! Input/output helpers.
//!
//! - raw FX CSV ingest + replay source (`ingest`)
//! - raw and performance CSV exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
