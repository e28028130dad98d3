//! Rate sources: where daily USD/local closes come from.
//!
//! - `yahoo`: the public Yahoo Finance chart endpoint (blocking HTTP)
//! - `sample`: deterministic synthetic series for offline use
//! - `source`: the `RateSource` seam and the per-selection fetch loop
//!
//! CSV replay lives in `crate::io::ingest` and implements the same trait.

pub mod sample;
pub mod source;
pub mod yahoo;

pub use sample::SampleSource;
pub use source::{FetchOutcome, RateSource, fetch_selection};
pub use yahoo::{YahooConfig, YahooSource};
