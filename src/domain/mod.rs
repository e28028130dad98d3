//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the supported currency set (`Currency`) and user selection (`Selection`, `DateRange`)
//! - fetched and aligned rate data (`RateSeries`, `FxTable`)
//! - performance outputs (`PerfWindow`, `PerfCell`, `PerformanceRow`)
//! - presentation knobs (`ChartMode`, `DashConfig`)

pub mod types;

pub use types::*;
