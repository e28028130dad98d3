//! Reshaping and metrics over fetched rate series.
//!
//! - `align`: union-of-dates table with forward-filled gaps
//! - `returns`: percentage-change series
//! - `performance`: trailing window returns and best/worst performers
//! - `layout`: subplot grid and pagination

pub mod align;
pub mod layout;
pub mod performance;
pub mod returns;

pub use align::build_table;
pub use layout::{PanelSlot, SubplotGrid};
pub use performance::{Performers, best_worst, calculate_performance};
pub use returns::{pct_change, rebased};
