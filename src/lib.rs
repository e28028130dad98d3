//! `fxdash` library crate.
//!
//! The binary (`fxdash`) is a thin wrapper around this library so that:
//!
//! - the fetch/align/compute pipeline is testable without a terminal or network
//! - CLI and TUI front-ends share one implementation
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
