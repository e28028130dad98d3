//! Terminal plotting for the CLI (`fxdash chart`).

pub mod ascii;

pub use ascii::{render_grid, render_panel_lines};
