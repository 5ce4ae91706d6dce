//! Chart output.
//!
//! - `ascii`: fixed-grid terminal plots
//! - `svg`: chart files rendered with plotters

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
