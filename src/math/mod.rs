//! Numerical utilities: moving windows and least squares.

pub mod ols;
pub mod window;

pub use ols::*;
pub use window::*;
