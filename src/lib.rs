//! `stock-indicators` library crate.
//!
//! The binary (`stx`) is a thin wrapper around this library so the pipeline
//! stages are testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod indicators;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
